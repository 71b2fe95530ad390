//! Mallard - OpenAI-compatible proxy for the DuckDuckGo AI chat backend
//!
//! This library provides the core functionality for the Mallard proxy
//! server: session token bootstrap, upstream streaming, and translation of
//! the backend's event stream into OpenAI chat-completion responses.

pub mod config;
pub mod error;
pub mod routes;
pub mod translate;
pub mod upstream;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::upstream::{Endpoints, StreamClient, TokenAcquirer};

/// Application state shared across all request handlers.
///
/// All translation state is request-local; this only holds configuration
/// and the upstream clients built around one pooled HTTP client.
pub struct AppState {
    pub config: Config,
    pub token_acquirer: TokenAcquirer,
    pub chat_client: StreamClient,
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let endpoints = Arc::new(Endpoints::from_config(&config)?);
        let token_acquirer = TokenAcquirer::new(http_client.clone(), endpoints.clone());
        let chat_client = StreamClient::new(http_client, endpoints, config.upstream_model.clone());

        Ok(Self {
            config,
            token_acquirer,
            chat_client,
            start_time: Instant::now(),
        })
    }
}

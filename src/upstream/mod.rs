//! Upstream backend clients
//!
//! Everything that talks to the chat backend lives here: the session token
//! bootstrap, the streaming chat call, and the line assembly for its
//! event-stream body.

pub mod chat;
pub mod headers;
pub mod lines;
pub mod token;

use anyhow::{anyhow, Context, Result};
use reqwest::header::HeaderValue;

use crate::config::Config;

pub use chat::{ByteStream, StreamClient, UpstreamMessage};
pub use lines::LineBuffer;
pub use token::{SessionToken, TokenAcquirer};

/// Path of the status endpoint that issues session tokens
const STATUS_PATH: &str = "/duckchat/v1/status";
/// Path of the chat endpoint
const CHAT_PATH: &str = "/duckchat/v1/chat";

/// Resolved upstream endpoints.
///
/// With domain fronting enabled the physical connection goes to the
/// front-end base URL while the `Host` header keeps the logical identity,
/// which also avoids the redirect the front end would otherwise answer with.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub status_url: String,
    pub chat_url: String,
    pub host_override: Option<HeaderValue>,
}

impl Endpoints {
    /// Resolve endpoint URLs and the optional `Host` override from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let (base, host_override) = if config.fronting_enabled {
            let logical = reqwest::Url::parse(&config.upstream_base_url)
                .context("Invalid UPSTREAM_BASE_URL")?;
            let host = logical
                .host_str()
                .ok_or_else(|| anyhow!("UPSTREAM_BASE_URL has no host"))?;
            let host_value =
                HeaderValue::from_str(host).context("UPSTREAM_BASE_URL host is not a valid header value")?;
            (config.fronting_base_url.as_str(), Some(host_value))
        } else {
            (config.upstream_base_url.as_str(), None)
        };

        let base = base.trim_end_matches('/');
        Ok(Self {
            status_url: format!("{base}{STATUS_PATH}"),
            chat_url: format!("{base}{CHAT_PATH}"),
            host_override,
        })
    }
}

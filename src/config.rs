//! Configuration management for Mallard
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

use crate::translate::TerminalFrameStyle;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Base URL of the upstream chat backend
    pub upstream_base_url: String,
    /// Route upstream calls through the alternate front-end host
    pub fronting_enabled: bool,
    /// Alternate front-end base URL used when fronting is enabled
    pub fronting_base_url: String,

    /// Model identifier sent upstream for every request
    pub upstream_model: String,
    /// Shape of the terminal frame emitted on streaming responses
    pub terminal_frame: TerminalFrameStyle,

    /// Timeout for upstream requests (in seconds), covering the full stream
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("MALLARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("MALLARD_PORT")
                .unwrap_or_else(|_| "3456".to_string())
                .parse()
                .context("Invalid MALLARD_PORT")?,

            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://duckduckgo.com".to_string()),
            // Accepts "yes" for compatibility with existing deployments
            fronting_enabled: env::var("ENABLE_DOMAIN_FRONTING")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "yes" | "true" | "1"))
                .unwrap_or(false),
            fronting_base_url: env::var("FRONTING_BASE_URL")
                .unwrap_or_else(|_| "https://duck.ai".to_string()),

            upstream_model: env::var("UPSTREAM_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo-0125".to_string()),
            terminal_frame: env::var("TERMINAL_FRAME_STYLE")
                .unwrap_or_else(|_| "full".to_string())
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid TERMINAL_FRAME_STYLE")?,

            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid REQUEST_TIMEOUT_SECS")?,
        })
    }
}

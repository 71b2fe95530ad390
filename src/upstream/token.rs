//! Session token bootstrap
//!
//! The backend requires a short-lived token with every chat call, issued
//! through a status probe that asks for one via a request header. Tokens
//! are single-use: one is acquired per request and dropped afterwards,
//! never cached or shared.

use std::sync::Arc;

use reqwest::header::HOST;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    upstream::{headers::browser_headers, Endpoints},
};

/// Request header that asks the status endpoint to issue a token
pub const TOKEN_REQUEST_HEADER: &str = "x-vqd-accept";
/// Header carrying the token, on the status response and the chat request
pub const TOKEN_HEADER: &str = "x-vqd-4";

/// Opaque single-use backend credential
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Acquires session tokens from the backend status endpoint
pub struct TokenAcquirer {
    http: reqwest::Client,
    endpoints: Arc<Endpoints>,
}

impl TokenAcquirer {
    pub fn new(http: reqwest::Client, endpoints: Arc<Endpoints>) -> Self {
        Self { http, endpoints }
    }

    /// Acquire a fresh session token.
    ///
    /// Any transport failure or missing token header surfaces immediately;
    /// the caller aborts the whole request. No retry.
    pub async fn acquire(&self) -> AppResult<SessionToken> {
        let mut request = self
            .http
            .get(&self.endpoints.status_url)
            .headers(browser_headers())
            .header(TOKEN_REQUEST_HEADER, "1");

        if let Some(host) = &self.endpoints.host_override {
            request = request.header(HOST, host.clone());
        }

        let response = request.send().await?;

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(AppError::TokenMissing)?;

        debug!("Acquired upstream session token");
        Ok(SessionToken(token))
    }
}

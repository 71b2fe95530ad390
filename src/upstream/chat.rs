//! Streaming chat client for the upstream backend
//!
//! Sends the translated conversation with a freshly acquired session token
//! and hands back the response body as an unbuffered byte stream. Backend
//! replies can be long and must be relayed as they arrive.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use reqwest::header::HOST;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    upstream::{headers::browser_headers, token::TOKEN_HEADER, Endpoints, SessionToken},
};

/// Stream type for the raw upstream response body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// One message of the conversation, in the shape the backend expects.
///
/// Roles are already coerced at this point; the backend only understands
/// `user` and `assistant`.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [UpstreamMessage],
}

/// Client for the upstream chat endpoint
pub struct StreamClient {
    http: reqwest::Client,
    endpoints: Arc<Endpoints>,
    model: String,
}

impl StreamClient {
    pub fn new(http: reqwest::Client, endpoints: Arc<Endpoints>, model: String) -> Self {
        Self {
            http,
            endpoints,
            model,
        }
    }

    /// Send the conversation upstream and return the streaming body.
    ///
    /// The token is consumed here; it is only valid for this one call.
    pub async fn send(
        &self,
        messages: &[UpstreamMessage],
        token: &SessionToken,
    ) -> AppResult<ByteStream> {
        let payload = ChatPayload {
            model: &self.model,
            messages,
        };

        let mut request = self
            .http
            .post(&self.endpoints.chat_url)
            .headers(browser_headers())
            .header(TOKEN_HEADER, token.as_str())
            .json(&payload);

        if let Some(host) = &self.endpoints.host_override {
            request = request.header(HOST, host.clone());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus(format!(
                "chat endpoint returned {status}: {body}"
            )));
        }

        debug!(model = %self.model, messages = messages.len(), "Upstream chat stream opened");
        Ok(Box::pin(response.bytes_stream()))
    }
}

//! Chat completions endpoint
//!
//! OpenAI-compatible chat completions API endpoint. Normalizes the inbound
//! request, bootstraps an upstream session, and relays the translated
//! reply either as an SSE stream or as one aggregated document.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::AppError,
    translate::{decode_events, error_frame, ChatEvent, Finished, Mode, Translator},
    upstream::UpstreamMessage,
    AppState,
};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Inbound chat message
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub role: Role,
    pub content: String,
}

/// Chat completion request.
///
/// Sampling parameters and other OpenAI extras are accepted and ignored;
/// the upstream call is always made with the pinned model.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub stream: bool,
}

/// Coerce inbound messages into the shape the backend accepts.
///
/// The backend has no system role, so `system` becomes `user` here, once,
/// at the boundary. `user` and `assistant` pass through unchanged.
fn to_upstream(messages: Vec<InboundMessage>) -> Vec<UpstreamMessage> {
    messages
        .into_iter()
        .map(|message| UpstreamMessage {
            role: match message.role {
                Role::System | Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: message.content,
        })
        .collect()
}

/// Handle chat completion requests
///
/// This endpoint is compatible with OpenAI's chat completions API.
/// Every request acquires a fresh single-use session token before the
/// upstream chat call; nothing is shared between requests.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ChatCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

    let messages = to_upstream(request.messages);

    info!(
        requested_model = ?request.model,
        pinned_model = %state.config.upstream_model,
        stream = request.stream,
        messages = messages.len(),
        "Processing chat completion request"
    );

    let token = state.token_acquirer.acquire().await?;
    let upstream = state.chat_client.send(&messages, &token).await?;
    let events = decode_events(upstream);

    let translator = Translator::new(
        if request.stream {
            Mode::Streaming
        } else {
            Mode::Aggregate
        },
        state.config.terminal_frame,
        state.config.upstream_model.clone(),
    );

    if request.stream {
        stream_response(events, translator)
    } else {
        aggregate_response(events, translator).await
    }
}

/// Drive the translator to completion and reply with one document
async fn aggregate_response<S>(events: S, mut translator: Translator) -> Result<Response, AppError>
where
    S: Stream<Item = Result<ChatEvent, AppError>>,
{
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        translator.on_event(event?);
    }

    match translator.finish() {
        Finished::Document(document) => Ok((StatusCode::OK, Json(document)).into_response()),
        Finished::Frames(_) => Err(AppError::Internal(anyhow::anyhow!(
            "aggregate translator finished with stream frames"
        ))),
    }
}

/// Relay translated fragments as they arrive.
///
/// Each frame is yielded individually so the transport flushes it right
/// away. Errors after the stream has started are reported as an SSE error
/// event; the `[DONE]` sentinel is only sent after a clean termination.
fn stream_response<S>(events: S, mut translator: Translator) -> Result<Response, AppError>
where
    S: Stream<Item = Result<ChatEvent, AppError>> + Send + 'static,
{
    let sse = async_stream::stream! {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some(frame) = translator.on_event(event) {
                        yield Ok::<_, Infallible>(frame);
                    }
                }
                Err(error) => {
                    warn!(%error, "Upstream stream failed mid-response");
                    yield Ok(error_frame(&error));
                    return;
                }
            }
        }

        match translator.finish() {
            Finished::Frames(frames) => {
                for frame in frames {
                    yield Ok(frame);
                }
            }
            Finished::Document(_) => {}
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(sse))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {e}")))
}

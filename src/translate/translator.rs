//! Response translation state machine
//!
//! One `Translator` lives for exactly one request. It stamps identity
//! fields from the first backend event, accumulates content fragments,
//! and produces either per-event SSE frames or one final document,
//! depending on the mode selected by the caller's `stream` flag.

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Number;
use uuid::Uuid;

use crate::error::AppError;
use crate::translate::{
    envelope::{sse_done, ChatCompletion, Identity, TerminalFrameStyle},
    event::ChatEvent,
};

/// Translation mode, selected once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Emit one fragment per backend event, then a terminal frame and the
    /// closing sentinel
    Streaming,
    /// Accumulate silently and emit one document at termination
    Aggregate,
}

/// Everything the translator produces at termination
pub enum Finished {
    /// Terminal frame plus closing sentinel, in emission order
    Frames(Vec<Bytes>),
    /// The single aggregated document
    Document(ChatCompletion),
}

/// Per-request translation state
pub struct Translator {
    mode: Mode,
    terminal_style: TerminalFrameStyle,
    fallback_model: String,
    identity: Option<Identity>,
    content: String,
}

impl Translator {
    pub fn new(mode: Mode, terminal_style: TerminalFrameStyle, fallback_model: String) -> Self {
        Self {
            mode,
            terminal_style,
            fallback_model,
            identity: None,
            content: String::new(),
        }
    }

    /// Translate one backend event.
    ///
    /// Identity fields are stamped on the first event only; later events
    /// never move them. Returns the SSE frame to emit in streaming mode,
    /// `None` in aggregate mode. Each frame is built fresh and carries
    /// only its own fragment, never the running total.
    pub fn on_event(&mut self, event: ChatEvent) -> Option<Bytes> {
        let fallback_model = &self.fallback_model;
        let identity = self
            .identity
            .get_or_insert_with(|| stamp_identity(&event, fallback_model));

        let fragment = event.message.unwrap_or_default();
        self.content.push_str(&fragment);

        match self.mode {
            Mode::Streaming => Some(ChatCompletion::delta_frame(identity, &fragment).to_sse()),
            Mode::Aggregate => None,
        }
    }

    /// Handle the terminal marker.
    ///
    /// Consumes the translator; nothing can be translated after this.
    pub fn finish(self) -> Finished {
        let Translator {
            mode,
            terminal_style,
            fallback_model,
            identity,
            content,
        } = self;

        // A stream that terminated before its first event still gets a
        // well-formed envelope.
        let identity = identity.unwrap_or_else(|| Identity {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            created: Number::from(Utc::now().timestamp()),
            model: fallback_model,
        });

        match mode {
            Mode::Streaming => Finished::Frames(vec![
                ChatCompletion::terminal_frame(&identity, terminal_style).to_sse(),
                sse_done(),
            ]),
            Mode::Aggregate => Finished::Document(ChatCompletion::document(&identity, content)),
        }
    }
}

fn stamp_identity(event: &ChatEvent, fallback_model: &str) -> Identity {
    Identity {
        id: event
            .id
            .clone()
            .unwrap_or_else(|| format!("chatcmpl-{}", Uuid::new_v4())),
        created: event
            .created
            .clone()
            .unwrap_or_else(|| Number::from(Utc::now().timestamp())),
        model: event
            .model
            .clone()
            .unwrap_or_else(|| fallback_model.to_string()),
    }
}

#[derive(Serialize)]
struct StreamErrorEvent {
    error: StreamErrorBody,
}

#[derive(Serialize)]
struct StreamErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
    code: &'static str,
}

/// Format an error as an SSE event so callers of an already-started stream
/// still learn why it ended. The stream closes without the `[DONE]`
/// sentinel afterwards.
pub fn error_frame(error: &AppError) -> Bytes {
    let event = StreamErrorEvent {
        error: StreamErrorBody {
            message: error.to_string(),
            kind: "stream_error",
            code: error.code(),
        },
    };
    let json = serde_json::to_string(&event).expect("error event should always serialize");
    Bytes::from(format!("data: {json}\n\n"))
}

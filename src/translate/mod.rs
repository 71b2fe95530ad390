//! Protocol translation core
//!
//! Decodes the backend's line-oriented event stream and re-frames it as
//! OpenAI-style chat completions, either incrementally (SSE) or as one
//! aggregated document.

pub mod envelope;
pub mod event;
pub mod stream;
pub mod translator;

pub use envelope::{sse_done, ChatCompletion, Identity, TerminalFrameStyle};
pub use event::{parse_line, ChatEvent, ParsedLine};
pub use stream::decode_events;
pub use translator::{error_frame, Finished, Mode, Translator};

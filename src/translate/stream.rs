//! Decoded event stream
//!
//! Exposes the backend response body as a lazy, finite, non-restartable
//! stream of decoded events. The stream ends cleanly only after the
//! terminal marker; end-of-input without it is an error, never a silent
//! truncation.

use async_stream::try_stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::{
    error::AppError,
    translate::event::{parse_line, ParsedLine},
    translate::ChatEvent,
    upstream::LineBuffer,
};

/// Decode a byte stream of backend lines into chat events.
///
/// Yields one [`ChatEvent`] per content line. After the terminal marker,
/// no further lines are parsed; the remaining body is drained and
/// discarded so the connection is fully consumed. A malformed line or an
/// end-of-input without the marker yields an error and ends the stream.
pub fn decode_events<S>(bytes: S) -> impl Stream<Item = Result<ChatEvent, AppError>>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>>,
{
    try_stream! {
        let mut lines = LineBuffer::new();
        let mut terminated = false;

        futures::pin_mut!(bytes);
        'body: while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for line in lines.feed(&chunk) {
                match parse_line(&line)? {
                    ParsedLine::Event(event) => yield event,
                    ParsedLine::Done => {
                        terminated = true;
                        break 'body;
                    }
                    ParsedLine::Skip => {}
                }
            }
        }

        if !terminated {
            if let Some(remainder) = lines.take_remainder() {
                warn!(
                    discarded = remainder.len(),
                    "Upstream body ended with unterminated trailing bytes"
                );
            }
            Err(AppError::IncompleteStream)?;
        }

        // Late bytes after the terminal marker are discarded unparsed.
        while bytes.next().await.is_some() {}
    }
}

//! Backend event decoding
//!
//! The backend pushes one event per line, each prefixed with `data: ` and
//! carrying either a JSON record or the literal terminal token. Parsing is
//! a pure function over one line at a time.

use serde::Deserialize;

use crate::error::AppResult;

/// Prefix marking a line that carries an event payload
pub const EVENT_PREFIX: &[u8] = b"data: ";
/// Literal payload signaling the end of the stream; not valid JSON, so it
/// must be recognized before structured decoding
pub const TERMINAL_TOKEN: &[u8] = b"[DONE]";

/// One decoded backend event.
///
/// `message` is a content delta, not a full message. The backend repeats
/// or omits the other fields freely, so all of them are optional here.
/// `created` is kept at arbitrary precision rather than squeezed into a
/// fixed-width float.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEvent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created: Option<serde_json::Number>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Outcome of parsing one line
#[derive(Debug)]
pub enum ParsedLine {
    /// A decoded content event
    Event(ChatEvent),
    /// The terminal sentinel; nothing follows
    Done,
    /// Not an event line (blank separators, unknown framing)
    Skip,
}

/// Parse one line of the backend stream.
///
/// A decode failure is fatal for the whole request; garbled backend
/// output cannot be recovered locally.
pub fn parse_line(line: &[u8]) -> AppResult<ParsedLine> {
    let Some(payload) = line.strip_prefix(EVENT_PREFIX) else {
        return Ok(ParsedLine::Skip);
    };

    if payload.starts_with(TERMINAL_TOKEN) {
        return Ok(ParsedLine::Done);
    }

    let event: ChatEvent = serde_json::from_slice(payload)?;
    Ok(ParsedLine::Event(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_foreign_lines_are_skipped() {
        assert!(matches!(parse_line(b"").unwrap(), ParsedLine::Skip));
        assert!(matches!(parse_line(b": keep-alive").unwrap(), ParsedLine::Skip));
        assert!(matches!(parse_line(b"event: ping").unwrap(), ParsedLine::Skip));
    }

    #[test]
    fn test_terminal_token_recognized_before_decoding() {
        assert!(matches!(parse_line(b"data: [DONE]").unwrap(), ParsedLine::Done));
        // Trailing bytes after the token do not matter
        assert!(matches!(parse_line(b"data: [DONE] ").unwrap(), ParsedLine::Done));
    }

    #[test]
    fn test_event_fields_decode() {
        let line = br#"data: {"role":"assistant","message":"He","created":1713934697,"id":"chatcmpl-9H","action":"success","model":"gpt-3.5-turbo-0125"}"#;
        let ParsedLine::Event(event) = parse_line(line).unwrap() else {
            panic!("expected event");
        };

        assert_eq!(event.role.as_deref(), Some("assistant"));
        assert_eq!(event.message.as_deref(), Some("He"));
        assert_eq!(event.created.unwrap().to_string(), "1713934697");
        assert_eq!(event.id.as_deref(), Some("chatcmpl-9H"));
        assert_eq!(event.action.as_deref(), Some("success"));
        assert_eq!(event.model.as_deref(), Some("gpt-3.5-turbo-0125"));
    }

    #[test]
    fn test_omitted_fields_default_to_none() {
        let ParsedLine::Event(event) = parse_line(br#"data: {"message":"hi"}"#).unwrap() else {
            panic!("expected event");
        };

        assert_eq!(event.message.as_deref(), Some("hi"));
        assert!(event.role.is_none());
        assert!(event.created.is_none());
        assert!(event.id.is_none());
    }

    #[test]
    fn test_timestamp_precision_is_preserved() {
        // Wider than both u64 and f64 can represent exactly
        let line = br#"data: {"created":123456789012345678901234567890}"#;
        let ParsedLine::Event(event) = parse_line(line).unwrap() else {
            panic!("expected event");
        };

        assert_eq!(
            event.created.unwrap().to_string(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        assert!(parse_line(b"data: {not json").is_err());
        assert!(parse_line(b"data: ").is_err());
    }
}

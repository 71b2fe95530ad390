//! Outbound response envelope
//!
//! Streaming fragments and the aggregated document share one envelope;
//! the mode only decides whether a choice carries `delta` or `message`.
//! This keeps the two response shapes from drifting apart.

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Number, Value};

/// `object` value used for both streamed fragments and the aggregate
/// document
pub const COMPLETION_OBJECT: &str = "chat.completion";

/// Shape of the terminal streaming frame.
///
/// `Full` mirrors the wire shape with an empty `delta` object and a null
/// `logprobs` field; `Minimal` carries only the index and finish reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalFrameStyle {
    Minimal,
    Full,
}

impl std::str::FromStr for TerminalFrameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown terminal frame style: {other}")),
        }
    }
}

/// Identity fields stamped from the first backend event and held fixed
/// for the rest of the response
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub created: Number,
    pub model: String,
}

/// Message content, serialized under `delta` or `message`
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One choice of the envelope
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<MessageBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Value>,
    pub finish_reason: Option<String>,
}

/// The outbound chat completion envelope
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: &'static str,
    pub created: Number,
    pub model: String,
    pub choices: Vec<Choice>,
}

impl ChatCompletion {
    /// One streamed fragment carrying exactly one content delta.
    ///
    /// An empty fragment still produces a frame, with `content` omitted.
    pub fn delta_frame(identity: &Identity, fragment: &str) -> Self {
        Self::with_choice(
            identity,
            Choice {
                index: 0,
                delta: Some(MessageBody {
                    role: None,
                    content: (!fragment.is_empty()).then(|| fragment.to_string()),
                }),
                message: None,
                logprobs: Some(Value::Null),
                finish_reason: None,
            },
        )
    }

    /// The terminal streamed fragment, marking finish-reason `stop`
    pub fn terminal_frame(identity: &Identity, style: TerminalFrameStyle) -> Self {
        let choice = match style {
            TerminalFrameStyle::Full => Choice {
                index: 0,
                delta: Some(MessageBody::default()),
                message: None,
                logprobs: Some(Value::Null),
                finish_reason: Some("stop".to_string()),
            },
            TerminalFrameStyle::Minimal => Choice {
                index: 0,
                delta: None,
                message: None,
                logprobs: None,
                finish_reason: Some("stop".to_string()),
            },
        };
        Self::with_choice(identity, choice)
    }

    /// The single aggregated document for non-streaming requests
    pub fn document(identity: &Identity, content: String) -> Self {
        Self::with_choice(
            identity,
            Choice {
                index: 0,
                delta: None,
                message: Some(MessageBody {
                    role: Some("assistant".to_string()),
                    content: Some(content),
                }),
                logprobs: None,
                finish_reason: Some("stop".to_string()),
            },
        )
    }

    fn with_choice(identity: &Identity, choice: Choice) -> Self {
        Self {
            id: identity.id.clone(),
            object: COMPLETION_OBJECT,
            created: identity.created.clone(),
            model: identity.model.clone(),
            choices: vec![choice],
        }
    }

    /// Serialize as one SSE event: `data: <json>\n\n`
    pub fn to_sse(&self) -> Bytes {
        let json = serde_json::to_string(self).expect("completion envelope should always serialize");
        Bytes::from(format!("data: {json}\n\n"))
    }
}

/// The stream's own closing sentinel
pub fn sse_done() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "chatcmpl-test".to_string(),
            created: Number::from(1713934697_i64),
            model: "gpt-3.5-turbo-0125".to_string(),
        }
    }

    fn parse_sse(bytes: &Bytes) -> Value {
        let text = std::str::from_utf8(bytes).unwrap();
        assert!(text.starts_with("data: "));
        assert!(text.ends_with("\n\n"));
        serde_json::from_str(text.trim_start_matches("data: ").trim_end()).unwrap()
    }

    #[test]
    fn test_delta_frame_shape() {
        let frame = parse_sse(&ChatCompletion::delta_frame(&identity(), "He").to_sse());

        assert_eq!(frame["id"], "chatcmpl-test");
        assert_eq!(frame["object"], "chat.completion");
        assert_eq!(frame["created"].to_string(), "1713934697");
        assert_eq!(frame["model"], "gpt-3.5-turbo-0125");
        assert_eq!(frame["choices"][0]["delta"]["content"], "He");
        assert_eq!(frame["choices"][0]["logprobs"], Value::Null);
        assert_eq!(frame["choices"][0]["finish_reason"], Value::Null);
        assert!(frame["choices"][0].get("message").is_none());
    }

    #[test]
    fn test_empty_fragment_omits_content() {
        let frame = parse_sse(&ChatCompletion::delta_frame(&identity(), "").to_sse());
        assert!(frame["choices"][0]["delta"].get("content").is_none());
    }

    #[test]
    fn test_terminal_frame_full() {
        let frame =
            parse_sse(&ChatCompletion::terminal_frame(&identity(), TerminalFrameStyle::Full).to_sse());

        let choice = &frame["choices"][0];
        assert_eq!(choice["finish_reason"], "stop");
        assert_eq!(choice["delta"], serde_json::json!({}));
        assert_eq!(choice["logprobs"], Value::Null);
    }

    #[test]
    fn test_terminal_frame_minimal() {
        let frame = parse_sse(
            &ChatCompletion::terminal_frame(&identity(), TerminalFrameStyle::Minimal).to_sse(),
        );

        let choice = &frame["choices"][0];
        assert_eq!(choice["finish_reason"], "stop");
        assert!(choice.get("delta").is_none());
        assert!(choice.get("logprobs").is_none());
    }

    #[test]
    fn test_document_shape() {
        let doc = ChatCompletion::document(&identity(), "Hello".to_string());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["choices"][0]["message"]["content"], "Hello");
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
        assert!(value["choices"][0].get("delta").is_none());
    }

    #[test]
    fn test_done_sentinel() {
        assert_eq!(&sse_done()[..], b"data: [DONE]\n\n");
    }

    #[test]
    fn test_terminal_style_parsing() {
        assert_eq!("full".parse::<TerminalFrameStyle>().unwrap(), TerminalFrameStyle::Full);
        assert_eq!(
            "MINIMAL".parse::<TerminalFrameStyle>().unwrap(),
            TerminalFrameStyle::Minimal
        );
        assert!("other".parse::<TerminalFrameStyle>().is_err());
    }
}

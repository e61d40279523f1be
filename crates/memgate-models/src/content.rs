//! Structured message content blocks.

use serde::{Deserialize, Serialize};

/// One block of structured message content.
///
/// The gateway itself only ever produces text blocks; the json variant
/// exists so callers can round-trip richer payloads (tool output,
/// checkpoints) through a session without the gateway inspecting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// The text itself
        text: String,
    },
    /// Opaque structured content
    Json {
        /// Arbitrary JSON payload
        content: serde_json::Value,
    },
}

impl ContentBlock {
    /// Create a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text of this block, if it is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Json { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_round_trip() {
        let block = ContentBlock::text("hello");
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hello"}"#);

        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_text(), Some("hello"));
    }

    #[test]
    fn test_json_block_has_no_text() {
        let block = ContentBlock::Json {
            content: serde_json::json!({"k": 1}),
        };
        assert!(block.as_text().is_none());
    }
}

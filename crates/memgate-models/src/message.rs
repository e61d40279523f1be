//! Message types for stored conversations.

use crate::content::ContentBlock;
use serde::{Deserialize, Serialize};

/// Role of a stored conversational turn.
///
/// Memory events only ever carry user or assistant turns; system
/// prompts and tool traffic never reach the memory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user message
    User,
    /// Assistant response
    Assistant,
}

impl MessageRole {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Structured message content
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with a single text block.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create an assistant message with a single text block.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Aggregate of all text blocks, or `None` if there are none.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self.content.iter().filter_map(ContentBlock::as_text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = Message::user("Hello!");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.text().as_deref(), Some("Hello!"));

        let assistant = Message::assistant("Hi there!");
        assert_eq!(assistant.role, MessageRole::Assistant);
    }

    #[test]
    fn test_text_joins_blocks() {
        let msg = Message {
            role: MessageRole::User,
            content: vec![ContentBlock::text("a"), ContentBlock::text("b")],
        };
        assert_eq!(msg.text().as_deref(), Some("a b"));
    }

    #[test]
    fn test_text_none_without_text_blocks() {
        let msg = Message {
            role: MessageRole::Assistant,
            content: vec![],
        };
        assert!(msg.text().is_none());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            r#""assistant""#
        );
    }
}

//! Session context projection.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single conversation, projected from backend events on demand.
///
/// The gateway never persists this shape itself; session identity and
/// event order belong to the backend. A context with a freshly
/// generated id only becomes durable once its first event is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session id (backend-assigned once the first event exists)
    pub session_id: String,
    /// User that owns this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Ordered conversation messages, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl SessionContext {
    /// Create a context for a known backend session.
    #[must_use]
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: Some(user_id.into()),
            messages: Vec::new(),
        }
    }

    /// Create an empty context with a locally generated session id.
    #[must_use]
    pub fn fresh(user_id: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), user_id)
    }

    /// Append a message to the conversation.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message, if any.
    #[must_use]
    pub fn newest_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = SessionContext::new("s-1", "u-1");
        assert_eq!(ctx.session_id, "s-1");
        assert_eq!(ctx.user_id.as_deref(), Some("u-1"));
        assert!(ctx.messages.is_empty());
        assert!(ctx.newest_message().is_none());
    }

    #[test]
    fn test_newest_message_is_last_appended() {
        let mut ctx = SessionContext::new("s-1", "u-1");
        ctx.add_message(Message::user("first"));
        ctx.add_message(Message::assistant("second"));

        let newest = ctx.newest_message().unwrap();
        assert_eq!(newest.text().as_deref(), Some("second"));
    }

    #[test]
    fn test_fresh_contexts_get_distinct_ids() {
        let a = SessionContext::fresh("u-1");
        let b = SessionContext::fresh("u-1");
        assert_ne!(a.session_id, b.session_id);
    }
}

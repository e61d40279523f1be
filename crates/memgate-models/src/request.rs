//! Request/response types for the four gateway operations.

use crate::message::{Message, MessageRole};
use crate::session::SessionContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_limit() -> u32 {
    20
}

/// Get the conversation for a user, resolving the session if needed.
///
/// `user_id` is required: the backend cannot address a session without
/// its owning actor, and an actor-less "return everything" default
/// would break tenant isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSessionContextRequest {
    /// Owning user
    pub user_id: String,
    /// Explicit session to read; when absent the most recently created
    /// session for the user is used (or a fresh one is initialized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Maximum number of events to return
    #[serde(default = "default_limit")]
    pub max_results: u32,
    /// Opaque continuation token from a previous call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl GetSessionContextRequest {
    /// Request the latest session for a user.
    #[must_use]
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: None,
            max_results: default_limit(),
            next_token: None,
        }
    }

    /// Pin the request to a specific session.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Response to [`GetSessionContextRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSessionContextResponse {
    /// Resolved session contexts (currently always exactly one)
    pub results: Vec<SessionContext>,
}

/// Replace a session's stored context wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSessionContextRequest {
    /// The context to store
    pub session_context: SessionContext,
}

/// Response to [`UpsertSessionContextRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSessionContextResponse {
    /// The stored (or, for append-only backends, unchanged) context
    pub session_context: SessionContext,
}

/// List memory events for one (user, session) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMemoriesRequest {
    /// Owning user
    pub user_id: String,
    /// Session to read
    pub session_id: String,
    /// Maximum number of events to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Opaque continuation token from a previous call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl GetMemoriesRequest {
    /// Request events for a session with the default limit.
    #[must_use]
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            limit: default_limit(),
            next_token: None,
        }
    }
}

/// One normalized memory event.
///
/// The backend's raw events also carry the memory resource id and the
/// actor id; both are redundant given the query's own scoping and are
/// stripped before events reach callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// Backend-assigned event id
    pub event_id: String,
    /// Session the event belongs to
    pub session_id: String,
    /// When the event was stored
    pub timestamp: DateTime<Utc>,
    /// Conversational turns carried by the event
    pub messages: Vec<Message>,
}

/// Response to [`GetMemoriesRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMemoriesResponse {
    /// Events in backend order
    pub events: Vec<MemoryEvent>,
    /// Continuation token for the next page, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Append the newest turn of a conversation to memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryRequest {
    /// Session to append to
    pub session_id: String,
    /// Owning user
    pub user_id: String,
    /// Conversation whose newest message is appended
    pub session_context: SessionContext,
}

/// The stored record acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Role of the stored turn
    pub role: MessageRole,
    /// Text of the stored turn
    pub text: String,
}

/// Response to [`CreateMemoryRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryResponse {
    /// The stored record
    pub memory: MemoryRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_session_context_request_builder() {
        let req = GetSessionContextRequest::for_user("u-1");
        assert_eq!(req.user_id, "u-1");
        assert!(req.session_id.is_none());
        assert_eq!(req.max_results, 20);

        let pinned = req.with_session("s-9");
        assert_eq!(pinned.session_id.as_deref(), Some("s-9"));
    }

    #[test]
    fn test_limit_defaults_when_absent() {
        let req: GetMemoriesRequest =
            serde_json::from_str(r#"{"user_id":"u-1","session_id":"s-1"}"#).unwrap();
        assert_eq!(req.limit, 20);
        assert!(req.next_token.is_none());
    }

    #[test]
    fn test_memory_event_serializes_without_next_token() {
        let resp = GetMemoriesResponse {
            events: vec![],
            next_token: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("next_token"));
    }
}

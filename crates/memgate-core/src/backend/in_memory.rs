//! In-process memory backend for development and tests
//!
//! Mirrors the managed backend's observable behavior where it can, but
//! is not append-only: upsert genuinely replaces a session here.
//! Everything lives in process memory and is lost on restart.

use super::{MemoryBackend, SESSION_INIT_TEXT};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memgate_models::{
    CreateMemoryRequest, CreateMemoryResponse, GetMemoriesRequest, GetMemoriesResponse,
    GetSessionContextRequest, GetSessionContextResponse, MemoryEvent, MemoryRecord, Message,
    SessionContext, UpsertSessionContextRequest, UpsertSessionContextResponse,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

struct StoredEvent {
    event_id: String,
    timestamp: DateTime<Utc>,
    messages: Vec<Message>,
}

struct StoredSession {
    session_id: String,
    created_at: DateTime<Utc>,
    events: Vec<StoredEvent>,
}

impl StoredSession {
    fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            events: Vec::new(),
        }
    }

    fn append(&mut self, messages: Vec<Message>) {
        self.events.push(StoredEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            messages,
        });
    }

    fn context(&self, user_id: &str) -> SessionContext {
        let mut context = SessionContext::new(self.session_id.clone(), user_id);
        for event in &self.events {
            for message in &event.messages {
                context.add_message(message.clone());
            }
        }
        context
    }
}

/// Development backend storing sessions per user in process memory.
#[derive(Default)]
pub struct InMemoryBackend {
    sessions: RwLock<HashMap<String, Vec<StoredSession>>>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryBackend {
    async fn get_session_context(
        &self,
        request: GetSessionContextRequest,
    ) -> Result<GetSessionContextResponse> {
        let mut sessions = self.sessions.write().await;
        let owned = sessions.entry(request.user_id.clone()).or_default();

        let context = match &request.session_id {
            Some(id) => {
                let session = owned
                    .iter()
                    .find(|session| &session.session_id == id)
                    .ok_or_else(|| Error::NotFound(format!("session {id} not found")))?;
                session.context(&request.user_id)
            }
            None => match owned.iter().max_by_key(|session| session.created_at) {
                Some(session) => session.context(&request.user_id),
                None => {
                    info!(user_id = %request.user_id, "initializing new memory session");
                    let mut session = StoredSession::new(Uuid::new_v4().to_string());
                    session.append(vec![Message::assistant(SESSION_INIT_TEXT)]);
                    let context = session.context(&request.user_id);
                    owned.push(session);
                    context
                }
            },
        };

        Ok(GetSessionContextResponse {
            results: vec![context],
        })
    }

    async fn upsert_session_context(
        &self,
        request: UpsertSessionContextRequest,
    ) -> Result<UpsertSessionContextResponse> {
        let context = request.session_context;
        let user_id = context
            .user_id
            .clone()
            .ok_or_else(|| Error::InvalidRequest("session context has no user_id".to_string()))?;

        let mut sessions = self.sessions.write().await;
        let owned = sessions.entry(user_id).or_default();

        let mut session = match owned
            .iter()
            .position(|session| session.session_id == context.session_id)
        {
            // Replacement keeps the original creation time.
            Some(index) => {
                let existing = owned.remove(index);
                let mut session = StoredSession::new(existing.session_id);
                session.created_at = existing.created_at;
                session
            }
            None => StoredSession::new(context.session_id.clone()),
        };
        for message in &context.messages {
            session.append(vec![message.clone()]);
        }
        debug!(session_id = %session.session_id, "session context stored");
        owned.push(session);

        Ok(UpsertSessionContextResponse {
            session_context: context,
        })
    }

    async fn get_memories(&self, request: GetMemoriesRequest) -> Result<GetMemoriesResponse> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&request.user_id)
            .and_then(|owned| {
                owned
                    .iter()
                    .find(|session| session.session_id == request.session_id)
            })
            .ok_or_else(|| {
                Error::NotFound(format!("session {} not found", request.session_id))
            })?;

        let events = session
            .events
            .iter()
            .take(request.limit as usize)
            .map(|event| MemoryEvent {
                event_id: event.event_id.clone(),
                session_id: session.session_id.clone(),
                timestamp: event.timestamp,
                messages: event.messages.clone(),
            })
            .collect();

        Ok(GetMemoriesResponse {
            events,
            next_token: None,
        })
    }

    async fn create_memory(&self, request: CreateMemoryRequest) -> Result<CreateMemoryResponse> {
        let newest = request
            .session_context
            .newest_message()
            .ok_or_else(|| Error::InvalidRequest("session context has no messages".to_string()))?
            .clone();

        let mut sessions = self.sessions.write().await;
        let owned = sessions.entry(request.user_id).or_default();
        let index = match owned
            .iter()
            .position(|session| session.session_id == request.session_id)
        {
            Some(index) => index,
            None => {
                owned.push(StoredSession::new(request.session_id));
                owned.len() - 1
            }
        };
        let session = &mut owned[index];

        let record = MemoryRecord {
            role: newest.role,
            text: newest.text().unwrap_or_default(),
        };
        session.append(vec![newest]);
        debug!(session_id = %session.session_id, "memory event created");

        Ok(CreateMemoryResponse { memory: record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memgate_models::MessageRole;

    #[tokio::test]
    async fn test_fresh_user_gets_initialized_session() {
        let backend = InMemoryBackend::new();
        let response = backend
            .get_session_context(GetSessionContextRequest::for_user("u1"))
            .await
            .unwrap();

        let context = &response.results[0];
        assert_eq!(context.user_id.as_deref(), Some("u1"));
        assert_eq!(context.messages.len(), 1);
        assert_eq!(context.messages[0].role, MessageRole::Assistant);
        assert_eq!(context.messages[0].text().as_deref(), Some(SESSION_INIT_TEXT));
    }

    #[tokio::test]
    async fn test_initialized_session_is_durable() {
        let backend = InMemoryBackend::new();
        let first = backend
            .get_session_context(GetSessionContextRequest::for_user("u1"))
            .await
            .unwrap();
        let second = backend
            .get_session_context(GetSessionContextRequest::for_user("u1"))
            .await
            .unwrap();
        assert_eq!(first.results[0].session_id, second.results[0].session_id);
    }

    #[tokio::test]
    async fn test_unknown_explicit_session_is_not_found() {
        let backend = InMemoryBackend::new();
        let err = backend
            .get_session_context(GetSessionContextRequest::for_user("u1").with_session("nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_memory_appends_newest_message() {
        let backend = InMemoryBackend::new();

        let mut context = SessionContext::new("s1", "u1");
        context.add_message(Message::user("older"));
        context.add_message(Message::user("newest"));

        let response = backend
            .create_memory(CreateMemoryRequest {
                session_id: "s1".to_string(),
                user_id: "u1".to_string(),
                session_context: context,
            })
            .await
            .unwrap();
        assert_eq!(response.memory.text, "newest");

        let memories = backend
            .get_memories(GetMemoriesRequest::new("u1", "s1"))
            .await
            .unwrap();
        assert_eq!(memories.events.len(), 1);
        assert_eq!(
            memories.events[0].messages[0].text().as_deref(),
            Some("newest")
        );
        assert!(memories.next_token.is_none());
    }

    #[tokio::test]
    async fn test_create_memory_rejects_empty_context() {
        let backend = InMemoryBackend::new();
        let err = backend
            .create_memory(CreateMemoryRequest {
                session_id: "s1".to_string(),
                user_id: "u1".to_string(),
                session_context: SessionContext::new("s1", "u1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_session_contents() {
        let backend = InMemoryBackend::new();

        let mut original = SessionContext::new("s1", "u1");
        original.add_message(Message::user("one"));
        original.add_message(Message::assistant("two"));
        backend
            .upsert_session_context(UpsertSessionContextRequest {
                session_context: original,
            })
            .await
            .unwrap();

        let mut replacement = SessionContext::new("s1", "u1");
        replacement.add_message(Message::user("only"));
        backend
            .upsert_session_context(UpsertSessionContextRequest {
                session_context: replacement,
            })
            .await
            .unwrap();

        let response = backend
            .get_session_context(GetSessionContextRequest::for_user("u1").with_session("s1"))
            .await
            .unwrap();
        let context = &response.results[0];
        assert_eq!(context.messages.len(), 1);
        assert_eq!(context.messages[0].text().as_deref(), Some("only"));
    }

    #[tokio::test]
    async fn test_upsert_requires_user_id() {
        let backend = InMemoryBackend::new();
        let context = SessionContext {
            session_id: "s1".to_string(),
            user_id: None,
            messages: vec![],
        };
        let err = backend
            .upsert_session_context(UpsertSessionContextRequest {
                session_context: context,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_latest_session_wins_resolution() {
        let backend = InMemoryBackend::new();

        let mut old = SessionContext::new("old", "u1");
        old.add_message(Message::user("old"));
        backend
            .upsert_session_context(UpsertSessionContextRequest {
                session_context: old,
            })
            .await
            .unwrap();

        let mut new = SessionContext::new("new", "u1");
        new.add_message(Message::user("new"));
        backend
            .upsert_session_context(UpsertSessionContextRequest {
                session_context: new,
            })
            .await
            .unwrap();

        let response = backend
            .get_session_context(GetSessionContextRequest::for_user("u1"))
            .await
            .unwrap();
        assert_eq!(response.results[0].session_id, "new");
    }

    #[tokio::test]
    async fn test_get_memories_applies_limit() {
        let backend = InMemoryBackend::new();
        for turn in ["a", "b", "c"] {
            let mut context = SessionContext::new("s1", "u1");
            context.add_message(Message::user(turn));
            backend
                .create_memory(CreateMemoryRequest {
                    session_id: "s1".to_string(),
                    user_id: "u1".to_string(),
                    session_context: context,
                })
                .await
                .unwrap();
        }

        let mut request = GetMemoriesRequest::new("u1", "s1");
        request.limit = 2;
        let memories = backend.get_memories(request).await.unwrap();
        assert_eq!(memories.events.len(), 2);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let backend = InMemoryBackend::new();

        let mut context = SessionContext::new("s1", "u1");
        context.add_message(Message::user("private"));
        backend
            .create_memory(CreateMemoryRequest {
                session_id: "s1".to_string(),
                user_id: "u1".to_string(),
                session_context: context,
            })
            .await
            .unwrap();

        let err = backend
            .get_memories(GetMemoriesRequest::new("u2", "s1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

//! Managed-service memory backend
//!
//! Session resolution, event retrieval/normalization, and event append
//! against the remote managed memory service. Sessions are never
//! created explicitly; they come into existence when the first event
//! for a fresh actor is appended.

use super::MemoryBackend;
use crate::error::{Error, Result};
use crate::provisioner::MemoryProvisioner;
use crate::service::{
    ConversationalPayload, CreateEventRequest, EventQuery, EventRecord, MemoryData,
};
use async_trait::async_trait;
use chrono::Utc;
use memgate_models::{
    ContentBlock, CreateMemoryRequest, CreateMemoryResponse, GetMemoriesRequest,
    GetMemoriesResponse, GetSessionContextRequest, GetSessionContextResponse, MemoryEvent,
    MemoryRecord, Message, SessionContext, UpsertSessionContextRequest,
    UpsertSessionContextResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Text of the single assistant-authored event that announces a
/// freshly initialized session.
pub const SESSION_INIT_TEXT: &str = "Initializing new conversational memory session.";

/// Memory backend over the remote managed service.
pub struct ManagedBackend {
    data: Arc<dyn MemoryData>,
    provisioner: Arc<MemoryProvisioner>,
}

impl ManagedBackend {
    /// Create a backend over a data plane and a lifecycle controller.
    pub fn new(data: Arc<dyn MemoryData>, provisioner: Arc<MemoryProvisioner>) -> Self {
        Self { data, provisioner }
    }

    /// The lifecycle controller this backend resolves its resource
    /// id through.
    #[must_use]
    pub fn provisioner(&self) -> Arc<MemoryProvisioner> {
        self.provisioner.clone()
    }

    /// Start a brand-new session for an actor by appending its first
    /// event, and project the resulting context.
    async fn initialize_session(&self, memory_id: &str, actor_id: &str) -> Result<SessionContext> {
        info!(actor_id = %actor_id, "initializing new memory session");
        let request = CreateEventRequest {
            memory_id: memory_id.to_string(),
            session_id: None,
            actor_id: actor_id.to_string(),
            timestamp: Utc::now(),
            payload: vec![ConversationalPayload {
                role: memgate_models::MessageRole::Assistant,
                text: SESSION_INIT_TEXT.to_string(),
            }],
        };
        let event = self.data.create_event(&request).await?;

        let mut context = SessionContext::new(event.session_id, actor_id);
        context.add_message(Message::assistant(SESSION_INIT_TEXT));
        Ok(context)
    }

    /// Pick the actor's most recently created session.
    ///
    /// `Ok(None)` means the actor has no sessions yet (unknown actor or
    /// an empty listing) and a fresh one should be initialized. Ties on
    /// `created_at` keep the first occurrence in list order.
    async fn most_recent_session(
        &self,
        memory_id: &str,
        actor_id: &str,
        next_token: Option<&str>,
    ) -> Result<Option<String>> {
        let page = match self.data.list_sessions(memory_id, actor_id, next_token).await {
            Ok(page) => page,
            Err(Error::NotFound(_)) => {
                debug!(actor_id = %actor_id, "actor not found in memory resource");
                return Ok(None);
            }
            Err(e) => {
                error!(actor_id = %actor_id, error = %e, "error listing sessions");
                return Err(e);
            }
        };

        let Some(mut best) = page.summaries.first() else {
            debug!(actor_id = %actor_id, "no sessions found for actor");
            return Ok(None);
        };
        for summary in &page.summaries[1..] {
            if summary.created_at > best.created_at {
                best = summary;
            }
        }
        Ok(Some(best.session_id.clone()))
    }

    /// Drop the redundant routing fields from a raw event.
    fn normalize(event: EventRecord) -> MemoryEvent {
        MemoryEvent {
            event_id: event.event_id,
            session_id: event.session_id,
            timestamp: event.timestamp,
            messages: event
                .payload
                .into_iter()
                .map(|turn| Message {
                    role: turn.role,
                    content: vec![ContentBlock::text(turn.text)],
                })
                .collect(),
        }
    }
}

#[async_trait]
impl MemoryBackend for ManagedBackend {
    async fn get_session_context(
        &self,
        request: GetSessionContextRequest,
    ) -> Result<GetSessionContextResponse> {
        debug!(user_id = %request.user_id, session_id = ?request.session_id, "getting session context");
        let memory_id = self.provisioner.resolve_resource_id().await?;

        // The continuation token scopes to whichever listing runs:
        // session resolution when no session id was supplied, event
        // retrieval otherwise.
        let (session_id, event_token) = match &request.session_id {
            Some(id) => (id.clone(), request.next_token.clone()),
            None => {
                match self
                    .most_recent_session(&memory_id, &request.user_id, request.next_token.as_deref())
                    .await?
                {
                    Some(id) => (id, None),
                    None => {
                        let context =
                            self.initialize_session(&memory_id, &request.user_id).await?;
                        return Ok(GetSessionContextResponse {
                            results: vec![context],
                        });
                    }
                }
            }
        };

        let mut memories = self
            .get_memories(GetMemoriesRequest {
                user_id: request.user_id.clone(),
                session_id: session_id.clone(),
                limit: request.max_results,
                next_token: event_token,
            })
            .await?;

        let mut context = SessionContext::new(session_id, request.user_id);
        for event in memories.events.drain(..) {
            for message in event.messages {
                context.add_message(message);
            }
        }
        Ok(GetSessionContextResponse {
            results: vec![context],
        })
    }

    async fn upsert_session_context(
        &self,
        request: UpsertSessionContextRequest,
    ) -> Result<UpsertSessionContextResponse> {
        // The managed service has no session-replacement primitive:
        // appending is the only mutation, and a session is identified
        // purely by events sharing its id. Documented no-op.
        debug!(
            session_id = %request.session_context.session_id,
            "upsert_session_context is a no-op on the managed backend"
        );
        Ok(UpsertSessionContextResponse {
            session_context: request.session_context,
        })
    }

    async fn get_memories(&self, request: GetMemoriesRequest) -> Result<GetMemoriesResponse> {
        let memory_id = self.provisioner.resolve_resource_id().await?;

        let page = self
            .data
            .list_events(&EventQuery {
                memory_id,
                session_id: request.session_id,
                actor_id: request.user_id,
                max_results: request.limit,
                next_token: request.next_token,
            })
            .await?;

        Ok(GetMemoriesResponse {
            events: page.events.into_iter().map(Self::normalize).collect(),
            next_token: page.next_token,
        })
    }

    async fn create_memory(&self, request: CreateMemoryRequest) -> Result<CreateMemoryResponse> {
        let memory_id = self.provisioner.resolve_resource_id().await?;

        let newest = request
            .session_context
            .newest_message()
            .ok_or_else(|| Error::InvalidRequest("session context has no messages".to_string()))?;

        let event = self
            .data
            .create_event(&CreateEventRequest {
                memory_id,
                session_id: Some(request.session_id),
                actor_id: request.user_id,
                timestamp: Utc::now(),
                payload: vec![ConversationalPayload {
                    role: newest.role,
                    text: newest.text().unwrap_or_default(),
                }],
            })
            .await?;

        let stored = event.payload.first().ok_or_else(|| {
            Error::Backend("event acknowledgement carried no payload".to_string())
        })?;
        debug!(event_id = %event.event_id, "memory event created");
        Ok(CreateMemoryResponse {
            memory: MemoryRecord {
                role: stored.role,
                text: stored.text.clone(),
            },
        })
    }
}

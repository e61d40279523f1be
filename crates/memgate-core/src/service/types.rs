//! Wire types for the managed memory service API.

use chrono::{DateTime, Utc};
use memgate_models::MessageRole;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a memory resource.
///
/// `Creating` and `Deleting` are non-terminal; `Active` is the
/// provisioning target; `Failed` is terminal non-success. Full removal
/// is observed as a not-found error rather than a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Resource is being provisioned
    Creating,
    /// Resource is usable
    Active,
    /// Provisioning failed; the resource will never become usable
    Failed,
    /// Resource is being torn down
    Deleting,
}

impl ResourceStatus {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Deleting => "DELETING",
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which long-term extraction strategy a resource runs over its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    /// Retrieval by semantic similarity
    SemanticSimilarity,
    /// Per-task summaries
    Summarization,
    /// Extracted user preferences
    UserPreference,
}

/// One memory-strategy descriptor attached to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySpec {
    /// Strategy family
    pub kind: StrategyKind,
    /// Strategy name, unique within the resource
    pub name: String,
    /// Human-readable purpose
    pub description: String,
}

/// The fixed strategy set every gateway-provisioned resource declares.
///
/// Not caller-configurable; callers that need different strategies go
/// through [`UpdateResourceRequest`] after provisioning.
#[must_use]
pub fn default_strategies() -> Vec<StrategySpec> {
    vec![
        StrategySpec {
            kind: StrategyKind::SemanticSimilarity,
            name: "semantic_memory".to_string(),
            description: "Long-term memories retrieved by semantic similarity for future \
                          reference and continuous improvement."
                .to_string(),
        },
        StrategySpec {
            kind: StrategyKind::Summarization,
            name: "summary_memory".to_string(),
            description: "Summarized learnings from a task for future reference and continuous \
                          improvement."
                .to_string(),
        },
        StrategySpec {
            kind: StrategyKind::UserPreference,
            name: "user_preferences_memory".to_string(),
            description: "Stored user preferences for future reference and continuous \
                          improvement."
                .to_string(),
        },
    ]
}

/// A backend-managed memory resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResource {
    /// Backend-assigned id; shares a delimiter-separated prefix with
    /// the resource name
    pub id: String,
    /// Canonical resource name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current lifecycle status
    pub status: ResourceStatus,
    /// Event retention in days
    pub retention_days: u32,
    /// Attached strategy descriptors
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MemoryResource {
    /// The name prefix of a resource id (`"dev_env-abc123"` → `"dev_env"`).
    #[must_use]
    pub fn name_prefix(id: &str) -> &str {
        id.split('-').next().unwrap_or(id)
    }
}

/// Create a memory resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    /// Canonical resource name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Event retention in days
    pub retention_days: u32,
    /// Strategy descriptors to attach
    pub strategies: Vec<StrategySpec>,
}

/// Partial update of a memory resource.
///
/// Only supplied fields are applied; a request with no optional fields
/// is a no-op, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    /// Resource to update
    pub memory_id: String,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New retention window in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    /// Replacement strategy list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategies: Option<Vec<StrategySpec>>,
}

impl UpdateResourceRequest {
    /// Create an empty update for a resource.
    #[must_use]
    pub fn for_resource(memory_id: impl Into<String>) -> Self {
        Self {
            memory_id: memory_id.into(),
            ..Self::default()
        }
    }

    /// Whether any optional field was supplied.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.description.is_some() || self.retention_days.is_some() || self.strategies.is_some()
    }
}

/// Summary entry from a session listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session id
    pub session_id: String,
    /// When the session's first event was stored
    pub created_at: DateTime<Utc>,
}

/// One page of session summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    /// Session summaries in backend order
    #[serde(default)]
    pub summaries: Vec<SessionSummary>,
    /// Continuation token for the next page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// A single conversational turn inside an event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationalPayload {
    /// Who authored the turn
    pub role: MessageRole,
    /// Turn text
    pub text: String,
}

/// A raw stored event as the backend returns it.
///
/// Carries the full routing scope (`memory_id`, `actor_id`); the
/// gateway strips both during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Backend-assigned event id
    pub event_id: String,
    /// Owning memory resource
    pub memory_id: String,
    /// Session the event belongs to
    pub session_id: String,
    /// Owning actor
    pub actor_id: String,
    /// When the event was stored
    pub timestamp: DateTime<Utc>,
    /// Conversational turns carried by the event
    #[serde(default)]
    pub payload: Vec<ConversationalPayload>,
}

/// One page of stored events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    /// Events in backend order
    #[serde(default)]
    pub events: Vec<EventRecord>,
    /// Continuation token for the next page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Scope and pagination for an event listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    /// Memory resource to read
    pub memory_id: String,
    /// Session to read
    pub session_id: String,
    /// Owning actor
    pub actor_id: String,
    /// Maximum number of events to return
    pub max_results: u32,
    /// Continuation token from a previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Append one event to a session stream.
///
/// Omitting `session_id` asks the backend to start a fresh session;
/// the assigned id comes back on the acknowledged [`EventRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Memory resource to append to
    pub memory_id: String,
    /// Session to append to; `None` starts a new session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Owning actor
    pub actor_id: String,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Conversational turns to store
    pub payload: Vec<ConversationalPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ResourceStatus::Active).unwrap(),
            r#""ACTIVE""#
        );
        let status: ResourceStatus = serde_json::from_str(r#""CREATING""#).unwrap();
        assert_eq!(status, ResourceStatus::Creating);
    }

    #[test]
    fn test_name_prefix() {
        assert_eq!(MemoryResource::name_prefix("dev_env-abc123"), "dev_env");
        assert_eq!(MemoryResource::name_prefix("noprefix"), "noprefix");
    }

    #[test]
    fn test_default_strategies_are_fixed() {
        let strategies = default_strategies();
        assert_eq!(strategies.len(), 3);
        assert_eq!(strategies[0].name, "semantic_memory");
        assert_eq!(strategies[1].name, "summary_memory");
        assert_eq!(strategies[2].name, "user_preferences_memory");
    }

    #[test]
    fn test_update_request_has_changes() {
        let empty = UpdateResourceRequest::for_resource("m-1");
        assert!(!empty.has_changes());

        let with_retention = UpdateResourceRequest {
            retention_days: Some(7),
            ..UpdateResourceRequest::for_resource("m-1")
        };
        assert!(with_retention.has_changes());
    }

    #[test]
    fn test_event_record_wire_names() {
        let json = r#"{
            "eventId": "e-1",
            "memoryId": "m-1",
            "sessionId": "s-1",
            "actorId": "u-1",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": [{"role": "user", "text": "hi"}]
        }"#;
        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_id, "e-1");
        assert_eq!(event.payload[0].text, "hi");
    }
}

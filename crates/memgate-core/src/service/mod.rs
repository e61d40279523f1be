//! Consumed interface of the managed memory service.
//!
//! The remote service is the sole source of truth for all memory
//! entities. It is split the way the service itself is split:
//!
//! - [`MemoryControl`]: the control plane — resource lifecycle
//!   (create/get/update/delete/list). Resources are created
//!   asynchronously and converge through non-terminal statuses.
//! - [`MemoryData`]: the data plane — session listings, paginated
//!   event retrieval, and event append.
//!
//! The provisioning and resolution logic is written against these
//! traits; [`HttpMemoryService`] is the concrete HTTP collaborator.

mod http;
mod types;

pub use http::HttpMemoryService;
pub use types::{
    default_strategies, ConversationalPayload, CreateEventRequest, CreateResourceRequest,
    EventPage, EventQuery, EventRecord, MemoryResource, ResourceStatus, SessionPage,
    SessionSummary, StrategyKind, StrategySpec, UpdateResourceRequest,
};

use crate::error::Result;
use async_trait::async_trait;

/// Control-plane operations on memory resources.
#[async_trait]
pub trait MemoryControl: Send + Sync {
    /// Create a memory resource. The returned resource is usually still
    /// `CREATING`; callers poll [`get_resource`](Self::get_resource)
    /// until it converges.
    async fn create_resource(&self, request: &CreateResourceRequest) -> Result<MemoryResource>;

    /// Fetch a resource by id.
    async fn get_resource(&self, memory_id: &str) -> Result<MemoryResource>;

    /// Apply a partial update to a resource.
    async fn update_resource(&self, request: &UpdateResourceRequest) -> Result<()>;

    /// Request deletion of a resource. Removal converges
    /// asynchronously; callers poll until `get_resource` reports
    /// not-found.
    async fn delete_resource(&self, memory_id: &str) -> Result<()>;

    /// List all memory resources.
    async fn list_resources(&self) -> Result<Vec<MemoryResource>>;
}

/// Data-plane operations on sessions and events.
#[async_trait]
pub trait MemoryData: Send + Sync {
    /// List session summaries for an actor.
    async fn list_sessions(
        &self,
        memory_id: &str,
        actor_id: &str,
        next_token: Option<&str>,
    ) -> Result<SessionPage>;

    /// Fetch one page of events for a (resource, session, actor) scope.
    async fn list_events(&self, query: &EventQuery) -> Result<EventPage>;

    /// Append one event; the acknowledgement carries the stored record
    /// including the (possibly freshly assigned) session id.
    async fn create_event(&self, request: &CreateEventRequest) -> Result<EventRecord>;
}

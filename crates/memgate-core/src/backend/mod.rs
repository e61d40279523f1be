//! Memory backends and the selection facade
//!
//! All callers go through [`MemoryGateway`], which forwards each of the
//! four gateway operations verbatim to the [`MemoryBackend`] chosen
//! once at startup. The set of backends is closed and compile-time
//! known; configuration picks a variant, it never loads code.

mod in_memory;
mod managed;

pub use in_memory::InMemoryBackend;
pub use managed::{ManagedBackend, SESSION_INIT_TEXT};

use crate::config::{BackendKind, GatewayConfig};
use crate::error::{Error, Result};
use crate::params::FileParameterStore;
use crate::provisioner::MemoryProvisioner;
use crate::service::HttpMemoryService;
use async_trait::async_trait;
use memgate_models::{
    CreateMemoryRequest, CreateMemoryResponse, GetMemoriesRequest, GetMemoriesResponse,
    GetSessionContextRequest, GetSessionContextResponse, UpsertSessionContextRequest,
    UpsertSessionContextResponse,
};
use std::sync::Arc;
use tracing::info;

/// Capability interface every memory backend implements.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Get the conversation for a user, resolving the session if the
    /// request does not name one.
    async fn get_session_context(
        &self,
        request: GetSessionContextRequest,
    ) -> Result<GetSessionContextResponse>;

    /// Replace a session's stored context wholesale.
    ///
    /// Append-only backends document this as a no-op: they return the
    /// context unchanged and persist nothing.
    async fn upsert_session_context(
        &self,
        request: UpsertSessionContextRequest,
    ) -> Result<UpsertSessionContextResponse>;

    /// List memory events for one (user, session) pair.
    async fn get_memories(&self, request: GetMemoriesRequest) -> Result<GetMemoriesResponse>;

    /// Append the newest turn of a conversation to memory.
    async fn create_memory(&self, request: CreateMemoryRequest) -> Result<CreateMemoryResponse>;
}

/// Backend selection facade.
///
/// Holds the backend chosen at process start and shields callers from
/// backend identity. Resource lifecycle operations are only reachable
/// when the managed backend is selected, via
/// [`provisioner`](Self::provisioner).
pub struct MemoryGateway {
    backend: Arc<dyn MemoryBackend>,
    kind: BackendKind,
    provisioner: Option<Arc<MemoryProvisioner>>,
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGateway")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl MemoryGateway {
    /// Gateway over the in-process development backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
            kind: BackendKind::InMemory,
            provisioner: None,
        }
    }

    /// Gateway over an already-wired managed backend.
    #[must_use]
    pub fn managed(backend: ManagedBackend) -> Self {
        let provisioner = backend.provisioner();
        Self {
            backend: Arc::new(backend),
            kind: BackendKind::Managed,
            provisioner: Some(provisioner),
        }
    }

    /// Build the gateway the configuration asks for.
    ///
    /// The managed variant wires the HTTP service client, the
    /// file-backed parameter store, and the lifecycle provisioner.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the managed backend is selected
    /// without a service URL.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        info!(backend = %config.backend, "selecting memory backend");
        match config.backend {
            BackendKind::InMemory => Ok(Self::in_memory()),
            BackendKind::Managed => {
                let url = config.service_url.as_deref().ok_or_else(|| {
                    Error::Configuration(
                        "managed backend requires MEMGATE_SERVICE_URL".to_string(),
                    )
                })?;
                let service = Arc::new(HttpMemoryService::new(url)?);
                let params = Arc::new(FileParameterStore::default_location()?);
                let provisioner =
                    Arc::new(MemoryProvisioner::new(service.clone(), params, config));
                Ok(Self::managed(ManagedBackend::new(service, provisioner)))
            }
        }
    }

    /// Which backend this gateway routes to.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// The resource lifecycle controller, when the managed backend is
    /// selected.
    #[must_use]
    pub fn provisioner(&self) -> Option<&Arc<MemoryProvisioner>> {
        self.provisioner.as_ref()
    }

    /// Forward to the selected backend.
    pub async fn get_session_context(
        &self,
        request: GetSessionContextRequest,
    ) -> Result<GetSessionContextResponse> {
        self.backend.get_session_context(request).await
    }

    /// Forward to the selected backend.
    pub async fn upsert_session_context(
        &self,
        request: UpsertSessionContextRequest,
    ) -> Result<UpsertSessionContextResponse> {
        self.backend.upsert_session_context(request).await
    }

    /// Forward to the selected backend.
    pub async fn get_memories(&self, request: GetMemoriesRequest) -> Result<GetMemoriesResponse> {
        self.backend.get_memories(request).await
    }

    /// Forward to the selected backend.
    pub async fn create_memory(&self, request: CreateMemoryRequest) -> Result<CreateMemoryResponse> {
        self.backend.create_memory(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_gateway_has_no_provisioner() {
        let gateway = MemoryGateway::in_memory();
        assert_eq!(gateway.kind(), BackendKind::InMemory);
        assert!(gateway.provisioner().is_none());
    }

    #[test]
    fn test_from_config_rejects_managed_without_url() {
        let config = GatewayConfig {
            backend: BackendKind::Managed,
            service_url: None,
            ..GatewayConfig::default()
        };
        let err = MemoryGateway::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

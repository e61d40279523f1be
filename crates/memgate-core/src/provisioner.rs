//! Memory resource lifecycle controller
//!
//! Provisions the one memory resource a deployment environment owns,
//! polls it to readiness or failure, tears it down and confirms
//! removal, and memoizes the resolved resource id.
//!
//! Both creation and deletion converge through the same bounded
//! fixed-delay poll loop: no backoff, `max_attempts` status checks,
//! one sleep between consecutive checks. Provisioning can take
//! minutes; callers must keep these calls off latency-sensitive
//! request paths.

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::params::ParameterStore;
use crate::service::{
    default_strategies, CreateResourceRequest, MemoryControl, MemoryResource, ResourceStatus,
    UpdateResourceRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Fixed-delay polling parameters.
///
/// Injected so tests can run with zero delay; the fixed-delay shape
/// itself is deliberate and must not gain backoff.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Fixed delay between consecutive checks
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay: Duration::from_secs(30),
        }
    }
}

impl PollConfig {
    /// Default parameters for deletion polling.
    #[must_use]
    pub fn deletion() -> Self {
        Self {
            max_attempts: 20,
            delay: Duration::from_secs(10),
        }
    }

    /// Set the maximum number of status checks.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay between checks.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Resource lifecycle controller and resource-id cache.
///
/// Exactly one memory resource exists per deployment environment. The
/// resolved id is memoized in an initialize-once cell so concurrent
/// first callers serialize on resolution instead of racing into
/// duplicate create attempts, and is persisted to the parameter store
/// for reuse across process restarts.
pub struct MemoryProvisioner {
    control: Arc<dyn MemoryControl>,
    params: Arc<dyn ParameterStore>,
    environment: String,
    retention_days: u32,
    create_poll: PollConfig,
    delete_poll: PollConfig,
    resource_id: OnceCell<String>,
}

impl MemoryProvisioner {
    /// Create a provisioner for the configured environment.
    pub fn new(
        control: Arc<dyn MemoryControl>,
        params: Arc<dyn ParameterStore>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            control,
            params,
            environment: config.environment.clone(),
            retention_days: config.retention_days,
            create_poll: PollConfig::default(),
            delete_poll: PollConfig::deletion(),
            resource_id: OnceCell::new(),
        }
    }

    /// Override the creation polling parameters.
    #[must_use]
    pub fn with_create_poll(mut self, poll: PollConfig) -> Self {
        self.create_poll = poll;
        self
    }

    /// Override the deletion polling parameters.
    #[must_use]
    pub fn with_delete_poll(mut self, poll: PollConfig) -> Self {
        self.delete_poll = poll;
        self
    }

    fn parameter_path(&self) -> String {
        format!("/{}/memory_resource_id", self.environment)
    }

    fn resource_name(&self) -> String {
        self.environment.replace('-', "_")
    }

    /// Resolve the environment's memory resource id.
    ///
    /// Resolution order: in-process cache (zero remote calls), then
    /// the parameter store, then resource creation. Concurrent callers
    /// serialize on the initialize-once cell.
    ///
    /// # Errors
    ///
    /// Parameter store errors propagate unchanged; creation failures
    /// surface as provisioning errors.
    pub async fn resolve_resource_id(&self) -> Result<String> {
        self.resource_id
            .get_or_try_init(|| async {
                let path = self.parameter_path();
                debug!(path = %path, "checking parameter store for memory resource id");
                if let Some(id) = self.params.get(&path).await? {
                    debug!(memory_id = %id, "memory resource id found in parameter store");
                    return Ok(id);
                }

                info!(environment = %self.environment, "no memory resource id stored; provisioning");
                self.provision(self.retention_days).await
            })
            .await
            .cloned()
    }

    /// Create the environment's memory resource and wait for it to
    /// become active.
    ///
    /// Idempotent on "already exists": the conflicting resource's id is
    /// adopted by matching the resource-name prefix of existing ids.
    /// On confirmed `ACTIVE` the id is persisted to the parameter store
    /// and cached in process.
    ///
    /// # Errors
    ///
    /// [`Error::ProvisioningFailed`] if the resource reaches a terminal
    /// non-active status, [`Error::ProvisioningTimeout`] if polling is
    /// exhausted, any other creation failure unchanged.
    pub async fn create_resource(&self, retention_days: u32) -> Result<String> {
        let id = self.provision(retention_days).await?;
        // Seed the in-process cache; lost to a concurrent resolver is fine.
        let _ = self.resource_id.set(id.clone());
        Ok(id)
    }

    async fn provision(&self, retention_days: u32) -> Result<String> {
        let name = self.resource_name();
        info!(
            name = %name,
            retention_days,
            "provisioning memory resource for environment {}",
            self.environment
        );

        let request = CreateResourceRequest {
            name: name.clone(),
            description: format!("Conversational memory for {} environment", self.environment),
            retention_days,
            strategies: default_strategies(),
        };

        let memory_id = match self.control.create_resource(&request).await {
            Ok(resource) => resource.id,
            Err(Error::AlreadyExists(_)) => {
                info!(name = %name, "memory resource already exists; adopting its id");
                self.adopt_existing(&name).await?
            }
            Err(e) => {
                error!(error = %e, "could not create memory resource");
                return Err(e);
            }
        };

        let resource = self.wait_for_active(&memory_id).await?;
        debug_assert_eq!(resource.status, ResourceStatus::Active);

        self.params.put(&self.parameter_path(), &memory_id).await?;
        info!(memory_id = %memory_id, "memory resource provisioned");
        Ok(memory_id)
    }

    /// Find the existing resource whose id prefix matches the name.
    async fn adopt_existing(&self, name: &str) -> Result<String> {
        let resources = self.control.list_resources().await?;
        resources
            .into_iter()
            .find(|resource| MemoryResource::name_prefix(&resource.id) == name)
            .map(|resource| resource.id)
            .ok_or_else(|| {
                Error::NotFound(format!("no existing memory resource matches name {name}"))
            })
    }

    /// Poll until the resource reports `ACTIVE`.
    ///
    /// Non-terminal statuses and not-yet-visible (not-found) responses
    /// continue the loop; unexpected errors are logged and still
    /// consume an attempt, so transient hiccups cannot prematurely
    /// fail a long provisioning run.
    ///
    /// # Errors
    ///
    /// [`Error::ProvisioningFailed`] on `FAILED`,
    /// [`Error::ProvisioningTimeout`] when attempts are exhausted.
    pub async fn wait_for_active(&self, memory_id: &str) -> Result<MemoryResource> {
        let poll = &self.create_poll;
        info!(memory_id = %memory_id, "waiting for memory resource to become active");

        for attempt in 1..=poll.max_attempts {
            match self.control.get_resource(memory_id).await {
                Ok(resource) => match resource.status {
                    ResourceStatus::Active => {
                        info!(memory_id = %memory_id, attempt, "memory resource is active");
                        return Ok(resource);
                    }
                    ResourceStatus::Failed => {
                        error!(memory_id = %memory_id, "memory resource provisioning failed");
                        return Err(Error::ProvisioningFailed {
                            resource_id: memory_id.to_string(),
                            status: resource.status.to_string(),
                        });
                    }
                    status => {
                        debug!(
                            memory_id = %memory_id,
                            %status,
                            attempt,
                            max_attempts = poll.max_attempts,
                            "memory resource not ready"
                        );
                    }
                },
                Err(Error::NotFound(_)) => {
                    debug!(
                        memory_id = %memory_id,
                        attempt,
                        max_attempts = poll.max_attempts,
                        "memory resource not yet visible"
                    );
                }
                Err(e) => {
                    warn!(memory_id = %memory_id, error = %e, "unexpected error checking resource status");
                }
            }

            if attempt < poll.max_attempts {
                sleep(poll.delay).await;
            }
        }

        Err(Error::ProvisioningTimeout {
            resource_id: memory_id.to_string(),
            operation: "creation",
            attempts: poll.max_attempts,
        })
    }

    /// Request deletion of a resource.
    ///
    /// Issues a single delete call and returns the id; convergence is
    /// confirmed separately via [`wait_for_deletion`](Self::wait_for_deletion).
    ///
    /// # Errors
    ///
    /// Any delete failure propagates unchanged; the call is not retried.
    pub async fn delete_resource(&self, memory_id: &str) -> Result<String> {
        info!(memory_id = %memory_id, "deleting memory resource");
        match self.control.delete_resource(memory_id).await {
            Ok(()) => {
                info!(memory_id = %memory_id, "memory resource deletion requested");
                Ok(memory_id.to_string())
            }
            Err(e) => {
                error!(memory_id = %memory_id, error = %e, "could not delete memory resource");
                Err(e)
            }
        }
    }

    /// Poll until the resource is gone.
    ///
    /// The first not-found response is the success exit; a resource
    /// that is still retrievable is non-terminal.
    ///
    /// # Errors
    ///
    /// [`Error::ProvisioningTimeout`] when attempts are exhausted.
    pub async fn wait_for_deletion(&self, memory_id: &str) -> Result<bool> {
        let poll = &self.delete_poll;
        info!(memory_id = %memory_id, "waiting for memory resource to be fully deleted");

        for attempt in 1..=poll.max_attempts {
            match self.control.get_resource(memory_id).await {
                Ok(_) => {
                    debug!(
                        memory_id = %memory_id,
                        attempt,
                        max_attempts = poll.max_attempts,
                        "memory resource still exists"
                    );
                }
                Err(Error::NotFound(_)) => {
                    info!(memory_id = %memory_id, attempt, "memory resource deleted");
                    return Ok(true);
                }
                Err(e) => {
                    warn!(memory_id = %memory_id, error = %e, "unexpected error checking resource deletion");
                }
            }

            if attempt < poll.max_attempts {
                sleep(poll.delay).await;
            }
        }

        Err(Error::ProvisioningTimeout {
            resource_id: memory_id.to_string(),
            operation: "deletion",
            attempts: poll.max_attempts,
        })
    }

    /// Apply a partial update to a resource.
    ///
    /// Fetches current state first; a request with no optional fields
    /// returns that state unchanged and issues zero update calls.
    /// Otherwise the supplied fields go out in one update call and the
    /// authoritative post-update view is re-fetched.
    pub async fn update_resource(&self, request: UpdateResourceRequest) -> Result<MemoryResource> {
        let current = self.control.get_resource(&request.memory_id).await?;

        if !request.has_changes() {
            info!(memory_id = %request.memory_id, "no resource updates provided");
            return Ok(current);
        }

        info!(
            memory_id = %request.memory_id,
            description = request.description.is_some(),
            retention = request.retention_days.is_some(),
            strategies = request.strategies.is_some(),
            "updating memory resource"
        );
        self.control.update_resource(&request).await?;
        self.control.get_resource(&request.memory_id).await
    }
}

//! Gateway configuration
//!
//! Configuration is read once at startup from environment variables;
//! everything has a development-friendly default.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Environment variable naming the deployment environment
pub const ENV_ENVIRONMENT: &str = "MEMGATE_ENVIRONMENT";
/// Environment variable for memory event retention in days
pub const ENV_RETENTION_DAYS: &str = "MEMGATE_RETENTION_DAYS";
/// Environment variable selecting the memory backend
pub const ENV_BACKEND: &str = "MEMGATE_BACKEND";
/// Environment variable with the managed memory service base URL
pub const ENV_SERVICE_URL: &str = "MEMGATE_SERVICE_URL";

const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_RETENTION_DAYS: u32 = 30;

/// The closed set of memory backends.
///
/// Selected once at process start; there is no runtime module loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process store for development and testing
    InMemory,
    /// Remote managed conversational-memory service
    Managed,
}

impl BackendKind {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "in-memory",
            Self::Managed => "managed",
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "in-memory" | "in_memory" => Ok(Self::InMemory),
            "managed" => Ok(Self::Managed),
            other => Err(Error::Configuration(format!(
                "unknown memory backend {other:?} (expected \"in-memory\" or \"managed\")"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deployment environment name; the memory resource name is
    /// derived from it
    pub environment: String,
    /// Event retention in days (minimum 1)
    pub retention_days: u32,
    /// Which backend serves memory operations
    pub backend: BackendKind,
    /// Base URL of the managed memory service (required for
    /// [`BackendKind::Managed`])
    pub service_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            backend: BackendKind::InMemory,
            service_url: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for unparseable values; unset
    /// variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let environment =
            std::env::var(ENV_ENVIRONMENT).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

        let retention_days = match std::env::var(ENV_RETENTION_DAYS) {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                Error::Configuration(format!("{ENV_RETENTION_DAYS} must be an integer, got {raw:?}"))
            })?,
            Err(_) => DEFAULT_RETENTION_DAYS,
        };
        if retention_days == 0 {
            return Err(Error::Configuration(format!(
                "{ENV_RETENTION_DAYS} must be at least 1"
            )));
        }

        let backend = match std::env::var(ENV_BACKEND) {
            Ok(raw) => raw.parse()?,
            Err(_) => BackendKind::InMemory,
        };

        Ok(Self {
            environment,
            retention_days,
            backend,
            service_url: std::env::var(ENV_SERVICE_URL).ok(),
        })
    }

    /// Parameter store path under which the resolved memory resource id
    /// is persisted for reuse across process restarts.
    #[must_use]
    pub fn parameter_path(&self) -> String {
        format!("/{}/memory_resource_id", self.environment)
    }

    /// Canonical memory resource name for this environment.
    ///
    /// Non-alphanumeric separators are normalized so the name is valid
    /// as a resource-id prefix.
    #[must_use]
    pub fn resource_name(&self) -> String {
        self.environment.replace('-', "_")
    }
}

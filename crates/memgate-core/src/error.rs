//! Error types for memgate-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Backend reports a resource, actor, or session that does not
    /// exist. Often a normal branch: it triggers session
    /// initialization and is the success exit of deletion polling.
    #[error("not found: {0}")]
    NotFound(String),

    /// Creation conflict; the existing resource's id is adopted instead
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A poll loop exhausted its attempts without reaching the target state
    #[error("memory resource {resource_id}: {operation} did not complete within {attempts} attempts")]
    ProvisioningTimeout {
        /// Resource being polled
        resource_id: String,
        /// `"creation"` or `"deletion"`
        operation: &'static str,
        /// Attempts consumed before giving up
        attempts: u32,
    },

    /// Resource reached a terminal but non-success status
    #[error("memory resource {resource_id} entered terminal status {status}")]
    ProvisioningFailed {
        /// Resource that failed to provision
        resource_id: String,
        /// The terminal status observed
        status: String,
    },

    /// Durable key-value configuration store failure (never retried here)
    #[error("parameter store error: {0}")]
    ParameterStore(String),

    /// Any other backend error, re-raised unchanged
    #[error("backend error: {0}")]
    Backend(String),

    /// Network/connection error
    #[error("network error: {0}")]
    Network(String),

    /// Caller supplied a request this backend cannot act on
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a not-found condition.
    ///
    /// Poll loops treat not-found as non-terminal during creation and
    /// as the success exit during deletion.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("memory m-1".into()).is_not_found());
        assert!(!Error::Backend("boom".into()).is_not_found());
    }

    #[test]
    fn test_timeout_message_names_resource() {
        let err = Error::ProvisioningTimeout {
            resource_id: "m-123".into(),
            operation: "creation",
            attempts: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("m-123"));
        assert!(msg.contains("creation"));
        assert!(msg.contains("20"));
    }
}

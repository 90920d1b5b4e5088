//! Error types for deployment domain validation and parsing.

use super::DeploymentId;
use thiserror::Error;

/// Errors returned while constructing or mutating deployment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeploymentDomainError {
    /// The resource name is empty after trimming.
    #[error("resource name must not be empty")]
    EmptyResourceName,

    /// The resource version is empty after trimming.
    #[error("resource version must not be empty")]
    EmptyVersion,

    /// The provider identifier is empty after trimming.
    #[error("provider identifier must not be empty")]
    EmptyProviderId,

    /// The provider name is empty after trimming.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// The platform key contains characters outside `[a-z0-9_-]` or is empty.
    #[error("invalid platform key '{0}' (lowercase alphanumerics, '-' and '_' only)")]
    InvalidPlatformKey(String),

    /// Transitioning between two statuses is invalid.
    #[error("invalid deployment status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Discovered deployments must be adopted before they can be undeployed.
    #[error("deployment {0} was discovered on the platform; adopt it before undeploying")]
    DiscoveredDeployment(DeploymentId),

    /// Only discovered deployments can be adopted.
    #[error("deployment {0} is already managed")]
    AlreadyManaged(DeploymentId),
}

/// Error returned while parsing a deployment status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown deployment status: {0}")]
pub struct ParseDeploymentStatusError(pub String);

/// Error returned while parsing a deployment origin from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown deployment origin: {0}")]
pub struct ParseDeploymentOriginError(pub String);

/// Error returned while parsing a resource type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resource type: {0} (expected 'mcp' or 'agent')")]
pub struct ParseResourceTypeError(pub String);

//! Platform adapter contract.

use crate::deployment::domain::{
    Deployment, DeploymentDomainError, DeploymentId, PlatformKey, ProviderId, ResourceType,
};
use crate::deployment::ports::DeploymentRegistryError;
use crate::runtime::services::ReconcileError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for adapter operations.
pub type PlatformAdapterResult<T> = Result<T, PlatformAdapterError>;

/// Runtime-specific deployment operations for one platform key.
///
/// Built-in platforms reconcile in-process; extension platforms implement
/// this trait against their own infrastructure.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Returns the platform key served by this adapter.
    fn platform(&self) -> &PlatformKey;

    /// Returns the resource types this adapter can run.
    fn supported_resource_types(&self) -> &[ResourceType];

    /// Brings `deployment` up and returns the record to persist.
    async fn deploy(&self, deployment: &Deployment) -> PlatformAdapterResult<Deployment>;

    /// Tears `deployment` down.
    async fn undeploy(&self, deployment: &Deployment) -> PlatformAdapterResult<()>;

    /// Returns recent log lines for `deployment`.
    async fn get_logs(&self, deployment: &Deployment) -> PlatformAdapterResult<Vec<String>>;

    /// Stops an in-flight deployment.
    async fn cancel(&self, deployment: &Deployment) -> PlatformAdapterResult<()>;

    /// Lists resources running on the provider that the registry does not
    /// manage, as discovered deployments.
    async fn discover(&self, provider_id: &ProviderId) -> PlatformAdapterResult<Vec<Deployment>>;
}

/// Errors returned by platform adapters.
#[derive(Debug, Error)]
pub enum PlatformAdapterError {
    /// The adapter does not implement the operation.
    #[error("platform '{platform}' does not support {operation}")]
    NotSupported {
        /// Platform key.
        platform: PlatformKey,
        /// Operation name.
        operation: &'static str,
    },

    /// A reconciliation pass failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// A discovered resource could not be turned into a deployment record.
    #[error(transparent)]
    Domain(#[from] DeploymentDomainError),

    /// The adapter returned a record for a different deployment.
    #[error("adapter returned deployment {returned} while deploying {expected}")]
    UnexpectedRecord {
        /// Deployment being deployed.
        expected: DeploymentId,
        /// Deployment the adapter returned.
        returned: DeploymentId,
    },

    /// The converged record could not be stored.
    #[error(transparent)]
    Persistence(#[from] DeploymentRegistryError),

    /// Adapter-specific runtime failure.
    #[error("platform runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlatformAdapterError {
    /// Wraps an adapter-specific runtime failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Creates a [`PlatformAdapterError::NotSupported`] error.
    #[must_use]
    pub fn not_supported(platform: &PlatformKey, operation: &'static str) -> Self {
        Self::NotSupported {
            platform: platform.clone(),
            operation,
        }
    }
}

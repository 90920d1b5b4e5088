//! Repository port for deployment records.

use crate::deployment::domain::{Deployment, DeploymentId, ProviderId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for deployment repository operations.
pub type DeploymentRegistryResult<T> = Result<T, DeploymentRegistryError>;

/// Persistence contract for deployment records.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Stores a new deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentRegistryError::DuplicateDeployment`] when the ID
    /// already exists or [`DeploymentRegistryError::DuplicateResource`] when
    /// the same resource version is already recorded for the provider.
    async fn insert(&self, deployment: &Deployment) -> DeploymentRegistryResult<()>;

    /// Persists updates to an existing deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentRegistryError::NotFound`] when the deployment does
    /// not exist.
    async fn update(&self, deployment: &Deployment) -> DeploymentRegistryResult<()>;

    /// Removes a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentRegistryError::NotFound`] when the deployment does
    /// not exist.
    async fn delete(&self, deployment_id: DeploymentId) -> DeploymentRegistryResult<()>;

    /// Finds a deployment by identifier.
    async fn find_by_id(
        &self,
        deployment_id: DeploymentId,
    ) -> DeploymentRegistryResult<Option<Deployment>>;

    /// Finds the deployment of one resource version on one provider.
    async fn find_by_resource(
        &self,
        resource_name: &str,
        version: &str,
        provider_id: &ProviderId,
    ) -> DeploymentRegistryResult<Option<Deployment>>;

    /// Returns every deployment regardless of status or origin, ordered by
    /// creation time.
    async fn list_all(&self) -> DeploymentRegistryResult<Vec<Deployment>>;
}

/// Errors returned by deployment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DeploymentRegistryError {
    /// A deployment with the same identifier already exists.
    #[error("duplicate deployment identifier: {0}")]
    DuplicateDeployment(DeploymentId),

    /// The resource version is already deployed to the provider.
    #[error("{resource_name}@{version} is already deployed to provider {provider_id}")]
    DuplicateResource {
        /// Catalog resource name.
        resource_name: String,
        /// Catalog resource version.
        version: String,
        /// Target provider.
        provider_id: ProviderId,
    },

    /// The deployment was not found.
    #[error("deployment not found: {0}")]
    NotFound(DeploymentId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted deployment data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DeploymentRegistryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! Cluster API port for custom resource objects.

use crate::runtime::domain::{ClusterResource, ResourceRef};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Create, list and delete primitives for agent and MCP server objects.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Creates or replaces an object.
    async fn apply(&self, resource: &ClusterResource) -> ClusterResult<()>;

    /// Lists agent and MCP server objects across namespaces, managed or not.
    async fn list_all(&self) -> ClusterResult<Vec<ClusterResource>>;

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] when the object does not exist.
    async fn delete(&self, resource: &ResourceRef) -> ClusterResult<()>;
}

/// Errors returned by cluster clients.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    /// The object does not exist.
    #[error("cluster object {0} not found")]
    NotFound(ResourceRef),

    /// The cluster API rejected or failed a request.
    #[error("cluster API error: {0}")]
    Api(Arc<dyn std::error::Error + Send + Sync>),
}

impl ClusterError {
    /// Wraps a cluster API failure.
    pub fn api(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Api(Arc::new(err))
    }
}

//! Repository port for published catalog entries.

use crate::catalog::domain::{CatalogAgent, CatalogServer, VersionSelector};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read and publish contract for catalog entries.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Publishes a server version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateEntry`] when the (name, version) pair
    /// is already published.
    async fn publish_server(&self, server: &CatalogServer) -> CatalogResult<()>;

    /// Publishes an agent version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateEntry`] when the (name, version) pair
    /// is already published.
    async fn publish_agent(&self, agent: &CatalogAgent) -> CatalogResult<()>;

    /// Finds a server version.
    ///
    /// Returns `None` when nothing matches.
    async fn find_server(
        &self,
        name: &str,
        version: &VersionSelector,
    ) -> CatalogResult<Option<CatalogServer>>;

    /// Finds an agent version.
    ///
    /// Returns `None` when nothing matches.
    async fn find_agent(
        &self,
        name: &str,
        version: &VersionSelector,
    ) -> CatalogResult<Option<CatalogAgent>>;
}

/// Errors returned by catalog repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The (name, version) pair is already published.
    #[error("catalog entry {name}@{version} already exists")]
    DuplicateEntry {
        /// Entry name.
        name: String,
        /// Entry version.
        version: String,
    },

    /// Persistence-layer failure.
    #[error("catalog persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

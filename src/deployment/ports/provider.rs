//! Repository port for provider records.

use crate::deployment::domain::{Provider, ProviderId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider repository operations.
pub type ProviderRegistryResult<T> = Result<T, ProviderRegistryError>;

/// Persistence contract for providers.
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// Stores a new provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderRegistryError::DuplicateProvider`] when the ID is
    /// already registered.
    async fn register(&self, provider: &Provider) -> ProviderRegistryResult<()>;

    /// Finds a provider by identifier.
    async fn find_by_id(&self, provider_id: &ProviderId)
    -> ProviderRegistryResult<Option<Provider>>;

    /// Returns all providers ordered by identifier.
    async fn list_all(&self) -> ProviderRegistryResult<Vec<Provider>>;
}

/// Errors returned by provider repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProviderRegistryError {
    /// A provider with the same identifier already exists.
    #[error("duplicate provider identifier: {0}")]
    DuplicateProvider(ProviderId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted provider data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProviderRegistryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

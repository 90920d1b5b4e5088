//! In-memory repository for providers.

use crate::deployment::{
    domain::{Provider, ProviderId},
    ports::{ProviderRegistryError, ProviderRegistryResult, ProviderRepository},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory provider repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderRepository {
    providers: Arc<RwLock<BTreeMap<ProviderId, Provider>>>,
}

impl InMemoryProviderRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> ProviderRegistryError {
    ProviderRegistryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn register(&self, provider: &Provider) -> ProviderRegistryResult<()> {
        let mut providers = self.providers.write().map_err(lock_error)?;
        if providers.contains_key(provider.id()) {
            return Err(ProviderRegistryError::DuplicateProvider(
                provider.id().clone(),
            ));
        }
        providers.insert(provider.id().clone(), provider.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        provider_id: &ProviderId,
    ) -> ProviderRegistryResult<Option<Provider>> {
        let providers = self.providers.read().map_err(lock_error)?;
        Ok(providers.get(provider_id).cloned())
    }

    async fn list_all(&self) -> ProviderRegistryResult<Vec<Provider>> {
        let providers = self.providers.read().map_err(lock_error)?;
        Ok(providers.values().cloned().collect())
    }
}

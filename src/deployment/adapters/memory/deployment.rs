//! In-memory repository for deployment records.

use crate::deployment::{
    domain::{Deployment, DeploymentId, ProviderId},
    ports::{DeploymentRegistryError, DeploymentRegistryResult, DeploymentRepository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory deployment repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeploymentRepository {
    state: Arc<RwLock<InMemoryDeploymentState>>,
}

#[derive(Debug, Default)]
struct InMemoryDeploymentState {
    deployments: HashMap<DeploymentId, Deployment>,
    resource_index: HashMap<ResourceKey, DeploymentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResourceKey {
    resource_name: String,
    version: String,
    provider_id: ProviderId,
}

impl ResourceKey {
    fn of(deployment: &Deployment) -> Self {
        Self {
            resource_name: deployment.resource_name().to_owned(),
            version: deployment.version().to_owned(),
            provider_id: deployment.provider_id().clone(),
        }
    }
}

impl InMemoryDeploymentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> DeploymentRegistryError {
    DeploymentRegistryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DeploymentRepository for InMemoryDeploymentRepository {
    async fn insert(&self, deployment: &Deployment) -> DeploymentRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.deployments.contains_key(&deployment.id()) {
            return Err(DeploymentRegistryError::DuplicateDeployment(deployment.id()));
        }

        let key = ResourceKey::of(deployment);
        if state.resource_index.contains_key(&key) {
            return Err(DeploymentRegistryError::DuplicateResource {
                resource_name: key.resource_name,
                version: key.version,
                provider_id: key.provider_id,
            });
        }

        state.resource_index.insert(key, deployment.id());
        state.deployments.insert(deployment.id(), deployment.clone());
        Ok(())
    }

    async fn update(&self, deployment: &Deployment) -> DeploymentRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if !state.deployments.contains_key(&deployment.id()) {
            return Err(DeploymentRegistryError::NotFound(deployment.id()));
        }

        state.deployments.insert(deployment.id(), deployment.clone());
        Ok(())
    }

    async fn delete(&self, deployment_id: DeploymentId) -> DeploymentRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        let removed = state
            .deployments
            .remove(&deployment_id)
            .ok_or(DeploymentRegistryError::NotFound(deployment_id))?;
        state.resource_index.remove(&ResourceKey::of(&removed));
        Ok(())
    }

    async fn find_by_id(
        &self,
        deployment_id: DeploymentId,
    ) -> DeploymentRegistryResult<Option<Deployment>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.deployments.get(&deployment_id).cloned())
    }

    async fn find_by_resource(
        &self,
        resource_name: &str,
        version: &str,
        provider_id: &ProviderId,
    ) -> DeploymentRegistryResult<Option<Deployment>> {
        let state = self.state.read().map_err(lock_error)?;
        let key = ResourceKey {
            resource_name: resource_name.to_owned(),
            version: version.to_owned(),
            provider_id: provider_id.clone(),
        };
        Ok(state
            .resource_index
            .get(&key)
            .and_then(|id| state.deployments.get(id))
            .cloned())
    }

    async fn list_all(&self) -> DeploymentRegistryResult<Vec<Deployment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut deployments: Vec<Deployment> = state.deployments.values().cloned().collect();
        deployments.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(deployments)
    }
}

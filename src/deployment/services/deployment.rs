//! Deploy API boundary: record mutation plus platform dispatch.

use super::locks::NameLocks;
use crate::deployment::{
    domain::{
        Deployment, DeploymentConfig, DeploymentDomainError, DeploymentId, DeploymentStatus,
        NewDeployment, PlatformKey, Provider, ProviderId, ResourceType,
    },
    ports::{
        DeploymentRegistryError, DeploymentRepository, ProviderRegistryError, ProviderRepository,
    },
};
use crate::platform::{
    PlatformAdapter, PlatformAdapterError, PlatformAdapterRegistry, PlatformRegistryError,
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for deploying a catalog resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    resource_name: String,
    version: String,
    resource_type: ResourceType,
    provider_id: String,
    config: DeploymentConfig,
}

impl DeployRequest {
    /// Creates a request with no overrides.
    #[must_use]
    pub fn new(
        resource_name: impl Into<String>,
        version: impl Into<String>,
        resource_type: ResourceType,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            version: version.into(),
            resource_type,
            provider_id: provider_id.into(),
            config: DeploymentConfig::new(),
        }
    }

    /// Sets the override map.
    #[must_use]
    pub fn with_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }
}

/// Service-level errors for deployment operations.
#[derive(Debug, Error)]
pub enum DeploymentServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] DeploymentDomainError),

    /// Deployment persistence failed.
    #[error(transparent)]
    Repository(#[from] DeploymentRegistryError),

    /// Provider lookup failed.
    #[error(transparent)]
    Providers(#[from] ProviderRegistryError),

    /// No platform adapter serves the provider's platform.
    #[error(transparent)]
    Platform(#[from] PlatformRegistryError),

    /// The deployment does not exist.
    #[error("deployment {0} not found")]
    NotFound(DeploymentId),

    /// The provider does not exist.
    #[error("provider '{0}' not found")]
    ProviderNotFound(ProviderId),

    /// The resource is already deployed to the provider.
    #[error("{resource_name}@{version} is already deployed to provider '{provider_id}'")]
    AlreadyDeployed {
        /// Catalog resource name.
        resource_name: String,
        /// Catalog version.
        version: String,
        /// Target provider.
        provider_id: ProviderId,
    },

    /// The platform cannot run this kind of resource.
    #[error("platform '{platform}' cannot run {resource_type} resources")]
    UnsupportedResourceType {
        /// Platform key.
        platform: PlatformKey,
        /// Rejected resource type.
        resource_type: ResourceType,
    },

    /// The record was written but the platform did not converge; the record
    /// has been removed again.
    #[error("deployment created but reconciliation failed: {0}")]
    ReconciliationFailed(#[source] Box<PlatformAdapterError>),

    /// The platform adapter failed; the record is unchanged.
    #[error(transparent)]
    Adapter(Box<PlatformAdapterError>),

    /// The platform adapter failed and the record could not be restored.
    #[error("{operation} failed: {cause}; restoring the deployment record also failed: {rollback}")]
    RollbackFailed {
        /// Operation being compensated.
        operation: &'static str,
        /// Adapter failure that triggered the rollback.
        cause: Box<PlatformAdapterError>,
        /// Persistence failure during the rollback.
        rollback: DeploymentRegistryError,
    },
}

impl DeploymentServiceError {
    fn adapter(err: PlatformAdapterError) -> Self {
        Self::Adapter(Box::new(err))
    }
}

/// Result type for deployment service operations.
pub type DeploymentServiceResult<T> = Result<T, DeploymentServiceError>;

/// Entry point for deploy, undeploy and inspection requests.
///
/// Every mutating call updates the record store first and then asks the
/// provider's platform adapter to converge; a failed adapter call is
/// compensated so the store never records work the platform rejected.
pub struct DeploymentService<R, P, K>
where
    R: DeploymentRepository,
    P: ProviderRepository,
    K: Clock + Send + Sync,
{
    deployments: Arc<R>,
    providers: Arc<P>,
    platforms: Arc<PlatformAdapterRegistry>,
    clock: Arc<K>,
    name_locks: Arc<NameLocks>,
}

impl<R, P, K> Clone for DeploymentService<R, P, K>
where
    R: DeploymentRepository,
    P: ProviderRepository,
    K: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            deployments: Arc::clone(&self.deployments),
            providers: Arc::clone(&self.providers),
            platforms: Arc::clone(&self.platforms),
            clock: Arc::clone(&self.clock),
            name_locks: Arc::clone(&self.name_locks),
        }
    }
}

impl<R, P, K> DeploymentService<R, P, K>
where
    R: DeploymentRepository,
    P: ProviderRepository,
    K: Clock + Send + Sync,
{
    /// Creates a deployment service.
    #[must_use]
    pub fn new(
        deployments: Arc<R>,
        providers: Arc<P>,
        platforms: Arc<PlatformAdapterRegistry>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            deployments,
            providers,
            platforms,
            clock,
            name_locks: Arc::new(NameLocks::default()),
        }
    }

    /// Deploys a catalog resource to a provider.
    ///
    /// The record is inserted as `deploying`, the platform adapter is asked
    /// to converge, and the adapter's record is persisted as `deployed`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when validation fails, the provider
    /// or platform is unknown, the resource is already deployed there, or the
    /// platform fails to converge. In the last case the inserted record is
    /// deleted again.
    pub async fn deploy(&self, request: DeployRequest) -> DeploymentServiceResult<Deployment> {
        let provider_id = ProviderId::new(request.provider_id)?;
        let params = NewDeployment::new(
            request.resource_name,
            request.version,
            request.resource_type,
            provider_id,
        )
        .with_config(request.config);
        let deployment = Deployment::new(params, &*self.clock)?;

        let (provider, adapter) = self.adapter_for(deployment.provider_id()).await?;
        if !adapter
            .supported_resource_types()
            .contains(&deployment.resource_type())
        {
            return Err(DeploymentServiceError::UnsupportedResourceType {
                platform: provider.platform().clone(),
                resource_type: deployment.resource_type(),
            });
        }

        let _guard = self.name_locks.acquire(deployment.resource_name()).await;
        if self
            .deployments
            .find_by_resource(
                deployment.resource_name(),
                deployment.version(),
                deployment.provider_id(),
            )
            .await?
            .is_some()
        {
            return Err(DeploymentServiceError::AlreadyDeployed {
                resource_name: deployment.resource_name().to_owned(),
                version: deployment.version().to_owned(),
                provider_id: deployment.provider_id().clone(),
            });
        }
        self.deployments.insert(&deployment).await?;

        let converged = match adapter.deploy(&deployment).await {
            Ok(record) => self.mark_deployed(&deployment, record).await,
            Err(err) => Err(err),
        };
        let deployed = match converged {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    deployment_id = %deployment.id(),
                    platform = %provider.platform(),
                    error = %err,
                    "deploy failed; removing record"
                );
                return Err(self.discard(&deployment, err).await);
            }
        };
        info!(
            deployment_id = %deployed.id(),
            resource = %deployed.resource_name(),
            platform = %provider.platform(),
            "deployment converged"
        );
        Ok(deployed)
    }

    /// Removes a managed deployment and tears it down.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError::NotFound`] for unknown ids,
    /// [`DeploymentDomainError::DiscoveredDeployment`] for discovered
    /// records, and an adapter error when teardown fails, after the record
    /// has been restored.
    pub async fn undeploy(&self, deployment_id: DeploymentId) -> DeploymentServiceResult<()> {
        let deployment = self.get_deployment(deployment_id).await?;
        deployment.ensure_can_undeploy()?;
        let (provider, adapter) = self.adapter_for(deployment.provider_id()).await?;

        let _guard = self.name_locks.acquire(deployment.resource_name()).await;
        self.deployments.delete(deployment_id).await?;
        if let Err(err) = adapter.undeploy(&deployment).await {
            warn!(
                %deployment_id,
                platform = %provider.platform(),
                error = %err,
                "undeploy failed; restoring record"
            );
            return Err(match self.deployments.insert(&deployment).await {
                Ok(()) => DeploymentServiceError::adapter(err),
                Err(rollback) => DeploymentServiceError::RollbackFailed {
                    operation: "undeploy",
                    cause: Box::new(err),
                    rollback,
                },
            });
        }
        info!(%deployment_id, platform = %provider.platform(), "deployment removed");
        Ok(())
    }

    /// Cancels an in-flight deployment and marks it `cancelled`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when the deployment is unknown, the
    /// adapter cannot cancel, or the status change is not allowed.
    pub async fn cancel(&self, deployment_id: DeploymentId) -> DeploymentServiceResult<Deployment> {
        let mut deployment = self.get_deployment(deployment_id).await?;
        let (_, adapter) = self.adapter_for(deployment.provider_id()).await?;
        adapter
            .cancel(&deployment)
            .await
            .map_err(DeploymentServiceError::adapter)?;
        deployment.transition_to(DeploymentStatus::Cancelled, &*self.clock)?;
        self.deployments.update(&deployment).await?;
        Ok(deployment)
    }

    /// Returns recent log lines for a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when the deployment is unknown or
    /// the adapter cannot provide logs.
    pub async fn get_logs(&self, deployment_id: DeploymentId) -> DeploymentServiceResult<Vec<String>> {
        let deployment = self.get_deployment(deployment_id).await?;
        let (_, adapter) = self.adapter_for(deployment.provider_id()).await?;
        adapter
            .get_logs(&deployment)
            .await
            .map_err(DeploymentServiceError::adapter)
    }

    /// Replaces a managed deployment's overrides and re-applies it.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when the deployment is unknown or
    /// discovered, or when the platform rejects the new overrides; the
    /// previous record is restored in that case.
    pub async fn update_config(
        &self,
        deployment_id: DeploymentId,
        config: DeploymentConfig,
    ) -> DeploymentServiceResult<Deployment> {
        let original = self.get_deployment(deployment_id).await?;
        if !original.is_managed() {
            return Err(DeploymentDomainError::DiscoveredDeployment(deployment_id).into());
        }
        let (provider, adapter) = self.adapter_for(original.provider_id()).await?;

        let _guard = self.name_locks.acquire(original.resource_name()).await;
        let mut updated = original.clone();
        let previous_config = updated.replace_config(config, &*self.clock);
        debug!(
            %deployment_id,
            previous_entries = previous_config.entries().len(),
            "replacing deployment overrides"
        );
        updated.transition_to(DeploymentStatus::Deploying, &*self.clock)?;
        self.deployments.update(&updated).await?;

        let mut deployed = match adapter.deploy(&updated).await {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    %deployment_id,
                    platform = %provider.platform(),
                    error = %err,
                    "config update failed; restoring previous record"
                );
                return Err(match self.deployments.update(&original).await {
                    Ok(()) => DeploymentServiceError::adapter(err),
                    Err(rollback) => DeploymentServiceError::RollbackFailed {
                        operation: "config update",
                        cause: Box::new(err),
                        rollback,
                    },
                });
            }
        };
        deployed.transition_to(DeploymentStatus::Deployed, &*self.clock)?;
        self.deployments.update(&deployed).await?;
        Ok(deployed)
    }

    /// Takes ownership of a discovered deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when the deployment is unknown or
    /// already managed.
    pub async fn adopt(&self, deployment_id: DeploymentId) -> DeploymentServiceResult<Deployment> {
        let mut deployment = self.get_deployment(deployment_id).await?;
        deployment.adopt(&*self.clock)?;
        self.deployments.update(&deployment).await?;
        info!(%deployment_id, "discovered deployment adopted");
        Ok(deployment)
    }

    /// Returns one deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError::NotFound`] for unknown ids.
    pub async fn get_deployment(
        &self,
        deployment_id: DeploymentId,
    ) -> DeploymentServiceResult<Deployment> {
        self.deployments
            .find_by_id(deployment_id)
            .await?
            .ok_or(DeploymentServiceError::NotFound(deployment_id))
    }

    /// Lists persisted deployments plus resources discovered on every
    /// provider.
    ///
    /// Newly discovered resources are persisted as discovered records.
    /// Providers whose platform cannot be resolved or whose discovery fails
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentServiceError`] when the record or provider store
    /// cannot be read.
    pub async fn list_deployments(&self) -> DeploymentServiceResult<Vec<Deployment>> {
        let mut deployments = self.deployments.list_all().await?;
        for provider in self.providers.list_all().await? {
            for found in self.discover(&provider).await {
                let known = deployments.iter().any(|existing| {
                    existing.matches_resource(
                        found.resource_name(),
                        found.version(),
                        found.provider_id(),
                    )
                });
                if known {
                    continue;
                }
                if let Err(err) = self.deployments.insert(&found).await {
                    warn!(
                        provider_id = %provider.id().as_str(),
                        resource = %found.resource_name(),
                        error = %err,
                        "failed to persist discovered deployment"
                    );
                    continue;
                }
                deployments.push(found);
            }
        }
        Ok(deployments)
    }

    async fn discover(&self, provider: &Provider) -> Vec<Deployment> {
        let adapter = match self.platforms.resolve(provider.platform()) {
            Ok(adapter) => adapter,
            Err(err) => {
                warn!(
                    provider_id = %provider.id().as_str(),
                    error = %err,
                    "skipping discovery for provider"
                );
                return Vec::new();
            }
        };
        adapter
            .discover(provider.id())
            .await
            .unwrap_or_else(|err| {
                warn!(
                    provider_id = %provider.id().as_str(),
                    platform = %provider.platform(),
                    error = %err,
                    "discovery failed; excluding provider from listing"
                );
                Vec::new()
            })
    }

    async fn adapter_for(
        &self,
        provider_id: &ProviderId,
    ) -> DeploymentServiceResult<(Provider, Arc<dyn PlatformAdapter>)> {
        let provider = self
            .providers
            .find_by_id(provider_id)
            .await?
            .ok_or_else(|| DeploymentServiceError::ProviderNotFound(provider_id.clone()))?;
        let adapter = self.platforms.resolve(provider.platform())?;
        Ok((provider, adapter))
    }

    async fn mark_deployed(
        &self,
        deployment: &Deployment,
        mut record: Deployment,
    ) -> Result<Deployment, PlatformAdapterError> {
        if record.id() != deployment.id() {
            return Err(PlatformAdapterError::UnexpectedRecord {
                expected: deployment.id(),
                returned: record.id(),
            });
        }
        record.transition_to(DeploymentStatus::Deployed, &*self.clock)?;
        self.deployments.update(&record).await?;
        Ok(record)
    }

    async fn discard(
        &self,
        deployment: &Deployment,
        cause: PlatformAdapterError,
    ) -> DeploymentServiceError {
        match self.deployments.delete(deployment.id()).await {
            Ok(()) => DeploymentServiceError::ReconciliationFailed(Box::new(cause)),
            Err(rollback) => DeploymentServiceError::RollbackFailed {
                operation: "deploy",
                cause: Box::new(cause),
                rollback,
            },
        }
    }
}

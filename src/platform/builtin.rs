//! Adapters for the platforms reconciled in-process.

use super::{PlatformAdapter, PlatformAdapterError, PlatformAdapterResult};
use crate::catalog::ports::CatalogRepository;
use crate::deployment::{
    domain::{
        BuiltinPlatform, Deployment, DeploymentConfig, NAMESPACE_KEY, NewDeployment, PlatformKey,
        ProviderId, ResourceType,
    },
    ports::{DeploymentRepository, ProviderRepository},
};
use crate::runtime::domain::ClusterResource;
use crate::runtime::services::{ReconcileReport, Reconciler};
use crate::runtime::translation::{AGENT_KIND, RESOURCE_VERSION_LABEL};
use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

const SUPPORTED_TYPES: &[ResourceType] = &[ResourceType::Mcp, ResourceType::Agent];
const UNVERSIONED: &str = "latest";

/// Adapter for a built-in platform.
///
/// Deploy and undeploy run a reconciliation pass over the platform's whole
/// group, so the record passed in must already be in (or already be gone
/// from) the deployment store.
pub struct BuiltinPlatformAdapter<D, P, C, K>
where
    D: DeploymentRepository,
    P: ProviderRepository,
    C: CatalogRepository,
    K: Clock + Send + Sync,
{
    platform: BuiltinPlatform,
    key: PlatformKey,
    reconciler: Arc<Reconciler<D, P, C>>,
    clock: Arc<K>,
}

impl<D, P, C, K> BuiltinPlatformAdapter<D, P, C, K>
where
    D: DeploymentRepository,
    P: ProviderRepository,
    C: CatalogRepository,
    K: Clock + Send + Sync,
{
    /// Creates the adapter for `platform`.
    #[must_use]
    pub fn new(
        platform: BuiltinPlatform,
        reconciler: Arc<Reconciler<D, P, C>>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            platform,
            key: platform.key(),
            reconciler,
            clock,
        }
    }

    /// Returns the built-in platform served.
    #[must_use]
    pub const fn builtin(&self) -> BuiltinPlatform {
        self.platform
    }

    async fn reconcile(&self, deployment: &Deployment) -> PlatformAdapterResult<ReconcileReport> {
        let report = self.reconciler.reconcile_platform(self.platform).await?;
        info!(
            platform = %self.key,
            deployment_id = %deployment.id(),
            digest = %report.digest,
            "platform converged"
        );
        Ok(report)
    }

    fn discovered_from(
        &self,
        resource: &ClusterResource,
        provider_id: &ProviderId,
    ) -> PlatformAdapterResult<Deployment> {
        let resource_type = if resource.kind == AGENT_KIND {
            ResourceType::Agent
        } else {
            ResourceType::Mcp
        };
        let version = resource
            .label(RESOURCE_VERSION_LABEL)
            .unwrap_or(UNVERSIONED);
        let params = NewDeployment::new(
            resource.metadata.name.clone(),
            version,
            resource_type,
            provider_id.clone(),
        )
        .with_config(
            DeploymentConfig::new().with(NAMESPACE_KEY, resource.metadata.namespace.clone()),
        );
        Deployment::discovered(params, &*self.clock).map_err(PlatformAdapterError::from)
    }
}

#[async_trait]
impl<D, P, C, K> PlatformAdapter for BuiltinPlatformAdapter<D, P, C, K>
where
    D: DeploymentRepository,
    P: ProviderRepository,
    C: CatalogRepository,
    K: Clock + Send + Sync,
{
    fn platform(&self) -> &PlatformKey {
        &self.key
    }

    fn supported_resource_types(&self) -> &[ResourceType] {
        SUPPORTED_TYPES
    }

    async fn deploy(&self, deployment: &Deployment) -> PlatformAdapterResult<Deployment> {
        let report = self.reconcile(deployment).await?;
        let mut deployed = deployment.clone();
        deployed.set_cloud_metadata(
            Some(json!({
                "platform": self.key.as_str(),
                "artifactDigest": report.digest,
            })),
            &*self.clock,
        );
        Ok(deployed)
    }

    async fn undeploy(&self, deployment: &Deployment) -> PlatformAdapterResult<()> {
        self.reconcile(deployment).await.map(|_| ())
    }

    async fn get_logs(&self, _deployment: &Deployment) -> PlatformAdapterResult<Vec<String>> {
        Err(PlatformAdapterError::not_supported(&self.key, "logs"))
    }

    async fn cancel(&self, _deployment: &Deployment) -> PlatformAdapterResult<()> {
        Err(PlatformAdapterError::not_supported(&self.key, "cancel"))
    }

    async fn discover(&self, provider_id: &ProviderId) -> PlatformAdapterResult<Vec<Deployment>> {
        let cluster = match (self.platform, self.reconciler.cluster()) {
            (BuiltinPlatform::Kubernetes, Some(cluster)) => Arc::clone(cluster),
            _ => return Ok(Vec::new()),
        };
        let resources = cluster
            .list_all()
            .await
            .map_err(PlatformAdapterError::runtime)?;
        let discovered = resources
            .iter()
            .filter(|resource| !resource.is_managed())
            .map(|resource| self.discovered_from(resource, provider_id))
            .collect::<PlatformAdapterResult<Vec<_>>>()?;
        debug!(
            platform = %self.key,
            provider_id = %provider_id.as_str(),
            count = discovered.len(),
            "discovered unmanaged resources"
        );
        Ok(discovered)
    }
}

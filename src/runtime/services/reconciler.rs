//! Full re-derivation of platform state from the deployment store.

use super::resolver::{ResolveError, RunRequestResolver};
use super::side_files::render_side_files;
use crate::catalog::ports::CatalogRepository;
use crate::config::RuntimeConfig;
use crate::deployment::{
    domain::{BuiltinPlatform, Deployment, DeploymentId, PlatformKey, ProviderId},
    ports::{
        DeploymentRegistryError, DeploymentRepository, ProviderRegistryError, ProviderRepository,
    },
};
use crate::runtime::adapters::{ArtifactWorkspace, WorkspaceError};
use crate::runtime::domain::{DesiredState, ResourceRef, RunRequest, TranslationError};
use crate::runtime::ports::{
    ClusterClient, ClusterError, ComposeError, ComposeInvocation, ComposeRunner,
};
use crate::runtime::translation::{
    COMPOSE_FILE, GATEWAY_CONFIG_FILE, KubernetesTranslator, LocalTranslator, MCP_SERVERS_FILE,
    translate_requests,
};
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while applying rendered artifacts.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The runtime directory could not be written.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// The container runtime rejected the compose project.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The cluster API rejected a request.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// Cluster resources are desired but no cluster client is configured.
    #[error("no cluster client is configured")]
    ClusterUnavailable,

    /// The blocking artifact writer did not complete.
    #[error("artifact writer task failed: {0}")]
    Join(String),
}

/// Errors raised by a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The deployment store could not be read.
    #[error(transparent)]
    Deployments(#[from] DeploymentRegistryError),

    /// The provider store could not be read.
    #[error(transparent)]
    Providers(#[from] ProviderRegistryError),

    /// A deployment could not be resolved against the catalog.
    #[error("failed to resolve deployment {deployment_id}: {source}")]
    Resolve {
        /// Deployment being resolved.
        deployment_id: DeploymentId,
        /// Resolution failure.
        #[source]
        source: ResolveError,
    },

    /// Desired state could not be rendered for the platform.
    #[error("{platform} translation failed: {source}")]
    Translation {
        /// Platform being reconciled.
        platform: BuiltinPlatform,
        /// Translation failure.
        #[source]
        source: TranslationError,
    },

    /// Rendered artifacts could not be applied.
    #[error("{platform} apply failed: {source}")]
    Apply {
        /// Platform being reconciled.
        platform: BuiltinPlatform,
        /// Apply failure.
        #[source]
        source: ApplyError,
    },
}

impl ReconcileError {
    fn translation(platform: BuiltinPlatform) -> impl FnOnce(TranslationError) -> Self {
        move |source| Self::Translation { platform, source }
    }

    fn apply(platform: BuiltinPlatform, source: impl Into<ApplyError>) -> Self {
        Self::Apply {
            platform,
            source: source.into(),
        }
    }
}

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Outcome of one successful platform pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Platform reconciled.
    pub platform: BuiltinPlatform,
    /// Deployments included in the desired state.
    pub deployments: usize,
    /// Servers in the desired state, including servers resolved for agents.
    pub mcp_servers: usize,
    /// Agents in the desired state.
    pub agents: usize,
    /// Deployments skipped because their provider could not be found.
    pub skipped: Vec<DeploymentId>,
    /// SHA-256 of the applied artifacts, hex encoded.
    pub digest: String,
}

#[derive(Debug, Default)]
struct Partition {
    groups: BTreeMap<PlatformKey, Vec<Deployment>>,
    skipped: Vec<DeploymentId>,
}

/// Converges a built-in platform onto the desired state held in the store.
///
/// Every pass reads the whole deployment store, so a pass is idempotent and
/// repairs drift left by any earlier failure.
pub struct Reconciler<D, P, C>
where
    D: DeploymentRepository,
    P: ProviderRepository,
    C: CatalogRepository,
{
    deployments: Arc<D>,
    providers: Arc<P>,
    resolver: RunRequestResolver<C>,
    config: Arc<RuntimeConfig>,
    compose: Arc<dyn ComposeRunner>,
    cluster: Option<Arc<dyn ClusterClient>>,
}

impl<D, P, C> Reconciler<D, P, C>
where
    D: DeploymentRepository,
    P: ProviderRepository,
    C: CatalogRepository,
{
    /// Creates a reconciler with no cluster client.
    #[must_use]
    pub fn new(
        deployments: Arc<D>,
        providers: Arc<P>,
        catalog: Arc<C>,
        config: Arc<RuntimeConfig>,
        compose: Arc<dyn ComposeRunner>,
    ) -> Self {
        Self {
            deployments,
            providers,
            resolver: RunRequestResolver::new(catalog),
            config,
            compose,
            cluster: None,
        }
    }

    /// Sets the client used for the cluster platform.
    #[must_use]
    pub fn with_cluster_client(mut self, cluster: Arc<dyn ClusterClient>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Returns the runtime configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns the cluster client, when one is configured.
    #[must_use]
    pub const fn cluster(&self) -> Option<&Arc<dyn ClusterClient>> {
        self.cluster.as_ref()
    }

    /// Rebuilds and applies the desired state of one platform.
    ///
    /// Managed deployments that are deploying or deployed are included.
    /// Any resolution, translation or apply failure aborts the whole pass.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the stores cannot be read or the pass
    /// fails.
    pub async fn reconcile_platform(
        &self,
        platform: BuiltinPlatform,
    ) -> ReconcileResult<ReconcileReport> {
        let mut partition = self.partition().await?;
        let deployments = partition
            .groups
            .remove(&platform.key())
            .unwrap_or_default();
        self.run_pass(platform, &deployments, partition.skipped)
            .await
    }

    /// Reconciles every built-in platform in turn.
    ///
    /// A failing platform does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the stores cannot be read; per-platform
    /// failures are reported in the returned list.
    pub async fn reconcile_all(
        &self,
    ) -> ReconcileResult<Vec<(BuiltinPlatform, ReconcileResult<ReconcileReport>)>> {
        let mut partition = self.partition().await?;
        let mut outcomes = Vec::with_capacity(BuiltinPlatform::ALL.len());
        for platform in BuiltinPlatform::ALL {
            let deployments = partition
                .groups
                .remove(&platform.key())
                .unwrap_or_default();
            let outcome = self
                .run_pass(platform, &deployments, partition.skipped.clone())
                .await;
            if let Err(err) = &outcome {
                warn!(%platform, error = %err, "platform reconciliation failed");
            }
            outcomes.push((platform, outcome));
        }
        Ok(outcomes)
    }

    async fn partition(&self) -> ReconcileResult<Partition> {
        let mut platforms: HashMap<ProviderId, Option<PlatformKey>> = HashMap::new();
        let mut partition = Partition::default();
        for deployment in self.deployments.list_all().await? {
            if !deployment.is_managed() || !deployment.status().is_desired() {
                continue;
            }

            let provider_id = deployment.provider_id().clone();
            if !platforms.contains_key(&provider_id) {
                let found = self
                    .providers
                    .find_by_id(&provider_id)
                    .await?
                    .map(|provider| provider.platform().clone());
                platforms.insert(provider_id.clone(), found);
            }

            let Some(key) = platforms.get(&provider_id).cloned().flatten() else {
                warn!(
                    deployment_id = %deployment.id(),
                    provider_id = %provider_id.as_str(),
                    "skipping deployment whose provider is not registered"
                );
                partition.skipped.push(deployment.id());
                continue;
            };
            partition.groups.entry(key).or_default().push(deployment);
        }
        Ok(partition)
    }

    async fn run_pass(
        &self,
        platform: BuiltinPlatform,
        deployments: &[Deployment],
        skipped: Vec<DeploymentId>,
    ) -> ReconcileResult<ReconcileReport> {
        info!(%platform, deployments = deployments.len(), "reconciling platform");
        let mut requests: Vec<RunRequest> = Vec::with_capacity(deployments.len());
        for deployment in deployments {
            let request = self.resolver.resolve(deployment).await.map_err(|source| {
                ReconcileError::Resolve {
                    deployment_id: deployment.id(),
                    source,
                }
            })?;
            requests.push(request);
        }
        let state = translate_requests(&requests).map_err(ReconcileError::translation(platform))?;

        let digest = match platform {
            BuiltinPlatform::Local => self.apply_local(&state).await?,
            BuiltinPlatform::Kubernetes => self.apply_kubernetes(&state).await?,
        };

        let report = ReconcileReport {
            platform,
            deployments: deployments.len(),
            mcp_servers: state.mcp_servers.len(),
            agents: state.agents.len(),
            skipped,
            digest,
        };
        info!(
            %platform,
            mcp_servers = report.mcp_servers,
            agents = report.agents,
            digest = %report.digest,
            "platform reconciled"
        );
        Ok(report)
    }

    async fn apply_local(&self, state: &DesiredState) -> ReconcileResult<String> {
        let platform = BuiltinPlatform::Local;
        let artifacts = LocalTranslator::new(&self.config)
            .translate(state)
            .map_err(ReconcileError::translation(platform))?;
        let compose_yaml = artifacts
            .compose_yaml()
            .map_err(ReconcileError::translation(platform))?;
        let gateway_yaml = artifacts
            .gateway_yaml()
            .map_err(ReconcileError::translation(platform))?;
        let side_files =
            render_side_files(state).map_err(ReconcileError::translation(platform))?;

        let mut hasher = Sha256::new();
        hasher.update(compose_yaml.as_bytes());
        hasher.update(gateway_yaml.as_bytes());
        for (path, contents) in &side_files {
            hasher.update(path.as_str().as_bytes());
            hasher.update(contents.as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());

        let workspace = ArtifactWorkspace::new(&self.config.runtime_dir)
            .map_err(|err| ReconcileError::apply(platform, err))?;
        let writer = workspace.clone();
        tokio::task::spawn_blocking(move || {
            write_local_artifacts(&writer, &compose_yaml, &gateway_yaml, &side_files)
        })
        .await
        .map_err(|err| ReconcileError::apply(platform, ApplyError::Join(err.to_string())))?
        .map_err(|err| ReconcileError::apply(platform, err))?;

        let invocation = ComposeInvocation {
            project: self.config.compose_project.clone(),
            project_dir: self.config.runtime_dir.clone(),
            compose_file: self.config.runtime_dir.join(COMPOSE_FILE),
        };
        self.compose
            .up(&invocation)
            .await
            .map_err(|err| ReconcileError::apply(platform, err))?;
        Ok(digest)
    }

    async fn apply_kubernetes(&self, state: &DesiredState) -> ReconcileResult<String> {
        let platform = BuiltinPlatform::Kubernetes;
        let resources = KubernetesTranslator::new(self.config.default_namespace.clone())
            .translate(state)
            .map_err(ReconcileError::translation(platform))?;
        let encoded = serde_json::to_vec(&resources).map_err(|err| {
            ReconcileError::translation(platform)(TranslationError::Serialization {
                artifact: "cluster resources",
                message: err.to_string(),
            })
        })?;
        let digest = format!("{:x}", Sha256::digest(&encoded));

        let Some(cluster) = self.cluster.as_ref() else {
            if resources.is_empty() {
                debug!("no cluster client and nothing desired; skipping cluster pass");
                return Ok(digest);
            }
            return Err(ReconcileError::apply(platform, ApplyError::ClusterUnavailable));
        };

        for resource in &resources {
            cluster
                .apply(resource)
                .await
                .map_err(|err| ReconcileError::apply(platform, err))?;
        }

        let desired: BTreeSet<ResourceRef> =
            resources.iter().map(|resource| resource.resource_ref()).collect();
        let existing = cluster
            .list_all()
            .await
            .map_err(|err| ReconcileError::apply(platform, err))?;
        for stale in existing
            .iter()
            .filter(|resource| resource.is_managed())
            .map(|resource| resource.resource_ref())
            .filter(|reference| !desired.contains(reference))
        {
            match cluster.delete(&stale).await {
                Ok(()) => debug!(resource = %stale, "deleted stale cluster object"),
                Err(ClusterError::NotFound(_)) => {}
                Err(err) => return Err(ReconcileError::apply(platform, err)),
            }
        }
        Ok(digest)
    }
}

fn write_local_artifacts(
    workspace: &ArtifactWorkspace,
    compose_yaml: &str,
    gateway_yaml: &str,
    side_files: &BTreeMap<Utf8PathBuf, String>,
) -> Result<(), ApplyError> {
    workspace.write_atomic(Utf8Path::new(COMPOSE_FILE), compose_yaml.as_bytes())?;
    workspace.write_atomic(Utf8Path::new(GATEWAY_CONFIG_FILE), gateway_yaml.as_bytes())?;
    for (path, contents) in side_files {
        workspace.write_atomic(path, contents.as_bytes())?;
    }
    for existing in workspace.find_nested_files(MCP_SERVERS_FILE)? {
        if !side_files.contains_key(&existing) {
            workspace.remove_file(&existing)?;
            debug!(path = %existing, "removed stale side file");
        }
    }
    Ok(())
}

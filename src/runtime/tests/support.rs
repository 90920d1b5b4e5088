//! Shared fixtures for reconciliation tests.

use crate::catalog::{
    adapters::InMemoryCatalog,
    domain::{
        AgentMcpServerEntry, CatalogAgent, CatalogServer, Package, PackageTransport, RegistryType,
    },
    ports::CatalogRepository,
};
use crate::config::RuntimeConfig;
use crate::deployment::{
    adapters::memory::{InMemoryDeploymentRepository, InMemoryProviderRepository},
    domain::{
        Deployment, DeploymentConfig, NewDeployment, PlatformKey, Provider, ProviderId,
        ResourceType,
    },
    ports::{DeploymentRepository, ProviderRepository},
};
use crate::runtime::adapters::{InMemoryClusterClient, RecordingComposeRunner};
use crate::runtime::services::Reconciler;
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use std::sync::Arc;
use tempfile::TempDir;

pub type TestReconciler =
    Reconciler<InMemoryDeploymentRepository, InMemoryProviderRepository, InMemoryCatalog>;

pub struct Harness {
    pub runtime_dir: TempDir,
    pub deployments: Arc<InMemoryDeploymentRepository>,
    pub providers: Arc<InMemoryProviderRepository>,
    pub catalog: Arc<InMemoryCatalog>,
    pub compose: Arc<RecordingComposeRunner>,
    pub cluster: Arc<InMemoryClusterClient>,
    pub reconciler: TestReconciler,
}

impl Harness {
    pub async fn new(with_cluster: bool) -> Self {
        let runtime_dir = tempfile::tempdir().expect("temp dir should be created");
        let deployments = Arc::new(InMemoryDeploymentRepository::new());
        let providers = Arc::new(InMemoryProviderRepository::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let compose = Arc::new(RecordingComposeRunner::new());
        let cluster = Arc::new(InMemoryClusterClient::new());
        let config = RuntimeConfig::default().with_runtime_dir(runtime_dir.path());

        providers
            .register(&Provider::local().expect("local provider"))
            .await
            .expect("local provider should register");
        providers
            .register(
                &Provider::new(
                    ProviderId::new("kind-dev").expect("valid provider id"),
                    "Kind cluster",
                    PlatformKey::kubernetes(),
                )
                .expect("valid provider"),
            )
            .await
            .expect("cluster provider should register");

        let base = Reconciler::new(
            Arc::clone(&deployments),
            Arc::clone(&providers),
            Arc::clone(&catalog),
            Arc::new(config),
            compose.clone(),
        );
        let reconciler = if with_cluster {
            base.with_cluster_client(cluster.clone())
        } else {
            base
        };

        Self {
            runtime_dir,
            deployments,
            providers,
            catalog,
            compose,
            cluster,
            reconciler,
        }
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.runtime_dir.path().join(relative))
            .expect("temp paths are UTF-8")
    }

    pub fn read(&self, relative: &str) -> Option<String> {
        std::fs::read_to_string(self.path(relative)).ok()
    }

    pub async fn deploy(
        &self,
        name: &str,
        version: &str,
        kind: ResourceType,
        provider: &str,
        config: DeploymentConfig,
    ) -> Deployment {
        let params = NewDeployment::new(
            name,
            version,
            kind,
            ProviderId::new(provider).expect("valid provider id"),
        )
        .with_config(config);
        let deployment = Deployment::new(params, &DefaultClock).expect("valid deployment");
        self.deployments
            .insert(&deployment)
            .await
            .expect("insert should succeed");
        deployment
    }
}

pub fn stdio_server() -> CatalogServer {
    CatalogServer::new("io.example/echo", "1.0.0")
        .expect("valid server")
        .with_package(
            Package::new(RegistryType::Npm, "@example/echo", "1.0.0").expect("valid package"),
        )
}

pub fn http_server(port: Option<u16>) -> CatalogServer {
    CatalogServer::new("io.example/search", "2.0.0")
        .expect("valid server")
        .with_package(
            Package::new(RegistryType::Oci, "ghcr.io/example/search", "2.0.0")
                .expect("valid package")
                .with_transport(PackageTransport::StreamableHttp { port, path: None }),
        )
}

pub fn planner_agent() -> CatalogAgent {
    CatalogAgent::new("planner", "0.1.0")
        .expect("valid agent")
        .with_image("ghcr.io/example/planner:0.1.0")
        .with_mcp_server(AgentMcpServerEntry::registry(
            "search",
            "io.example/search",
            Some("2.0.0".to_owned()),
        ))
}

pub async fn publish_all(catalog: &InMemoryCatalog) {
    catalog
        .publish_server(&stdio_server())
        .await
        .expect("publish should succeed");
    catalog
        .publish_server(&http_server(Some(3000)))
        .await
        .expect("publish should succeed");
    catalog
        .publish_agent(&planner_agent())
        .await
        .expect("publish should succeed");
}

//! Service fixtures: stores, built-in adapters and a scripted extension
//! platform.

use crate::catalog::{
    adapters::InMemoryCatalog,
    domain::{CatalogServer, Package, PackageTransport, RegistryType},
    ports::CatalogRepository,
};
use crate::config::RuntimeConfig;
use crate::deployment::{
    adapters::memory::{InMemoryDeploymentRepository, InMemoryProviderRepository},
    domain::{
        BuiltinPlatform, Deployment, DeploymentStatus, NewDeployment, PlatformKey, Provider,
        ProviderId, ResourceType,
    },
    ports::ProviderRepository,
    services::DeploymentService,
};
use crate::platform::{
    BuiltinPlatformAdapter, PlatformAdapter, PlatformAdapterError, PlatformAdapterRegistry,
    PlatformAdapterResult,
};
use crate::runtime::adapters::{InMemoryClusterClient, RecordingComposeRunner};
use crate::runtime::services::Reconciler;
use async_trait::async_trait;
use mockable::DefaultClock;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub type TestService =
    DeploymentService<InMemoryDeploymentRepository, InMemoryProviderRepository, DefaultClock>;

/// Extension adapter whose behaviour is set by the test.
pub struct ScriptedAdapter {
    key: PlatformKey,
    state: Mutex<Script>,
}

#[derive(Clone, Default)]
struct Script {
    calls: Vec<String>,
    fail_deploy: bool,
    fail_discovery: bool,
    reported_status: Option<DeploymentStatus>,
    foreign_record: bool,
    discovered: Vec<Deployment>,
}

impl ScriptedAdapter {
    pub fn new(key: &str) -> Arc<Self> {
        Arc::new(Self {
            key: PlatformKey::new(key).expect("valid platform key"),
            state: Mutex::new(Script::default()),
        })
    }

    pub fn fail_deploys(&self, fail: bool) {
        self.state.lock().expect("script lock").fail_deploy = fail;
    }

    /// Makes deploy return the record already moved to `status`.
    pub fn reports_status(&self, status: DeploymentStatus) {
        self.state.lock().expect("script lock").reported_status = Some(status);
    }

    /// Makes deploy return a record with a fresh id.
    pub fn reports_foreign_record(&self) {
        self.state.lock().expect("script lock").foreign_record = true;
    }

    pub fn fail_discovery(&self) {
        self.state.lock().expect("script lock").fail_discovery = true;
    }

    pub fn discovers(&self, deployment: Deployment) {
        self.state
            .lock()
            .expect("script lock")
            .discovered
            .push(deployment);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().expect("script lock").calls.clone()
    }

    fn record(&self, call: String) -> Script {
        let mut state = self.state.lock().expect("script lock");
        state.calls.push(call);
        state.clone()
    }
}

#[async_trait]
impl PlatformAdapter for ScriptedAdapter {
    fn platform(&self) -> &PlatformKey {
        &self.key
    }

    fn supported_resource_types(&self) -> &[ResourceType] {
        &[ResourceType::Mcp]
    }

    async fn deploy(&self, deployment: &Deployment) -> PlatformAdapterResult<Deployment> {
        let script = self.record(format!("deploy {}", deployment.resource_name()));
        if script.fail_deploy {
            return Err(PlatformAdapterError::runtime(std::io::Error::other(
                "acme rejected the workload",
            )));
        }
        if script.foreign_record {
            let params = NewDeployment::new(
                deployment.resource_name(),
                deployment.version(),
                deployment.resource_type(),
                deployment.provider_id().clone(),
            );
            return Ok(Deployment::new(params, &DefaultClock)?);
        }
        let mut record = deployment.clone();
        if let Some(status) = script.reported_status {
            record.transition_to(status, &DefaultClock)?;
        }
        Ok(record)
    }

    async fn undeploy(&self, deployment: &Deployment) -> PlatformAdapterResult<()> {
        self.record(format!("undeploy {}", deployment.resource_name()));
        Ok(())
    }

    async fn get_logs(&self, deployment: &Deployment) -> PlatformAdapterResult<Vec<String>> {
        self.record(format!("logs {}", deployment.resource_name()));
        Ok(vec![format!("{} started", deployment.resource_name())])
    }

    async fn cancel(&self, deployment: &Deployment) -> PlatformAdapterResult<()> {
        self.record(format!("cancel {}", deployment.resource_name()));
        Ok(())
    }

    async fn discover(&self, provider_id: &ProviderId) -> PlatformAdapterResult<Vec<Deployment>> {
        let script = self.record(format!("discover {}", provider_id.as_str()));
        if script.fail_discovery {
            return Err(PlatformAdapterError::runtime(std::io::Error::other(
                "acme api unreachable",
            )));
        }
        Ok(script.discovered)
    }
}

pub struct ServiceHarness {
    _runtime_dir: TempDir,
    pub deployments: Arc<InMemoryDeploymentRepository>,
    pub compose: Arc<RecordingComposeRunner>,
    pub cluster: Arc<InMemoryClusterClient>,
    pub acme: Arc<ScriptedAdapter>,
    pub service: TestService,
}

impl ServiceHarness {
    pub async fn new() -> Self {
        let runtime_dir = tempfile::tempdir().expect("temp dir should be created");
        let deployments = Arc::new(InMemoryDeploymentRepository::new());
        let providers = Arc::new(InMemoryProviderRepository::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let compose = Arc::new(RecordingComposeRunner::new());
        let cluster = Arc::new(InMemoryClusterClient::new());
        let clock = Arc::new(DefaultClock);

        register_providers(&providers).await;
        publish_servers(&catalog).await;

        let reconciler = Arc::new(
            Reconciler::new(
                Arc::clone(&deployments),
                Arc::clone(&providers),
                catalog,
                Arc::new(RuntimeConfig::default().with_runtime_dir(runtime_dir.path())),
                compose.clone(),
            )
            .with_cluster_client(cluster.clone()),
        );

        let acme = ScriptedAdapter::new("acme");
        let mut registry = PlatformAdapterRegistry::new();
        for platform in BuiltinPlatform::ALL {
            registry
                .register(
                    platform.as_str(),
                    Arc::new(BuiltinPlatformAdapter::new(
                        platform,
                        Arc::clone(&reconciler),
                        Arc::clone(&clock),
                    )),
                )
                .expect("built-in registration should succeed");
        }
        registry
            .register("acme", acme.clone())
            .expect("extension registration should succeed");

        let service = DeploymentService::new(
            Arc::clone(&deployments),
            providers,
            Arc::new(registry),
            clock,
        );

        Self {
            _runtime_dir: runtime_dir,
            deployments,
            compose,
            cluster,
            acme,
            service,
        }
    }
}

async fn register_providers(providers: &InMemoryProviderRepository) {
    let extra = [
        ("kind-dev", "Kind cluster", PlatformKey::kubernetes()),
        (
            "acme-prod",
            "Acme production",
            PlatformKey::new("acme").expect("valid platform key"),
        ),
        (
            "orphan",
            "Unregistered platform",
            PlatformKey::new("nowhere").expect("valid platform key"),
        ),
    ];
    providers
        .register(&Provider::local().expect("local provider"))
        .await
        .expect("local provider should register");
    for (id, name, platform) in extra {
        let provider = Provider::new(ProviderId::new(id).expect("valid provider id"), name, platform)
            .expect("valid provider");
        providers
            .register(&provider)
            .await
            .expect("provider should register");
    }
}

async fn publish_servers(catalog: &InMemoryCatalog) {
    let echo = CatalogServer::new("io.example/echo", "1.0.0")
        .expect("valid server")
        .with_package(
            Package::new(RegistryType::Npm, "@example/echo", "1.0.0").expect("valid package"),
        );
    let search = CatalogServer::new("io.example/search", "2.0.0")
        .expect("valid server")
        .with_package(
            Package::new(RegistryType::Oci, "ghcr.io/example/search", "2.0.0")
                .expect("valid package")
                .with_transport(PackageTransport::StreamableHttp {
                    port: Some(3000),
                    path: None,
                }),
        );
    for server in [echo, search] {
        catalog
            .publish_server(&server)
            .await
            .expect("publish should succeed");
    }
}

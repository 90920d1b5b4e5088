//! Shared world state for deployment lifecycle BDD scenarios.

use std::sync::{Arc, Mutex};

use agentregistry::catalog::adapters::InMemoryCatalog;
use agentregistry::config::RuntimeConfig;
use agentregistry::deployment::{
    adapters::memory::{InMemoryDeploymentRepository, InMemoryProviderRepository},
    domain::{BuiltinPlatform, Deployment, PlatformKey, ProviderId, ResourceType},
    services::{DeploymentService, DeploymentServiceError},
};
use agentregistry::platform::{
    BuiltinPlatformAdapter, PlatformAdapter, PlatformAdapterError, PlatformAdapterRegistry,
    PlatformAdapterResult,
};
use agentregistry::runtime::adapters::RecordingComposeRunner;
use agentregistry::runtime::services::Reconciler;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::fixture;
use tempfile::TempDir;

/// Service type used by the BDD world.
pub type TestDeploymentService =
    DeploymentService<InMemoryDeploymentRepository, InMemoryProviderRepository, DefaultClock>;

/// Extension adapter that accepts every request and records it.
pub struct RecordingPlatform {
    key: PlatformKey,
    calls: Mutex<Vec<String>>,
}

impl RecordingPlatform {
    fn new(key: &str) -> Result<Self, eyre::Report> {
        Ok(Self {
            key: PlatformKey::new(key)?,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Returns the calls received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, operation: &str, deployment: &Deployment) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{operation} {}", deployment.resource_name()));
        }
    }
}

#[async_trait]
impl PlatformAdapter for RecordingPlatform {
    fn platform(&self) -> &PlatformKey {
        &self.key
    }

    fn supported_resource_types(&self) -> &[ResourceType] {
        &[ResourceType::Mcp, ResourceType::Agent]
    }

    async fn deploy(&self, deployment: &Deployment) -> PlatformAdapterResult<Deployment> {
        self.record("deploy", deployment);
        Ok(deployment.clone())
    }

    async fn undeploy(&self, deployment: &Deployment) -> PlatformAdapterResult<()> {
        self.record("undeploy", deployment);
        Ok(())
    }

    async fn get_logs(&self, _deployment: &Deployment) -> PlatformAdapterResult<Vec<String>> {
        Err(PlatformAdapterError::not_supported(&self.key, "logs"))
    }

    async fn cancel(&self, deployment: &Deployment) -> PlatformAdapterResult<()> {
        self.record("cancel", deployment);
        Ok(())
    }

    async fn discover(&self, _provider_id: &ProviderId) -> PlatformAdapterResult<Vec<Deployment>> {
        Ok(Vec::new())
    }
}

/// Scenario world for deployment lifecycle behaviour tests.
pub struct DeploymentWorld {
    pub runtime_dir: TempDir,
    pub catalog: Arc<InMemoryCatalog>,
    pub providers: Arc<InMemoryProviderRepository>,
    pub deployments: Arc<InMemoryDeploymentRepository>,
    pub compose: Arc<RecordingComposeRunner>,
    pub acme: Arc<RecordingPlatform>,
    pub service: TestDeploymentService,
    pub last_deploy: Option<Result<Deployment, DeploymentServiceError>>,
}

impl DeploymentWorld {
    /// Creates a world with empty stores, both built-in platforms and the
    /// `acme` extension platform.
    pub fn new() -> Result<Self, eyre::Report> {
        let runtime_dir = tempfile::tempdir()?;
        let catalog = Arc::new(InMemoryCatalog::new());
        let providers = Arc::new(InMemoryProviderRepository::new());
        let deployments = Arc::new(InMemoryDeploymentRepository::new());
        let compose = Arc::new(RecordingComposeRunner::new());
        let clock = Arc::new(DefaultClock);

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&deployments),
            Arc::clone(&providers),
            Arc::clone(&catalog),
            Arc::new(RuntimeConfig::default().with_runtime_dir(runtime_dir.path())),
            compose.clone(),
        ));
        let acme = Arc::new(RecordingPlatform::new("acme")?);
        let mut registry = PlatformAdapterRegistry::new();
        for platform in BuiltinPlatform::ALL {
            registry.register(
                platform.as_str(),
                Arc::new(BuiltinPlatformAdapter::new(
                    platform,
                    Arc::clone(&reconciler),
                    Arc::clone(&clock),
                )),
            )?;
        }
        registry.register("acme", acme.clone())?;

        let service = DeploymentService::new(
            Arc::clone(&deployments),
            Arc::clone(&providers),
            Arc::new(registry),
            clock,
        );

        Ok(Self {
            runtime_dir,
            catalog,
            providers,
            deployments,
            compose,
            acme,
            service,
            last_deploy: None,
        })
    }

    /// Returns the path of a file inside the runtime directory.
    pub fn runtime_file(&self, relative: &str) -> Result<Utf8PathBuf, eyre::Report> {
        Utf8PathBuf::from_path_buf(self.runtime_dir.path().join(relative))
            .map_err(|path| eyre::eyre!("non UTF-8 runtime path: {}", path.display()))
    }

    /// Returns the successful deploy result.
    pub fn deployed(&self) -> Result<&Deployment, eyre::Report> {
        match self.last_deploy.as_ref() {
            Some(Ok(deployment)) => Ok(deployment),
            Some(Err(err)) => Err(eyre::eyre!("deploy failed: {err}")),
            None => Err(eyre::eyre!("no deploy attempted in scenario")),
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DeploymentWorld {
    DeploymentWorld::new().unwrap_or_else(|err| panic!("scenario world should build: {err:?}"))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

//! In-memory repositories for deployments and providers.

mod deployment;
mod provider;

pub use deployment::InMemoryDeploymentRepository;
pub use provider::InMemoryProviderRepository;

//! Port contracts for deployment and provider persistence.

mod provider;
mod repository;

pub use provider::{ProviderRegistryError, ProviderRegistryResult, ProviderRepository};
pub use repository::{DeploymentRegistryError, DeploymentRegistryResult, DeploymentRepository};

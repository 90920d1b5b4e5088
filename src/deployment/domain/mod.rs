//! Domain model for deployment and provider records.
//!
//! Deployments carry the resource reference, the target provider, the
//! override map and lifecycle status. Providers bind a platform key to a
//! concrete runtime instance.

mod config;
mod deployment;
mod error;
mod ids;
mod platform;
mod provider;
mod resource;

pub use config::{ARG_PREFIX, DeploymentConfig, HEADER_PREFIX, NAMESPACE_KEY};
pub use deployment::{
    Deployment, DeploymentOrigin, DeploymentStatus, NewDeployment, PersistedDeploymentData,
};
pub use error::{
    DeploymentDomainError, ParseDeploymentOriginError, ParseDeploymentStatusError,
    ParseResourceTypeError,
};
pub use ids::{DeploymentId, ProviderId};
pub use platform::{BuiltinPlatform, PlatformKey};
pub use provider::Provider;
pub use resource::ResourceType;

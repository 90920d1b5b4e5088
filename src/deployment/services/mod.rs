//! Application services for deployment orchestration.

mod deployment;
mod locks;

pub use deployment::{
    DeployRequest, DeploymentService, DeploymentServiceError, DeploymentServiceResult,
};

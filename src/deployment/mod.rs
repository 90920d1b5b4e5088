//! Deployment and provider records, and the deploy API boundary.
//!
//! A deployment asks for one catalog resource to run on one provider. The
//! records here are the desired state the runtime converges towards; the
//! [`services::DeploymentService`] is the entry point that mutates them and
//! triggers platform work. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

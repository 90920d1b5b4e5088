//! `PostgreSQL` adapters for deployment and provider persistence.

mod models;
mod repository;
mod schema;

pub use repository::{DeploymentPgPool, PostgresDeploymentRepository, PostgresProviderRepository};

//! Diesel row models for deployment and provider persistence.

use super::schema::{deployments, providers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for deployment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = deployments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeploymentRow {
    /// Deployment identifier.
    pub id: uuid::Uuid,
    /// Catalog resource name.
    pub resource_name: String,
    /// Catalog resource version.
    pub version: String,
    /// Resource kind.
    pub resource_type: String,
    /// Target provider identifier.
    pub provider_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Origin.
    pub origin: String,
    /// Override map payload.
    pub config: Value,
    /// Platform-reported metadata.
    pub cloud_metadata: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for deployment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deployments)]
pub struct NewDeploymentRow {
    /// Deployment identifier.
    pub id: uuid::Uuid,
    /// Catalog resource name.
    pub resource_name: String,
    /// Catalog resource version.
    pub version: String,
    /// Resource kind.
    pub resource_type: String,
    /// Target provider identifier.
    pub provider_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Origin.
    pub origin: String,
    /// Override map payload.
    pub config: Value,
    /// Platform-reported metadata.
    pub cloud_metadata: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for provider records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = providers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProviderRow {
    /// Provider identifier.
    pub id: String,
    /// Provider name.
    pub name: String,
    /// Platform key.
    pub platform: String,
    /// Opaque provider configuration.
    pub config: Value,
}

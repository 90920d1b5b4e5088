//! `PostgreSQL` repository implementations for deployments and providers.

use super::{
    models::{DeploymentRow, NewDeploymentRow, ProviderRow},
    schema::{deployments, providers},
};
use crate::deployment::{
    domain::{
        Deployment, DeploymentConfig, DeploymentId, DeploymentOrigin, DeploymentStatus,
        PersistedDeploymentData, PlatformKey, Provider, ProviderId, ResourceType,
    },
    ports::{
        DeploymentRegistryError, DeploymentRegistryResult, DeploymentRepository,
        ProviderRegistryError, ProviderRegistryResult, ProviderRepository,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::BTreeMap;

/// `PostgreSQL` connection pool type for deployment adapters.
pub type DeploymentPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed repository for deployment records.
#[derive(Debug, Clone)]
pub struct PostgresDeploymentRepository {
    pool: DeploymentPgPool,
}

impl PostgresDeploymentRepository {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: DeploymentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> DeploymentRegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DeploymentRegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DeploymentRegistryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(DeploymentRegistryError::persistence)?
    }
}

#[async_trait]
impl DeploymentRepository for PostgresDeploymentRepository {
    async fn insert(&self, deployment: &Deployment) -> DeploymentRegistryResult<()> {
        let deployment_id = deployment.id();
        let resource_name = deployment.resource_name().to_owned();
        let version = deployment.version().to_owned();
        let provider_id = deployment.provider_id().clone();
        let new_row = to_new_row(deployment)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(deployments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_resource_unique_violation(info.as_ref()) =>
                    {
                        DeploymentRegistryError::DuplicateResource {
                            resource_name: resource_name.clone(),
                            version: version.clone(),
                            provider_id: provider_id.clone(),
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DeploymentRegistryError::DuplicateDeployment(deployment_id)
                    }
                    _ => DeploymentRegistryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, deployment: &Deployment) -> DeploymentRegistryResult<()> {
        let deployment_id = deployment.id().into_inner();
        let row = to_new_row(deployment)?;

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(deployments::table.filter(deployments::id.eq(deployment_id)))
                    .set((
                        deployments::status.eq(&row.status),
                        deployments::origin.eq(&row.origin),
                        deployments::config.eq(&row.config),
                        deployments::cloud_metadata.eq(&row.cloud_metadata),
                        deployments::updated_at.eq(row.updated_at),
                    ))
                    .execute(connection)
                    .map_err(DeploymentRegistryError::persistence)?;

            if updated_count == 0 {
                return Err(DeploymentRegistryError::NotFound(
                    DeploymentId::from_uuid(deployment_id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, deployment_id: DeploymentId) -> DeploymentRegistryResult<()> {
        self.run_blocking(move |connection| {
            let deleted_count = diesel::delete(
                deployments::table.filter(deployments::id.eq(deployment_id.into_inner())),
            )
            .execute(connection)
            .map_err(DeploymentRegistryError::persistence)?;

            if deleted_count == 0 {
                return Err(DeploymentRegistryError::NotFound(deployment_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        deployment_id: DeploymentId,
    ) -> DeploymentRegistryResult<Option<Deployment>> {
        self.run_blocking(move |connection| {
            let row = deployments::table
                .filter(deployments::id.eq(deployment_id.into_inner()))
                .select(DeploymentRow::as_select())
                .first::<DeploymentRow>(connection)
                .optional()
                .map_err(DeploymentRegistryError::persistence)?;
            row.map(row_to_deployment).transpose()
        })
        .await
    }

    async fn find_by_resource(
        &self,
        resource_name: &str,
        version: &str,
        provider_id: &ProviderId,
    ) -> DeploymentRegistryResult<Option<Deployment>> {
        let name = resource_name.to_owned();
        let resource_version = version.to_owned();
        let provider = provider_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = deployments::table
                .filter(deployments::resource_name.eq(&name))
                .filter(deployments::version.eq(&resource_version))
                .filter(deployments::provider_id.eq(&provider))
                .select(DeploymentRow::as_select())
                .first::<DeploymentRow>(connection)
                .optional()
                .map_err(DeploymentRegistryError::persistence)?;
            row.map(row_to_deployment).transpose()
        })
        .await
    }

    async fn list_all(&self) -> DeploymentRegistryResult<Vec<Deployment>> {
        self.run_blocking(move |connection| {
            let rows = deployments::table
                .order((deployments::created_at.asc(), deployments::id.asc()))
                .select(DeploymentRow::as_select())
                .load::<DeploymentRow>(connection)
                .map_err(DeploymentRegistryError::persistence)?;
            rows.into_iter().map(row_to_deployment).collect()
        })
        .await
    }
}

fn to_new_row(deployment: &Deployment) -> DeploymentRegistryResult<NewDeploymentRow> {
    let config =
        serde_json::to_value(deployment.config()).map_err(DeploymentRegistryError::persistence)?;

    Ok(NewDeploymentRow {
        id: deployment.id().into_inner(),
        resource_name: deployment.resource_name().to_owned(),
        version: deployment.version().to_owned(),
        resource_type: deployment.resource_type().as_str().to_owned(),
        provider_id: deployment.provider_id().as_str().to_owned(),
        status: deployment.status().as_str().to_owned(),
        origin: deployment.origin().as_str().to_owned(),
        config,
        cloud_metadata: deployment.cloud_metadata().cloned(),
        created_at: deployment.created_at(),
        updated_at: deployment.updated_at(),
    })
}

fn row_to_deployment(row: DeploymentRow) -> DeploymentRegistryResult<Deployment> {
    let DeploymentRow {
        id,
        resource_name,
        version,
        resource_type,
        provider_id,
        status,
        origin,
        config,
        cloud_metadata,
        created_at,
        updated_at,
    } = row;

    let data = PersistedDeploymentData {
        id: DeploymentId::from_uuid(id),
        resource_name,
        version,
        resource_type: ResourceType::try_from(resource_type.as_str())
            .map_err(DeploymentRegistryError::invalid_persisted_data)?,
        provider_id: ProviderId::new(provider_id)
            .map_err(DeploymentRegistryError::invalid_persisted_data)?,
        status: DeploymentStatus::try_from(status.as_str())
            .map_err(DeploymentRegistryError::invalid_persisted_data)?,
        origin: DeploymentOrigin::try_from(origin.as_str())
            .map_err(DeploymentRegistryError::invalid_persisted_data)?,
        config: serde_json::from_value::<DeploymentConfig>(config)
            .map_err(DeploymentRegistryError::invalid_persisted_data)?,
        cloud_metadata,
        created_at,
        updated_at,
    };

    Ok(Deployment::from_persisted(data))
}

fn is_resource_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_deployments_resource")
}

/// `PostgreSQL`-backed repository for providers.
#[derive(Debug, Clone)]
pub struct PostgresProviderRepository {
    pool: DeploymentPgPool,
}

impl PostgresProviderRepository {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: DeploymentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ProviderRegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProviderRegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProviderRegistryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(ProviderRegistryError::persistence)?
    }
}

#[async_trait]
impl ProviderRepository for PostgresProviderRepository {
    async fn register(&self, provider: &Provider) -> ProviderRegistryResult<()> {
        let provider_id = provider.id().clone();
        let row = to_provider_row(provider)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(providers::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProviderRegistryError::DuplicateProvider(provider_id.clone())
                    }
                    _ => ProviderRegistryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        provider_id: &ProviderId,
    ) -> ProviderRegistryResult<Option<Provider>> {
        let id = provider_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = providers::table
                .filter(providers::id.eq(&id))
                .select(ProviderRow::as_select())
                .first::<ProviderRow>(connection)
                .optional()
                .map_err(ProviderRegistryError::persistence)?;
            row.map(row_to_provider).transpose()
        })
        .await
    }

    async fn list_all(&self) -> ProviderRegistryResult<Vec<Provider>> {
        self.run_blocking(move |connection| {
            let rows = providers::table
                .order(providers::id.asc())
                .select(ProviderRow::as_select())
                .load::<ProviderRow>(connection)
                .map_err(ProviderRegistryError::persistence)?;
            rows.into_iter().map(row_to_provider).collect()
        })
        .await
    }
}

fn to_provider_row(provider: &Provider) -> ProviderRegistryResult<ProviderRow> {
    Ok(ProviderRow {
        id: provider.id().as_str().to_owned(),
        name: provider.name().to_owned(),
        platform: provider.platform().as_str().to_owned(),
        config: serde_json::to_value(provider.config())
            .map_err(ProviderRegistryError::persistence)?,
    })
}

fn row_to_provider(row: ProviderRow) -> ProviderRegistryResult<Provider> {
    let ProviderRow {
        id,
        name,
        platform,
        config,
    } = row;

    let parsed_id = ProviderId::new(id).map_err(ProviderRegistryError::invalid_persisted_data)?;
    let parsed_platform =
        PlatformKey::new(platform).map_err(ProviderRegistryError::invalid_persisted_data)?;
    let parsed_config: BTreeMap<String, String> =
        serde_json::from_value(config).map_err(ProviderRegistryError::invalid_persisted_data)?;

    Ok(Provider::new(parsed_id, name, parsed_platform)
        .map_err(ProviderRegistryError::invalid_persisted_data)?
        .with_config(parsed_config))
}

//! Deployment aggregate root.

use super::{
    DeploymentConfig, DeploymentDomainError, DeploymentId, ParseDeploymentOriginError,
    ParseDeploymentStatusError, ProviderId, ResourceType,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle status of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Platform work is in progress.
    Deploying,
    /// The platform reports the resource as running.
    Deployed,
    /// The deployment was cancelled on the platform.
    Cancelled,
    /// Platform work failed.
    Failed,
}

impl DeploymentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deploying => "deploying",
            Self::Deployed => "deployed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Returns whether records in this status belong in desired state.
    #[must_use]
    pub const fn is_desired(self) -> bool {
        matches!(self, Self::Deploying | Self::Deployed)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (_, Self::Deploying)
                | (
                    Self::Deploying | Self::Deployed,
                    Self::Deployed | Self::Failed | Self::Cancelled
                )
                | (Self::Failed, Self::Failed)
                | (Self::Cancelled, Self::Cancelled)
        )
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeploymentStatus {
    type Error = ParseDeploymentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deploying" => Ok(Self::Deploying),
            "deployed" => Ok(Self::Deployed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseDeploymentStatusError(value.to_owned())),
        }
    }
}

/// How a deployment came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentOrigin {
    /// Created through the deploy API.
    Managed,
    /// Found running on a platform without having been created here.
    Discovered,
}

impl DeploymentOrigin {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Discovered => "discovered",
        }
    }
}

impl fmt::Display for DeploymentOrigin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeploymentOrigin {
    type Error = ParseDeploymentOriginError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "managed" => Ok(Self::Managed),
            "discovered" => Ok(Self::Discovered),
            _ => Err(ParseDeploymentOriginError(value.to_owned())),
        }
    }
}

/// Parameter object for creating a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeployment {
    /// Explicit identifier; a random one is generated when absent.
    pub id: Option<DeploymentId>,
    /// Catalog resource name.
    pub resource_name: String,
    /// Catalog resource version.
    pub version: String,
    /// Catalog resource kind.
    pub resource_type: ResourceType,
    /// Target provider.
    pub provider_id: ProviderId,
    /// Override map.
    pub config: DeploymentConfig,
}

impl NewDeployment {
    /// Creates deployment parameters with an empty override map.
    #[must_use]
    pub fn new(
        resource_name: impl Into<String>,
        version: impl Into<String>,
        resource_type: ResourceType,
        provider_id: ProviderId,
    ) -> Self {
        Self {
            id: None,
            resource_name: resource_name.into(),
            version: version.into(),
            resource_type,
            provider_id,
            config: DeploymentConfig::new(),
        }
    }

    /// Sets the override map.
    #[must_use]
    pub fn with_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }
}

/// Deployment aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    id: DeploymentId,
    resource_name: String,
    version: String,
    resource_type: ResourceType,
    provider_id: ProviderId,
    status: DeploymentStatus,
    origin: DeploymentOrigin,
    config: DeploymentConfig,
    cloud_metadata: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted deployment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDeploymentData {
    /// Persisted identifier.
    pub id: DeploymentId,
    /// Persisted resource name.
    pub resource_name: String,
    /// Persisted resource version.
    pub version: String,
    /// Persisted resource kind.
    pub resource_type: ResourceType,
    /// Persisted provider identifier.
    pub provider_id: ProviderId,
    /// Persisted status.
    pub status: DeploymentStatus,
    /// Persisted origin.
    pub origin: DeploymentOrigin,
    /// Persisted override map.
    pub config: DeploymentConfig,
    /// Persisted cloud metadata.
    pub cloud_metadata: Option<Value>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Deployment {
    /// Creates a managed deployment in `deploying` status.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError`] when the resource name or version is
    /// empty.
    pub fn new(params: NewDeployment, clock: &impl Clock) -> Result<Self, DeploymentDomainError> {
        Self::build(
            params,
            DeploymentStatus::Deploying,
            DeploymentOrigin::Managed,
            clock,
        )
    }

    /// Creates a discovered deployment in `deployed` status.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError`] when the resource name or version is
    /// empty.
    pub fn discovered(
        params: NewDeployment,
        clock: &impl Clock,
    ) -> Result<Self, DeploymentDomainError> {
        Self::build(
            params,
            DeploymentStatus::Deployed,
            DeploymentOrigin::Discovered,
            clock,
        )
    }

    fn build(
        params: NewDeployment,
        status: DeploymentStatus,
        origin: DeploymentOrigin,
        clock: &impl Clock,
    ) -> Result<Self, DeploymentDomainError> {
        let resource_name = params.resource_name.trim().to_owned();
        if resource_name.is_empty() {
            return Err(DeploymentDomainError::EmptyResourceName);
        }
        let version = params.version.trim().to_owned();
        if version.is_empty() {
            return Err(DeploymentDomainError::EmptyVersion);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: params.id.unwrap_or_default(),
            resource_name,
            version,
            resource_type: params.resource_type,
            provider_id: params.provider_id,
            status,
            origin,
            config: params.config,
            cloud_metadata: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a deployment from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedDeploymentData) -> Self {
        Self {
            id: data.id,
            resource_name: data.resource_name,
            version: data.version,
            resource_type: data.resource_type,
            provider_id: data.provider_id,
            status: data.status,
            origin: data.origin,
            config: data.config,
            cloud_metadata: data.cloud_metadata,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the deployment identifier.
    #[must_use]
    pub const fn id(&self) -> DeploymentId {
        self.id
    }

    /// Returns the catalog resource name.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Returns the catalog resource version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the catalog resource kind.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the target provider.
    #[must_use]
    pub const fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> DeploymentStatus {
        self.status
    }

    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> DeploymentOrigin {
        self.origin
    }

    /// Returns the override map.
    #[must_use]
    pub const fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Returns platform-reported metadata.
    #[must_use]
    pub const fn cloud_metadata(&self) -> Option<&Value> {
        self.cloud_metadata.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this record was created through the deploy API.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        matches!(self.origin, DeploymentOrigin::Managed)
    }

    /// Returns whether this record names the given resource on the given
    /// provider.
    #[must_use]
    pub fn matches_resource(&self, name: &str, version: &str, provider_id: &ProviderId) -> bool {
        self.resource_name == name && self.version == version && &self.provider_id == provider_id
    }

    /// Moves the deployment to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::InvalidStatusTransition`] when the
    /// transition is not allowed.
    pub fn transition_to(
        &mut self,
        target: DeploymentStatus,
        clock: &impl Clock,
    ) -> Result<(), DeploymentDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DeploymentDomainError::InvalidStatusTransition {
                from: self.status.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the override map and returns the previous one.
    pub fn replace_config(
        &mut self,
        config: DeploymentConfig,
        clock: &impl Clock,
    ) -> DeploymentConfig {
        let previous = std::mem::replace(&mut self.config, config);
        self.touch(clock);
        previous
    }

    /// Stores platform-reported metadata.
    pub fn set_cloud_metadata(&mut self, metadata: Option<Value>, clock: &impl Clock) {
        self.cloud_metadata = metadata;
        self.touch(clock);
    }

    /// Takes ownership of a discovered deployment.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::AlreadyManaged`] when the deployment
    /// is already managed.
    pub fn adopt(&mut self, clock: &impl Clock) -> Result<(), DeploymentDomainError> {
        if self.is_managed() {
            return Err(DeploymentDomainError::AlreadyManaged(self.id));
        }
        self.origin = DeploymentOrigin::Managed;
        self.touch(clock);
        Ok(())
    }

    /// Validates that the deployment can be torn down through this system.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::DiscoveredDeployment`] for discovered
    /// deployments.
    pub const fn ensure_can_undeploy(&self) -> Result<(), DeploymentDomainError> {
        if self.is_managed() {
            return Ok(());
        }
        Err(DeploymentDomainError::DiscoveredDeployment(self.id))
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn params() -> NewDeployment {
        NewDeployment::new(
            "io.example/echo",
            "1.0.0",
            ResourceType::Mcp,
            ProviderId::new("local").expect("valid provider id"),
        )
    }

    #[test]
    fn new_deployment_is_managed_and_deploying() {
        let deployment = Deployment::new(params(), &DefaultClock).expect("valid deployment");

        assert_eq!(deployment.status(), DeploymentStatus::Deploying);
        assert_eq!(deployment.origin(), DeploymentOrigin::Managed);
        assert!(deployment.ensure_can_undeploy().is_ok());
    }

    #[test]
    fn discovered_deployment_cannot_be_undeployed_until_adopted() {
        let clock = DefaultClock;
        let mut deployment = Deployment::discovered(params(), &clock).expect("valid deployment");

        assert!(matches!(
            deployment.ensure_can_undeploy(),
            Err(DeploymentDomainError::DiscoveredDeployment(_))
        ));

        deployment.adopt(&clock).expect("adoption should succeed");
        assert!(deployment.ensure_can_undeploy().is_ok());
        assert!(matches!(
            deployment.adopt(&clock),
            Err(DeploymentDomainError::AlreadyManaged(_))
        ));
    }

    #[test]
    fn blank_version_is_rejected() {
        let mut new_deployment = params();
        new_deployment.version = "  ".to_owned();

        assert_eq!(
            Deployment::new(new_deployment, &DefaultClock),
            Err(DeploymentDomainError::EmptyVersion)
        );
    }

    #[rstest]
    #[case(DeploymentStatus::Deploying, DeploymentStatus::Deployed, true)]
    #[case(DeploymentStatus::Deployed, DeploymentStatus::Cancelled, true)]
    #[case(DeploymentStatus::Failed, DeploymentStatus::Deploying, true)]
    #[case(DeploymentStatus::Failed, DeploymentStatus::Deployed, false)]
    #[case(DeploymentStatus::Cancelled, DeploymentStatus::Deployed, false)]
    fn status_transition_matrix(
        #[case] current: DeploymentStatus,
        #[case] target: DeploymentStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(current.can_transition_to(target), expected);
    }

    #[test]
    fn replace_config_returns_previous_map() {
        let clock = DefaultClock;
        let mut deployment = Deployment::new(
            params().with_config(DeploymentConfig::new().with("LOG_LEVEL", "info")),
            &clock,
        )
        .expect("valid deployment");

        let previous =
            deployment.replace_config(DeploymentConfig::new().with("LOG_LEVEL", "debug"), &clock);

        assert_eq!(previous.env().get("LOG_LEVEL").map(String::as_str), Some("info"));
        assert_eq!(
            deployment.config().env().get("LOG_LEVEL").map(String::as_str),
            Some("debug")
        );
    }
}

//! Provider records binding a platform key to a runtime instance.

use super::{DeploymentDomainError, PlatformKey, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A configured instance of a target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    id: ProviderId,
    name: String,
    platform: PlatformKey,
    config: BTreeMap<String, String>,
}

impl Provider {
    /// Creates a provider.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::EmptyProviderName`] when the name is
    /// empty after trimming.
    pub fn new(
        id: ProviderId,
        name: impl Into<String>,
        platform: PlatformKey,
    ) -> Result<Self, DeploymentDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(DeploymentDomainError::EmptyProviderName);
        }
        Ok(Self {
            id,
            name: normalized_name,
            platform,
            config: BTreeMap::new(),
        })
    }

    /// Returns the singleton local provider.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature mirrors [`Provider::new`].
    pub fn local() -> Result<Self, DeploymentDomainError> {
        Self::new(ProviderId::new("local")?, "Local", PlatformKey::local())
    }

    /// Replaces the opaque configuration map.
    #[must_use]
    pub fn with_config(mut self, config: impl IntoIterator<Item = (String, String)>) -> Self {
        self.config = config.into_iter().collect();
        self
    }

    /// Returns the provider identifier.
    #[must_use]
    pub const fn id(&self) -> &ProviderId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the platform key.
    #[must_use]
    pub const fn platform(&self) -> &PlatformKey {
        &self.platform
    }

    /// Returns the opaque configuration map.
    #[must_use]
    pub const fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }
}

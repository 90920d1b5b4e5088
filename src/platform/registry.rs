//! Lookup of platform adapters by key.

use super::PlatformAdapter;
use crate::deployment::domain::{DeploymentDomainError, PlatformKey};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`PlatformAdapterRegistry`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformRegistryError {
    /// The key is empty or malformed.
    #[error(transparent)]
    InvalidKey(#[from] DeploymentDomainError),

    /// An adapter is already registered under the key.
    #[error("platform '{0}' already has a registered adapter")]
    AlreadyRegistered(PlatformKey),

    /// The adapter reports a different platform than the key it is
    /// registered under.
    #[error("adapter for platform '{adapter}' cannot be registered as '{key}'")]
    KeyMismatch {
        /// Registration key.
        key: PlatformKey,
        /// Key reported by the adapter.
        adapter: PlatformKey,
    },

    /// No adapter is registered for the key.
    #[error("unsupported platform '{0}'")]
    UnsupportedPlatform(String),
}

/// Adapters keyed by platform.
#[derive(Clone, Default)]
pub struct PlatformAdapterRegistry {
    adapters: HashMap<PlatformKey, Arc<dyn PlatformAdapter>>,
}

impl PlatformAdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformRegistryError`] when the key is invalid, already
    /// taken, or differs from the adapter's own platform.
    pub fn register(
        &mut self,
        key: &str,
        adapter: Arc<dyn PlatformAdapter>,
    ) -> Result<(), PlatformRegistryError> {
        let platform = PlatformKey::new(key)?;
        if adapter.platform() != &platform {
            return Err(PlatformRegistryError::KeyMismatch {
                key: platform,
                adapter: adapter.platform().clone(),
            });
        }
        if self.adapters.contains_key(&platform) {
            return Err(PlatformRegistryError::AlreadyRegistered(platform));
        }
        self.adapters.insert(platform, adapter);
        Ok(())
    }

    /// Returns the adapter registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformRegistryError::UnsupportedPlatform`] when nothing is
    /// registered under the key.
    pub fn resolve(
        &self,
        key: &PlatformKey,
    ) -> Result<Arc<dyn PlatformAdapter>, PlatformRegistryError> {
        self.adapters
            .get(key)
            .cloned()
            .ok_or_else(|| PlatformRegistryError::UnsupportedPlatform(key.to_string()))
    }

    /// Returns the registered keys in sorted order.
    #[must_use]
    pub fn platforms(&self) -> Vec<PlatformKey> {
        let mut keys: Vec<PlatformKey> = self.adapters.keys().cloned().collect();
        keys.sort();
        keys
    }
}

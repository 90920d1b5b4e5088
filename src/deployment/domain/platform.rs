//! Platform keys naming the runtime a provider targets.

use super::DeploymentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated platform key such as `local`, `kubernetes` or an
/// extension-defined name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformKey(String);

impl PlatformKey {
    /// Creates a validated platform key.
    ///
    /// The input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentDomainError::InvalidPlatformKey`] when the key is
    /// empty or contains characters outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, DeploymentDomainError> {
        let normalized = value.into().trim().to_ascii_lowercase();
        let is_valid = !normalized.is_empty()
            && normalized.chars().all(|character| {
                character.is_ascii_lowercase()
                    || character.is_ascii_digit()
                    || character == '-'
                    || character == '_'
            });
        if !is_valid {
            return Err(DeploymentDomainError::InvalidPlatformKey(normalized));
        }
        Ok(Self(normalized))
    }

    /// Returns the key of the built-in local platform.
    #[must_use]
    pub fn local() -> Self {
        Self(BuiltinPlatform::Local.as_str().to_owned())
    }

    /// Returns the key of the built-in cluster platform.
    #[must_use]
    pub fn kubernetes() -> Self {
        Self(BuiltinPlatform::Kubernetes.as_str().to_owned())
    }

    /// Returns the built-in platform this key names, if any.
    #[must_use]
    pub fn builtin(&self) -> Option<BuiltinPlatform> {
        BuiltinPlatform::from_key(self.as_str())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlatformKey {
    type Error = DeploymentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlatformKey> for String {
    fn from(key: PlatformKey) -> Self {
        key.0
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Platforms reconciled in-process rather than delegated to an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPlatform {
    /// Compose project fronted by a gateway on the local host.
    Local,
    /// Custom resources in a cluster.
    Kubernetes,
}

impl BuiltinPlatform {
    /// All built-in platforms in reconciliation order.
    pub const ALL: [Self; 2] = [Self::Local, Self::Kubernetes];

    /// Returns the platform key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Kubernetes => "kubernetes",
        }
    }

    /// Returns the platform key.
    #[must_use]
    pub fn key(self) -> PlatformKey {
        PlatformKey(self.as_str().to_owned())
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "local" => Some(Self::Local),
            "kubernetes" => Some(Self::Kubernetes),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinPlatform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

//! Override map attached to a deployment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix marking an argument override.
pub const ARG_PREFIX: &str = "ARG_";

/// Prefix marking a header override.
pub const HEADER_PREFIX: &str = "HEADER_";

/// Key selecting the cluster namespace for a deployment and everything it
/// pulls in.
pub const NAMESPACE_KEY: &str = "KUBERNETES_NAMESPACE";

/// Flat override map: plain keys are environment variables, `ARG_` keys are
/// argument overrides and `HEADER_` keys are header overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentConfig(BTreeMap<String, String>);

impl DeploymentConfig {
    /// Creates an empty override map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns environment overrides.
    #[must_use]
    pub fn env(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter(|(key, _)| {
                !key.starts_with(ARG_PREFIX)
                    && !key.starts_with(HEADER_PREFIX)
                    && key.as_str() != NAMESPACE_KEY
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns argument overrides keyed by argument name.
    #[must_use]
    pub fn args(&self) -> BTreeMap<String, String> {
        self.stripped(ARG_PREFIX)
    }

    /// Returns header overrides keyed by header name.
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        self.stripped(HEADER_PREFIX)
    }

    /// Returns the namespace override, if set and non-blank.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0
            .get(NAMESPACE_KEY)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Returns the raw entries.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    fn stripped(&self, prefix: &str) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_owned(), value.clone()))
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for DeploymentConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

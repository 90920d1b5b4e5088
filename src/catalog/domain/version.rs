//! Version selection for catalog lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version requested from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSelector {
    /// The newest published version.
    Latest,
    /// One exact published version.
    Exact(String),
}

impl VersionSelector {
    /// Parses a user-supplied version; empty or `latest` selects the newest.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("" | "latest") => Self::Latest,
            Some(exact) => Self::Exact(exact.to_owned()),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => formatter.write_str("latest"),
            Self::Exact(version) => formatter.write_str(version),
        }
    }
}

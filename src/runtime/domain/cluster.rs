//! Cluster custom resource objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Label marking objects owned by this registry.
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`] on owned objects.
pub const MANAGED_BY_VALUE: &str = "agentregistry";

/// Object metadata subset used by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name.
    pub name: String,
    /// Namespace.
    pub namespace: String,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A custom resource object as sent to the cluster API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResource {
    /// API group and version.
    pub api_version: String,
    /// Resource kind.
    pub kind: String,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Kind-specific spec.
    pub spec: Value,
}

impl ClusterResource {
    /// Returns the address of this object.
    #[must_use]
    pub fn resource_ref(&self) -> ResourceRef {
        ResourceRef {
            kind: self.kind.clone(),
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
        }
    }

    /// Returns whether the object carries the registry ownership label.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.metadata
            .labels
            .get(MANAGED_BY_LABEL)
            .is_some_and(|value| value == MANAGED_BY_VALUE)
    }

    /// Returns a label value.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }
}

/// Address of one cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    /// Resource kind.
    pub kind: String,
    /// Namespace.
    pub namespace: String,
    /// Object name.
    pub name: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

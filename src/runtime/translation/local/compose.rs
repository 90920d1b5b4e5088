//! Compose project model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A compose project: one named service per local resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeProject {
    /// Project name.
    pub name: String,
    /// Services keyed by name.
    pub services: BTreeMap<String, ComposeService>,
}

/// One compose service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeService {
    /// Container image.
    pub image: String,
    /// Command line replacing the image default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Published ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Bind mounts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Restart policy.
    pub restart: String,
}

impl ComposeService {
    /// Creates a service restarted unless explicitly stopped.
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            command: Vec::new(),
            environment: BTreeMap::new(),
            ports: Vec::new(),
            volumes: Vec::new(),
            restart: "unless-stopped".to_owned(),
        }
    }
}

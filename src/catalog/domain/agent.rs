//! Published agent definitions and their MCP server manifests.

use super::{CatalogDomainError, RemoteEndpoint, error::normalize_required};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One MCP server entry in an agent manifest.
///
/// Only [`AgentMcpServerEntry::Registry`] entries are resolved against the
/// catalog and deployed alongside the agent. The other kinds are baked into
/// the agent image or reached directly by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum AgentMcpServerEntry {
    /// A catalog server deployed next to the agent.
    #[serde(rename_all = "camelCase")]
    Registry {
        /// Name the agent uses for the server.
        name: String,
        /// Catalog server name.
        registry_server_name: String,
        /// Catalog server version, `latest` when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        registry_server_version: Option<String>,
        /// Whether a hosted endpoint is preferred over a local package.
        #[serde(default)]
        registry_server_prefer_remote: bool,
    },
    /// A command the agent spawns itself.
    Command {
        /// Name the agent uses for the server.
        name: String,
        /// Executable.
        command: String,
        /// Arguments.
        #[serde(default)]
        args: Vec<String>,
    },
    /// A hosted server the agent calls directly.
    Remote {
        /// Name the agent uses for the server.
        name: String,
        /// Endpoint URL.
        url: String,
        /// Headers to send.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

impl AgentMcpServerEntry {
    /// Creates a catalog-resolved entry at the given version.
    #[must_use]
    pub fn registry(
        name: impl Into<String>,
        server_name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self::Registry {
            name: name.into(),
            registry_server_name: server_name.into(),
            registry_server_version: version,
            registry_server_prefer_remote: false,
        }
    }

    /// Returns the name the agent uses for the server.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Registry { name, .. } | Self::Command { name, .. } | Self::Remote { name, .. } => {
                name
            }
        }
    }
}

/// A published agent version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAgent {
    /// Agent name.
    pub name: String,
    /// Published version.
    pub version: String,
    /// Container image running the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Entrypoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Default environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Port the agent serves its protocol on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Model provider the agent is configured for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    /// Model name the agent is configured for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Hosted endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<RemoteEndpoint>,
    /// MCP servers the agent expects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<AgentMcpServerEntry>,
}

impl CatalogAgent {
    /// Creates an agent entry with no image and an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when the name or version is empty.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        Ok(Self {
            name: normalize_required(name, CatalogDomainError::EmptyName)?,
            version: normalize_required(version, CatalogDomainError::EmptyVersion)?,
            image: None,
            command: None,
            args: Vec::new(),
            env: BTreeMap::new(),
            port: None,
            model_provider: None,
            model_name: None,
            remotes: Vec::new(),
            mcp_servers: Vec::new(),
        })
    }

    /// Sets the container image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Adds a manifest entry.
    #[must_use]
    pub fn with_mcp_server(mut self, entry: AgentMcpServerEntry) -> Self {
        self.mcp_servers.push(entry);
        self
    }

    /// Returns manifest entries that must be resolved against the catalog.
    pub fn registry_servers(&self) -> impl Iterator<Item = &AgentMcpServerEntry> {
        self.mcp_servers
            .iter()
            .filter(|entry| matches!(entry, AgentMcpServerEntry::Registry { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_entries_deserialize_by_type() {
        let agent: CatalogAgent = serde_json::from_value(json!({
            "name": "planner",
            "version": "0.2.0",
            "image": "ghcr.io/example/planner:0.2.0",
            "mcpServers": [
                {"type": "registry", "name": "fs", "registryServerName": "io.example/fs"},
                {"type": "command", "name": "git", "command": "git-mcp"},
                {"type": "remote", "name": "search", "url": "https://search.example/mcp"}
            ]
        }))
        .expect("agent should deserialize");

        assert_eq!(agent.mcp_servers.len(), 3);
        assert_eq!(agent.registry_servers().count(), 1);
    }

    #[test]
    fn empty_agent_name_is_rejected() {
        assert_eq!(
            CatalogAgent::new("  ", "1.0.0"),
            Err(CatalogDomainError::EmptyName)
        );
    }
}

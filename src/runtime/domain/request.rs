//! Run requests: resolved, override-carrying inputs to translation.

use crate::catalog::domain::{CatalogAgent, CatalogServer};
use std::collections::BTreeMap;

/// One resolved unit of work for a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    /// Run an MCP server.
    McpServer(McpServerRunRequest),
    /// Run an agent together with the servers its manifest references.
    Agent(AgentRunRequest),
}

impl RunRequest {
    /// Returns the runtime name of the requested resource.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::McpServer(request) => &request.name,
            Self::Agent(request) => &request.name,
        }
    }
}

/// Request to run one catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerRunRequest {
    /// Runtime resource name.
    pub name: String,
    /// Catalog entry being run.
    pub server: CatalogServer,
    /// Prefer a remote endpoint over a local package when both exist.
    pub prefer_remote: bool,
    /// Environment overrides.
    pub env: BTreeMap<String, String>,
    /// Argument overrides keyed by argument name.
    pub args: BTreeMap<String, String>,
    /// Header overrides keyed by header name.
    pub headers: BTreeMap<String, String>,
    /// Execution scope override.
    pub namespace: Option<String>,
    /// Runtime name of the agent this server was resolved for.
    pub owner_agent: Option<String>,
}

impl McpServerRunRequest {
    /// Creates a request with no overrides.
    #[must_use]
    pub fn new(name: impl Into<String>, server: CatalogServer) -> Self {
        Self {
            name: name.into(),
            server,
            prefer_remote: false,
            env: BTreeMap::new(),
            args: BTreeMap::new(),
            headers: BTreeMap::new(),
            namespace: None,
            owner_agent: None,
        }
    }
}

/// Request to run one catalog agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunRequest {
    /// Runtime resource name.
    pub name: String,
    /// Catalog entry being run.
    pub agent: CatalogAgent,
    /// Environment overrides.
    pub env: BTreeMap<String, String>,
    /// Execution scope override, shared with every resolved server.
    pub namespace: Option<String>,
    /// Servers resolved from the agent manifest.
    pub resolved_servers: Vec<McpServerRunRequest>,
}

impl AgentRunRequest {
    /// Creates a request with no overrides and no resolved servers.
    #[must_use]
    pub fn new(name: impl Into<String>, agent: CatalogAgent) -> Self {
        Self {
            name: name.into(),
            agent,
            env: BTreeMap::new(),
            namespace: None,
            resolved_servers: Vec::new(),
        }
    }
}

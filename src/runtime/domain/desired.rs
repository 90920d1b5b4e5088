//! Platform-neutral description of what should be running.

use crate::catalog::domain::RemoteTransport;
use std::collections::BTreeMap;

/// Container parameters for a locally run resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDeployment {
    /// Container image.
    pub image: String,
    /// Program to run; the image default when absent.
    pub command: Option<String>,
    /// Program arguments.
    pub args: Vec<String>,
    /// Environment variables.
    pub env: BTreeMap<String, String>,
}

impl ContainerDeployment {
    /// Returns the command line: the program followed by its arguments.
    #[must_use]
    pub fn command_line(&self) -> Vec<String> {
        self.command
            .iter()
            .cloned()
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// HTTP flavour spoken by a local MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpProtocol {
    /// Streamable HTTP.
    StreamableHttp,
    /// Server-sent events.
    Sse,
}

/// How the gateway talks to a local MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTransport {
    /// The gateway spawns the server and speaks over its standard streams.
    Stdio,
    /// The server listens on a port inside the runtime network.
    Http {
        /// Listening port; translation fails when it is missing.
        port: Option<u16>,
        /// Request path.
        path: String,
        /// HTTP flavour.
        protocol: HttpProtocol,
    },
}

/// A locally run MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMcpServer {
    /// Container parameters.
    pub deployment: ContainerDeployment,
    /// Transport.
    pub transport: LocalTransport,
}

/// A remotely hosted MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMcpServer {
    /// Endpoint URL.
    pub url: String,
    /// Transport spoken at the endpoint.
    pub transport: RemoteTransport,
    /// Headers to send, after overrides.
    pub headers: BTreeMap<String, String>,
}

/// Where an MCP server runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpServerSpec {
    /// Run as a local container or gateway child process.
    Local(LocalMcpServer),
    /// Reached over the network.
    Remote(RemoteMcpServer),
}

/// One MCP server in the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServer {
    /// Runtime name, unique among servers.
    pub name: String,
    /// Catalog version.
    pub version: String,
    /// Execution scope override.
    pub namespace: Option<String>,
    /// Runtime name of the agent this server was resolved for.
    pub owner_agent: Option<String>,
    /// Placement.
    pub spec: McpServerSpec,
}

/// A remotely hosted agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAgent {
    /// Endpoint URL.
    pub url: String,
    /// Headers to send.
    pub headers: BTreeMap<String, String>,
}

/// Where an agent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSpec {
    /// Run as a local container.
    Local {
        /// Container parameters.
        deployment: ContainerDeployment,
        /// Port the agent serves on.
        port: u16,
    },
    /// Reached over the network.
    Remote(RemoteAgent),
}

/// One agent in the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Runtime name, unique among agents.
    pub name: String,
    /// Catalog version, used for side-file placement.
    pub version: String,
    /// Execution scope override.
    pub namespace: Option<String>,
    /// Placement.
    pub spec: AgentSpec,
    /// Runtime names of the servers resolved from the agent manifest.
    pub mcp_servers: Vec<String>,
}

/// Ordered servers and agents a platform should be running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    /// MCP servers, including servers resolved for agents.
    pub mcp_servers: Vec<McpServer>,
    /// Agents.
    pub agents: Vec<Agent>,
}

impl DesiredState {
    /// Returns `true` when nothing should be running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty() && self.agents.is_empty()
    }

    /// Finds a server by runtime name.
    #[must_use]
    pub fn server(&self, name: &str) -> Option<&McpServer> {
        self.mcp_servers.iter().find(|server| server.name == name)
    }

    /// Finds an agent by runtime name.
    #[must_use]
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.name == name)
    }
}

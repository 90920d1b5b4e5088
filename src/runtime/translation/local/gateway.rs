//! Gateway routing config model.
//!
//! The gateway listens on one port. Its first route aggregates every MCP
//! target behind `/mcp`; every agent then gets its own `/agent/{name}`
//! route that rewrites the prefix away and applies the agent-to-agent
//! protocol policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level gateway config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listening ports.
    pub binds: Vec<Bind>,
}

impl GatewayConfig {
    /// Returns every route across binds and listeners, in order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.binds
            .iter()
            .flat_map(|bind| bind.listeners.iter())
            .flat_map(|listener| listener.routes.iter())
    }

    /// Returns the targets of the aggregated MCP route.
    #[must_use]
    pub fn mcp_targets(&self) -> Vec<&McpTarget> {
        self.routes()
            .flat_map(|route| route.backends.iter())
            .filter_map(|backend| match backend {
                RouteBackend::Mcp(mcp) => Some(mcp.targets.iter()),
                RouteBackend::Host(_) => None,
            })
            .flatten()
            .collect()
    }
}

/// One listening port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bind {
    /// Port number.
    pub port: u16,
    /// Listeners on the port.
    pub listeners: Vec<Listener>,
}

/// Route table of a bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    /// Routes in match order.
    pub routes: Vec<Route>,
}

/// One route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route name.
    pub name: String,
    /// Request matchers.
    pub matches: Vec<RouteMatch>,
    /// Policies applied to matched requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<RoutePolicies>,
    /// Backends receiving matched requests.
    pub backends: Vec<RouteBackend>,
}

/// Request matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    /// Path condition.
    pub path: PathMatch,
}

impl RouteMatch {
    /// Matches requests whose path starts with `prefix`.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            path: PathMatch {
                path_prefix: prefix.into(),
            },
        }
    }
}

/// Path condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMatch {
    /// Required path prefix.
    pub path_prefix: String,
}

/// Policies attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicies {
    /// Path rewrite applied before forwarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_rewrite: Option<UrlRewrite>,
    /// Agent-to-agent protocol handling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2a: Option<A2aPolicy>,
}

/// Path rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewrite {
    /// Replacement for the matched prefix.
    pub path: PathRewrite,
}

/// Prefix replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewrite {
    /// New prefix.
    pub prefix: String,
}

/// Marker enabling agent-to-agent protocol handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct A2aPolicy {}

/// Where a route forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteBackend {
    /// MCP multiplexer over several targets.
    Mcp(McpBackend),
    /// Plain HTTP backend at `host:port` or URL.
    Host(String),
}

/// MCP multiplexer backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpBackend {
    /// Targets sorted by name.
    pub targets: Vec<McpTarget>,
}

/// One MCP server behind the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpTarget {
    /// Target name, unique within the backend.
    pub name: String,
    /// Connection details.
    #[serde(flatten)]
    pub spec: McpTargetSpec,
}

/// Connection details for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTargetSpec {
    /// Child process spawned by the gateway.
    Stdio(StdioTarget),
    /// Streamable HTTP server.
    Mcp(HttpTarget),
    /// Server-sent events server.
    Sse(HttpTarget),
}

/// Child process target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTarget {
    /// Program.
    pub cmd: String,
    /// Arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Network target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTarget {
    /// Service host inside the runtime network, or a full URL for remotes.
    pub host: String,
    /// Port, absent for URL hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Request path, absent for URL hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Headers to send.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

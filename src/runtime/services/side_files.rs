//! Per-agent lists of resolved MCP servers for the local platform.

use crate::runtime::domain::{
    Agent, AgentSpec, DesiredState, LocalTransport, McpServerSpec, TranslationError,
    sanitize_version,
};
use crate::runtime::translation::MCP_SERVERS_FILE;
use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::BTreeMap;

/// One entry in an agent's side file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideFileEntry {
    /// Name the agent manifest uses for the server.
    pub name: String,
    /// `remote` for servers reached over HTTP, `command` for stdio servers.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Endpoint for `remote` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Headers for `remote` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Program for `command` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Program arguments for `command` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

/// Returns the side-file path of `agent`, relative to the runtime directory.
#[must_use]
pub fn side_file_path(agent: &Agent) -> Utf8PathBuf {
    Utf8PathBuf::from(&agent.name)
        .join(sanitize_version(&agent.version))
        .join(MCP_SERVERS_FILE)
}

/// Lists the servers resolved for `agent`.
///
/// Local HTTP servers are addressed by service name inside the runtime
/// network. Servers missing from `state` are left out.
#[must_use]
pub fn side_file_entries(agent: &Agent, state: &DesiredState) -> Vec<SideFileEntry> {
    let prefix = format!("{}-", agent.name);
    agent
        .mcp_servers
        .iter()
        .filter_map(|server_name| state.server(server_name))
        .map(|server| {
            let name = server
                .name
                .strip_prefix(&prefix)
                .unwrap_or(&server.name)
                .to_owned();
            match &server.spec {
                McpServerSpec::Remote(remote) => SideFileEntry {
                    name,
                    kind: "remote",
                    url: Some(remote.url.clone()),
                    headers: Some(remote.headers.clone()).filter(|headers| !headers.is_empty()),
                    command: None,
                    args: None,
                },
                McpServerSpec::Local(local) => match &local.transport {
                    LocalTransport::Http { port, path, .. } => SideFileEntry {
                        url: Some(port.map_or_else(
                            || format!("http://{}{path}", server.name),
                            |listen_port| format!("http://{}:{listen_port}{path}", server.name),
                        )),
                        name,
                        kind: "remote",
                        headers: None,
                        command: None,
                        args: None,
                    },
                    LocalTransport::Stdio => SideFileEntry {
                        name,
                        kind: "command",
                        url: None,
                        headers: None,
                        command: local.deployment.command.clone(),
                        args: Some(local.deployment.args.clone())
                            .filter(|args| !args.is_empty()),
                    },
                },
            }
        })
        .collect()
}

/// Renders the side file of every local agent that references MCP servers,
/// keyed by relative path.
///
/// Agents without servers, and remote agents, get no file. Any file left
/// from an earlier pass is therefore swept as stale.
///
/// # Errors
///
/// Returns [`TranslationError::Serialization`] when JSON encoding fails.
pub fn render_side_files(
    state: &DesiredState,
) -> Result<BTreeMap<Utf8PathBuf, String>, TranslationError> {
    state
        .agents
        .iter()
        .filter(|agent| {
            matches!(agent.spec, AgentSpec::Local { .. }) && !agent.mcp_servers.is_empty()
        })
        .map(|agent| {
            let entries = side_file_entries(agent, state);
            serde_json::to_string_pretty(&entries)
                .map(|json| (side_file_path(agent), json))
                .map_err(|err| TranslationError::Serialization {
                    artifact: MCP_SERVERS_FILE,
                    message: err.to_string(),
                })
        })
        .collect()
}

//! Kubernetes platform translator: custom resource objects.

use crate::catalog::domain::RemoteTransport;
use crate::runtime::domain::{
    AgentSpec, ClusterResource, ContainerDeployment, DesiredState, LocalTransport,
    MANAGED_BY_LABEL, MANAGED_BY_VALUE, McpServer, McpServerSpec, ObjectMeta, TranslationError,
    sanitize_version,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Kind of agent objects.
pub const AGENT_KIND: &str = "Agent";

/// Kind of locally run MCP server objects.
pub const MCP_SERVER_KIND: &str = "MCPServer";

/// Kind of remote MCP server objects.
pub const REMOTE_MCP_SERVER_KIND: &str = "RemoteMCPServer";

/// Label naming the agent a server was resolved for.
pub const AGENT_NAME_LABEL: &str = "agentregistry.dev/agent";

/// Label carrying the catalog version of the resource.
pub const RESOURCE_VERSION_LABEL: &str = "agentregistry.dev/version";

const MCP_SERVER_API_VERSION: &str = "kagent.dev/v1alpha1";
const AGENT_API_VERSION: &str = "kagent.dev/v1alpha2";

/// Translates desired state into cluster custom resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesTranslator {
    default_namespace: String,
}

impl KubernetesTranslator {
    /// Creates a translator placing unscoped resources in
    /// `default_namespace`.
    #[must_use]
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: default_namespace.into(),
        }
    }

    /// Returns the namespace used when a resource carries no override.
    #[must_use]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Translates desired state, sorted by kind, namespace and name.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::UnsupportedRemoteAgent`] for remote agents
    /// and [`TranslationError::MissingTargetPort`] for HTTP servers without a
    /// port.
    pub fn translate(
        &self,
        state: &DesiredState,
    ) -> Result<Vec<ClusterResource>, TranslationError> {
        let mut resources = Vec::with_capacity(state.mcp_servers.len() + state.agents.len());

        for server in &state.mcp_servers {
            resources.push(self.translate_server(server)?);
        }

        for agent in &state.agents {
            let AgentSpec::Local { deployment, port } = &agent.spec else {
                return Err(TranslationError::UnsupportedRemoteAgent(agent.name.clone()));
            };
            let mut spec_deployment = deployment_spec(deployment);
            spec_deployment.insert("port".to_owned(), json!(port));
            resources.push(ClusterResource {
                api_version: AGENT_API_VERSION.to_owned(),
                kind: AGENT_KIND.to_owned(),
                metadata: self.metadata(&agent.name, agent.namespace.as_deref(), &agent.version, None),
                spec: json!({
                    "type": "BYO",
                    "byo": { "deployment": Value::Object(spec_deployment) },
                }),
            });
        }

        resources.sort_by(|left, right| left.resource_ref().cmp(&right.resource_ref()));
        Ok(resources)
    }

    fn translate_server(&self, server: &McpServer) -> Result<ClusterResource, TranslationError> {
        let metadata = self.metadata(
            &server.name,
            server.namespace.as_deref(),
            &server.version,
            server.owner_agent.as_deref(),
        );

        match &server.spec {
            McpServerSpec::Remote(remote) => Ok(ClusterResource {
                api_version: AGENT_API_VERSION.to_owned(),
                kind: REMOTE_MCP_SERVER_KIND.to_owned(),
                metadata,
                spec: json!({
                    "url": remote.url,
                    "protocol": match remote.transport {
                        RemoteTransport::StreamableHttp => "STREAMABLE_HTTP",
                        RemoteTransport::Sse => "SSE",
                    },
                    "headersFrom": name_value_list(&remote.headers),
                }),
            }),
            McpServerSpec::Local(local) => {
                let mut spec = Map::new();
                let mut deployment = deployment_spec(&local.deployment);
                match &local.transport {
                    LocalTransport::Stdio => {
                        spec.insert("transportType".to_owned(), json!("stdio"));
                        spec.insert("stdioTransport".to_owned(), json!({}));
                    }
                    LocalTransport::Http { port, path, .. } => {
                        let target_port = port.ok_or_else(|| {
                            TranslationError::MissingTargetPort(server.name.clone())
                        })?;
                        deployment.insert("port".to_owned(), json!(target_port));
                        spec.insert("transportType".to_owned(), json!("http"));
                        spec.insert(
                            "httpTransport".to_owned(),
                            json!({ "targetPort": target_port, "path": path }),
                        );
                    }
                }
                spec.insert("deployment".to_owned(), Value::Object(deployment));
                Ok(ClusterResource {
                    api_version: MCP_SERVER_API_VERSION.to_owned(),
                    kind: MCP_SERVER_KIND.to_owned(),
                    metadata,
                    spec: Value::Object(spec),
                })
            }
        }
    }

    fn metadata(
        &self,
        name: &str,
        namespace: Option<&str>,
        version: &str,
        owner_agent: Option<&str>,
    ) -> ObjectMeta {
        let mut labels = BTreeMap::from([
            (MANAGED_BY_LABEL.to_owned(), MANAGED_BY_VALUE.to_owned()),
            (
                RESOURCE_VERSION_LABEL.to_owned(),
                sanitize_version(version),
            ),
        ]);
        if let Some(agent) = owner_agent {
            labels.insert(AGENT_NAME_LABEL.to_owned(), agent.to_owned());
        }
        ObjectMeta {
            name: name.to_owned(),
            namespace: namespace.unwrap_or(&self.default_namespace).to_owned(),
            labels,
        }
    }
}

fn deployment_spec(deployment: &ContainerDeployment) -> Map<String, Value> {
    let mut spec = Map::new();
    spec.insert("image".to_owned(), json!(deployment.image));
    if let Some(command) = &deployment.command {
        spec.insert("cmd".to_owned(), json!(command));
    }
    if !deployment.args.is_empty() {
        spec.insert("args".to_owned(), json!(deployment.args));
    }
    if !deployment.env.is_empty() {
        spec.insert("env".to_owned(), name_value_list(&deployment.env));
    }
    spec
}

fn name_value_list(entries: &BTreeMap<String, String>) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect(),
    )
}

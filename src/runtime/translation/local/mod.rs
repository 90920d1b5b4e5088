//! Local platform translator: a compose project fronted by a gateway.

mod compose;
mod gateway;

pub use compose::{ComposeProject, ComposeService};
pub use gateway::{
    A2aPolicy, Bind, GatewayConfig, HttpTarget, Listener, McpBackend, McpTarget, McpTargetSpec,
    PathMatch, PathRewrite, Route, RouteBackend, RouteMatch, RoutePolicies, StdioTarget,
    UrlRewrite,
};

use crate::catalog::domain::RemoteTransport;
use crate::config::RuntimeConfig;
use crate::runtime::domain::{
    Agent, AgentSpec, ContainerDeployment, DesiredState, HttpProtocol, LocalTransport,
    McpServer, McpServerSpec, TranslationError, sanitize_version,
};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Compose service name of the gateway.
pub const GATEWAY_SERVICE: &str = "agentgateway";

/// File name of the compose project inside the runtime directory.
pub const COMPOSE_FILE: &str = "docker-compose.yaml";

/// File name of the gateway config inside the runtime directory.
pub const GATEWAY_CONFIG_FILE: &str = "gateway.yaml";

/// File name of an agent's resolved-server side file.
pub const MCP_SERVERS_FILE: &str = "mcp-servers.json";

/// Environment variable pointing an agent at its side file.
pub const MCP_SERVERS_CONFIG_ENV: &str = "MCP_SERVERS_CONFIG";

/// Mount point of an agent's side-file directory inside its container.
pub const AGENT_CONFIG_MOUNT: &str = "/config/mcp";

const GATEWAY_CONFIG_MOUNT: &str = "/config";
const MCP_ROUTE: &str = "mcp";

/// Artifacts for one local reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifacts {
    /// Compose project.
    pub compose: ComposeProject,
    /// Gateway routing config.
    pub gateway: GatewayConfig,
}

impl LocalArtifacts {
    /// Serialises the compose project.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Serialization`] when YAML encoding fails.
    pub fn compose_yaml(&self) -> Result<String, TranslationError> {
        serde_yaml::to_string(&self.compose).map_err(|err| TranslationError::Serialization {
            artifact: COMPOSE_FILE,
            message: err.to_string(),
        })
    }

    /// Serialises the gateway config.
    ///
    /// Backends are written as single-key mappings (`mcp:`, `host:`), not
    /// as YAML tags.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Serialization`] when encoding fails.
    pub fn gateway_yaml(&self) -> Result<String, TranslationError> {
        let encode_error = |message: String| TranslationError::Serialization {
            artifact: GATEWAY_CONFIG_FILE,
            message,
        };
        let document =
            serde_json::to_value(&self.gateway).map_err(|err| encode_error(err.to_string()))?;
        serde_yaml::to_string(&document).map_err(|err| encode_error(err.to_string()))
    }
}

/// Translates desired state into compose and gateway artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTranslator {
    project: String,
    gateway_image: String,
    gateway_port: u16,
}

impl LocalTranslator {
    /// Creates a translator from runtime settings.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            project: config.compose_project.clone(),
            gateway_image: config.gateway_image.clone(),
            gateway_port: config.gateway_port,
        }
    }

    /// Translates desired state.
    ///
    /// Stdio servers become gateway child processes and get no compose
    /// service. Targets and agent routes are sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::MissingTargetPort`] for HTTP servers
    /// without a port and [`TranslationError::ServiceNameConflict`] when two
    /// resources claim one service name.
    pub fn translate(&self, state: &DesiredState) -> Result<LocalArtifacts, TranslationError> {
        let mut services = BTreeMap::new();
        insert_service(&mut services, GATEWAY_SERVICE, self.gateway_service())?;

        let mut targets = Vec::with_capacity(state.mcp_servers.len());
        for server in &state.mcp_servers {
            targets.push(translate_server(server, &mut services)?);
        }
        targets.sort_by(|left, right| left.name.cmp(&right.name));

        let mut agents: Vec<&Agent> = state.agents.iter().collect();
        agents.sort_by(|left, right| left.name.cmp(&right.name));

        let mut routes = Vec::with_capacity(agents.len().saturating_add(1));
        if !targets.is_empty() {
            routes.push(Route {
                name: MCP_ROUTE.to_owned(),
                matches: vec![RouteMatch::prefix("/mcp")],
                policies: None,
                backends: vec![RouteBackend::Mcp(McpBackend { targets })],
            });
        }
        for agent in agents {
            let backend = match &agent.spec {
                AgentSpec::Local { deployment, port } => {
                    insert_service(&mut services, &agent.name, agent_service(agent, deployment))?;
                    format!("{}:{port}", agent.name)
                }
                AgentSpec::Remote(remote) => remote.url.clone(),
            };
            routes.push(agent_route(&agent.name, backend));
        }

        Ok(LocalArtifacts {
            compose: ComposeProject {
                name: self.project.clone(),
                services,
            },
            gateway: GatewayConfig {
                binds: vec![Bind {
                    port: self.gateway_port,
                    listeners: vec![Listener { routes }],
                }],
            },
        })
    }

    fn gateway_service(&self) -> ComposeService {
        let mut service = ComposeService::new(self.gateway_image.clone());
        service.command = vec![
            "-f".to_owned(),
            format!("{GATEWAY_CONFIG_MOUNT}/{GATEWAY_CONFIG_FILE}"),
        ];
        service.ports = vec![format!("{port}:{port}", port = self.gateway_port)];
        service.volumes = vec![format!(".:{GATEWAY_CONFIG_MOUNT}:ro")];
        service
    }
}

fn insert_service(
    services: &mut BTreeMap<String, ComposeService>,
    name: &str,
    service: ComposeService,
) -> Result<(), TranslationError> {
    match services.entry(name.to_owned()) {
        Entry::Occupied(_) => Err(TranslationError::ServiceNameConflict(name.to_owned())),
        Entry::Vacant(slot) => {
            slot.insert(service);
            Ok(())
        }
    }
}

fn container_service(deployment: &ContainerDeployment) -> ComposeService {
    let mut service = ComposeService::new(deployment.image.clone());
    service.command = deployment.command_line();
    service.environment = deployment.env.clone();
    service
}

fn translate_server(
    server: &McpServer,
    services: &mut BTreeMap<String, ComposeService>,
) -> Result<McpTarget, TranslationError> {
    let spec = match &server.spec {
        McpServerSpec::Remote(remote) => {
            let target = HttpTarget {
                host: remote.url.clone(),
                port: None,
                path: None,
                headers: remote.headers.clone(),
            };
            match remote.transport {
                RemoteTransport::StreamableHttp => McpTargetSpec::Mcp(target),
                RemoteTransport::Sse => McpTargetSpec::Sse(target),
            }
        }
        McpServerSpec::Local(local) => match &local.transport {
            LocalTransport::Stdio => McpTargetSpec::Stdio(stdio_target(&local.deployment)),
            LocalTransport::Http {
                port,
                path,
                protocol,
            } => {
                let target_port =
                    port.ok_or_else(|| TranslationError::MissingTargetPort(server.name.clone()))?;
                insert_service(services, &server.name, container_service(&local.deployment))?;
                let target = HttpTarget {
                    host: server.name.clone(),
                    port: Some(target_port),
                    path: Some(path.clone()),
                    headers: BTreeMap::new(),
                };
                match protocol {
                    HttpProtocol::StreamableHttp => McpTargetSpec::Mcp(target),
                    HttpProtocol::Sse => McpTargetSpec::Sse(target),
                }
            }
        },
    };
    Ok(McpTarget {
        name: server.name.clone(),
        spec,
    })
}

/// Stdio targets run inside the gateway container; image-only packages are
/// started through the container CLI.
fn stdio_target(deployment: &ContainerDeployment) -> StdioTarget {
    if let Some(command) = &deployment.command {
        return StdioTarget {
            cmd: command.clone(),
            args: deployment.args.clone(),
            env: deployment.env.clone(),
        };
    }

    let mut args = vec!["run".to_owned(), "-i".to_owned(), "--rm".to_owned()];
    for (name, value) in &deployment.env {
        args.push("-e".to_owned());
        args.push(format!("{name}={value}"));
    }
    args.push(deployment.image.clone());
    args.extend(deployment.args.iter().cloned());
    StdioTarget {
        cmd: "docker".to_owned(),
        args,
        env: BTreeMap::new(),
    }
}

fn agent_service(agent: &Agent, deployment: &ContainerDeployment) -> ComposeService {
    let mut service = container_service(deployment);
    if !agent.mcp_servers.is_empty() {
        service.volumes.push(format!(
            "./{}/{}:{AGENT_CONFIG_MOUNT}:ro",
            agent.name,
            sanitize_version(&agent.version)
        ));
        service.environment.insert(
            MCP_SERVERS_CONFIG_ENV.to_owned(),
            format!("{AGENT_CONFIG_MOUNT}/{MCP_SERVERS_FILE}"),
        );
    }
    service
}

fn agent_route(name: &str, backend: String) -> Route {
    Route {
        name: format!("agent-{name}"),
        matches: vec![RouteMatch::prefix(format!("/agent/{name}"))],
        policies: Some(RoutePolicies {
            url_rewrite: Some(UrlRewrite {
                path: PathRewrite {
                    prefix: "/".to_owned(),
                },
            }),
            a2a: Some(A2aPolicy::default()),
        }),
        backends: vec![RouteBackend::Host(backend)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::domain::{LocalMcpServer, RemoteMcpServer};
    use rstest::{fixture, rstest};

    #[fixture]
    fn translator() -> LocalTranslator {
        LocalTranslator::new(&RuntimeConfig::default())
    }

    fn stdio_server(name: &str) -> McpServer {
        McpServer {
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
            namespace: None,
            owner_agent: None,
            spec: McpServerSpec::Local(LocalMcpServer {
                deployment: ContainerDeployment {
                    image: "node:22-alpine".to_owned(),
                    command: Some("npx".to_owned()),
                    args: vec!["-y".to_owned(), format!("@example/{name}")],
                    env: BTreeMap::new(),
                },
                transport: LocalTransport::Stdio,
            }),
        }
    }

    fn http_server(name: &str, port: Option<u16>) -> McpServer {
        McpServer {
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
            namespace: None,
            owner_agent: None,
            spec: McpServerSpec::Local(LocalMcpServer {
                deployment: ContainerDeployment {
                    image: format!("ghcr.io/example/{name}:1.0.0"),
                    command: None,
                    args: Vec::new(),
                    env: BTreeMap::new(),
                },
                transport: LocalTransport::Http {
                    port,
                    path: "/mcp".to_owned(),
                    protocol: HttpProtocol::StreamableHttp,
                },
            }),
        }
    }

    fn local_agent(name: &str, servers: &[&str]) -> Agent {
        Agent {
            name: name.to_owned(),
            version: "0.2.0".to_owned(),
            namespace: None,
            spec: AgentSpec::Local {
                deployment: ContainerDeployment {
                    image: format!("ghcr.io/example/{name}:0.2.0"),
                    command: None,
                    args: Vec::new(),
                    env: BTreeMap::new(),
                },
                port: 8080,
            },
            mcp_servers: servers.iter().map(|server| (*server).to_owned()).collect(),
        }
    }

    #[rstest]
    fn stdio_server_has_no_compose_service(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: vec![stdio_server("echo")],
            agents: Vec::new(),
        };

        let artifacts = translator.translate(&state).expect("translation should succeed");

        assert_eq!(
            artifacts.compose.services.keys().collect::<Vec<_>>(),
            vec![GATEWAY_SERVICE]
        );
        let targets = artifacts.gateway.mcp_targets();
        let [target] = targets.as_slice() else {
            panic!("expected one target");
        };
        assert_eq!(
            target.spec,
            McpTargetSpec::Stdio(StdioTarget {
                cmd: "npx".to_owned(),
                args: vec!["-y".to_owned(), "@example/echo".to_owned()],
                env: BTreeMap::new(),
            })
        );
    }

    #[rstest]
    fn gateway_backends_are_plain_mappings(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: vec![stdio_server("echo")],
            agents: Vec::new(),
        };

        let yaml = translator
            .translate(&state)
            .expect("translation should succeed")
            .gateway_yaml()
            .expect("gateway should serialise");

        let document: serde_yaml::Value =
            serde_yaml::from_str(&yaml).expect("gateway yaml should parse");
        let backend = &document["binds"][0]["listeners"][0]["routes"][0]["backends"][0];
        assert_eq!(backend["mcp"]["targets"][0]["name"].as_str(), Some("echo"));
        assert_eq!(backend["mcp"]["targets"][0]["stdio"]["cmd"].as_str(), Some("npx"));
        assert!(!yaml.contains('!'));
    }

    #[rstest]
    fn http_server_without_port_requires_target_port(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: vec![http_server("search", None)],
            agents: Vec::new(),
        };

        let err = translator
            .translate(&state)
            .expect_err("translation should fail");

        assert_eq!(err, TranslationError::MissingTargetPort("search".to_owned()));
        assert!(err.to_string().contains("requires a target port"));
    }

    #[rstest]
    fn output_is_independent_of_input_order(translator: LocalTranslator) {
        let forward = DesiredState {
            mcp_servers: vec![http_server("beta", Some(3000)), stdio_server("alpha")],
            agents: vec![local_agent("zed", &[]), local_agent("ada", &[])],
        };
        let reversed = DesiredState {
            mcp_servers: forward.mcp_servers.iter().rev().cloned().collect(),
            agents: forward.agents.iter().rev().cloned().collect(),
        };

        let first = translator.translate(&forward).expect("translation should succeed");
        let second = translator
            .translate(&reversed)
            .expect("translation should succeed");

        assert_eq!(
            first.compose_yaml().expect("compose should serialise"),
            second.compose_yaml().expect("compose should serialise")
        );
        assert_eq!(
            first.gateway_yaml().expect("gateway should serialise"),
            second.gateway_yaml().expect("gateway should serialise")
        );
        let route_names: Vec<&str> = first
            .gateway
            .routes()
            .map(|route| route.name.as_str())
            .collect();
        assert_eq!(route_names, vec!["mcp", "agent-ada", "agent-zed"]);
    }

    #[rstest]
    fn agent_route_rewrites_to_backend(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: vec![stdio_server("planner-echo")],
            agents: vec![local_agent("planner", &["planner-echo"])],
        };

        let artifacts = translator.translate(&state).expect("translation should succeed");
        let route = artifacts
            .gateway
            .routes()
            .find(|route| route.name == "agent-planner")
            .expect("agent route should exist");

        assert_eq!(route.matches, vec![RouteMatch::prefix("/agent/planner")]);
        assert_eq!(
            route.backends,
            vec![RouteBackend::Host("planner:8080".to_owned())]
        );
        let service = artifacts
            .compose
            .services
            .get("planner")
            .expect("agent service should exist");
        assert_eq!(service.volumes, vec!["./planner/0.2.0:/config/mcp:ro"]);
        assert_eq!(
            service
                .environment
                .get(MCP_SERVERS_CONFIG_ENV)
                .map(String::as_str),
            Some("/config/mcp/mcp-servers.json")
        );
    }

    #[rstest]
    fn remote_server_becomes_url_target(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: vec![McpServer {
                name: "search".to_owned(),
                version: "1.0.0".to_owned(),
                namespace: None,
                owner_agent: None,
                spec: McpServerSpec::Remote(RemoteMcpServer {
                    url: "https://search.example/sse".to_owned(),
                    transport: RemoteTransport::Sse,
                    headers: BTreeMap::new(),
                }),
            }],
            agents: Vec::new(),
        };

        let artifacts = translator.translate(&state).expect("translation should succeed");
        let targets = artifacts.gateway.mcp_targets();

        assert_eq!(
            targets.first().map(|target| &target.spec),
            Some(&McpTargetSpec::Sse(HttpTarget {
                host: "https://search.example/sse".to_owned(),
                port: None,
                path: None,
                headers: BTreeMap::new(),
            }))
        );
        assert_eq!(artifacts.compose.services.len(), 1);
    }

    #[rstest]
    fn agent_named_like_gateway_conflicts(translator: LocalTranslator) {
        let state = DesiredState {
            mcp_servers: Vec::new(),
            agents: vec![local_agent(GATEWAY_SERVICE, &[])],
        };

        assert_eq!(
            translator.translate(&state),
            Err(TranslationError::ServiceNameConflict(
                GATEWAY_SERVICE.to_owned()
            ))
        );
    }
}

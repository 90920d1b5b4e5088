//! Run requests to platform-neutral desired state.

use crate::catalog::domain::{Package, PackageArgument, PackageTransport, RegistryType, RemoteHeader};
use crate::runtime::domain::{
    Agent, AgentRunRequest, AgentSpec, ContainerDeployment, DesiredState, HttpProtocol,
    LocalMcpServer, LocalTransport, McpServer, McpServerRunRequest, McpServerSpec, RemoteAgent,
    RemoteMcpServer, RunRequest, TranslationError,
};
use std::collections::{BTreeMap, BTreeSet};

/// Image used to run `npm` packages through `npx`.
pub const NODE_IMAGE: &str = "node:22-alpine";

/// Image used to run `pypi` packages through `uvx`.
pub const UV_IMAGE: &str = "ghcr.io/astral-sh/uv:python3.12-alpine";

/// Port an agent serves on when its catalog entry does not say.
pub const DEFAULT_AGENT_PORT: u16 = 8080;

const MODEL_PROVIDER_ENV: &str = "MODEL_PROVIDER";
const MODEL_NAME_ENV: &str = "MODEL_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interpreter {
    Npx,
    Uvx,
}

impl Interpreter {
    fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim() {
            "npx" => Some(Self::Npx),
            "uvx" => Some(Self::Uvx),
            _ => None,
        }
    }

    const fn for_registry(registry: &RegistryType) -> Option<Self> {
        match registry {
            RegistryType::Npm => Some(Self::Npx),
            RegistryType::Pypi => Some(Self::Uvx),
            RegistryType::Oci | RegistryType::Other(_) => None,
        }
    }

    const fn image(self) -> &'static str {
        match self {
            Self::Npx => NODE_IMAGE,
            Self::Uvx => UV_IMAGE,
        }
    }

    const fn command(self) -> &'static str {
        match self {
            Self::Npx => "npx",
            Self::Uvx => "uvx",
        }
    }

    fn package_reference(self, identifier: &str, version: &str) -> String {
        match (self, version.is_empty()) {
            (_, true) => identifier.to_owned(),
            (Self::Npx, false) => format!("{identifier}@{version}"),
            (Self::Uvx, false) => format!("{identifier}=={version}"),
        }
    }

    fn leading_args(self) -> impl Iterator<Item = String> {
        let flags: &'static [&'static str] = match self {
            Self::Npx => &["-y"],
            Self::Uvx => &[],
        };
        flags.iter().map(|flag| (*flag).to_owned())
    }
}

/// Translates a batch of run requests into desired state.
///
/// Servers resolved for an agent are listed alongside directly requested
/// servers, in request order.
///
/// # Errors
///
/// Returns [`TranslationError`] when a resource cannot be run locally or
/// remotely, or when two servers or two agents share a name.
pub fn translate_requests(requests: &[RunRequest]) -> Result<DesiredState, TranslationError> {
    let mut state = DesiredState::default();
    for request in requests {
        match request {
            RunRequest::McpServer(server) => state.mcp_servers.push(translate_server(server)?),
            RunRequest::Agent(agent) => {
                for resolved in &agent.resolved_servers {
                    state.mcp_servers.push(translate_server(resolved)?);
                }
                state.agents.push(translate_agent(agent)?);
            }
        }
    }

    ensure_unique(
        state.mcp_servers.iter().map(|server| server.name.as_str()),
        TranslationError::DuplicateServerName,
    )?;
    ensure_unique(
        state.agents.iter().map(|agent| agent.name.as_str()),
        TranslationError::DuplicateAgentName,
    )?;
    Ok(state)
}

fn ensure_unique<'a>(
    names: impl Iterator<Item = &'a str>,
    duplicate: impl Fn(String) -> TranslationError,
) -> Result<(), TranslationError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(duplicate(name.to_owned()));
        }
    }
    Ok(())
}

fn ensure_name(runtime_name: &str, catalog_name: &str) -> Result<(), TranslationError> {
    if runtime_name.is_empty() {
        return Err(TranslationError::InvalidName(catalog_name.to_owned()));
    }
    Ok(())
}

fn translate_server(request: &McpServerRunRequest) -> Result<McpServer, TranslationError> {
    ensure_name(&request.name, &request.server.name)?;
    let server = &request.server;
    let package = server.primary_package();
    let remote = server
        .primary_remote()
        .filter(|_| request.prefer_remote || package.is_none());

    let spec = match (remote, package) {
        (Some(endpoint), _) => McpServerSpec::Remote(RemoteMcpServer {
            url: endpoint.url.clone(),
            transport: endpoint.transport,
            headers: merge_headers(&endpoint.headers, &request.headers),
        }),
        (None, Some(local_package)) => {
            McpServerSpec::Local(translate_package(&request.name, local_package, request)?)
        }
        (None, None) => return Err(TranslationError::NoDistribution(request.name.clone())),
    };

    Ok(McpServer {
        name: request.name.clone(),
        version: server.version.clone(),
        namespace: request.namespace.clone(),
        owner_agent: request.owner_agent.clone(),
        spec,
    })
}

fn translate_package(
    name: &str,
    package: &Package,
    request: &McpServerRunRequest,
) -> Result<LocalMcpServer, TranslationError> {
    let interpreter = package
        .runtime_hint
        .as_deref()
        .and_then(Interpreter::from_hint)
        .or_else(|| Interpreter::for_registry(&package.registry_type));
    let package_args = render_arguments(&package.package_arguments, &request.args);

    let mut env: BTreeMap<String, String> = package
        .environment_variables
        .iter()
        .filter_map(|variable| {
            variable
                .default
                .as_ref()
                .map(|default| (variable.name.clone(), default.clone()))
        })
        .collect();
    env.extend(request.env.clone());

    let deployment = match interpreter {
        Some(runner) => ContainerDeployment {
            image: runner.image().to_owned(),
            command: Some(runner.command().to_owned()),
            args: render_arguments(&package.runtime_arguments, &BTreeMap::new())
                .into_iter()
                .chain(runner.leading_args())
                .chain(std::iter::once(
                    runner.package_reference(&package.identifier, &package.version),
                ))
                .chain(package_args)
                .collect(),
            env,
        },
        None if package.registry_type == RegistryType::Oci => ContainerDeployment {
            image: oci_image(&package.identifier, &package.version),
            command: None,
            args: package_args,
            env,
        },
        None => {
            return Err(TranslationError::MissingImage {
                name: name.to_owned(),
                reason: format!(
                    "registry type '{}' has no image or known interpreter",
                    package.registry_type.as_str()
                ),
            });
        }
    };

    Ok(LocalMcpServer {
        deployment,
        transport: local_transport(&package.transport),
    })
}

fn local_transport(transport: &PackageTransport) -> LocalTransport {
    match transport {
        PackageTransport::Stdio => LocalTransport::Stdio,
        PackageTransport::StreamableHttp { port, path } => LocalTransport::Http {
            port: *port,
            path: path.clone().unwrap_or_else(|| "/mcp".to_owned()),
            protocol: HttpProtocol::StreamableHttp,
        },
        PackageTransport::Sse { port, path } => LocalTransport::Http {
            port: *port,
            path: path.clone().unwrap_or_else(|| "/sse".to_owned()),
            protocol: HttpProtocol::Sse,
        },
    }
}

/// Renders arguments, letting overrides replace named argument values.
///
/// Overrides that match no named argument are appended as `--name=value`
/// in key order.
fn render_arguments(
    arguments: &[PackageArgument],
    overrides: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut rendered = Vec::new();
    let mut matched = BTreeSet::new();
    for argument in arguments {
        match argument {
            PackageArgument::Positional { value } => rendered.push(value.clone()),
            PackageArgument::Named { name, value } => {
                rendered.push(format!("--{name}"));
                match (overrides.get(name), value) {
                    (Some(override_value), _) => {
                        matched.insert(name.as_str());
                        rendered.push(override_value.clone());
                    }
                    (None, Some(default)) => rendered.push(default.clone()),
                    (None, None) => {}
                }
            }
        }
    }
    for (name, value) in overrides {
        if !matched.contains(name.as_str()) {
            rendered.push(format!("--{name}={value}"));
        }
    }
    rendered
}

fn merge_headers(
    declared: &[RemoteHeader],
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = declared
        .iter()
        .filter_map(|header| {
            header
                .value
                .as_ref()
                .map(|value| (header.name.clone(), value.clone()))
        })
        .collect();
    headers.extend(overrides.clone());
    headers
}

fn oci_image(identifier: &str, version: &str) -> String {
    let last_segment = identifier.rsplit('/').next().unwrap_or(identifier);
    if version.is_empty() || identifier.contains('@') || last_segment.contains(':') {
        return identifier.to_owned();
    }
    format!("{identifier}:{version}")
}

fn translate_agent(request: &AgentRunRequest) -> Result<Agent, TranslationError> {
    ensure_name(&request.name, &request.agent.name)?;
    let agent = &request.agent;

    let spec = match (&agent.image, agent.remotes.first()) {
        (Some(image), _) => {
            let mut env = agent.env.clone();
            if let Some(provider) = &agent.model_provider {
                env.entry(MODEL_PROVIDER_ENV.to_owned())
                    .or_insert_with(|| provider.clone());
            }
            if let Some(model) = &agent.model_name {
                env.entry(MODEL_NAME_ENV.to_owned())
                    .or_insert_with(|| model.clone());
            }
            env.extend(request.env.clone());
            AgentSpec::Local {
                deployment: ContainerDeployment {
                    image: image.clone(),
                    command: agent.command.clone(),
                    args: agent.args.clone(),
                    env,
                },
                port: agent.port.unwrap_or(DEFAULT_AGENT_PORT),
            }
        }
        (None, Some(remote)) => AgentSpec::Remote(RemoteAgent {
            url: remote.url.clone(),
            headers: merge_headers(&remote.headers, &BTreeMap::new()),
        }),
        (None, None) => {
            return Err(TranslationError::MissingImage {
                name: request.name.clone(),
                reason: "the agent has neither an image nor a remote endpoint".to_owned(),
            });
        }
    };

    Ok(Agent {
        name: request.name.clone(),
        version: agent.version.clone(),
        namespace: request.namespace.clone(),
        spec,
        mcp_servers: request
            .resolved_servers
            .iter()
            .map(|server| server.name.clone())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{
        AgentMcpServerEntry, CatalogAgent, CatalogServer, RemoteEndpoint, RemoteTransport,
    };
    use rstest::{fixture, rstest};

    fn npm_server() -> CatalogServer {
        CatalogServer::new("io.example/echo", "1.0.0")
            .expect("valid server")
            .with_package(
                Package::new(RegistryType::Npm, "@example/echo", "1.0.0")
                    .expect("valid package")
                    .with_package_arguments([
                        PackageArgument::named("--greeting", "hello"),
                        PackageArgument::positional("serve"),
                    ])
                    .with_env("LOG_LEVEL", Some("info".to_owned()))
                    .with_env("API_KEY", None),
            )
    }

    #[fixture]
    fn echo_request() -> McpServerRunRequest {
        McpServerRunRequest::new("echo", npm_server())
    }

    fn local(server: &McpServer) -> &LocalMcpServer {
        match &server.spec {
            McpServerSpec::Local(local) => local,
            McpServerSpec::Remote(_) => panic!("expected a local server"),
        }
    }

    #[rstest]
    fn npm_package_runs_through_npx(echo_request: McpServerRunRequest) {
        let state = translate_requests(&[RunRequest::McpServer(echo_request)])
            .expect("translation should succeed");
        let server = state.server("echo").expect("server should be present");
        let local_server = local(server);

        assert_eq!(local_server.deployment.image, NODE_IMAGE);
        assert_eq!(local_server.deployment.command.as_deref(), Some("npx"));
        assert_eq!(
            local_server.deployment.args,
            vec!["-y", "@example/echo@1.0.0", "--greeting", "hello", "serve"]
        );
        assert_eq!(
            local_server.deployment.env,
            BTreeMap::from([("LOG_LEVEL".to_owned(), "info".to_owned())])
        );
        assert_eq!(local_server.transport, LocalTransport::Stdio);
    }

    #[rstest]
    fn overrides_win_over_catalog_defaults(mut echo_request: McpServerRunRequest) {
        echo_request
            .args
            .insert("greeting".to_owned(), "hi".to_owned());
        echo_request
            .args
            .insert("verbose".to_owned(), "true".to_owned());
        echo_request
            .env
            .insert("LOG_LEVEL".to_owned(), "debug".to_owned());

        let state = translate_requests(&[RunRequest::McpServer(echo_request)])
            .expect("translation should succeed");
        let local_server = local(state.server("echo").expect("server should be present"));

        assert_eq!(
            local_server.deployment.args,
            vec![
                "-y",
                "@example/echo@1.0.0",
                "--greeting",
                "hi",
                "serve",
                "--verbose=true"
            ]
        );
        assert_eq!(
            local_server.deployment.env.get("LOG_LEVEL").map(String::as_str),
            Some("debug")
        );
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, true)]
    fn prefer_remote_selects_remote_endpoint(#[case] prefer_remote: bool, #[case] remote: bool) {
        let server = npm_server().with_remote(
            RemoteEndpoint::new(RemoteTransport::StreamableHttp, "https://echo.example/mcp")
                .expect("valid remote")
                .with_header("Authorization", None),
        );
        let mut request = McpServerRunRequest::new("echo", server);
        request.prefer_remote = prefer_remote;
        request
            .headers
            .insert("Authorization".to_owned(), "Bearer t".to_owned());

        let state = translate_requests(&[RunRequest::McpServer(request)])
            .expect("translation should succeed");
        let spec = &state.server("echo").expect("server should be present").spec;

        assert_eq!(matches!(spec, McpServerSpec::Remote(_)), remote);
        if let McpServerSpec::Remote(endpoint) = spec {
            assert_eq!(
                endpoint.headers.get("Authorization").map(String::as_str),
                Some("Bearer t")
            );
        }
    }

    #[test]
    fn unknown_registry_without_hint_is_missing_image() {
        let server = CatalogServer::new("io.example/dotnet", "1.0.0")
            .expect("valid server")
            .with_package(
                Package::new(RegistryType::Other("nuget".to_owned()), "Example.Mcp", "1.0.0")
                    .expect("valid package"),
            );

        let result =
            translate_requests(&[RunRequest::McpServer(McpServerRunRequest::new("dotnet", server))]);

        assert!(matches!(
            result,
            Err(TranslationError::MissingImage { ref name, .. }) if name == "dotnet"
        ));
    }

    #[test]
    fn oci_package_keeps_explicit_tag() {
        assert_eq!(oci_image("ghcr.io/example/echo:2.0", "1.0.0"), "ghcr.io/example/echo:2.0");
        assert_eq!(oci_image("ghcr.io/example/echo", "1.0.0"), "ghcr.io/example/echo:1.0.0");
        assert_eq!(oci_image("localhost:5000/echo", "1.0.0"), "localhost:5000/echo:1.0.0");
    }

    #[rstest]
    fn duplicate_server_names_fail(echo_request: McpServerRunRequest) {
        let result = translate_requests(&[
            RunRequest::McpServer(echo_request.clone()),
            RunRequest::McpServer(echo_request),
        ]);

        assert_eq!(
            result,
            Err(TranslationError::DuplicateServerName("echo".to_owned()))
        );
    }

    #[test]
    fn agent_gets_model_defaults_and_resolved_server_names() {
        let mut catalog_agent = CatalogAgent::new("io.example/planner", "0.2.0")
            .expect("valid agent")
            .with_image("ghcr.io/example/planner:0.2.0")
            .with_mcp_server(AgentMcpServerEntry::registry("echo", "io.example/echo", None));
        catalog_agent.model_provider = Some("openai".to_owned());
        let mut request = AgentRunRequest::new("planner", catalog_agent);
        let mut resolved = McpServerRunRequest::new("planner-echo", npm_server());
        resolved.owner_agent = Some("planner".to_owned());
        request.resolved_servers.push(resolved);

        let state =
            translate_requests(&[RunRequest::Agent(request)]).expect("translation should succeed");
        let translated = state.agent("planner").expect("agent should be present");

        assert_eq!(translated.mcp_servers, vec!["planner-echo"]);
        assert!(state.server("planner-echo").is_some());
        let AgentSpec::Local { deployment, port } = &translated.spec else {
            panic!("expected a local agent");
        };
        assert_eq!(*port, DEFAULT_AGENT_PORT);
        assert_eq!(
            deployment.env.get(MODEL_PROVIDER_ENV).map(String::as_str),
            Some("openai")
        );
    }
}

//! Translators from run requests to desired state, and from desired state
//! to platform artifacts.

mod desired;
mod kubernetes;
mod local;

pub use desired::{DEFAULT_AGENT_PORT, NODE_IMAGE, UV_IMAGE, translate_requests};
pub use kubernetes::{
    AGENT_KIND, AGENT_NAME_LABEL, KubernetesTranslator, MCP_SERVER_KIND, REMOTE_MCP_SERVER_KIND,
    RESOURCE_VERSION_LABEL,
};
pub use local::{
    AGENT_CONFIG_MOUNT, COMPOSE_FILE, ComposeProject, ComposeService, GATEWAY_CONFIG_FILE,
    GATEWAY_SERVICE, GatewayConfig, LocalArtifacts, LocalTranslator, MCP_SERVERS_CONFIG_ENV,
    MCP_SERVERS_FILE, McpTarget, McpTargetSpec, Route, RouteBackend, StdioTarget, HttpTarget,
};

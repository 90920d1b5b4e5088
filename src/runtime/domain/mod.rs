//! Domain model for run requests, desired state and cluster objects.

mod cluster;
mod desired;
mod error;
mod naming;
mod request;

pub use cluster::{
    ClusterResource, MANAGED_BY_LABEL, MANAGED_BY_VALUE, ObjectMeta, ResourceRef,
};
pub use desired::{
    Agent, AgentSpec, ContainerDeployment, DesiredState, HttpProtocol, LocalMcpServer,
    LocalTransport, McpServer, McpServerSpec, RemoteAgent, RemoteMcpServer,
};
pub use error::TranslationError;
pub use naming::{runtime_name, sanitize_version};
pub use request::{AgentRunRequest, McpServerRunRequest, RunRequest};

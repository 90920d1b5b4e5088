//! Domain model for catalog entries consumed by the deployment runtime.
//!
//! Server entries describe how a server can be run (packages) or reached
//! (remotes). Agent entries describe the agent image and the MCP servers the
//! agent expects at startup.

mod agent;
mod error;
mod server;
mod version;

pub use agent::{AgentMcpServerEntry, CatalogAgent};
pub use error::CatalogDomainError;
pub use server::{
    CatalogServer, EnvironmentVariable, Package, PackageArgument, PackageTransport,
    RegistryType, RemoteEndpoint, RemoteHeader, RemoteTransport,
};
pub use version::VersionSelector;

//! Resolution of deployment records into run requests.

use crate::catalog::{
    domain::{AgentMcpServerEntry, CatalogAgent, VersionSelector},
    ports::{CatalogError, CatalogRepository},
};
use crate::deployment::domain::{Deployment, ResourceType};
use crate::runtime::domain::{AgentRunRequest, McpServerRunRequest, RunRequest, runtime_name};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while resolving a deployment against the catalog.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The deployed server version is not published.
    #[error("MCP server {name}@{version} not found in catalog")]
    ServerNotFound {
        /// Catalog name.
        name: String,
        /// Requested version.
        version: String,
    },

    /// The deployed agent version is not published.
    #[error("agent {name}@{version} not found in catalog")]
    AgentNotFound {
        /// Catalog name.
        name: String,
        /// Requested version.
        version: String,
    },

    /// An agent manifest references an unpublished server.
    #[error("agent '{agent}' references MCP server {name}@{version}, which is not in the catalog")]
    ReferencedServerNotFound {
        /// Agent catalog name.
        agent: String,
        /// Referenced server name.
        name: String,
        /// Referenced server version.
        version: String,
    },

    /// Catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Joins deployment records with catalog entries.
pub struct RunRequestResolver<C>
where
    C: CatalogRepository,
{
    catalog: Arc<C>,
}

impl<C> Clone for RunRequestResolver<C>
where
    C: CatalogRepository,
{
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C> RunRequestResolver<C>
where
    C: CatalogRepository,
{
    /// Creates a resolver reading from `catalog`.
    #[must_use]
    pub const fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Builds the run request for one deployment.
    ///
    /// The deployed resource is looked up at exactly the recorded version;
    /// only manifest references may select the newest version. Server
    /// deployments carry the deployment's env, argument, header and
    /// namespace overrides. Agent deployments carry env and namespace
    /// overrides, and every catalog server named in the agent manifest is
    /// resolved into a server request owned by the agent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the deployed resource, or a server its
    /// manifest references, is not in the catalog.
    pub async fn resolve(&self, deployment: &Deployment) -> ResolveResult<RunRequest> {
        match deployment.resource_type() {
            ResourceType::Mcp => self.resolve_server(deployment).await.map(RunRequest::McpServer),
            ResourceType::Agent => self.resolve_agent(deployment).await.map(RunRequest::Agent),
        }
    }

    async fn resolve_server(&self, deployment: &Deployment) -> ResolveResult<McpServerRunRequest> {
        let selector = VersionSelector::Exact(deployment.version().to_owned());
        let server = self
            .catalog
            .find_server(deployment.resource_name(), &selector)
            .await?
            .ok_or_else(|| ResolveError::ServerNotFound {
                name: deployment.resource_name().to_owned(),
                version: selector.to_string(),
            })?;

        let config = deployment.config();
        let mut request = McpServerRunRequest::new(runtime_name(&server.name), server);
        request.env = config.env();
        request.args = config.args();
        request.headers = config.headers();
        request.namespace = config.namespace().map(str::to_owned);
        Ok(request)
    }

    async fn resolve_agent(&self, deployment: &Deployment) -> ResolveResult<AgentRunRequest> {
        let selector = VersionSelector::Exact(deployment.version().to_owned());
        let agent = self
            .catalog
            .find_agent(deployment.resource_name(), &selector)
            .await?
            .ok_or_else(|| ResolveError::AgentNotFound {
                name: deployment.resource_name().to_owned(),
                version: selector.to_string(),
            })?;

        let config = deployment.config();
        let agent_name = runtime_name(&agent.name);
        let namespace = config.namespace().map(str::to_owned);
        let resolved_servers = self
            .resolve_manifest(&agent, &agent_name, namespace.as_deref())
            .await?;

        let mut request = AgentRunRequest::new(agent_name, agent);
        request.env = config.env();
        request.namespace = namespace;
        request.resolved_servers = resolved_servers;
        Ok(request)
    }

    async fn resolve_manifest(
        &self,
        agent: &CatalogAgent,
        agent_name: &str,
        namespace: Option<&str>,
    ) -> ResolveResult<Vec<McpServerRunRequest>> {
        let mut visited = HashSet::new();
        let mut resolved = Vec::new();
        for entry in agent.registry_servers() {
            let AgentMcpServerEntry::Registry {
                name,
                registry_server_name,
                registry_server_version,
                registry_server_prefer_remote,
            } = entry
            else {
                continue;
            };

            let selector = VersionSelector::parse(registry_server_version.as_deref());
            if !visited.insert((registry_server_name.clone(), selector.clone())) {
                debug!(
                    agent = %agent.name,
                    server = %registry_server_name,
                    "skipping repeated manifest entry"
                );
                continue;
            }

            let server = self
                .catalog
                .find_server(registry_server_name, &selector)
                .await?
                .ok_or_else(|| ResolveError::ReferencedServerNotFound {
                    agent: agent.name.clone(),
                    name: registry_server_name.clone(),
                    version: selector.to_string(),
                })?;

            let mut request =
                McpServerRunRequest::new(format!("{agent_name}-{}", runtime_name(name)), server);
            request.prefer_remote = *registry_server_prefer_remote;
            request.namespace = namespace.map(str::to_owned);
            request.owner_agent = Some(agent_name.to_owned());
            resolved.push(request);
        }
        Ok(resolved)
    }
}

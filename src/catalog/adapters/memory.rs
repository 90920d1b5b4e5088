//! In-memory catalog used by tests and single-process setups.

use crate::catalog::{
    domain::{CatalogAgent, CatalogServer, VersionSelector},
    ports::{CatalogError, CatalogRepository, CatalogResult},
};
use async_trait::async_trait;
use semver::Version;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    servers: BTreeMap<String, Vec<CatalogServer>>,
    agents: BTreeMap<String, Vec<CatalogAgent>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orders versions by semver when both parse, otherwise lexically, with
/// semver versions ranked above free-form ones.
fn compare_versions(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(left_version), Ok(right_version)) => left_version.cmp(&right_version),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

fn select<'a, T>(
    entries: Option<&'a Vec<T>>,
    selector: &VersionSelector,
    version_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let candidates = entries?;
    match selector {
        VersionSelector::Exact(version) => candidates
            .iter()
            .find(|entry| version_of(entry) == version.as_str()),
        VersionSelector::Latest => candidates
            .iter()
            .max_by(|left, right| compare_versions(version_of(left), version_of(right))),
    }
}

fn lock_error(err: impl ToString) -> CatalogError {
    CatalogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn publish_server(&self, server: &CatalogServer) -> CatalogResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let versions = state.servers.entry(server.name.clone()).or_default();
        if versions.iter().any(|entry| entry.version == server.version) {
            return Err(CatalogError::DuplicateEntry {
                name: server.name.clone(),
                version: server.version.clone(),
            });
        }
        versions.push(server.clone());
        Ok(())
    }

    async fn publish_agent(&self, agent: &CatalogAgent) -> CatalogResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let versions = state.agents.entry(agent.name.clone()).or_default();
        if versions.iter().any(|entry| entry.version == agent.version) {
            return Err(CatalogError::DuplicateEntry {
                name: agent.name.clone(),
                version: agent.version.clone(),
            });
        }
        versions.push(agent.clone());
        Ok(())
    }

    async fn find_server(
        &self,
        name: &str,
        version: &VersionSelector,
    ) -> CatalogResult<Option<CatalogServer>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(select(state.servers.get(name), version, |server| server.version.as_str()).cloned())
    }

    async fn find_agent(
        &self,
        name: &str,
        version: &VersionSelector,
    ) -> CatalogResult<Option<CatalogAgent>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(select(state.agents.get(name), version, |agent| agent.version.as_str()).cloned())
    }
}

//! In-memory runtime adapters for tests and dry runs.

use crate::runtime::{
    domain::{ClusterResource, ResourceRef},
    ports::{
        ClusterClient, ClusterError, ClusterResult, ComposeError, ComposeInvocation,
        ComposeResult, ComposeRunner,
    },
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

/// Compose runner that records invocations instead of running anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingComposeRunner {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    invocations: Vec<ComposeInvocation>,
    failure: Option<String>,
}

impl RecordingComposeRunner {
    /// Creates a runner whose invocations succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner whose invocations fail with `stderr`.
    #[must_use]
    pub fn failing(stderr: impl Into<String>) -> Self {
        let runner = Self::default();
        runner.set_failure(Some(stderr.into()));
        runner
    }

    /// Makes later invocations fail with `stderr`, or succeed when `None`.
    pub fn set_failure(&self, stderr: Option<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = stderr;
        }
    }

    /// Returns the invocations seen so far, failed ones included.
    #[must_use]
    pub fn invocations(&self) -> Vec<ComposeInvocation> {
        self.state
            .lock()
            .map(|state| state.invocations.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ComposeRunner for RecordingComposeRunner {
    async fn up(&self, invocation: &ComposeInvocation) -> ComposeResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| ComposeError::runtime(std::io::Error::other(err.to_string())))?;
        state.invocations.push(invocation.clone());
        state.failure.as_ref().map_or(Ok(()), |stderr| {
            Err(ComposeError::Failed {
                status: "exit status: 1".to_owned(),
                stderr: stderr.clone(),
            })
        })
    }
}

/// Thread-safe in-memory cluster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClusterClient {
    objects: Arc<RwLock<BTreeMap<ResourceRef, ClusterResource>>>,
}

impl InMemoryClusterClient {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> ClusterError {
    ClusterError::api(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ClusterClient for InMemoryClusterClient {
    async fn apply(&self, resource: &ClusterResource) -> ClusterResult<()> {
        let mut objects = self.objects.write().map_err(lock_error)?;
        objects.insert(resource.resource_ref(), resource.clone());
        Ok(())
    }

    async fn list_all(&self) -> ClusterResult<Vec<ClusterResource>> {
        let objects = self.objects.read().map_err(lock_error)?;
        Ok(objects.values().cloned().collect())
    }

    async fn delete(&self, resource: &ResourceRef) -> ClusterResult<()> {
        let mut objects = self.objects.write().map_err(lock_error)?;
        objects
            .remove(resource)
            .map(|_| ())
            .ok_or_else(|| ClusterError::NotFound(resource.clone()))
    }
}

//! Container runtime port for compose projects.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for compose operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// One `up` invocation against a compose project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInvocation {
    /// Project name.
    pub project: String,
    /// Directory holding the project files.
    pub project_dir: PathBuf,
    /// Compose file path.
    pub compose_file: PathBuf,
}

impl ComposeInvocation {
    /// Arguments after the compose program: project selection, then a
    /// detached forced recreate that removes services no longer declared.
    ///
    /// The runtime is started inside `project_dir`, so a compose file under
    /// that directory is passed relative to it.
    #[must_use]
    pub fn up_args(&self) -> Vec<String> {
        let compose_file = self
            .compose_file
            .strip_prefix(&self.project_dir)
            .unwrap_or(&self.compose_file);
        vec![
            "-p".to_owned(),
            self.project.clone(),
            "-f".to_owned(),
            compose_file.display().to_string(),
            "up".to_owned(),
            "-d".to_owned(),
            "--force-recreate".to_owned(),
            "--remove-orphans".to_owned(),
        ]
    }
}

/// Applies compose projects.
#[async_trait]
pub trait ComposeRunner: Send + Sync {
    /// Recreates every service in the project and removes orphans.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] when the runtime cannot be started, exits
    /// unsuccessfully or times out.
    async fn up(&self, invocation: &ComposeInvocation) -> ComposeResult<()>;
}

/// Errors returned by compose runners.
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    /// The runtime process could not be started.
    #[error("failed to start compose: {0}")]
    Spawn(Arc<std::io::Error>),

    /// The runtime process exited unsuccessfully.
    #[error("compose exited with {status}: {stderr}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The runtime process did not finish in time and was killed.
    #[error("compose did not finish within {0:?}")]
    TimedOut(Duration),

    /// Any other runtime failure.
    #[error("compose runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ComposeError {
    /// Wraps an arbitrary runtime failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

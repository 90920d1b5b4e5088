//! Compose runner shelling out to the container runtime CLI.

use crate::config::RuntimeConfig;
use crate::runtime::ports::{ComposeError, ComposeInvocation, ComposeResult, ComposeRunner};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Runs `compose up` through an external program such as `docker compose`.
///
/// The child is killed when the returned future is dropped, so a cancelled
/// reconciliation does not leave the runtime CLI running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerComposeRunner {
    program: String,
    leading_args: Vec<String>,
    timeout: Option<Duration>,
}

impl DockerComposeRunner {
    /// Creates a runner from the configured compose command and timeout.
    ///
    /// An empty command falls back to `docker compose`.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        let (program, leading_args) = config.compose_command.split_first().map_or_else(
            || ("docker".to_owned(), vec!["compose".to_owned()]),
            |(program, rest)| (program.clone(), rest.to_vec()),
        );
        Self {
            program,
            leading_args,
            timeout: config.apply_timeout(),
        }
    }

    async fn wait(&self, child: Child) -> ComposeResult<Output> {
        let Some(limit) = self.timeout else {
            return child.wait_with_output().await.map_err(ComposeError::runtime);
        };
        tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| ComposeError::TimedOut(limit))?
            .map_err(ComposeError::runtime)
    }

    fn command(&self, invocation: &ComposeInvocation) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(invocation.up_args())
            .current_dir(&invocation.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ComposeRunner for DockerComposeRunner {
    async fn up(&self, invocation: &ComposeInvocation) -> ComposeResult<()> {
        debug!(
            program = %self.program,
            project = %invocation.project,
            dir = %invocation.project_dir.display(),
            "running compose up"
        );
        let child = self
            .command(invocation)
            .spawn()
            .map_err(|err| ComposeError::Spawn(Arc::new(err)))?;

        let output = self.wait(child).await?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        warn!(
            project = %invocation.project,
            status = %output.status,
            "compose up failed"
        );
        Err(ComposeError::Failed {
            status: output.status.to_string(),
            stderr,
        })
    }
}

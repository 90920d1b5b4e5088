//! Adapter implementations for runtime ports and the artifact directory.

mod compose;
mod memory;
mod workspace;

pub use compose::DockerComposeRunner;
pub use memory::{InMemoryClusterClient, RecordingComposeRunner};
pub use workspace::{ArtifactWorkspace, WorkspaceError};

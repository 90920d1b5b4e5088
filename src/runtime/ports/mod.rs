//! Port contracts for the container runtime and the cluster API.

mod cluster;
mod compose;

pub use cluster::{ClusterClient, ClusterError, ClusterResult};
pub use compose::{ComposeError, ComposeInvocation, ComposeResult, ComposeRunner};

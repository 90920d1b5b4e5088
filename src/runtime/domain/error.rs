//! Translation failures.

use thiserror::Error;

/// Errors raised while translating run requests or desired state.
///
/// Every variant is raised before any artifact is written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// A catalog name normalises to an empty runtime name.
    #[error("catalog name '{0}' does not yield a usable runtime name")]
    InvalidName(String),

    /// Two servers share a runtime name.
    #[error("duplicate MCP server name '{0}' in desired state")]
    DuplicateServerName(String),

    /// Two agents share a runtime name.
    #[error("duplicate agent name '{0}' in desired state")]
    DuplicateAgentName(String),

    /// Two local resources would share one compose service name.
    #[error("compose service name '{0}' is claimed by more than one resource")]
    ServiceNameConflict(String),

    /// A server has neither a package nor a remote endpoint.
    #[error("MCP server '{0}' has no package or remote endpoint to run")]
    NoDistribution(String),

    /// A local resource has no usable image.
    #[error("'{name}' requires a deployment image: {reason}")]
    MissingImage {
        /// Runtime name.
        name: String,
        /// What was missing.
        reason: String,
    },

    /// A local HTTP resource declares no port.
    #[error("'{0}' uses an HTTP transport and requires a target port")]
    MissingTargetPort(String),

    /// The platform cannot run remote agents.
    #[error("agent '{0}' is remote; remote agents are not supported on this platform")]
    UnsupportedRemoteAgent(String),

    /// An artifact could not be serialised.
    #[error("failed to serialise {artifact}: {message}")]
    Serialization {
        /// Artifact being written.
        artifact: &'static str,
        /// Serialiser message.
        message: String,
    },
}

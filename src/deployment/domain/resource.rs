//! Kinds of catalog resources a deployment can run.

use super::ParseResourceTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource referenced by a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// An MCP server.
    Mcp,
    /// An agent.
    Agent,
}

impl ResourceType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ResourceType {
    type Error = ParseResourceTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mcp" => Ok(Self::Mcp),
            "agent" => Ok(Self::Agent),
            _ => Err(ParseResourceTypeError(value.to_owned())),
        }
    }
}

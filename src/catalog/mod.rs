//! Catalog of published MCP servers and agents.
//!
//! The catalog is owned by the registry's versioned store; this module only
//! models the parts the deployment runtime reads: package definitions, remote
//! endpoints and agent manifests. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

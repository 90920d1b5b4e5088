//! Agentregistry: deployment runtime for a registry of AI resources.
//!
//! The registry catalogs MCP servers and agents and also runs them. This
//! crate turns persisted deployment records into running infrastructure:
//! records are resolved into run requests, translated into a
//! platform-neutral desired state, rendered into platform artifacts and
//! applied, either as a local compose project fronted by a gateway or as
//! cluster custom resources.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, processes, etc.)
//!
//! # Modules
//!
//! - [`catalog`]: Published server and agent definitions
//! - [`deployment`]: Deployment and provider records plus the deploy API
//! - [`runtime`]: Run-request resolution, translation and reconciliation
//! - [`platform`]: Platform adapter contract and registry
//! - [`config`]: Runtime configuration

pub mod catalog;
pub mod config;
pub mod deployment;
pub mod platform;
pub mod runtime;

//! Desired-state reconciliation for the built-in platforms.
//!
//! Deployment records are resolved into run requests, translated into a
//! platform-neutral [`domain::DesiredState`], rendered into platform
//! artifacts by the translators in [`translation`] and applied by the
//! [`services::Reconciler`] through the ports in [`ports`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod translation;

#[cfg(test)]
mod tests;

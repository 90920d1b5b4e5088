//! Adapter implementations for deployment and provider repository ports.

pub mod memory;
pub mod postgres;

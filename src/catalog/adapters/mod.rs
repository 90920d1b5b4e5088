//! Adapter implementations for catalog ports.

pub mod memory;

pub use memory::InMemoryCatalog;

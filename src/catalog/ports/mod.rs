//! Port contracts for catalog lookups.

mod repository;

pub use repository::{CatalogError, CatalogRepository, CatalogResult};

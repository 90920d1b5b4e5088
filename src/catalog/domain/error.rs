//! Error types for catalog domain validation.

use thiserror::Error;

/// Errors returned while constructing catalog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogDomainError {
    /// The catalog entry name is empty after trimming.
    #[error("catalog entry name must not be empty")]
    EmptyName,

    /// The catalog entry version is empty after trimming.
    #[error("catalog entry version must not be empty")]
    EmptyVersion,

    /// A package identifier is empty after trimming.
    #[error("package identifier must not be empty")]
    EmptyPackageIdentifier,

    /// A remote endpoint URL does not use an HTTP scheme.
    #[error("remote URL '{0}' must start with 'http://' or 'https://'")]
    InvalidRemoteUrl(String),
}

pub(crate) fn normalize_required(
    value: impl Into<String>,
    empty: CatalogDomainError,
) -> Result<String, CatalogDomainError> {
    let normalized = value.into().trim().to_owned();
    if normalized.is_empty() {
        return Err(empty);
    }
    Ok(normalized)
}

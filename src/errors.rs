//! Error types for the portal client.

use thiserror::Error;

/// Errors returned by the auth provider.
///
/// Every variant is user-facing: the sign-in/sign-up form renders the message
/// verbatim and stays open so the user can correct the input and retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Network error: {0}")]
    Network(String),

    /// Any other rejection from the provider (weak password, rate limit, ...),
    /// carrying the provider's own message.
    #[error("{0}")]
    Rejected(String),
}

/// Errors returned by the catalog interface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A list read failed. Callers recover with the static fallback dataset
    /// rather than surfacing an error dialog.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The access-log write failed. Swallowed after a diagnostic; never blocks
    /// or rolls back document viewing.
    #[error("Access log write failed: {0}")]
    LogFailure(String),
}

//! Tenant creation error types.

use thiserror::Error;

/// A result type using `TenantError`.
pub type Result<T> = std::result::Result<T, TenantError>;

/// Errors that can occur while creating a tenant.
#[derive(Debug, Error)]
pub enum TenantError {
    /// A tenant with the same name already exists upstream.
    #[error("tenant already exists: {0}")]
    AlreadyExists(String),

    /// The tenant service refused the request.
    #[error("tenant service rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error detail returned by the service.
        message: String,
    },

    /// The request could not be sent or the connection failed.
    #[error("tenant request failed: {0}")]
    Request(String),

    /// The service answered with a body that could not be parsed.
    #[error("invalid tenant service response: {0}")]
    InvalidResponse(String),

    /// Writing the tenant directly to the store failed.
    #[error("storage error: {0}")]
    Store(#[from] cte_migrate_store::StoreError),
}

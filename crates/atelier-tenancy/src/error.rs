//! Error types for tenant resolution and scoped storage
//!
//! Resolution failures are never retried automatically; they surface to
//! the caller immediately. Scoped-storage failures collapse to `NotFound`
//! so that a cross-tenant access attempt is indistinguishable from a
//! record that does not exist.

use thiserror::Error;

/// Tenant resolution error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No authenticated principal was supplied
    #[error("Unauthenticated")]
    Unauthenticated,

    /// No selector was supplied and the user does not belong to exactly
    /// one organization
    #[error("Ambiguous tenant: user belongs to {organization_count} organizations")]
    AmbiguousTenant {
        /// How many active organizations the user belongs to
        organization_count: usize,
    },

    /// The user has no active membership in the selected organization
    ///
    /// Also returned when the selected organization does not exist or is
    /// inactive; the distinction is never exposed.
    #[error("Not a member of the selected organization")]
    NotAMember,
}

impl ResolveError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::Unauthenticated => "UNAUTHENTICATED",
            ResolveError::AmbiguousTenant { .. } => "AMBIGUOUS_TENANT",
            ResolveError::NotAMember => "NOT_A_MEMBER",
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::Unauthenticated => 401,
            ResolveError::AmbiguousTenant { .. } => 400,
            ResolveError::NotAMember => 403,
        }
    }
}

/// Result type for tenant resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Scoped-storage error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The record does not exist within the resolved tenant
    ///
    /// Deliberately covers both "never existed" and "exists in another
    /// organization"; existence in other tenants must not leak.
    #[error("Not found")]
    NotFound,
}

impl AccessError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::NotFound => "NOT_FOUND",
        }
    }
}

/// Result type for scoped-storage operations.
pub type AccessResult<T> = Result<T, AccessError>;

//! Error types for admission control
//!
//! The taxonomy distinguishes the terminal `QuotaExceeded` from the
//! transient `RateLimited`; callers need that distinction to decide
//! whether retrying later is meaningful.

use thiserror::Error;
use uuid::Uuid;

/// The rate window that rejected an admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    /// Trailing 60 seconds
    Minute,
    /// Trailing 3600 seconds
    Hour,
}

impl RateWindow {
    /// Window length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            RateWindow::Minute => 60,
            RateWindow::Hour => 3600,
        }
    }

    /// Get string representation of the window.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateWindow::Minute => "minute",
            RateWindow::Hour => "hour",
        }
    }
}

impl std::fmt::Display for RateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admission error types.
///
/// A rejected admission never consumes quota or rate budget, whatever
/// the reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Absolute quota reached; terminal until the limit is raised
    #[error("Generation quota exceeded: {used}/{limit} used, {requested} requested")]
    QuotaExceeded {
        /// Generations already consumed
        used: u64,
        /// Absolute generation limit
        limit: u64,
        /// Units this attempt requested
        requested: u64,
    },

    /// Rate window full; clears when the window rolls forward
    #[error("Rate limited: per-{window} window is full")]
    RateLimited {
        /// Which window rejected the attempt
        window: RateWindow,
    },

    /// The selected provider is inactive or unknown
    #[error("Provider unavailable")]
    ProviderUnavailable,

    /// The organization was never registered with the usage ledger
    ///
    /// Indicates a caller bug: admission was reached without tenant
    /// resolution seeding the ledger.
    #[error("Unknown organization: {0}")]
    UnknownOrganization(Uuid),
}

impl AdmissionError {
    /// Check whether a well-behaved caller may retry after backoff.
    ///
    /// Only `RateLimited` clears on its own; `QuotaExceeded` and
    /// `ProviderUnavailable` require an external state change (raising
    /// the quota, re-activating a provider).
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::RateLimited { .. })
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AdmissionError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            AdmissionError::RateLimited { .. } => "RATE_LIMITED",
            AdmissionError::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            AdmissionError::UnknownOrganization(_) => "UNKNOWN_ORGANIZATION",
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AdmissionError::QuotaExceeded { .. } => 402,
            AdmissionError::RateLimited { .. } => 429,
            AdmissionError::ProviderUnavailable => 503,
            AdmissionError::UnknownOrganization(_) => 500,
        }
    }
}

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

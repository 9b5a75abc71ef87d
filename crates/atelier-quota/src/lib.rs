//! # Atelier Quota
//!
//! Generation quota and rate-limit admission control for the Atelier
//! platform.
//!
//! ## Overview
//!
//! The atelier-quota crate handles:
//! - **Providers**: The external metered AI backends, each with its own
//!   per-organization rate limits and a failover priority
//! - **Usage ledger**: The absolute per-organization generation quota,
//!   enforced by an atomic compare-and-increment
//! - **Rate counters**: Continuously sliding per-minute and per-hour
//!   windows, kept per (organization, provider) pair
//! - **Admission**: The [`AdmissionController`] gate every metered
//!   generation passes through before a provider is called
//!
//! ## Decision order
//!
//! ```text
//! admit ─→ provider active? ──no──→ ProviderUnavailable
//!             │ yes
//!             ▼
//!          rate windows ──full──→ RateLimited        (retryable)
//!             │ room (slot reserved)
//!             ▼
//!          quota ledger ──over──→ QuotaExceeded      (slot cancelled)
//!             │ headroom
//!             ▼
//!          Admission
//! ```
//!
//! A rejection at any stage leaves every counter as it was: the quota
//! counter is only ever incremented by a granted admission, and a rate
//! slot taken ahead of a quota rejection is cancelled.

pub mod admission;
pub mod error;
pub mod ledger;
pub mod provider;
pub mod rate;

// Re-export main types for convenience
pub use admission::{Admission, AdmissionController, AdmissionStats};
pub use error::{AdmissionError, AdmissionResult, RateWindow};
pub use ledger::{MemoryUsageLedger, UsageLedger, UsageSnapshot};
pub use provider::{ProviderDirectory, ResourceProvider};
pub use rate::{MemoryRateCounter, RateCounter, RateLimits, RateReservation};

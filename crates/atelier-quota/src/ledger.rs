//! Usage ledger
//!
//! The durable counter behind the absolute generation quota. The core
//! operation is `try_consume`: a single atomic compare-and-increment
//! that either admits the requested units and records them, or rejects
//! without mutating anything. Two concurrent requests can never both be
//! admitted when only one unit of headroom remains.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use atelier_org::Organization;

use crate::error::{AdmissionError, AdmissionResult};

/// A point-in-time view of an organization's quota counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    /// Generations consumed
    pub used: u64,
    /// Absolute generation limit
    pub limit: u64,
}

impl UsageSnapshot {
    /// Units remaining before the quota is reached.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Durable quota counter per organization.
///
/// Implementations must make `try_consume` atomic with respect to the
/// counter: a single conditional update, never a read followed by a
/// separate write. `generations_used` is monotonic: nothing decrements
/// it, and rejected attempts leave it untouched.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Atomically consume `units` if headroom allows.
    ///
    /// # Returns
    ///
    /// The snapshot *after* the increment on success;
    /// `QuotaExceeded` (with the unchanged counters) on insufficient
    /// headroom; `UnknownOrganization` if the organization was never
    /// registered.
    async fn try_consume(&self, organization_id: Uuid, units: u64) -> AdmissionResult<UsageSnapshot>;

    /// Read the current counter without consuming.
    async fn usage(&self, organization_id: Uuid) -> AdmissionResult<UsageSnapshot>;

    /// Raise (or lower) the absolute limit.
    ///
    /// Raising the limit is the only way a `QuotaExceeded` organization
    /// regains admission.
    async fn set_limit(&self, organization_id: Uuid, limit: u64) -> AdmissionResult<()>;
}

/// In-memory usage ledger.
///
/// One mutex guards the counters, making `try_consume` a true
/// compare-and-increment. A production deployment maps this to a
/// conditional `UPDATE ... SET used = used + $n WHERE used + $n <= limit`
/// on the organization row.
#[derive(Default)]
pub struct MemoryUsageLedger {
    /// Counters by organization
    counters: Arc<Mutex<HashMap<Uuid, UsageSnapshot>>>,
}

impl std::fmt::Debug for MemoryUsageLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUsageLedger").finish()
    }
}

impl MemoryUsageLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger from an organization's durable record.
    pub async fn register(&self, organization: &Organization) {
        self.counters.lock().await.insert(
            organization.id,
            UsageSnapshot {
                used: organization.generations_used,
                limit: organization.generation_limit,
            },
        );
    }
}

#[async_trait]
impl UsageLedger for MemoryUsageLedger {
    async fn try_consume(
        &self,
        organization_id: Uuid,
        units: u64,
    ) -> AdmissionResult<UsageSnapshot> {
        let mut counters = self.counters.lock().await;
        let counter = counters
            .get_mut(&organization_id)
            .ok_or(AdmissionError::UnknownOrganization(organization_id))?;

        let proposed = counter.used.saturating_add(units);
        if proposed > counter.limit {
            return Err(AdmissionError::QuotaExceeded {
                used: counter.used,
                limit: counter.limit,
                requested: units,
            });
        }

        counter.used = proposed;
        Ok(*counter)
    }

    async fn usage(&self, organization_id: Uuid) -> AdmissionResult<UsageSnapshot> {
        self.counters
            .lock()
            .await
            .get(&organization_id)
            .copied()
            .ok_or(AdmissionError::UnknownOrganization(organization_id))
    }

    async fn set_limit(&self, organization_id: Uuid, limit: u64) -> AdmissionResult<()> {
        let mut counters = self.counters.lock().await;
        let counter = counters
            .get_mut(&organization_id)
            .ok_or(AdmissionError::UnknownOrganization(organization_id))?;
        counter.limit = limit;
        tracing::debug!(
            organization_id = %organization_id,
            limit,
            "Generation limit updated"
        );
        Ok(())
    }
}

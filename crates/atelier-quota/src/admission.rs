//! Admission controller
//!
//! The single gate every metered generation passes through before any
//! provider call is made. Checks run cheapest-and-reversible first:
//!
//! 1. provider liveness (no state touched)
//! 2. rate windows (`try_reserve`, cancellable)
//! 3. absolute quota (`try_consume`, the irreversible step)
//!
//! If the quota rejects after a rate slot was taken, the slot is
//! cancelled; the quota counter itself is never decremented, so
//! `generations_used` stays monotonic and a rejected request leaves
//! every counter exactly as it found it.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AdmissionError, AdmissionResult};
use crate::ledger::{UsageLedger, UsageSnapshot};
use crate::provider::ProviderDirectory;
use crate::rate::{RateCounter, RateLimits};

/// A granted admission: proof that quota and rate budget were consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Organization the consumption was charged to
    pub organization_id: Uuid,
    /// Provider the consumption was attributed to
    pub provider_id: Uuid,
    /// Units consumed
    pub units: u64,
    /// Quota counter after the consumption
    pub usage: UsageSnapshot,
    /// When the admission was granted
    pub admitted_at: DateTime<Utc>,
}

/// Admission decision counters.
#[derive(Debug, Default)]
pub struct AdmissionStats {
    /// Requests admitted
    pub admitted: AtomicU64,
    /// Requests rejected by the absolute quota
    pub rejected_quota: AtomicU64,
    /// Requests rejected by a rate window
    pub rejected_rate: AtomicU64,
    /// Requests rejected because the provider was unavailable
    pub rejected_provider: AtomicU64,
}

impl AdmissionStats {
    fn record(&self, outcome: &AdmissionResult<Admission>) {
        match outcome {
            Ok(_) => self.admitted.fetch_add(1, Ordering::Relaxed),
            Err(AdmissionError::QuotaExceeded { .. }) => {
                self.rejected_quota.fetch_add(1, Ordering::Relaxed)
            }
            Err(AdmissionError::RateLimited { .. }) => {
                self.rejected_rate.fetch_add(1, Ordering::Relaxed)
            }
            Err(AdmissionError::ProviderUnavailable) => {
                self.rejected_provider.fetch_add(1, Ordering::Relaxed)
            }
            Err(AdmissionError::UnknownOrganization(_)) => 0,
        };
    }
}

/// Gatekeeper combining the provider directory, the usage ledger and
/// the rate counters.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use atelier_org::Organization;
/// use atelier_quota::{
///     AdmissionController, MemoryRateCounter, MemoryUsageLedger,
///     ProviderDirectory, ResourceProvider,
/// };
/// use uuid::Uuid;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let ledger = Arc::new(MemoryUsageLedger::new());
/// let org = Organization::new("Studio", "studio", Uuid::now_v7());
/// ledger.register(&org).await;
///
/// let providers = ProviderDirectory::new();
/// let provider = ResourceProvider::new("Flux Renderer", "flux");
/// let provider_id = provider.id;
/// providers.register(provider).await;
///
/// let controller = AdmissionController::new(
///     Arc::new(providers),
///     ledger,
///     Arc::new(MemoryRateCounter::new()),
/// );
/// let admission = controller.admit(org.id, provider_id, 1).await.unwrap();
/// assert_eq!(admission.usage.used, 1);
/// # });
/// ```
pub struct AdmissionController {
    /// Registered generation providers
    providers: Arc<ProviderDirectory>,
    /// Absolute quota counters
    ledger: Arc<dyn UsageLedger>,
    /// Sliding-window rate counters
    rates: Arc<dyn RateCounter>,
    /// Decision counters
    stats: AdmissionStats,
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("stats", &self.stats)
            .finish()
    }
}

impl AdmissionController {
    /// Creates a new controller over the given stores.
    pub fn new(
        providers: Arc<ProviderDirectory>,
        ledger: Arc<dyn UsageLedger>,
        rates: Arc<dyn RateCounter>,
    ) -> Self {
        Self {
            providers,
            ledger,
            rates,
            stats: AdmissionStats::default(),
        }
    }

    /// Admit `units` of consumption against a specific provider.
    ///
    /// On success the quota counter and the provider's rate windows
    /// have both recorded the consumption. On any rejection, nothing
    /// has been consumed.
    pub async fn admit(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        units: u64,
    ) -> AdmissionResult<Admission> {
        self.admit_at(organization_id, provider_id, units, Utc::now())
            .await
    }

    /// [`admit`](Self::admit) with an explicit clock, so rate windows
    /// can be exercised deterministically.
    pub async fn admit_at(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        units: u64,
        now: DateTime<Utc>,
    ) -> AdmissionResult<Admission> {
        let outcome = self
            .decide(organization_id, provider_id, units, now)
            .await;
        self.stats.record(&outcome);

        match &outcome {
            Ok(admission) => {
                tracing::debug!(
                    organization_id = %organization_id,
                    provider_id = %provider_id,
                    units,
                    used = admission.usage.used,
                    limit = admission.usage.limit,
                    "Admission granted"
                );
            }
            Err(error) => {
                tracing::warn!(
                    organization_id = %organization_id,
                    provider_id = %provider_id,
                    units,
                    code = error.error_code(),
                    "Admission rejected"
                );
            }
        }
        outcome
    }

    /// Admit against the first active provider (in failover order)
    /// whose rate windows have room.
    ///
    /// Providers whose windows are full are skipped; the quota check
    /// runs once, against the provider that accepted the rate slot.
    /// With no active provider at all, the result is
    /// `ProviderUnavailable`; with every active provider rate-limited,
    /// the tightest rejection (the last provider's) is returned.
    pub async fn admit_any(
        &self,
        organization_id: Uuid,
        units: u64,
    ) -> AdmissionResult<Admission> {
        let now = Utc::now();
        let active = self.providers.active_providers().await;
        let mut last_error = AdmissionError::ProviderUnavailable;

        for provider in active {
            match self
                .admit_at(organization_id, provider.id, units, now)
                .await
            {
                Ok(admission) => return Ok(admission),
                // Quota rejection applies to every provider alike.
                Err(err @ AdmissionError::QuotaExceeded { .. }) => return Err(err),
                Err(err @ AdmissionError::UnknownOrganization(_)) => return Err(err),
                Err(err) => last_error = err,
            }
        }

        Err(last_error)
    }

    /// Current quota counter for an organization.
    pub async fn usage(&self, organization_id: Uuid) -> AdmissionResult<UsageSnapshot> {
        self.ledger.usage(organization_id).await
    }

    /// Decision counters since construction.
    pub fn stats(&self) -> &AdmissionStats {
        &self.stats
    }

    async fn decide(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        units: u64,
        now: DateTime<Utc>,
    ) -> AdmissionResult<Admission> {
        // 1. Provider liveness. Unknown and inactive are reported the
        //    same way; callers cannot probe the directory through
        //    admission errors.
        let provider = self
            .providers
            .get(provider_id)
            .await
            .filter(|p| p.is_active)
            .ok_or(AdmissionError::ProviderUnavailable)?;

        // 2. Rate windows, reversibly.
        let limits = RateLimits {
            per_minute: provider.rate_limit_per_minute,
            per_hour: provider.rate_limit_per_hour,
        };
        let reservation = self
            .rates
            .try_reserve(organization_id, provider_id, limits, now)
            .await?;

        // 3. Absolute quota, the irreversible step. On rejection the
        //    rate slot is handed back; the quota counter was never
        //    touched.
        match self.ledger.try_consume(organization_id, units).await {
            Ok(usage) => Ok(Admission {
                organization_id,
                provider_id,
                units,
                usage,
                admitted_at: now,
            }),
            Err(err) => {
                self.rates.cancel(reservation).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryUsageLedger;
    use crate::provider::ResourceProvider;
    use crate::rate::MemoryRateCounter;
    use atelier_org::Organization;

    struct Fixture {
        controller: AdmissionController,
        providers: Arc<ProviderDirectory>,
        org_id: Uuid,
        provider_id: Uuid,
    }

    async fn fixture(limit: u64, per_minute: u32, per_hour: u32) -> Fixture {
        let ledger = Arc::new(MemoryUsageLedger::new());
        let org = Organization::new("Studio", "studio", Uuid::now_v7())
            .with_generation_limit(limit);
        ledger.register(&org).await;

        let providers = Arc::new(ProviderDirectory::new());
        let provider =
            ResourceProvider::new("Flux Renderer", "flux").with_rate_limits(per_minute, per_hour);
        let provider_id = provider.id;
        providers.register(provider).await;

        Fixture {
            controller: AdmissionController::new(
                providers.clone(),
                ledger,
                Arc::new(MemoryRateCounter::new()),
            ),
            providers,
            org_id: org.id,
            provider_id,
        }
    }

    #[tokio::test]
    async fn test_admit_within_quota() {
        let f = fixture(3, 100, 1000).await;

        for expected in 1..=3u64 {
            let admission = f.controller.admit(f.org_id, f.provider_id, 1).await.unwrap();
            assert_eq!(admission.usage.used, expected);
        }
        assert!(matches!(
            f.controller.admit(f.org_id, f.provider_id, 1).await,
            Err(AdmissionError::QuotaExceeded { used: 3, limit: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_inactive_provider_consumes_nothing() {
        let f = fixture(10, 100, 1000).await;
        f.providers.deactivate(f.provider_id).await;

        assert_eq!(
            f.controller.admit(f.org_id, f.provider_id, 1).await,
            Err(AdmissionError::ProviderUnavailable)
        );
        assert_eq!(f.controller.usage(f.org_id).await.unwrap().used, 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unavailable() {
        let f = fixture(10, 100, 1000).await;
        assert_eq!(
            f.controller.admit(f.org_id, Uuid::now_v7(), 1).await,
            Err(AdmissionError::ProviderUnavailable)
        );
    }

    #[tokio::test]
    async fn test_quota_rejection_returns_rate_slot() {
        let f = fixture(1, 2, 1000).await;
        let now = Utc::now();

        f.controller
            .admit_at(f.org_id, f.provider_id, 1, now)
            .await
            .unwrap();

        // Quota is exhausted; the rate slot taken by each attempt is
        // handed back, so rejections never pile up in the windows.
        for _ in 0..5 {
            assert!(matches!(
                f.controller.admit_at(f.org_id, f.provider_id, 1, now).await,
                Err(AdmissionError::QuotaExceeded { .. })
            ));
        }
        // With per_minute = 2 and one real admission recorded, a third
        // admission would have been RateLimited had the slots leaked.
    }

    #[tokio::test]
    async fn test_rate_limited_before_quota() {
        let f = fixture(100, 2, 1000).await;
        let now = Utc::now();

        f.controller.admit_at(f.org_id, f.provider_id, 1, now).await.unwrap();
        f.controller.admit_at(f.org_id, f.provider_id, 1, now).await.unwrap();

        assert!(matches!(
            f.controller.admit_at(f.org_id, f.provider_id, 1, now).await,
            Err(AdmissionError::RateLimited { .. })
        ));
        // The rejected attempt consumed no quota.
        assert_eq!(f.controller.usage(f.org_id).await.unwrap().used, 2);
    }

    #[tokio::test]
    async fn test_admit_any_fails_over() {
        let f = fixture(100, 1, 1000).await;
        let fallback = ResourceProvider::new("Fallback", "fallback")
            .with_rate_limits(10, 1000)
            .with_priority(200);
        let fallback_id = fallback.id;
        f.providers.register(fallback).await;

        // First admission lands on the primary (priority 100).
        let first = f.controller.admit_any(f.org_id, 1).await.unwrap();
        assert_eq!(first.provider_id, f.provider_id);

        // Primary's minute window is now full; the fallback absorbs.
        let second = f.controller.admit_any(f.org_id, 1).await.unwrap();
        assert_eq!(second.provider_id, fallback_id);
    }

    #[tokio::test]
    async fn test_admit_any_with_no_active_providers() {
        let f = fixture(100, 10, 1000).await;
        f.providers.deactivate(f.provider_id).await;

        assert_eq!(
            f.controller.admit_any(f.org_id, 1).await,
            Err(AdmissionError::ProviderUnavailable)
        );
    }

    #[tokio::test]
    async fn test_stats_track_decisions() {
        let f = fixture(1, 1, 1000).await;
        let now = Utc::now();

        f.controller.admit_at(f.org_id, f.provider_id, 1, now).await.unwrap();
        let _ = f.controller.admit_at(f.org_id, f.provider_id, 1, now).await;
        f.providers.deactivate(f.provider_id).await;
        let _ = f.controller.admit_at(f.org_id, f.provider_id, 1, now).await;

        let stats = f.controller.stats();
        assert_eq!(stats.admitted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.rejected_rate.load(Ordering::Relaxed), 1);
        assert_eq!(stats.rejected_provider.load(Ordering::Relaxed), 1);
    }
}

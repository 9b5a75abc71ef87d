//! Sliding-window rate counters
//!
//! Per-(organization, provider) trailing windows over admitted
//! consumptions. Windows slide continuously: an admission at 12:00:30
//! stops counting against the minute window at 12:01:30, not at the
//! top of the next minute.
//!
//! `try_reserve` is the atomic check-and-record: under one lock it
//! prunes expired timestamps, checks both windows, and records the new
//! admission. A reservation can be cancelled if a later admission stage
//! rejects, so a rate slot is never burned by a request that did not
//! ultimately consume quota.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AdmissionError, AdmissionResult, RateWindow};

/// Per-provider rate limits applied to each organization independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    /// Admissions allowed in any trailing 60 seconds
    pub per_minute: u32,
    /// Admissions allowed in any trailing 3600 seconds
    pub per_hour: u32,
}

/// Proof of a recorded rate slot, returned by a successful reserve.
///
/// Handed back to [`RateCounter::cancel`] when a later admission stage
/// rejects the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateReservation {
    /// Organization the slot was recorded against
    pub organization_id: Uuid,
    /// Provider the slot was recorded against
    pub provider_id: Uuid,
    /// Timestamp recorded in the windows
    pub recorded_at: DateTime<Utc>,
}

/// Sliding-window admission counter.
///
/// One timeline per (organization, provider) pair; organizations never
/// share rate budget, and neither do providers.
#[async_trait]
pub trait RateCounter: Send + Sync {
    /// Atomically check both windows and record the admission.
    ///
    /// Rejection must leave the windows untouched so a rejected request
    /// does not hasten the rejection of the next one. The minute window
    /// is checked before the hour window.
    async fn try_reserve(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        limits: RateLimits,
        now: DateTime<Utc>,
    ) -> AdmissionResult<RateReservation>;

    /// Remove a previously recorded admission.
    ///
    /// Used when a later stage (the quota ledger) rejects after the
    /// rate slot was already taken.
    async fn cancel(&self, reservation: RateReservation);

    /// Admissions currently inside the given window.
    async fn count_in_window(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        window: RateWindow,
        now: DateTime<Utc>,
    ) -> usize;
}

/// In-memory sliding-window counter.
///
/// Keeps one timestamp deque per (organization, provider) pair.
/// Timestamps older than the hour window are pruned on every reserve,
/// so a pair's memory is bounded by its hourly limit.
#[derive(Default)]
pub struct MemoryRateCounter {
    /// Admission timestamps keyed by (organization, provider)
    windows: Arc<Mutex<HashMap<(Uuid, Uuid), VecDeque<DateTime<Utc>>>>>,
}

impl std::fmt::Debug for MemoryRateCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRateCounter").finish()
    }
}

impl MemoryRateCounter {
    /// Create a new empty counter.
    pub fn new() -> Self {
        Self::default()
    }
}

fn prune(timeline: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    let horizon = now - Duration::seconds(RateWindow::Hour.seconds());
    while timeline.front().is_some_and(|t| *t <= horizon) {
        timeline.pop_front();
    }
}

fn count_since(timeline: &VecDeque<DateTime<Utc>>, now: DateTime<Utc>, window: RateWindow) -> usize {
    let horizon = now - Duration::seconds(window.seconds());
    timeline.iter().filter(|t| **t > horizon).count()
}

#[async_trait]
impl RateCounter for MemoryRateCounter {
    async fn try_reserve(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        limits: RateLimits,
        now: DateTime<Utc>,
    ) -> AdmissionResult<RateReservation> {
        let mut windows = self.windows.lock().await;
        let timeline = windows.entry((organization_id, provider_id)).or_default();
        prune(timeline, now);

        if count_since(timeline, now, RateWindow::Minute) >= limits.per_minute as usize {
            return Err(AdmissionError::RateLimited {
                window: RateWindow::Minute,
            });
        }
        if count_since(timeline, now, RateWindow::Hour) >= limits.per_hour as usize {
            return Err(AdmissionError::RateLimited {
                window: RateWindow::Hour,
            });
        }

        timeline.push_back(now);
        Ok(RateReservation {
            organization_id,
            provider_id,
            recorded_at: now,
        })
    }

    async fn cancel(&self, reservation: RateReservation) {
        let mut windows = self.windows.lock().await;
        if let Some(timeline) = windows.get_mut(&(
            reservation.organization_id,
            reservation.provider_id,
        )) {
            // Remove one matching timestamp; duplicates from other
            // requests in the same instant keep their slots.
            if let Some(pos) = timeline.iter().position(|t| *t == reservation.recorded_at) {
                timeline.remove(pos);
            }
        }
    }

    async fn count_in_window(
        &self,
        organization_id: Uuid,
        provider_id: Uuid,
        window: RateWindow,
        now: DateTime<Utc>,
    ) -> usize {
        let mut windows = self.windows.lock().await;
        match windows.get_mut(&(organization_id, provider_id)) {
            Some(timeline) => {
                prune(timeline, now);
                count_since(timeline, now, window)
            }
            None => 0,
        }
    }
}

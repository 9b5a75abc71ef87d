//! Generation providers
//!
//! This module models the external metered AI backends and a directory
//! for looking them up. Each admitted consumption is attributed to
//! exactly one provider for its rate windows; an inactive provider
//! rejects admission without burning any allowance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An external AI generation backend with its own rate limits.
///
/// # Examples
///
/// ```
/// use atelier_quota::ResourceProvider;
///
/// let provider = ResourceProvider::new("Flux Renderer", "flux")
///     .with_rate_limits(10, 200);
/// assert!(provider.is_active);
/// assert_eq!(provider.rate_limit_per_minute, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceProvider {
    /// Unique identifier for the provider
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug
    pub slug: String,

    /// Admitted consumptions allowed in any trailing 60 seconds,
    /// per organization
    pub rate_limit_per_minute: u32,

    /// Admitted consumptions allowed in any trailing 3600 seconds,
    /// per organization
    pub rate_limit_per_hour: u32,

    /// Whether the provider accepts new consumptions
    pub is_active: bool,

    /// Failover ordering; lower values are tried first
    pub priority: u32,

    /// When the provider was registered
    pub created_at: DateTime<Utc>,

    /// When the provider was last updated
    pub updated_at: DateTime<Utc>,
}

impl ResourceProvider {
    /// Creates a new active provider with conservative default limits.
    ///
    /// # Arguments
    ///
    /// * `name` - The provider name
    /// * `slug` - URL-friendly slug
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            rate_limit_per_minute: 10,
            rate_limit_per_hour: 100,
            is_active: true,
            priority: 100,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the per-minute and per-hour rate limits.
    pub fn with_rate_limits(mut self, per_minute: u32, per_hour: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self.rate_limit_per_hour = per_hour;
        self.updated_at = Utc::now();
        self
    }

    /// Set the failover priority (lower is tried first).
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self.updated_at = Utc::now();
        self
    }
}

/// Directory of registered generation providers.
///
/// Providers are read-dominant; activation flips are the only writes
/// after registration.
#[derive(Default)]
pub struct ProviderDirectory {
    /// Providers by ID
    providers: Arc<RwLock<HashMap<Uuid, ResourceProvider>>>,
}

impl std::fmt::Debug for ProviderDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDirectory").finish()
    }
}

impl ProviderDirectory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    pub async fn register(&self, provider: ResourceProvider) {
        tracing::debug!(
            provider_id = %provider.id,
            slug = %provider.slug,
            "Provider registered"
        );
        self.providers.write().await.insert(provider.id, provider);
    }

    /// Look up a provider by ID.
    pub async fn get(&self, provider_id: Uuid) -> Option<ResourceProvider> {
        self.providers.read().await.get(&provider_id).cloned()
    }

    /// Mark a provider inactive. Admissions against it are rejected
    /// with `ProviderUnavailable` until it is re-activated.
    pub async fn deactivate(&self, provider_id: Uuid) {
        if let Some(provider) = self.providers.write().await.get_mut(&provider_id) {
            provider.is_active = false;
            provider.updated_at = Utc::now();
            tracing::warn!(provider_id = %provider_id, "Provider deactivated");
        }
    }

    /// Re-activate a provider.
    pub async fn activate(&self, provider_id: Uuid) {
        if let Some(provider) = self.providers.write().await.get_mut(&provider_id) {
            provider.is_active = true;
            provider.updated_at = Utc::now();
            tracing::debug!(provider_id = %provider_id, "Provider activated");
        }
    }

    /// Active providers in failover order (ascending priority).
    ///
    /// Callers failing over between backends walk this list, admitting
    /// against each provider's own windows.
    pub async fn active_providers(&self) -> Vec<ResourceProvider> {
        let mut active: Vec<ResourceProvider> = self
            .providers
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.priority);
        active
    }
}

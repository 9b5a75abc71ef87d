//! Organization domain models
//!
//! This module provides the core Organization entity. Organizations are
//! the top-level tenant entities; every piece of business data and every
//! metered consumption is scoped to exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::tiers::Tier;

/// An organization represents a tenant in the multi-tenant system.
///
/// Users can belong to multiple organizations with different roles.
/// Each organization carries its subscription tier and its AI generation
/// allowance: an absolute `generation_limit` and a monotonically increasing
/// `generations_used` counter.
///
/// The counter invariant `generations_used <= generation_limit` is enforced
/// at consumption time by the usage ledger (a single atomic
/// compare-and-increment), never by read-then-write at call sites. The
/// fields here are the durable record the ledger is seeded from.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use atelier_org::Organization;
///
/// let owner_id = Uuid::now_v7();
/// let org = Organization::new("Acme Studio", "acme-studio", owner_id);
/// assert_eq!(org.name, "Acme Studio");
/// assert!(org.is_active);
/// assert_eq!(org.generations_used, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique across platform)
    pub slug: String,

    /// Optional description
    pub description: Option<String>,

    /// Logo URL for branding
    pub logo_url: Option<String>,

    /// Subscription tier for feature gating
    pub tier: Tier,

    /// Owner user ID (the user who created the org)
    pub owner_id: Uuid,

    /// Absolute AI generation ceiling for the current billing cycle
    pub generation_limit: u64,

    /// Generations consumed so far (monotonically increasing)
    pub generations_used: u64,

    /// Whether the organization is active
    pub is_active: bool,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Organization {
    /// Creates a new organization on the default (Free) tier.
    ///
    /// The organization is created with:
    /// - A newly generated UUID v7 ID
    /// - `generation_limit` seeded from the tier's allowance
    /// - Zero usage and active status
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `slug` - URL-friendly slug (must be unique)
    /// * `owner_id` - The user ID who owns this organization
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use atelier_org::{Organization, Tier};
    ///
    /// let org = Organization::new("Acme Studio", "acme-studio", Uuid::now_v7());
    /// assert_eq!(org.tier, Tier::Free);
    /// assert_eq!(org.generation_limit, Tier::Free.default_generation_limit());
    /// ```
    pub fn new(name: impl Into<String>, slug: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        let tier = Tier::default();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            logo_url: None,
            tier,
            owner_id,
            generation_limit: tier.default_generation_limit(),
            generations_used: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    /// Set the subscription tier, re-seeding the generation limit from it.
    ///
    /// # Arguments
    ///
    /// * `tier` - The tier to move the organization to
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self.generation_limit = tier.default_generation_limit();
        self.updated_at = Utc::now();
        self
    }

    /// Override the absolute generation limit.
    ///
    /// Used for negotiated limits that differ from the tier default.
    pub fn with_generation_limit(mut self, limit: u64) -> Self {
        self.generation_limit = limit;
        self.updated_at = Utc::now();
        self
    }

    /// Generations remaining before the absolute quota is reached.
    pub fn remaining_generations(&self) -> u64 {
        self.generation_limit.saturating_sub(self.generations_used)
    }

    /// Check whether the recorded usage leaves headroom for `units`.
    ///
    /// This is a read of the durable record, not an admission decision;
    /// admission goes through the usage ledger's atomic consume.
    pub fn has_generation_headroom(&self, units: u64) -> bool {
        self.generations_used.saturating_add(units) <= self.generation_limit
    }

    /// Get the maximum number of members allowed for this tier.
    ///
    /// # Returns
    ///
    /// Maximum number of members, with `u32::MAX` representing unlimited
    pub fn max_members(&self) -> u32 {
        self.tier.limits().members.unwrap_or(u32::MAX)
    }
}

/// Summary of an organization for list displays.
///
/// Lightweight representation including the requesting user's role and
/// aggregated usage, for organization-switcher UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    /// Organization ID
    pub id: Uuid,

    /// Organization name
    pub name: String,

    /// Slug
    pub slug: String,

    /// Tier
    pub tier: Tier,

    /// User's role in this organization
    pub user_role: crate::roles::OrganizationRole,

    /// Generations consumed this cycle
    pub generations_used: u64,

    /// Absolute generation limit
    pub generation_limit: u64,

    /// Number of active members
    pub member_count: u32,
}

//! Subscription tiers and feature limits
//!
//! This module defines the subscription tiers available on the platform
//! and the usage limits associated with each tier. The tier's generation
//! allowance seeds a new organization's `generation_limit`.

use serde::{Deserialize, Serialize};

/// Subscription tier for an organization.
///
/// Tiers determine feature access and usage limits, most importantly the
/// AI generation allowance per billing cycle.
///
/// # Examples
///
/// ```
/// use atelier_org::Tier;
///
/// let tier = Tier::Studio;
/// let limits = tier.limits();
/// assert_eq!(limits.members, Some(10));
/// assert_eq!(limits.generations_per_cycle, Some(500));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Free tier for individuals trying the product
    Free,

    /// Small design studios
    Studio,

    /// Agencies with multiple teams
    Agency,

    /// Enterprise contracts with negotiated limits
    Enterprise,
}

impl Tier {
    /// Get the feature limits for this tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_org::Tier;
    ///
    /// let limits = Tier::Free.limits();
    /// assert_eq!(limits.members, Some(1));
    /// assert_eq!(limits.generations_per_cycle, Some(25));
    /// ```
    pub fn limits(&self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                members: Some(1),
                generations_per_cycle: Some(25),
                storage_gb: Some(1),
                providers: Some(1),
                custom_branding: false,
            },
            Tier::Studio => TierLimits {
                members: Some(10),
                generations_per_cycle: Some(500),
                storage_gb: Some(25),
                providers: Some(2),
                custom_branding: false,
            },
            Tier::Agency => TierLimits {
                members: Some(50),
                generations_per_cycle: Some(5000),
                storage_gb: Some(250),
                providers: None, // Unlimited
                custom_branding: true,
            },
            Tier::Enterprise => TierLimits {
                members: None,
                generations_per_cycle: None,
                storage_gb: None,
                providers: None,
                custom_branding: true,
            },
        }
    }

    /// Get the default absolute generation limit for a new organization.
    ///
    /// Unlimited tiers map to `u64::MAX`; the ledger still tracks usage.
    pub fn default_generation_limit(&self) -> u64 {
        self.limits().generations_per_cycle.unwrap_or(u64::MAX)
    }

    /// Parse tier from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Tier::Free),
            "studio" => Some(Tier::Studio),
            "agency" => Some(Tier::Agency),
            "enterprise" => Some(Tier::Enterprise),
            _ => None,
        }
    }

    /// Get string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Studio => "studio",
            Tier::Agency => "agency",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Get a human-readable display name for the tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Studio => "Studio",
            Tier::Agency => "Agency",
            Tier::Enterprise => "Enterprise",
        }
    }

    /// Check if this is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Tier::Free)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Free
    }
}

/// Feature limits for a subscription tier.
///
/// Values of `None` indicate unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum number of members (None = unlimited)
    pub members: Option<u32>,

    /// AI generations per billing cycle (None = unlimited)
    pub generations_per_cycle: Option<u64>,

    /// Storage limit in GB (None = unlimited)
    pub storage_gb: Option<u32>,

    /// Maximum generation providers configurable (None = unlimited)
    pub providers: Option<u32>,

    /// Custom branding enabled
    pub custom_branding: bool,
}

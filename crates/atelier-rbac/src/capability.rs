//! # Capabilities
//!
//! The closed set of capabilities an organization member may hold, and a
//! typed set used for membership-level denials.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A capability is a named operation a member may perform within their
/// organization.
///
/// Capabilities are granted by a static table keyed by role (see
/// [`crate::engine`]); membership-level denial flags may narrow them but
/// never widen them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Remove members and change member roles.
    ManageUsers,

    /// Change subscription, raise quotas, view invoices.
    ManageBilling,

    /// Invite new members into the organization.
    InviteUsers,

    /// Export designs and analytics data.
    ExportData,

    /// Submit AI generation requests (metered).
    GenerateAiContent,

    /// View organization usage and analytics dashboards.
    ViewAnalytics,
}

impl Capability {
    /// Get the string representation of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageUsers => "manage_users",
            Capability::ManageBilling => "manage_billing",
            Capability::InviteUsers => "invite_users",
            Capability::ExportData => "export_data",
            Capability::GenerateAiContent => "generate_ai_content",
            Capability::ViewAnalytics => "view_analytics",
        }
    }

    /// Parse capability from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use atelier_rbac::Capability;
    ///
    /// assert_eq!(Capability::parse("manage_billing"), Some(Capability::ManageBilling));
    /// assert_eq!(Capability::parse("generate"), Some(Capability::GenerateAiContent)); // Alias
    /// assert_eq!(Capability::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "manage_users" | "users" => Some(Capability::ManageUsers),
            "manage_billing" | "billing" => Some(Capability::ManageBilling),
            "invite_users" | "invite" => Some(Capability::InviteUsers),
            "export_data" | "export" => Some(Capability::ExportData),
            "generate_ai_content" | "generate" => Some(Capability::GenerateAiContent),
            "view_analytics" | "analytics" => Some(Capability::ViewAnalytics),
            _ => None,
        }
    }

    /// Get all capabilities.
    pub fn all() -> &'static [Capability] {
        &[
            Capability::ManageUsers,
            Capability::ManageBilling,
            Capability::InviteUsers,
            Capability::ExportData,
            Capability::GenerateAiContent,
            Capability::ViewAnalytics,
        ]
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of capabilities.
///
/// Used for membership-level denial lists and for reporting a member's
/// effective capabilities.
///
/// # Example
///
/// ```
/// use atelier_rbac::{Capability, CapabilitySet};
///
/// let mut denied = CapabilitySet::new();
/// denied.add(Capability::ManageBilling);
/// assert!(denied.contains(Capability::ManageBilling));
/// assert_eq!(denied.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilitySet {
    /// The capabilities in this set.
    capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    /// Create a new empty capability set.
    pub fn new() -> Self {
        Self {
            capabilities: HashSet::new(),
        }
    }

    /// Add a capability to the set.
    pub fn add(&mut self, capability: Capability) {
        self.capabilities.insert(capability);
    }

    /// Remove a capability from the set.
    ///
    /// # Returns
    ///
    /// `true` if the capability was present, `false` otherwise
    pub fn remove(&mut self, capability: Capability) -> bool {
        self.capabilities.remove(&capability)
    }

    /// Check if the set contains a capability.
    pub fn contains(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Create from a list of capability strings.
    ///
    /// Unknown identifiers are ignored; a denial string that names no
    /// capability denies nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use atelier_rbac::{Capability, CapabilitySet};
    ///
    /// let set = CapabilitySet::from_strings(&["manage_billing", "bogus"]);
    /// assert_eq!(set.len(), 1);
    /// assert!(set.contains(Capability::ManageBilling));
    /// ```
    pub fn from_strings<S: AsRef<str>>(identifiers: &[S]) -> Self {
        let mut set = Self::new();
        for id in identifiers {
            if let Some(cap) = Capability::parse(id.as_ref()) {
                set.add(cap);
            }
        }
        set
    }

    /// Get all capabilities in the set.
    pub fn all(&self) -> Vec<Capability> {
        self.capabilities.iter().copied().collect()
    }

    /// Get the count of capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        let mut set = CapabilitySet::new();
        for cap in iter {
            set.add(cap);
        }
        set
    }
}

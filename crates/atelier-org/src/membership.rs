//! Membership domain models
//!
//! This module provides the membership entity that links users to
//! organizations. A membership defines a user's role within an
//! organization and any capability denials narrowing that role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::OrganizationRole;

/// Organization membership linking a user to an organization.
///
/// At most one *active* membership may exist per (user, organization)
/// pair; the registry enforces this on insert. Removal deactivates the
/// membership rather than deleting it, preserving the audit trail.
///
/// `denied_capabilities` holds capability identifiers explicitly revoked
/// for this member. Denials can only narrow what the role grants by
/// default; they never widen a lower role's capability set.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use atelier_org::{OrganizationMembership, OrganizationRole};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = OrganizationMembership::new(org_id, user_id, OrganizationRole::Designer);
/// assert!(membership.is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    /// Unique membership ID
    pub id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    pub role: OrganizationRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// Who invited this user (if applicable)
    pub invited_by: Option<Uuid>,

    /// Whether the membership is active
    pub is_active: bool,

    /// When the membership was deactivated (if it was)
    pub deactivated_at: Option<DateTime<Utc>>,

    /// Capability identifiers explicitly denied for this member
    ///
    /// These narrow the role's default grants (e.g. an admin membership
    /// can still be denied "manage_billing"). Unknown identifiers are
    /// ignored by the permission engine.
    #[serde(default)]
    pub denied_capabilities: Vec<String>,

    /// User's display name within the org (if different from profile)
    pub display_name: Option<String>,
}

impl OrganizationMembership {
    /// Creates a new active organization membership.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The organization ID
    /// * `user_id` - The user ID
    /// * `role` - The user's role in the organization
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use atelier_org::{OrganizationMembership, OrganizationRole};
    ///
    /// let membership = OrganizationMembership::new(
    ///     Uuid::now_v7(),
    ///     Uuid::now_v7(),
    ///     OrganizationRole::Manager,
    /// );
    /// assert!(membership.denied_capabilities.is_empty());
    /// ```
    pub fn new(organization_id: Uuid, user_id: Uuid, role: OrganizationRole) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            role,
            joined_at: Utc::now(),
            invited_by: None,
            is_active: true,
            deactivated_at: None,
            denied_capabilities: Vec::new(),
            display_name: None,
        }
    }

    /// Set who invited this user.
    ///
    /// # Arguments
    ///
    /// * `inviter_id` - The user ID of who invited this user
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    /// Set the display name for this user within the organization.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Deny a capability for this member.
    ///
    /// # Arguments
    ///
    /// * `capability` - The capability identifier to deny (e.g. "manage_billing")
    pub fn deny_capability(&mut self, capability: impl Into<String>) {
        let cap = capability.into();
        if !self.denied_capabilities.contains(&cap) {
            self.denied_capabilities.push(cap);
        }
    }

    /// Restore a previously denied capability.
    ///
    /// # Arguments
    ///
    /// * `capability` - The capability identifier to restore
    pub fn restore_capability(&mut self, capability: &str) {
        self.denied_capabilities.retain(|c| c != capability);
    }

    /// Check if a capability is explicitly denied for this member.
    pub fn is_denied(&self, capability: &str) -> bool {
        self.denied_capabilities.iter().any(|c| c == capability)
    }

    /// Deactivate this membership (soft revocation).
    ///
    /// The record is kept for audit; the registry stops returning it
    /// from active-membership lookups.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.deactivated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_creation() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let membership = OrganizationMembership::new(org_id, user_id, OrganizationRole::Designer);

        assert_eq!(membership.organization_id, org_id);
        assert_eq!(membership.user_id, user_id);
        assert_eq!(membership.role, OrganizationRole::Designer);
        assert!(membership.is_active);
        assert!(membership.deactivated_at.is_none());
    }

    #[test]
    fn test_membership_with_inviter() {
        let inviter_id = Uuid::now_v7();
        let membership =
            OrganizationMembership::new(Uuid::now_v7(), Uuid::now_v7(), OrganizationRole::Manager)
                .with_inviter(inviter_id);

        assert_eq!(membership.invited_by, Some(inviter_id));
    }

    #[test]
    fn test_capability_denial() {
        let mut membership =
            OrganizationMembership::new(Uuid::now_v7(), Uuid::now_v7(), OrganizationRole::Admin);

        membership.deny_capability("manage_billing");
        assert!(membership.is_denied("manage_billing"));

        membership.deny_capability("manage_billing"); // Duplicate
        assert_eq!(membership.denied_capabilities.len(), 1);

        membership.restore_capability("manage_billing");
        assert!(!membership.is_denied("manage_billing"));
    }

    #[test]
    fn test_deactivate_preserves_record() {
        let mut membership =
            OrganizationMembership::new(Uuid::now_v7(), Uuid::now_v7(), OrganizationRole::Designer);

        membership.deactivate();
        assert!(!membership.is_active);
        assert!(membership.deactivated_at.is_some());
        assert_eq!(membership.role, OrganizationRole::Designer);
    }
}

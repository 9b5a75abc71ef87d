//! Organization roles
//!
//! This module defines the role hierarchy used for capability checks
//! within an organization.

use serde::{Deserialize, Serialize};

/// User role within an organization.
///
/// Roles are totally ordered; any capability granted to a lower role is
/// granted to every higher role. The hierarchy is:
/// Designer < Manager < Admin < Owner
///
/// # Permission Model
///
/// - **Designer**: Creates designs and runs AI generation
/// - **Manager**: Coordinates the team, invites members, views analytics
/// - **Admin**: Manages members and billing
/// - **Owner**: Admin-equivalent with full billing rights; cannot be removed
///
/// # Examples
///
/// ```
/// use atelier_org::OrganizationRole;
///
/// let role = OrganizationRole::Manager;
/// assert!(role.can_invite_members());
/// assert!(!role.can_manage_billing());
///
/// let admin = OrganizationRole::Admin;
/// assert!(admin.can_manage_billing());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    /// Creates and edits designs, runs AI generation
    Designer = 1,

    /// Coordinates designers, invites members, views analytics
    Manager = 2,

    /// Manages members and billing
    Admin = 3,

    /// Organization owner (admin-equivalent with billing rights)
    Owner = 4,
}

impl OrganizationRole {
    /// Check if this role has admin privileges.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn is_admin(&self) -> bool {
        *self >= OrganizationRole::Admin
    }

    /// Check if this role can run AI generation.
    ///
    /// # Returns
    ///
    /// `true` for every role
    pub fn can_generate(&self) -> bool {
        *self >= OrganizationRole::Designer
    }

    /// Check if this role can invite new members.
    ///
    /// # Returns
    ///
    /// `true` for Manager, Admin, and Owner roles
    pub fn can_invite_members(&self) -> bool {
        *self >= OrganizationRole::Manager
    }

    /// Check if this role can manage members.
    ///
    /// This includes removing members and changing member roles.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn can_manage_members(&self) -> bool {
        *self >= OrganizationRole::Admin
    }

    /// Check if this role can manage billing.
    ///
    /// This includes subscription changes and quota upgrades.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn can_manage_billing(&self) -> bool {
        *self >= OrganizationRole::Admin
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(OrganizationRole)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_org::OrganizationRole;
    ///
    /// assert_eq!(OrganizationRole::parse("admin"), Some(OrganizationRole::Admin));
    /// assert_eq!(OrganizationRole::parse("DESIGNER"), Some(OrganizationRole::Designer));
    /// assert_eq!(OrganizationRole::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "designer" => Some(Self::Designer),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Get string representation of the role.
    ///
    /// # Returns
    ///
    /// Lowercase string representation
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_org::OrganizationRole;
    ///
    /// assert_eq!(OrganizationRole::Admin.as_str(), "admin");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Designer => "designer",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Designer => "Designer",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
            Self::Owner => "Owner",
        }
    }
}

impl Default for OrganizationRole {
    fn default() -> Self {
        Self::Designer
    }
}

//! # Permission engine
//!
//! Pure capability evaluation: a static grant table keyed by role, with
//! membership-level denials that narrow (and never widen) the defaults.
//!
//! Roles are totally ordered, so the grant table is expressed as a
//! minimum role per capability; a capability granted to a role is
//! granted to every higher role.

use thiserror::Error;

use atelier_org::OrganizationRole;

use crate::capability::{Capability, CapabilitySet};

/// Authorization error types.
///
/// Denial is deliberately opaque: the error carries no capability,
/// tenant, or resource detail that could leak what exists elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller's role/denial flags do not permit the operation
    #[error("Forbidden: insufficient permissions")]
    Forbidden,
}

impl AuthzError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::Forbidden => "FORBIDDEN",
        }
    }
}

/// Result type for authorization checks.
pub type AuthzResult = Result<(), AuthzError>;

impl Capability {
    /// The minimum role a capability is granted to by default.
    ///
    /// Every role at or above the minimum holds the capability unless a
    /// membership-level denial narrows it away.
    pub fn minimum_role(&self) -> OrganizationRole {
        match self {
            Capability::GenerateAiContent | Capability::ExportData => OrganizationRole::Designer,
            Capability::InviteUsers | Capability::ViewAnalytics => OrganizationRole::Manager,
            Capability::ManageUsers | Capability::ManageBilling => OrganizationRole::Admin,
        }
    }
}

/// Check whether a role holds a capability by default.
///
/// # Examples
///
/// ```
/// use atelier_org::OrganizationRole;
/// use atelier_rbac::{granted_by_default, Capability};
///
/// assert!(granted_by_default(OrganizationRole::Designer, Capability::GenerateAiContent));
/// assert!(!granted_by_default(OrganizationRole::Designer, Capability::ManageBilling));
/// assert!(granted_by_default(OrganizationRole::Owner, Capability::ManageBilling));
/// ```
pub fn granted_by_default(role: OrganizationRole, capability: Capability) -> bool {
    role >= capability.minimum_role()
}

/// Compute the effective capability set for a member.
///
/// Starts from the role's default grants and subtracts the membership's
/// denial flags. A denial of a capability the role never held is a no-op.
///
/// # Arguments
///
/// * `role` - The member's role
/// * `denied` - Membership-level denial flags
pub fn effective_capabilities(role: OrganizationRole, denied: &CapabilitySet) -> CapabilitySet {
    Capability::all()
        .iter()
        .copied()
        .filter(|cap| granted_by_default(role, *cap) && !denied.contains(*cap))
        .collect()
}

/// Authorize a capability for a member.
///
/// Must be called after tenant resolution and before any state-mutating
/// or resource-consuming operation. Denial is terminal for the request
/// path; there is no retry.
///
/// # Arguments
///
/// * `role` - The member's role in the resolved organization
/// * `denied` - Membership-level denial flags
/// * `capability` - The capability the operation requires
///
/// # Examples
///
/// ```
/// use atelier_org::OrganizationRole;
/// use atelier_rbac::{authorize, AuthzError, Capability, CapabilitySet};
///
/// let no_denials = CapabilitySet::new();
/// assert!(authorize(OrganizationRole::Designer, &no_denials, Capability::GenerateAiContent).is_ok());
/// assert_eq!(
///     authorize(OrganizationRole::Designer, &no_denials, Capability::ManageBilling),
///     Err(AuthzError::Forbidden),
/// );
/// ```
pub fn authorize(
    role: OrganizationRole,
    denied: &CapabilitySet,
    capability: Capability,
) -> AuthzResult {
    if granted_by_default(role, capability) && !denied.contains(capability) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

//! Resolved tenant context
//!
//! This module provides the immutable `TenantContext` produced by tenant
//! resolution. The context is a plain value threaded through request
//! handling (or carried in a task-local scope); it is never process-wide
//! mutable state, so one request's resolved tenant cannot leak into
//! another's execution under concurrency.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_org::OrganizationRole;
use atelier_rbac::{authorize, AuthzResult, Capability, CapabilitySet};

/// The resolved (user, organization, role) triple for one request.
///
/// Once resolved, the triple is immutable for the life of the request:
/// fields are private and there are no mutators. Nested calls must reuse
/// the context rather than re-resolve, so a single request is guaranteed
/// to act against exactly one tenant throughout.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use atelier_org::OrganizationRole;
/// use atelier_rbac::{Capability, CapabilitySet};
/// use atelier_tenancy::TenantContext;
///
/// let ctx = TenantContext::new(
///     Uuid::now_v7(),
///     Uuid::now_v7(),
///     OrganizationRole::Designer,
///     CapabilitySet::new(),
/// );
/// assert!(ctx.authorize(Capability::GenerateAiContent).is_ok());
/// assert!(ctx.authorize(Capability::ManageBilling).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TenantContext {
    /// Authenticated user
    user_id: Uuid,
    /// Resolved organization (the active tenant)
    organization_id: Uuid,
    /// The user's role in the resolved organization
    role: OrganizationRole,
    /// Membership-level capability denials, frozen at resolution time
    denied: CapabilitySet,
    /// When the context was resolved
    resolved_at: DateTime<Utc>,
}

impl TenantContext {
    /// Create a resolved tenant context.
    ///
    /// Normally produced by [`crate::TenantResolver::resolve`]; exposed
    /// for tests and for services that resolve through other means.
    pub fn new(
        user_id: Uuid,
        organization_id: Uuid,
        role: OrganizationRole,
        denied: CapabilitySet,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            role,
            denied,
            resolved_at: Utc::now(),
        }
    }

    /// The authenticated user this context was resolved for.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The resolved organization (the active tenant).
    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    /// The user's role in the resolved organization.
    pub fn role(&self) -> OrganizationRole {
        self.role
    }

    /// Membership-level capability denials captured at resolution.
    pub fn denied_capabilities(&self) -> &CapabilitySet {
        &self.denied
    }

    /// When the context was resolved.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Authorize a capability for this context.
    ///
    /// Evaluates the role's default grants narrowed by the membership's
    /// denial flags. Must run before any state-mutating or
    /// resource-consuming operation; denial is terminal for the request.
    pub fn authorize(&self, capability: Capability) -> AuthzResult {
        authorize(self.role, &self.denied, capability)
    }
}

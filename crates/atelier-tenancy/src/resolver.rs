//! Tenant context resolution
//!
//! This module turns an authenticated principal plus an explicit
//! organization selector into exactly one immutable [`TenantContext`],
//! or fails. Resolution runs before authorization and before any
//! tenant-scoped storage access; a request that fails here never reaches
//! either.

use std::sync::Arc;
use uuid::Uuid;

use atelier_org::MembershipRegistry;
use atelier_rbac::CapabilitySet;

use crate::context::TenantContext;
use crate::error::{ResolveError, ResolveResult};

/// The explicit organization selector extracted from a request.
///
/// How the selector travels (header, subdomain, path parameter) is a
/// transport concern; by the time it reaches the resolver it is one of
/// these two semantic forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationSelector {
    /// Select by organization ID
    Id(Uuid),
    /// Select by organization slug
    Slug(String),
}

/// Resolves the active organization for a request.
///
/// # Resolution algorithm
///
/// 1. Require an authenticated principal (`Unauthenticated` otherwise).
/// 2. If a selector is present, look the organization up and require an
///    active membership (`NotAMember` otherwise, also covering
///    organizations that do not exist or are inactive, so existence
///    never leaks).
/// 3. If no selector is present, default to the user's single active
///    organization; zero or several yield `AmbiguousTenant`.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use atelier_org::MemoryRegistry;
/// use atelier_tenancy::TenantResolver;
///
/// let resolver = TenantResolver::new(Arc::new(MemoryRegistry::new()));
/// ```
pub struct TenantResolver {
    /// Membership registry consulted for organizations and roles
    registry: Arc<dyn MembershipRegistry>,
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver").finish()
    }
}

impl TenantResolver {
    /// Create a resolver over a membership registry.
    pub fn new(registry: Arc<dyn MembershipRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the tenant context for a request.
    ///
    /// # Arguments
    ///
    /// * `principal` - The authenticated user, if any (authentication
    ///   itself is an external collaborator; `None` means it failed or
    ///   was absent)
    /// * `selector` - The explicit organization selector, if any
    ///
    /// # Returns
    ///
    /// The immutable resolved context, or a [`ResolveError`] that must
    /// surface to the caller without retry.
    pub async fn resolve(
        &self,
        principal: Option<Uuid>,
        selector: Option<OrganizationSelector>,
    ) -> ResolveResult<TenantContext> {
        let user_id = principal.ok_or(ResolveError::Unauthenticated)?;

        let organization = match selector {
            Some(OrganizationSelector::Id(id)) => self
                .registry
                .organization(id)
                .await
                .map_err(|_| ResolveError::NotAMember)?,
            Some(OrganizationSelector::Slug(slug)) => self
                .registry
                .organization_by_slug(&slug)
                .await
                .map_err(|_| ResolveError::NotAMember)?,
            None => {
                let mut orgs = self
                    .registry
                    .organizations_for_user(user_id)
                    .await
                    .map_err(|_| ResolveError::NotAMember)?;
                if orgs.len() != 1 {
                    return Err(ResolveError::AmbiguousTenant {
                        organization_count: orgs.len(),
                    });
                }
                orgs.remove(0)
            }
        };

        if !organization.is_active {
            // Indistinguishable from having no membership.
            return Err(ResolveError::NotAMember);
        }

        let membership = self
            .registry
            .active_membership(user_id, organization.id)
            .await
            .map_err(|_| ResolveError::NotAMember)?;

        let denied = CapabilitySet::from_strings(&membership.denied_capabilities);

        tracing::debug!(
            user_id = %user_id,
            organization_id = %organization.id,
            role = membership.role.as_str(),
            "Tenant resolved"
        );

        Ok(TenantContext::new(
            user_id,
            organization.id,
            membership.role,
            denied,
        ))
    }
}

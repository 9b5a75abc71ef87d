//! Membership registry
//!
//! This module defines the registry contract for organization and
//! membership lookups, plus an in-memory implementation suitable for
//! single-process services and testing. The registry is read-mostly;
//! writes go through transactional operations that check organization
//! existence and the one-active-membership-per-pair invariant.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::membership::OrganizationMembership;
use crate::organization::Organization;
use crate::roles::OrganizationRole;

/// Registry error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Organization does not exist (or is not visible)
    #[error("Organization not found")]
    OrganizationNotFound,

    /// No active membership for the (user, organization) pair
    #[error("Membership not found")]
    MembershipNotFound,

    /// An active membership already exists for the (user, organization) pair
    #[error("Duplicate active membership")]
    DuplicateMembership,

    /// Organization slug is already taken
    #[error("Slug already taken: {0}")]
    SlugTaken(String),
}

impl RegistryError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            RegistryError::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            RegistryError::DuplicateMembership => "DUPLICATE_MEMBERSHIP",
            RegistryError::SlugTaken(_) => "SLUG_TAKEN",
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of organizations and their memberships.
///
/// Lookup methods return `MembershipNotFound` / `OrganizationNotFound`
/// for missing *or deactivated* records; callers never see a partial or
/// stale role.
#[async_trait]
pub trait MembershipRegistry: Send + Sync {
    /// Look up an organization by ID.
    async fn organization(&self, organization_id: Uuid) -> RegistryResult<Organization>;

    /// Look up an organization by slug.
    async fn organization_by_slug(&self, slug: &str) -> RegistryResult<Organization>;

    /// Get the active membership for a (user, organization) pair.
    ///
    /// Deactivated memberships are not returned.
    async fn active_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<OrganizationMembership>;

    /// List the active organizations a user has an active membership in.
    async fn organizations_for_user(&self, user_id: Uuid) -> RegistryResult<Vec<Organization>>;

    /// Get a user's role in an organization.
    async fn role_of(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<OrganizationRole>;

    /// Create a new organization.
    ///
    /// Fails with `SlugTaken` if the slug is already in use.
    async fn create_organization(&self, organization: Organization) -> RegistryResult<()>;

    /// Add a membership (invitation acceptance or admin provisioning).
    ///
    /// Checks that the organization exists and that no active membership
    /// already exists for the (user, organization) pair.
    async fn add_membership(&self, membership: OrganizationMembership) -> RegistryResult<()>;

    /// Deactivate a membership (soft revocation).
    ///
    /// The record is preserved for audit; only its active flag changes.
    async fn deactivate_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<()>;
}

/// In-memory membership registry.
///
/// Suitable for single-process services and testing. A production
/// deployment backs the same trait with durable storage; organization
/// and membership records must survive restarts.
#[derive(Default)]
pub struct MemoryRegistry {
    /// Organizations by ID
    organizations: Arc<RwLock<HashMap<Uuid, Organization>>>,
    /// Memberships by (user, organization)
    memberships: Arc<RwLock<HashMap<(Uuid, Uuid), OrganizationMembership>>>,
}

impl std::fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegistry").finish()
    }
}

impl MemoryRegistry {
    /// Create a new empty in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipRegistry for MemoryRegistry {
    async fn organization(&self, organization_id: Uuid) -> RegistryResult<Organization> {
        self.organizations
            .read()
            .await
            .get(&organization_id)
            .cloned()
            .ok_or(RegistryError::OrganizationNotFound)
    }

    async fn organization_by_slug(&self, slug: &str) -> RegistryResult<Organization> {
        self.organizations
            .read()
            .await
            .values()
            .find(|org| org.slug == slug)
            .cloned()
            .ok_or(RegistryError::OrganizationNotFound)
    }

    async fn active_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<OrganizationMembership> {
        self.memberships
            .read()
            .await
            .get(&(user_id, organization_id))
            .filter(|m| m.is_active)
            .cloned()
            .ok_or(RegistryError::MembershipNotFound)
    }

    async fn organizations_for_user(&self, user_id: Uuid) -> RegistryResult<Vec<Organization>> {
        // One lock at a time; no method in this registry ever holds
        // both maps together, so writers cannot form a wait cycle with
        // readers.
        let org_ids: Vec<Uuid> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|m| m.user_id == user_id && m.is_active)
            .map(|m| m.organization_id)
            .collect();

        let organizations = self.organizations.read().await;
        let mut result: Vec<Organization> = org_ids
            .iter()
            .filter_map(|id| organizations.get(id))
            .filter(|org| org.is_active)
            .cloned()
            .collect();
        result.sort_by_key(|org| org.created_at);
        Ok(result)
    }

    async fn role_of(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<OrganizationRole> {
        self.active_membership(user_id, organization_id)
            .await
            .map(|m| m.role)
    }

    async fn create_organization(&self, organization: Organization) -> RegistryResult<()> {
        let mut organizations = self.organizations.write().await;

        if organizations.values().any(|org| org.slug == organization.slug) {
            return Err(RegistryError::SlugTaken(organization.slug.clone()));
        }

        tracing::debug!(
            organization_id = %organization.id,
            slug = %organization.slug,
            "Organization created"
        );
        organizations.insert(organization.id, organization);
        Ok(())
    }

    async fn add_membership(&self, membership: OrganizationMembership) -> RegistryResult<()> {
        // The organizations guard is released before the memberships
        // lock is taken: holding both here, in the opposite order to
        // `organizations_for_user`, can wedge under contention. The
        // check cannot go stale because organizations are never removed
        // from the map (deactivation only flips `is_active`).
        {
            let organizations = self.organizations.read().await;
            if !organizations.contains_key(&membership.organization_id) {
                return Err(RegistryError::OrganizationNotFound);
            }
        }

        let mut memberships = self.memberships.write().await;
        let key = (membership.user_id, membership.organization_id);
        if memberships.get(&key).map(|m| m.is_active).unwrap_or(false) {
            return Err(RegistryError::DuplicateMembership);
        }

        tracing::debug!(
            user_id = %membership.user_id,
            organization_id = %membership.organization_id,
            role = membership.role.as_str(),
            "Membership added"
        );
        memberships.insert(key, membership);
        Ok(())
    }

    async fn deactivate_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RegistryResult<()> {
        let mut memberships = self.memberships.write().await;
        let membership = memberships
            .get_mut(&(user_id, organization_id))
            .filter(|m| m.is_active)
            .ok_or(RegistryError::MembershipNotFound)?;

        membership.deactivate();
        tracing::debug!(
            user_id = %user_id,
            organization_id = %organization_id,
            "Membership deactivated"
        );
        Ok(())
    }
}

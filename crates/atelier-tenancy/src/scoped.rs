//! Tenant-scoped storage
//!
//! This module makes cross-tenant access a structural impossibility
//! rather than a convention. A [`ScopedCollection`] exposes no raw,
//! unscoped accessor: the only way in is [`ScopedCollection::with_tenant`],
//! and every operation on the returned handle intersects with the
//! resolved organization. This is the single choke point all entity
//! types share; scoping is not repeated ad hoc at call sites.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::{AccessError, AccessResult};

/// Marker trait for entities owned by exactly one organization.
///
/// Every persisted business record (a design, a poster, a template)
/// implements this; the scoped store uses it to filter reads and to
/// stamp writes. `assign_organization` exists so the store can stamp
/// new and updated entities itself; callers cannot produce a record
/// in another tenant.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use atelier_tenancy::TenantScoped;
///
/// #[derive(Clone)]
/// struct Design {
///     id: Uuid,
///     organization_id: Uuid,
///     title: String,
/// }
///
/// impl TenantScoped for Design {
///     fn id(&self) -> Uuid { self.id }
///     fn organization_id(&self) -> Uuid { self.organization_id }
///     fn assign_organization(&mut self, organization_id: Uuid) {
///         self.organization_id = organization_id;
///     }
/// }
/// ```
pub trait TenantScoped {
    /// The entity's unique ID.
    fn id(&self) -> Uuid;

    /// The owning organization.
    fn organization_id(&self) -> Uuid;

    /// Stamp the owning organization. Called by the store on insert and
    /// after every update closure; not intended for callers.
    fn assign_organization(&mut self, organization_id: Uuid);
}

/// In-memory collection of tenant-scoped entities.
///
/// The collection itself has no public read or write methods; all access
/// goes through [`ScopedCollection::with_tenant`]. A production
/// deployment backs the same shape with a database table whose every
/// query carries the organization filter.
pub struct ScopedCollection<T: TenantScoped> {
    /// Entities by ID
    entities: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: TenantScoped> std::fmt::Debug for ScopedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedCollection").finish()
    }
}

impl<T: TenantScoped + Clone + Send + Sync> Default for ScopedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TenantScoped + Clone + Send + Sync> ScopedCollection<T> {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Access the collection as the resolved tenant.
    ///
    /// This is the only accessor; there is no unscoped path.
    ///
    /// # Arguments
    ///
    /// * `context` - The resolved tenant context for the current request
    pub fn with_tenant(&self, context: &TenantContext) -> TenantHandle<'_, T> {
        TenantHandle {
            collection: self,
            organization_id: context.organization_id(),
        }
    }
}

/// A view of a [`ScopedCollection`] restricted to one organization.
///
/// Every operation implicitly intersects with the handle's organization:
/// reads filter, creates stamp, updates and deletes verify ownership
/// first and report [`AccessError::NotFound`] for anything outside the
/// tenant (never `Forbidden`, which would leak existence).
pub struct TenantHandle<'a, T: TenantScoped> {
    collection: &'a ScopedCollection<T>,
    organization_id: Uuid,
}

impl<T: TenantScoped + Clone + Send + Sync> TenantHandle<'_, T> {
    /// The organization this handle is scoped to.
    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    /// Insert a new entity, stamping it with the resolved organization.
    ///
    /// Whatever organization the entity carried before is overwritten;
    /// creating a record in another tenant is not expressible.
    ///
    /// # Returns
    ///
    /// The ID of the stored entity.
    pub async fn insert(&self, mut entity: T) -> Uuid {
        entity.assign_organization(self.organization_id);
        let id = entity.id();
        self.collection.entities.write().await.insert(id, entity);
        id
    }

    /// Get an entity by ID.
    ///
    /// # Returns
    ///
    /// `NotFound` if the entity does not exist or belongs to another
    /// organization.
    pub async fn get(&self, id: Uuid) -> AccessResult<T> {
        self.collection
            .entities
            .read()
            .await
            .get(&id)
            .filter(|e| e.organization_id() == self.organization_id)
            .cloned()
            .ok_or(AccessError::NotFound)
    }

    /// List all entities in the resolved organization.
    pub async fn list(&self) -> Vec<T> {
        self.collection
            .entities
            .read()
            .await
            .values()
            .filter(|e| e.organization_id() == self.organization_id)
            .cloned()
            .collect()
    }

    /// Count entities in the resolved organization.
    pub async fn count(&self) -> usize {
        self.collection
            .entities
            .read()
            .await
            .values()
            .filter(|e| e.organization_id() == self.organization_id)
            .count()
    }

    /// Update an entity in place.
    ///
    /// The target's ownership is verified before the closure runs, and
    /// the organization is re-stamped afterwards, so an update cannot
    /// move an entity between tenants.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity to update
    /// * `f` - Mutation applied to the entity
    ///
    /// # Returns
    ///
    /// The updated entity, or `NotFound` if it does not exist in this
    /// organization.
    pub async fn update<F>(&self, id: Uuid, f: F) -> AccessResult<T>
    where
        F: FnOnce(&mut T) + Send,
    {
        let mut entities = self.collection.entities.write().await;
        let entity = entities
            .get_mut(&id)
            .filter(|e| e.organization_id() == self.organization_id)
            .ok_or(AccessError::NotFound)?;

        f(entity);
        entity.assign_organization(self.organization_id);
        Ok(entity.clone())
    }

    /// Delete an entity.
    ///
    /// # Returns
    ///
    /// The removed entity, or `NotFound` if it does not exist in this
    /// organization.
    pub async fn delete(&self, id: Uuid) -> AccessResult<T> {
        let mut entities = self.collection.entities.write().await;
        let owned = entities
            .get(&id)
            .map(|e| e.organization_id() == self.organization_id)
            .unwrap_or(false);
        if !owned {
            return Err(AccessError::NotFound);
        }
        entities.remove(&id).ok_or(AccessError::NotFound)
    }

    /// Update every entity in the organization matching a predicate.
    ///
    /// Carries the same implicit tenant filter as single-entity
    /// operations; an unscoped bulk write is not expressible.
    ///
    /// # Returns
    ///
    /// The number of entities updated.
    pub async fn update_where<P, F>(&self, predicate: P, mut f: F) -> usize
    where
        P: Fn(&T) -> bool + Send,
        F: FnMut(&mut T) + Send,
    {
        let mut entities = self.collection.entities.write().await;
        let mut updated = 0;
        for entity in entities.values_mut() {
            if entity.organization_id() == self.organization_id && predicate(entity) {
                f(entity);
                entity.assign_organization(self.organization_id);
                updated += 1;
            }
        }
        updated
    }

    /// Delete every entity in the organization matching a predicate.
    ///
    /// # Returns
    ///
    /// The number of entities deleted.
    pub async fn delete_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool + Send,
    {
        let mut entities = self.collection.entities.write().await;
        let before = entities.len();
        entities.retain(|_, e| !(e.organization_id() == self.organization_id && predicate(e)));
        before - entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_org::OrganizationRole;
    use atelier_rbac::CapabilitySet;

    #[derive(Debug, Clone, PartialEq)]
    struct Design {
        id: Uuid,
        organization_id: Uuid,
        title: String,
        archived: bool,
    }

    impl Design {
        fn new(title: &str) -> Self {
            Self {
                id: Uuid::now_v7(),
                organization_id: Uuid::nil(),
                title: title.to_string(),
                archived: false,
            }
        }
    }

    impl TenantScoped for Design {
        fn id(&self) -> Uuid {
            self.id
        }
        fn organization_id(&self) -> Uuid {
            self.organization_id
        }
        fn assign_organization(&mut self, organization_id: Uuid) {
            self.organization_id = organization_id;
        }
    }

    fn context_for(org_id: Uuid) -> TenantContext {
        TenantContext::new(
            Uuid::now_v7(),
            org_id,
            OrganizationRole::Designer,
            CapabilitySet::new(),
        )
    }

    #[tokio::test]
    async fn test_insert_stamps_organization() {
        let collection = ScopedCollection::new();
        let org_id = Uuid::now_v7();
        let handle = collection.with_tenant(&context_for(org_id));

        let mut design = Design::new("Poster");
        design.organization_id = Uuid::now_v7(); // Caller-supplied org is ignored
        let id = handle.insert(design).await;

        let stored = handle.get(id).await.unwrap();
        assert_eq!(stored.organization_id, org_id);
    }

    #[tokio::test]
    async fn test_cross_tenant_read_is_not_found() {
        let collection = ScopedCollection::new();
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let ctx_a = context_for(org_a);
        let ctx_b = context_for(org_b);

        let id = collection
            .with_tenant(&ctx_a)
            .insert(Design::new("Secret"))
            .await;

        assert_eq!(
            collection.with_tenant(&ctx_b).get(id).await,
            Err(AccessError::NotFound)
        );
        assert!(collection.with_tenant(&ctx_b).list().await.is_empty());
    }

    #[tokio::test]
    async fn test_cross_tenant_update_and_delete_are_not_found() {
        let collection = ScopedCollection::new();
        let ctx_a = context_for(Uuid::now_v7());
        let ctx_b = context_for(Uuid::now_v7());

        let id = collection
            .with_tenant(&ctx_a)
            .insert(Design::new("Poster"))
            .await;

        let other = collection.with_tenant(&ctx_b);
        assert_eq!(
            other.update(id, |d| d.title = "Hijacked".to_string()).await,
            Err(AccessError::NotFound)
        );
        assert_eq!(other.delete(id).await, Err(AccessError::NotFound));

        // The owner still sees the original.
        let stored = collection.with_tenant(&ctx_a).get(id).await.unwrap();
        assert_eq!(stored.title, "Poster");
    }

    #[tokio::test]
    async fn test_update_cannot_move_entity_between_tenants() {
        let collection = ScopedCollection::new();
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let ctx_a = context_for(org_a);

        let handle = collection.with_tenant(&ctx_a);
        let id = handle.insert(Design::new("Poster")).await;

        // A malicious closure tries to reassign the organization.
        let updated = handle
            .update(id, |d| d.organization_id = org_b)
            .await
            .unwrap();
        assert_eq!(updated.organization_id, org_a);

        // Still invisible to the other tenant.
        assert_eq!(
            collection.with_tenant(&context_for(org_b)).get(id).await,
            Err(AccessError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_list_and_count_are_scoped() {
        let collection = ScopedCollection::new();
        let ctx_a = context_for(Uuid::now_v7());
        let ctx_b = context_for(Uuid::now_v7());

        for title in ["A1", "A2", "A3"] {
            collection.with_tenant(&ctx_a).insert(Design::new(title)).await;
        }
        collection.with_tenant(&ctx_b).insert(Design::new("B1")).await;

        assert_eq!(collection.with_tenant(&ctx_a).count().await, 3);
        assert_eq!(collection.with_tenant(&ctx_b).count().await, 1);
    }

    #[tokio::test]
    async fn test_bulk_operations_are_scoped() {
        let collection = ScopedCollection::new();
        let ctx_a = context_for(Uuid::now_v7());
        let ctx_b = context_for(Uuid::now_v7());

        for title in ["A1", "A2"] {
            collection.with_tenant(&ctx_a).insert(Design::new(title)).await;
        }
        collection.with_tenant(&ctx_b).insert(Design::new("B1")).await;

        // Bulk archive everything visible to tenant A.
        let updated = collection
            .with_tenant(&ctx_a)
            .update_where(|_| true, |d| d.archived = true)
            .await;
        assert_eq!(updated, 2);

        // Tenant B's design is untouched.
        let b_designs = collection.with_tenant(&ctx_b).list().await;
        assert!(!b_designs[0].archived);

        // Bulk delete is scoped the same way.
        let deleted = collection.with_tenant(&ctx_a).delete_where(|_| true).await;
        assert_eq!(deleted, 2);
        assert_eq!(collection.with_tenant(&ctx_b).count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_returns_entity() {
        let collection = ScopedCollection::new();
        let ctx = context_for(Uuid::now_v7());
        let handle = collection.with_tenant(&ctx);

        let id = handle.insert(Design::new("Poster")).await;
        let removed = handle.delete(id).await.unwrap();
        assert_eq!(removed.title, "Poster");
        assert_eq!(handle.get(id).await, Err(AccessError::NotFound));
    }
}

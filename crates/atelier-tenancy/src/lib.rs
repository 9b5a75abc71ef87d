//! # Atelier Tenancy
//!
//! Tenant resolution and tenant-scoped storage for the Atelier platform.
//!
//! ## Overview
//!
//! The atelier-tenancy crate handles:
//! - **Resolution**: Turning an authenticated principal and an explicit
//!   organization selector into exactly one immutable [`TenantContext`]
//! - **Context**: The frozen (user, organization, role) triple threaded
//!   through request handling; never process-wide mutable state
//! - **Scoped storage**: A single choke point ([`ScopedCollection`])
//!   through which every tenant-scoped entity is read and written, with
//!   the organization filter applied implicitly and unconditionally
//!
//! ## Control flow
//!
//! ```text
//! request ─→ TenantResolver::resolve ─→ TenantContext
//!                                          │  authorize(capability)
//!                                          ▼
//!                          ScopedCollection::with_tenant(ctx)
//!                                          │  get / list / insert / update / delete
//!                                          ▼
//!                               records of this tenant only
//! ```
//!
//! A request that fails resolution or authorization never reaches
//! storage or the admission controller; no consumption is recorded for
//! a rejected request.
//!
//! ## Error semantics
//!
//! Cross-tenant access attempts surface as [`AccessError::NotFound`],
//! indistinguishable from a record that does not exist; existence in
//! other tenants never leaks.

pub mod context;
pub mod error;
pub mod resolver;
pub mod scoped;

// Re-export main types for convenience
pub use context::TenantContext;
pub use error::{AccessError, AccessResult, ResolveError, ResolveResult};
pub use resolver::{OrganizationSelector, TenantResolver};
pub use scoped::{ScopedCollection, TenantHandle, TenantScoped};

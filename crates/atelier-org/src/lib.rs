//! # Atelier Organization Management
//!
//! This crate provides multi-tenant organization management for the
//! Atelier platform, shared across the poster builder, template gallery,
//! and render services.
//!
//! ## Overview
//!
//! The atelier-org crate handles:
//! - **Organizations**: Top-level tenant entities with tier and generation quota
//! - **Memberships**: User-organization relationships with roles and
//!   capability denials
//! - **Roles**: Totally ordered role hierarchy for capability checks
//! - **Tiers**: Subscription tiers with usage limits
//! - **Registry**: Lookup and lifecycle contract with an in-memory backend
//!
//! ## Architecture
//!
//! ```text
//! User (external principal, Uuid)
//!   └─ OrganizationMembership ─→ Organization
//!                                   ├─ Tier (limits)
//!                                   ├─ generation_limit / generations_used
//!                                   └─ is_active
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atelier_org::{Organization, OrganizationMembership, OrganizationRole, Tier};
//! use uuid::Uuid;
//!
//! let owner_id = Uuid::now_v7();
//! let org = Organization::new("Acme Studio", "acme-studio", owner_id)
//!     .with_tier(Tier::Studio);
//!
//! let user_id = Uuid::now_v7();
//! let membership = OrganizationMembership::new(org.id, user_id, OrganizationRole::Designer);
//! ```
//!
//! ## Cross-crate integration
//!
//! This crate is designed to work with:
//! - `atelier-rbac`: Capability grants keyed by role
//! - `atelier-tenancy`: Tenant resolution and scoped storage
//! - `atelier-quota`: Generation quota and rate admission

pub mod membership;
pub mod organization;
pub mod registry;
pub mod roles;
pub mod tiers;

// Re-export main types for convenience
pub use membership::OrganizationMembership;
pub use organization::{Organization, OrganizationSummary};
pub use registry::{MembershipRegistry, MemoryRegistry, RegistryError, RegistryResult};
pub use roles::OrganizationRole;
pub use tiers::{Tier, TierLimits};

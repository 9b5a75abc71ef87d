//! # Atelier RBAC (Role-Based Access Control)
//!
//! This crate provides capability evaluation for the Atelier platform.
//!
//! ## Overview
//!
//! The atelier-rbac crate handles:
//! - **Capabilities**: The closed set of operations members may perform
//! - **Capability sets**: Typed sets for denial flags and reporting
//! - **Engine**: The static role→capability grant table and `authorize`
//!
//! ## Grant table
//!
//! ```text
//! Designer: generate_ai_content, export_data
//! Manager:  + invite_users, view_analytics
//! Admin:    + manage_users, manage_billing
//! Owner:    same as Admin (billing rights included)
//! ```
//!
//! Roles are totally ordered, so a capability granted to a role is
//! granted to every higher role. Membership-level denial flags narrow
//! these defaults; they can never widen a lower role's set.
//!
//! ## Usage
//!
//! ```rust
//! use atelier_org::OrganizationRole;
//! use atelier_rbac::{authorize, Capability, CapabilitySet};
//!
//! let denied = CapabilitySet::from_strings(&["manage_billing"]);
//!
//! // An admin with a billing denial keeps their other capabilities.
//! assert!(authorize(OrganizationRole::Admin, &denied, Capability::ManageUsers).is_ok());
//! assert!(authorize(OrganizationRole::Admin, &denied, Capability::ManageBilling).is_err());
//! ```

pub mod capability;
pub mod engine;

// Re-export main types for convenience
pub use capability::{Capability, CapabilitySet};
pub use engine::{authorize, effective_capabilities, granted_by_default, AuthzError, AuthzResult};

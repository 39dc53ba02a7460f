//! Permission classification and admin grant policy
//!
//! - **Catalog / classifier**: static permission → group membership, resolved
//!   once per platform level
//! - **Admin-restricted set**: shared `Arc<AdminRestrictedSet>`, append-only
//! - **Admin grant policy**: decides whether an administrator may grant a
//!   permission in a profile
//!
//! ## Example
//!
//! ```rust,ignore
//! use profile_grant_policy::core::PlatformGates;
//! use profile_grant_policy::permissions::{
//!     names, AdminGrantPolicy, AdminRestrictedSet, GrantInputs, PermissionCatalog,
//! };
//! use std::sync::Arc;
//!
//! let gates = PlatformGates::for_api_level(34);
//! let restricted = Arc::new(AdminRestrictedSet::with_baseline(&gates));
//! let classifier = Arc::new(PermissionCatalog::platform().resolve(34)?);
//! let policy = AdminGrantPolicy::new(gates, restricted, classifier);
//!
//! let decision = policy.decide(&GrantInputs::new(names::CAMERA).with_sensor_grant(false));
//! assert!(!decision.is_allowed());
//! ```

mod admin_grant;
mod catalog;
pub mod names;
mod restricted;

pub use admin_grant::{
    AdminGrantPolicy, AllowReason, DenyReason, DevicePolicyProvider, GrantDecision, GrantInputs,
    ManagedSmsState, ManagedSubscriptionsPolicy,
};
pub use catalog::{
    CatalogEntry, PermissionCatalog, PermissionCategory, PermissionClassifier, PermissionEntry,
};
pub use restricted::{AdminRestrictedSet, RestrictedSnapshot};

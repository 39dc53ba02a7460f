//! Role defaults
//!
//! Default holders, visibility and installed-filtered qualifying holders of a
//! role, per profile.

mod authority;
mod resolver;

pub use authority::{ApplicationInfo, InstalledApps, RoleAuthority};
pub use resolver::{DefaultHolders, RoleDefaultsResolver, RolePackageSet, RoleResolution};

//! Snapshots and in-memory collaborators
//!
//! A `Scenario` bundles a profile directory, permission catalog and the
//! state every collaborator reports, so an engine can be built from one JSON
//! file.

mod collaborators;
mod scenario;
mod storage;

pub use collaborators::{
    DevicePolicySnapshot, InstalledPackage, InstalledPackages, RestrictionEntry, RestrictionTable,
    RoleDefinition, RoleProfileData, StaticCaller, StaticRoleAuthority,
};
pub use scenario::Scenario;
pub use storage::ScenarioStorage;

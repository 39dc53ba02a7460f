//! Scenario: everything one engine instance needs, as plain data

use serde::{Deserialize, Serialize};

use super::collaborators::{
    DevicePolicySnapshot, InstalledPackage, RestrictionTable, RoleDefinition, StaticCaller,
};
use crate::core::EngineConfig;
use crate::permissions::PermissionCatalog;
use crate::profiles::ProfileSnapshot;

/// Serializable description of a device state
///
/// Missing sections default to empty; a missing catalog means the platform
/// catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: EngineConfig,

    pub profiles: ProfileSnapshot,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PermissionCatalog>,

    #[serde(default)]
    pub installed: Vec<InstalledPackage>,

    #[serde(default)]
    pub roles: Vec<RoleDefinition>,

    #[serde(default)]
    pub device_policy: DevicePolicySnapshot,

    #[serde(default)]
    pub restrictions: RestrictionTable,

    /// Identity used for queries issued from this scenario
    #[serde(default)]
    pub caller: StaticCaller,
}

impl Scenario {
    /// Scenario with defaults for everything but the profile directory
    pub fn new(profiles: ProfileSnapshot) -> Self {
        Self {
            config: EngineConfig::default(),
            profiles,
            catalog: None,
            installed: Vec::new(),
            roles: Vec::new(),
            device_policy: DevicePolicySnapshot::default(),
            restrictions: RestrictionTable::default(),
            caller: StaticCaller::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: PermissionCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_installed(mut self, package: InstalledPackage) -> Self {
        self.installed.push(package);
        self
    }

    pub fn with_role(mut self, role: RoleDefinition) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_device_policy(mut self, device_policy: DevicePolicySnapshot) -> Self {
        self.device_policy = device_policy;
        self
    }

    pub fn with_restrictions(mut self, restrictions: RestrictionTable) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn with_caller(mut self, caller: StaticCaller) -> Self {
        self.caller = caller;
        self
    }

    /// The catalog to resolve, falling back to the platform catalog
    pub fn catalog_or_platform(&self) -> PermissionCatalog {
        self.catalog.clone().unwrap_or_else(PermissionCatalog::platform)
    }
}

//! In-memory collaborator implementations
//!
//! Each type here answers one collaborator trait from plain data, so a whole
//! decision context can be described in a JSON scenario file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::access::{CallerIdentity, UserRestriction, UserRestrictions};
use crate::core::ProfileId;
use crate::permissions::{DevicePolicyProvider, ManagedSubscriptionsPolicy};
use crate::roles::{ApplicationInfo, InstalledApps, RoleAuthority};

/// One installed package in one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub profile: ProfileId,
    #[serde(flatten)]
    pub info: ApplicationInfo,
}

/// Installed-application registry backed by a map
#[derive(Debug, Clone, Default)]
pub struct InstalledPackages {
    by_profile: HashMap<ProfileId, HashMap<String, ApplicationInfo>>,
}

impl InstalledPackages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat list; later entries replace earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = InstalledPackage>) -> Self {
        entries
            .into_iter()
            .fold(Self::new(), |apps, entry| apps.with_package(entry.profile, entry.info))
    }

    /// Install `info` in `profile`
    pub fn with_package(mut self, profile: impl Into<ProfileId>, info: ApplicationInfo) -> Self {
        self.by_profile
            .entry(profile.into())
            .or_default()
            .insert(info.package_name.clone(), info);
        self
    }

    /// Number of installed (profile, package) pairs
    pub fn len(&self) -> usize {
        self.by_profile.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InstalledApps for InstalledPackages {
    fn application_info(&self, package: &str, profile: ProfileId) -> Option<ApplicationInfo> {
        self.by_profile
            .get(&profile)
            .and_then(|packages| packages.get(package))
            .cloned()
    }
}

/// Role data for one profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfileData {
    pub profile: ProfileId,
    #[serde(default)]
    pub default_holders: Vec<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl RoleProfileData {
    pub fn new(profile: impl Into<ProfileId>) -> Self {
        Self {
            profile: profile.into(),
            ..Self::default()
        }
    }

    pub fn with_default_holders<I, S>(mut self, holders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_holders = holders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }
}

/// A role as known to the static authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,

    /// Feature gate for the role's behavior
    #[serde(default = "default_behavior_enabled")]
    pub behavior_enabled: bool,

    #[serde(default)]
    pub profiles: Vec<RoleProfileData>,
}

fn default_behavior_enabled() -> bool {
    true
}

impl RoleDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior_enabled: true,
            profiles: Vec::new(),
        }
    }

    pub fn with_behavior_enabled(mut self, enabled: bool) -> Self {
        self.behavior_enabled = enabled;
        self
    }

    pub fn with_profile(mut self, data: RoleProfileData) -> Self {
        self.profiles.push(data);
        self
    }

    fn for_profile(&self, profile: ProfileId) -> Option<&RoleProfileData> {
        self.profiles.iter().find(|p| p.profile == profile)
    }
}

/// Role authority backed by static role definitions
#[derive(Debug, Clone, Default)]
pub struct StaticRoleAuthority {
    roles: HashMap<String, RoleDefinition>,
}

impl StaticRoleAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = RoleDefinition>) -> Self {
        definitions.into_iter().fold(Self::new(), Self::with_role)
    }

    pub fn with_role(mut self, definition: RoleDefinition) -> Self {
        self.roles.insert(definition.name.clone(), definition);
        self
    }

    fn profile_data(&self, role: &str, profile: ProfileId) -> Option<&RoleProfileData> {
        self.roles.get(role).and_then(|r| r.for_profile(profile))
    }
}

impl RoleAuthority for StaticRoleAuthority {
    fn has_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    fn behavior_enabled(&self, role: &str) -> bool {
        self.roles
            .get(role)
            .map(|r| r.behavior_enabled)
            .unwrap_or(false)
    }

    fn default_holders(&self, role: &str, profile: ProfileId) -> Vec<String> {
        self.profile_data(role, profile)
            .map(|d| d.default_holders.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, role: &str, profile: ProfileId) -> bool {
        self.profile_data(role, profile)
            .map(|d| d.visible)
            .unwrap_or(false)
    }

    fn qualifying_candidates(&self, role: &str, profile: ProfileId) -> Vec<String> {
        self.profile_data(role, profile)
            .map(|d| d.candidates.clone())
            .unwrap_or_default()
    }
}

/// Device-policy state as plain data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePolicySnapshot {
    /// Profiles whose admin enabled the sensor-grant toggle
    #[serde(default)]
    pub sensor_grant_profiles: BTreeSet<ProfileId>,

    #[serde(default)]
    pub organization_owned_managed_profile: bool,

    #[serde(default)]
    pub managed_subscriptions_policy: ManagedSubscriptionsPolicy,
}

impl DevicePolicySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor_grant(mut self, profile: impl Into<ProfileId>) -> Self {
        self.sensor_grant_profiles.insert(profile.into());
        self
    }

    pub fn with_organization_owned_managed_profile(mut self, org_owned: bool) -> Self {
        self.organization_owned_managed_profile = org_owned;
        self
    }

    pub fn with_subscriptions_policy(mut self, policy: ManagedSubscriptionsPolicy) -> Self {
        self.managed_subscriptions_policy = policy;
        self
    }
}

impl DevicePolicyProvider for DevicePolicySnapshot {
    fn can_admin_grant_sensors_permissions(&self, profile: ProfileId) -> bool {
        self.sensor_grant_profiles.contains(&profile)
    }

    fn is_organization_owned_device_with_managed_profile(&self) -> bool {
        self.organization_owned_managed_profile
    }

    fn managed_subscriptions_policy(&self) -> ManagedSubscriptionsPolicy {
        self.managed_subscriptions_policy
    }
}

/// One restriction set on one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RestrictionEntry {
    pub profile: ProfileId,
    pub restriction: UserRestriction,
}

/// User restrictions as a flat table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestrictionTable {
    entries: BTreeSet<RestrictionEntry>,
}

impl RestrictionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restriction(mut self, profile: impl Into<ProfileId>, restriction: UserRestriction) -> Self {
        self.entries.insert(RestrictionEntry {
            profile: profile.into(),
            restriction,
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestrictionEntry> {
        self.entries.iter()
    }
}

impl UserRestrictions for RestrictionTable {
    fn has_restriction(&self, profile: ProfileId, restriction: UserRestriction) -> bool {
        self.entries.contains(&RestrictionEntry {
            profile,
            restriction,
        })
    }
}

/// Calling identity as plain data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCaller {
    pub profile: ProfileId,
    #[serde(default)]
    pub cross_user_capability: bool,
    #[serde(default)]
    pub shell: bool,
}

impl Default for StaticCaller {
    fn default() -> Self {
        Self::new(ProfileId::SYSTEM)
    }
}

impl StaticCaller {
    /// Regular caller without the cross-user capability
    pub fn new(profile: impl Into<ProfileId>) -> Self {
        Self {
            profile: profile.into(),
            cross_user_capability: false,
            shell: false,
        }
    }

    pub fn with_cross_user_capability(mut self) -> Self {
        self.cross_user_capability = true;
        self
    }

    /// Mark as the privileged shell identity
    pub fn shell(mut self) -> Self {
        self.shell = true;
        self
    }
}

impl CallerIdentity for StaticCaller {
    fn calling_profile(&self) -> ProfileId {
        self.profile
    }

    fn holds_cross_user_capability(&self) -> bool {
        self.cross_user_capability
    }

    fn is_shell(&self) -> bool {
        self.shell
    }
}

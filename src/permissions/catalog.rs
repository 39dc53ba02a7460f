//! Permission catalog and classifier
//!
//! `PermissionCatalog` is the versioned source data; entries carry the API
//! level they appeared in. `resolve` picks the entries for one platform level
//! and builds the lookup tables once, so queries never check versions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::names::{self, group};
use super::restricted::RestrictedSnapshot;
use crate::core::{PolicyError, PolicyResult};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Permission name
    pub permission: String,

    /// Owning permission group, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// First platform API level that defines this permission
    #[serde(default)]
    pub min_api_level: u32,
}

impl CatalogEntry {
    pub fn new(permission: impl Into<String>, group: Option<&str>) -> Self {
        Self {
            permission: permission.into(),
            group: group.map(str::to_string),
            min_api_level: 0,
        }
    }

    /// Only define this entry from `api_level` on
    pub fn since(mut self, api_level: u32) -> Self {
        self.min_api_level = api_level;
        self
    }
}

/// Versioned permission catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl PermissionCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The platform runtime-permission groups
    pub fn platform() -> Self {
        use crate::core::config::API_LEVEL_T;

        let entries = vec![
            CatalogEntry::new(names::ACCESS_FINE_LOCATION, Some(group::LOCATION)),
            CatalogEntry::new(names::ACCESS_COARSE_LOCATION, Some(group::LOCATION)),
            CatalogEntry::new(names::ACCESS_BACKGROUND_LOCATION, Some(group::LOCATION)),
            CatalogEntry::new(names::CAMERA, Some(group::CAMERA)),
            CatalogEntry::new(names::BACKGROUND_CAMERA, Some(group::CAMERA)).since(API_LEVEL_T),
            CatalogEntry::new(names::RECORD_AUDIO, Some(group::MICROPHONE)),
            CatalogEntry::new(names::RECORD_BACKGROUND_AUDIO, Some(group::MICROPHONE))
                .since(API_LEVEL_T),
            CatalogEntry::new(names::ACTIVITY_RECOGNITION, Some(group::ACTIVITY_RECOGNITION)),
            CatalogEntry::new(names::BODY_SENSORS, Some(group::SENSORS)),
            CatalogEntry::new(names::BODY_SENSORS_BACKGROUND, Some(group::SENSORS))
                .since(API_LEVEL_T),
            CatalogEntry::new(names::READ_SMS, Some(group::SMS)),
            CatalogEntry::new(names::SEND_SMS, Some(group::SMS)),
            CatalogEntry::new(names::RECEIVE_SMS, Some(group::SMS)),
            CatalogEntry::new(names::RECEIVE_MMS, Some(group::SMS)),
            CatalogEntry::new(names::READ_CONTACTS, Some(group::CONTACTS)),
            CatalogEntry::new(names::WRITE_CONTACTS, Some(group::CONTACTS)),
            CatalogEntry::new(names::READ_CALENDAR, Some(group::CALENDAR)),
            CatalogEntry::new(names::WRITE_CALENDAR, Some(group::CALENDAR)),
            CatalogEntry::new(names::CALL_PHONE, Some(group::PHONE)),
            CatalogEntry::new(names::READ_PHONE_STATE, Some(group::PHONE)),
            CatalogEntry::new(names::READ_EXTERNAL_STORAGE, Some(group::STORAGE)),
            CatalogEntry::new(names::READ_MEDIA_IMAGES, Some(group::READ_MEDIA_VISUAL))
                .since(API_LEVEL_T),
            CatalogEntry::new(names::POST_NOTIFICATIONS, Some(group::NOTIFICATIONS))
                .since(API_LEVEL_T),
            CatalogEntry::new(names::BLUETOOTH_SCAN, Some(group::NEARBY_DEVICES)),
            CatalogEntry::new(names::BLUETOOTH_CONNECT, Some(group::NEARBY_DEVICES)),
            CatalogEntry::new(names::NEARBY_WIFI_DEVICES, Some(group::NEARBY_DEVICES))
                .since(API_LEVEL_T),
        ];
        Self { entries }
    }

    /// Add an entry
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Build the classifier for one platform API level
    ///
    /// Fails if a permission is assigned to two different groups.
    pub fn resolve(&self, api_level: u32) -> PolicyResult<PermissionClassifier> {
        let mut group_of: HashMap<String, Option<String>> = HashMap::new();
        let mut members: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for entry in self.entries.iter().filter(|e| e.min_api_level <= api_level) {
            if let Some(existing) = group_of.get(&entry.permission) {
                if *existing != entry.group {
                    return Err(PolicyError::invalid_argument(format!(
                        "permission {} listed in groups {:?} and {:?}",
                        entry.permission, existing, entry.group
                    )));
                }
                continue;
            }
            group_of.insert(entry.permission.clone(), entry.group.clone());
            if let Some(group) = &entry.group {
                members
                    .entry(group.clone())
                    .or_default()
                    .insert(entry.permission.clone());
            }
        }

        tracing::debug!(
            api_level,
            permissions = group_of.len(),
            groups = members.len(),
            "Permission catalog resolved"
        );

        Ok(PermissionClassifier { group_of, members })
    }
}

/// Sensitivity category of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Subject to the admin sensor-grant policy
    SensorRestricted,
    /// READ_SMS, subject to the managed-subscription policy on work profiles
    SmsSpecial,
    Ordinary,
}

/// Catalog entry as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry<'a> {
    pub permission: &'a str,
    pub group: Option<&'a str>,
}

/// Static permission lookups for one platform level
#[derive(Debug, Clone)]
pub struct PermissionClassifier {
    group_of: HashMap<String, Option<String>>,
    members: BTreeMap<String, BTreeSet<String>>,
}

impl PermissionClassifier {
    /// Group owning `permission`
    pub fn group_of(&self, permission: &str) -> Option<&str> {
        self.group_of.get(permission).and_then(|g| g.as_deref())
    }

    /// Permissions belonging to `group`, in name order
    pub fn permissions_in_group<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.members
            .get(group)
            .into_iter()
            .flat_map(|members| members.iter().map(String::as_str))
    }

    /// Whether the catalog defines `permission`
    pub fn is_known(&self, permission: &str) -> bool {
        self.group_of.contains_key(permission)
    }

    /// Catalog entry for `permission`
    pub fn lookup<'a>(&'a self, permission: &str) -> PolicyResult<PermissionEntry<'a>> {
        self.group_of
            .get_key_value(permission)
            .map(|(name, group)| PermissionEntry {
                permission: name.as_str(),
                group: group.as_deref(),
            })
            .ok_or_else(|| PolicyError::PermissionNotFound(permission.to_string()))
    }

    /// Known groups, in name order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Whether any member of `group` is in `restricted`
    pub fn group_has_restricted_member(&self, group: &str, restricted: &RestrictedSnapshot) -> bool {
        self.permissions_in_group(group).any(|p| restricted.contains(p))
    }

    /// Sensitivity category of `permission` against a restricted-set snapshot
    pub fn classify(&self, permission: &str, restricted: &RestrictedSnapshot) -> PermissionCategory {
        if permission == names::READ_SMS {
            return PermissionCategory::SmsSpecial;
        }
        let group_restricted = self
            .group_of(permission)
            .map(|g| self.group_has_restricted_member(g, restricted))
            .unwrap_or(false);
        if restricted.contains(permission) || group_restricted {
            PermissionCategory::SensorRestricted
        } else {
            PermissionCategory::Ordinary
        }
    }
}

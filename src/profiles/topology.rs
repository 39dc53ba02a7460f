//! Profile topology
//!
//! Read-only view over a profile directory snapshot. Profile ids index into
//! the snapshot; there is no ambient "current context" object, every query
//! names the profile it is about.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::{
    PolicyError, PolicyResult, PrivateProfileSupport, ProfileId, ProfileInfo, ProfileKind,
};

/// Profile directory snapshot as supplied by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Live profiles, in directory order
    pub profiles: Vec<ProfileInfo>,

    /// Profile of the current process
    #[serde(default = "default_current")]
    pub current: ProfileId,
}

fn default_current() -> ProfileId {
    ProfileId::SYSTEM
}

impl ProfileSnapshot {
    /// Create a snapshot whose current profile is the system profile
    pub fn new(profiles: Vec<ProfileInfo>) -> Self {
        Self {
            profiles,
            current: ProfileId::SYSTEM,
        }
    }

    /// Set the current process profile
    pub fn with_current(mut self, current: impl Into<ProfileId>) -> Self {
        self.current = current.into();
        self
    }
}

/// Relationships between profiles
///
/// The topology is a forest of depth at most two: a profile either has no
/// parent, or its parent has no parent. `new` rejects anything else.
#[derive(Debug, Clone)]
pub struct ProfileTopology {
    profiles: Vec<ProfileInfo>,
    index: HashMap<ProfileId, usize>,
    current: ProfileId,
    private_profiles: bool,
}

impl ProfileTopology {
    /// Build a topology from a snapshot, validating its shape
    pub fn new(snapshot: ProfileSnapshot, private: PrivateProfileSupport) -> PolicyResult<Self> {
        let mut index = HashMap::with_capacity(snapshot.profiles.len());
        for (position, info) in snapshot.profiles.iter().enumerate() {
            if !info.id.is_valid() {
                return Err(PolicyError::invalid_argument(format!(
                    "negative profile id {}",
                    info.id.as_raw()
                )));
            }
            if index.insert(info.id, position).is_some() {
                return Err(PolicyError::invalid_argument(format!(
                    "duplicate profile id {}",
                    info.id
                )));
            }
        }

        if !index.contains_key(&ProfileId::SYSTEM) {
            return Err(PolicyError::invalid_argument("system profile 0 is missing"));
        }
        if !index.contains_key(&snapshot.current) {
            return Err(PolicyError::invalid_argument(format!(
                "current profile {} is not in the snapshot",
                snapshot.current
            )));
        }

        for info in &snapshot.profiles {
            let Some(parent) = info.parent else {
                continue;
            };
            if parent == info.id {
                return Err(PolicyError::invalid_argument(format!(
                    "profile {} is its own parent",
                    info.id
                )));
            }
            let parent_info = index
                .get(&parent)
                .map(|&i| &snapshot.profiles[i])
                .ok_or_else(|| {
                    PolicyError::invalid_argument(format!(
                        "profile {} has unknown parent {}",
                        info.id, parent
                    ))
                })?;
            // Child profiles never have children.
            if parent_info.parent.is_some() {
                return Err(PolicyError::invalid_argument(format!(
                    "profile {} has parent {} which is itself a child profile",
                    info.id, parent
                )));
            }
            if parent_info.kind != ProfileKind::Primary {
                return Err(PolicyError::invalid_argument(format!(
                    "profile {} has parent {} which is not a primary profile",
                    info.id, parent
                )));
            }
            if info.kind == ProfileKind::Primary {
                return Err(PolicyError::invalid_argument(format!(
                    "profile {} is primary but has parent {}",
                    info.id, parent
                )));
            }
        }

        tracing::debug!(
            profiles = snapshot.profiles.len(),
            current = %snapshot.current,
            "Profile topology loaded"
        );

        Ok(Self {
            profiles: snapshot.profiles,
            index,
            current: snapshot.current,
            private_profiles: private.is_enabled(),
        })
    }

    /// Profile of the current process
    pub fn current_profile(&self) -> ProfileId {
        self.current
    }

    /// Whether `profile` is live in this snapshot
    pub fn contains(&self, profile: ProfileId) -> bool {
        self.index.contains_key(&profile)
    }

    /// Directory entry for `profile`
    pub fn info(&self, profile: ProfileId) -> PolicyResult<&ProfileInfo> {
        self.index
            .get(&profile)
            .map(|&i| &self.profiles[i])
            .ok_or(PolicyError::ProfileNotFound(profile))
    }

    /// Kind of `profile`
    pub fn kind(&self, profile: ProfileId) -> PolicyResult<ProfileKind> {
        Ok(self.info(profile)?.kind)
    }

    /// All profiles in directory order
    pub fn profiles(&self) -> &[ProfileInfo] {
        &self.profiles
    }

    /// The profile-group parent of `profile`, or `profile` itself
    pub fn parent_or_self(&self, profile: ProfileId) -> PolicyResult<ProfileId> {
        let info = self.info(profile)?;
        Ok(info.parent.unwrap_or(info.id))
    }

    /// Whether `profile` heads its own profile group
    pub fn is_profile_group_parent(&self, profile: ProfileId) -> PolicyResult<bool> {
        Ok(self.parent_or_self(profile)? == profile)
    }

    /// Profile-group parent of the current process profile
    pub fn current_profile_group_parent(&self) -> PolicyResult<ProfileId> {
        self.parent_or_self(self.current)
    }

    pub fn is_managed(&self, profile: ProfileId) -> PolicyResult<bool> {
        Ok(self.kind(profile)? == ProfileKind::Managed)
    }

    /// Whether `profile` is a private profile
    ///
    /// Always false unless both the OS gate and the feature flag are on.
    pub fn is_private(&self, profile: ProfileId) -> PolicyResult<bool> {
        let kind = self.kind(profile)?;
        Ok(self.private_profiles && kind == ProfileKind::Private)
    }

    /// Members of `profile`'s group, in directory order
    pub fn profile_group(&self, profile: ProfileId) -> PolicyResult<Vec<ProfileId>> {
        let anchor = self.parent_or_self(profile)?;
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.id == anchor || p.parent == Some(anchor))
            .map(|p| p.id)
            .collect())
    }

    /// First managed profile in `group_anchor`'s group
    ///
    /// With `exclude_self` set, the current process profile is skipped so a
    /// work profile never reports itself as its own work profile.
    pub fn work_profile_of(
        &self,
        group_anchor: ProfileId,
        exclude_self: bool,
    ) -> PolicyResult<Option<ProfileId>> {
        let group = self.profile_group(group_anchor)?;
        Ok(group.into_iter().find(|&id| {
            if exclude_self && id == self.current {
                return false;
            }
            self.index
                .get(&id)
                .map(|&i| self.profiles[i].kind == ProfileKind::Managed)
                .unwrap_or(false)
        }))
    }
}

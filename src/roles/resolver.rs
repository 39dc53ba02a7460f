//! Role defaults resolver
//!
//! Computes default holders, visibility and qualifying holders of a role for
//! one profile. Nothing is cached; every call asks the collaborators again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::authority::{InstalledApps, RoleAuthority};
use crate::core::{PolicyError, PolicyResult, ProfileId};
use crate::profiles::ProfileTopology;

/// Ordered package names holding or qualifying for a role
///
/// The first entry is the primary holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePackageSet(Vec<String>);

impl RolePackageSet {
    pub fn new(packages: Vec<String>) -> Self {
        Self(packages)
    }

    /// First-listed package
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.0.iter().any(|p| p == package)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for RolePackageSet {
    fn from(packages: Vec<String>) -> Self {
        Self(packages)
    }
}

/// Default holders of a role
///
/// `Unset` defers to the standard role logic; `Explicit` with an empty set
/// means "explicitly no default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "holders", rename_all = "snake_case")]
pub enum DefaultHolders {
    Unset,
    Explicit(RolePackageSet),
}

impl DefaultHolders {
    pub fn is_unset(&self) -> bool {
        matches!(self, DefaultHolders::Unset)
    }

    /// Explicit holders, if any were set
    pub fn explicit(&self) -> Option<&RolePackageSet> {
        match self {
            DefaultHolders::Unset => None,
            DefaultHolders::Explicit(set) => Some(set),
        }
    }
}

/// All three role queries for one (role, profile) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleResolution {
    pub role: String,
    pub profile: ProfileId,
    pub default_holders: DefaultHolders,
    pub visible: bool,
    pub qualifying_holders: RolePackageSet,
}

/// Resolves role defaults against a profile topology
#[derive(Clone)]
pub struct RoleDefaultsResolver {
    topology: Arc<ProfileTopology>,
    authority: Arc<dyn RoleAuthority>,
    apps: Arc<dyn InstalledApps>,
}

impl RoleDefaultsResolver {
    pub fn new(
        topology: Arc<ProfileTopology>,
        authority: Arc<dyn RoleAuthority>,
        apps: Arc<dyn InstalledApps>,
    ) -> Self {
        Self {
            topology,
            authority,
            apps,
        }
    }

    /// Profile must exist (never falls back to the primary profile) and the
    /// role must be known.
    fn ensure_known(&self, role: &str, profile: ProfileId) -> PolicyResult<()> {
        if !self.topology.contains(profile) {
            return Err(PolicyError::ProfileNotFound(profile));
        }
        if !self.authority.has_role(role) {
            return Err(PolicyError::RoleNotFound(role.to_string()));
        }
        Ok(())
    }

    /// Default holders of `role` in `profile`
    pub fn default_holders(&self, role: &str, profile: ProfileId) -> PolicyResult<DefaultHolders> {
        self.ensure_known(role, profile)?;
        if !self.authority.behavior_enabled(role) {
            return Ok(DefaultHolders::Unset);
        }
        let holders = self.authority.default_holders(role, profile);
        Ok(DefaultHolders::Explicit(RolePackageSet::new(holders)))
    }

    /// Whether `role` is visible in `profile`; false while the behavior is gated off
    pub fn is_visible(&self, role: &str, profile: ProfileId) -> PolicyResult<bool> {
        self.ensure_known(role, profile)?;
        if !self.authority.behavior_enabled(role) {
            return Ok(false);
        }
        Ok(self.authority.is_visible(role, profile))
    }

    /// Qualifying holders of `role` in `profile`
    ///
    /// Candidates not installed and enabled in `profile` are dropped; the
    /// remaining candidates keep their order.
    pub fn qualifying_holders(&self, role: &str, profile: ProfileId) -> PolicyResult<RolePackageSet> {
        self.ensure_known(role, profile)?;
        let candidates = self.authority.qualifying_candidates(role, profile);
        let total = candidates.len();
        let available: Vec<String> = candidates
            .into_iter()
            .filter(|package| self.apps.is_available(package, profile))
            .collect();

        if available.len() != total {
            tracing::debug!(
                role,
                profile = %profile,
                dropped = total - available.len(),
                "Dropped unavailable role candidates"
            );
        }

        Ok(RolePackageSet::new(available))
    }

    /// Default holders, visibility and qualifying holders together
    pub fn resolve(&self, role: &str, profile: ProfileId) -> PolicyResult<RoleResolution> {
        Ok(RoleResolution {
            role: role.to_string(),
            profile,
            default_holders: self.default_holders(role, profile)?,
            visible: self.is_visible(role, profile)?,
            qualifying_holders: self.qualifying_holders(role, profile)?,
        })
    }
}

impl std::fmt::Debug for RoleDefaultsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleDefaultsResolver")
            .field("profiles", &self.topology.profiles().len())
            .finish()
    }
}

//! Cross-profile access guard
//!
//! Decides whether the calling identity may query or act on a target profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::{AccessDenied, DenialReason, PolicyError, PolicyResult, ProfileId};
use crate::permissions::DevicePolicyProvider;
use crate::profiles::ProfileTopology;

/// Identity of the current caller
pub trait CallerIdentity {
    /// Profile the caller runs in
    fn calling_profile(&self) -> ProfileId;

    /// Caller holds the cross-user capability
    fn holds_cross_user_capability(&self) -> bool;

    /// Caller is the privileged shell identity
    fn is_shell(&self) -> bool;
}

/// Per-profile user restrictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRestriction {
    /// `no_debugging_features`
    #[serde(rename = "no_debugging_features")]
    DisallowDebuggingFeatures,
}

impl fmt::Display for UserRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRestriction::DisallowDebuggingFeatures => write!(f, "no_debugging_features"),
        }
    }
}

/// Source of user-restriction state
pub trait UserRestrictions: Send + Sync {
    fn has_restriction(&self, profile: ProfileId, restriction: UserRestriction) -> bool;
}

/// What the caller wants to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    /// Target profile, or `ProfileId::ALL`
    pub target: ProfileId,
    /// Caller accepts `ProfileId::ALL` as a target
    pub allow_all: bool,
    /// Check the whole profile group, not just the target
    pub enforce_for_group: bool,
}

impl AccessRequest {
    pub fn new(target: impl Into<ProfileId>) -> Self {
        Self {
            target: target.into(),
            allow_all: false,
            enforce_for_group: false,
        }
    }

    pub fn allow_all(mut self, allow: bool) -> Self {
        self.allow_all = allow;
        self
    }

    pub fn enforce_for_group(mut self, enforce: bool) -> Self {
        self.enforce_for_group = enforce;
        self
    }
}

/// Enforces which caller may act on which profile
#[derive(Clone)]
pub struct CrossProfileAccessGuard {
    topology: Arc<ProfileTopology>,
    restrictions: Arc<dyn UserRestrictions>,
    device_policy: Arc<dyn DevicePolicyProvider>,
}

impl CrossProfileAccessGuard {
    pub fn new(
        topology: Arc<ProfileTopology>,
        restrictions: Arc<dyn UserRestrictions>,
        device_policy: Arc<dyn DevicePolicyProvider>,
    ) -> Self {
        Self {
            topology,
            restrictions,
            device_policy,
        }
    }

    /// Authorize `caller` for `request`
    ///
    /// Self-access without group enforcement is always allowed. A denial
    /// names the offending profile.
    pub fn authorize(&self, caller: &dyn CallerIdentity, request: AccessRequest) -> PolicyResult<()> {
        let calling_profile = caller.calling_profile();
        let target = request.target;

        if target == calling_profile && !request.enforce_for_group {
            return Ok(());
        }

        let is_all = request.allow_all && target.is_all();
        if !is_all && !(target.is_valid() && self.topology.contains(target)) {
            return Err(PolicyError::invalid_argument(format!(
                "invalid target profile {}",
                target.as_raw()
            )));
        }

        if !caller.holds_cross_user_capability() {
            return Err(self.deny(
                calling_profile,
                target,
                DenialReason::MissingCrossUserCapability,
            ));
        }

        // Restrictions are per concrete profile.
        if is_all {
            return Ok(());
        }

        if caller.is_shell() && request.enforce_for_group {
            if !self
                .device_policy
                .is_organization_owned_device_with_managed_profile()
            {
                // BYOD users may freely choose the personal or work profile.
                return Ok(());
            }
            for profile in self.topology.profile_group(target)? {
                if profile == calling_profile {
                    continue;
                }
                self.check_debugging_allowed(calling_profile, profile)?;
            }
            return Ok(());
        }

        self.check_debugging_allowed(calling_profile, target)
    }

    fn check_debugging_allowed(&self, caller: ProfileId, profile: ProfileId) -> PolicyResult<()> {
        if self
            .restrictions
            .has_restriction(profile, UserRestriction::DisallowDebuggingFeatures)
        {
            return Err(self.deny(caller, profile, DenialReason::DebuggingFeaturesDisallowed));
        }
        Ok(())
    }

    fn deny(&self, caller: ProfileId, profile: ProfileId, reason: DenialReason) -> PolicyError {
        tracing::warn!(
            caller = %caller,
            profile = %profile,
            %reason,
            "Cross-profile access denied"
        );
        AccessDenied::new(profile, reason).into()
    }
}

impl fmt::Debug for CrossProfileAccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossProfileAccessGuard")
            .field("profiles", &self.topology.profiles().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PrivateProfileSupport, ProfileInfo, ProfileKind};
    use crate::profiles::ProfileSnapshot;
    use crate::snapshot::{DevicePolicySnapshot, RestrictionTable, StaticCaller};

    fn topology() -> Arc<ProfileTopology> {
        Arc::new(
            ProfileTopology::new(
                ProfileSnapshot::new(vec![
                    ProfileInfo::root(0, ProfileKind::Other),
                    ProfileInfo::root(10, ProfileKind::Primary),
                    ProfileInfo::child(11, ProfileKind::Managed, 10),
                    ProfileInfo::child(12, ProfileKind::Private, 10),
                ])
                .with_current(10),
                PrivateProfileSupport::default(),
            )
            .unwrap(),
        )
    }

    fn guard(restrictions: RestrictionTable, org_owned: bool) -> CrossProfileAccessGuard {
        let device_policy =
            DevicePolicySnapshot::new().with_organization_owned_managed_profile(org_owned);
        CrossProfileAccessGuard::new(topology(), Arc::new(restrictions), Arc::new(device_policy))
    }

    fn debugging_disallowed(profiles: &[i32]) -> RestrictionTable {
        profiles.iter().fold(RestrictionTable::new(), |table, &p| {
            table.with_restriction(p, UserRestriction::DisallowDebuggingFeatures)
        })
    }

    fn denied_profile(result: PolicyResult<()>) -> Option<ProfileId> {
        result.err().and_then(|e| e.as_denied().map(|d| d.profile))
    }

    #[test]
    fn test_self_access_always_allowed() {
        let guard = guard(debugging_disallowed(&[10, 11]), true);
        let caller = StaticCaller::new(10);
        assert!(guard.authorize(&caller, AccessRequest::new(10)).is_ok());
        assert!(guard.authorize(&StaticCaller::new(11).shell(), AccessRequest::new(11)).is_ok());
    }

    #[test]
    fn test_restricted_target_denied_for_regular_caller() {
        let guard = guard(debugging_disallowed(&[11]), false);
        let caller = StaticCaller::new(10).with_cross_user_capability();

        let result = guard.authorize(&caller, AccessRequest::new(11));
        assert_eq!(denied_profile(result), Some(ProfileId::new(11)));

        assert!(guard.authorize(&caller, AccessRequest::new(12)).is_ok());
    }

    #[test]
    fn test_missing_capability() {
        let guard = guard(RestrictionTable::new(), false);
        let err = guard
            .authorize(&StaticCaller::new(10), AccessRequest::new(11))
            .unwrap_err();
        let denied = err.as_denied().unwrap();
        assert_eq!(denied.reason, DenialReason::MissingCrossUserCapability);
        assert_eq!(denied.profile, ProfileId::new(11));
    }

    #[test]
    fn test_invalid_targets() {
        let guard = guard(RestrictionTable::new(), false);
        let caller = StaticCaller::new(10).with_cross_user_capability();

        for request in [
            AccessRequest::new(-5),
            AccessRequest::new(ProfileId::ALL),
            AccessRequest::new(99),
            AccessRequest::new(-5).allow_all(true),
        ] {
            let err = guard.authorize(&caller, request).unwrap_err();
            assert!(matches!(err, PolicyError::InvalidArgument(_)), "{:?}", request);
        }
    }

    #[test]
    fn test_all_profiles_sentinel() {
        let guard = guard(debugging_disallowed(&[0, 11]), true);
        let request = AccessRequest::new(ProfileId::ALL).allow_all(true);

        assert!(guard
            .authorize(&StaticCaller::new(10).with_cross_user_capability(), request)
            .is_ok());
        assert!(guard
            .authorize(&StaticCaller::new(10).with_cross_user_capability().shell(), request)
            .is_ok());
        assert!(guard.authorize(&StaticCaller::new(10), request).is_err());
    }

    #[test]
    fn test_shell_group_check_on_org_owned_device() {
        let guard = guard(debugging_disallowed(&[12]), true);
        let shell = StaticCaller::new(0).with_cross_user_capability().shell();
        let request = AccessRequest::new(11).enforce_for_group(true);

        assert_eq!(denied_profile(guard.authorize(&shell, request)), Some(ProfileId::new(12)));
    }

    #[test]
    fn test_shell_group_check_skips_caller_profile() {
        let guard = guard(debugging_disallowed(&[10]), true);
        let shell = StaticCaller::new(10).with_cross_user_capability().shell();
        let request = AccessRequest::new(10).enforce_for_group(true);

        assert!(guard.authorize(&shell, request).is_ok());
    }

    #[test]
    fn test_shell_group_check_exempt_on_byod() {
        let guard = guard(debugging_disallowed(&[10, 11, 12]), false);
        let shell = StaticCaller::new(0).with_cross_user_capability().shell();
        let request = AccessRequest::new(11).enforce_for_group(true);

        assert!(guard.authorize(&shell, request).is_ok());
    }

    #[test]
    fn test_shell_without_group_checks_single_target() {
        let guard = guard(debugging_disallowed(&[12]), true);
        let shell = StaticCaller::new(0).with_cross_user_capability().shell();

        assert!(guard.authorize(&shell, AccessRequest::new(11)).is_ok());
        assert_eq!(
            denied_profile(guard.authorize(&shell, AccessRequest::new(12))),
            Some(ProfileId::new(12))
        );
    }

    #[test]
    fn test_group_enforcement_for_self_still_checks() {
        let guard = guard(debugging_disallowed(&[10]), true);
        let caller = StaticCaller::new(10).with_cross_user_capability();
        let request = AccessRequest::new(10).enforce_for_group(true);

        assert_eq!(denied_profile(guard.authorize(&caller, request)), Some(ProfileId::new(10)));
    }
}

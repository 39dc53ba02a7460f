//! Admin grant policy
//!
//! Decides whether a device administrator may silently grant a permission in
//! a profile. The decision is a pure function of its inputs plus one snapshot
//! of the admin-restricted set; precedence, first match wins:
//!
//! 1. platform gate closed → allowed (legacy behavior)
//! 2. managed profile + READ_SMS → managed-subscription policy
//! 3. permission or its group admin-restricted → sensor-grant toggle
//! 4. otherwise → allowed
//!
//! READ_SMS is not a sensor permission, so step 2 has to run before step 3.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::catalog::PermissionClassifier;
use super::names;
use super::restricted::{AdminRestrictedSet, RestrictedSnapshot};
use crate::core::{PlatformGates, PolicyResult, ProfileId};
use crate::profiles::ProfileTopology;

/// Managed-subscription policy type set by the device owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedSubscriptionsPolicy {
    /// Subscriptions stay personal
    #[default]
    AllPersonalSubscriptions,
    /// Every subscription belongs to the managed profile
    AllManagedSubscriptions,
}

/// Device-policy state supplied by the platform
pub trait DevicePolicyProvider: Send + Sync {
    /// Admin's sensor-grant toggle for `profile`
    fn can_admin_grant_sensors_permissions(&self, profile: ProfileId) -> bool;

    /// Organization-owned device with a managed profile
    fn is_organization_owned_device_with_managed_profile(&self) -> bool;

    fn managed_subscriptions_policy(&self) -> ManagedSubscriptionsPolicy;
}

/// Device-policy facts behind the managed-profile READ_SMS rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedSmsState {
    pub organization_owned_with_managed_profile: bool,
    pub subscriptions_policy: ManagedSubscriptionsPolicy,
}

impl ManagedSmsState {
    pub fn new(
        organization_owned_with_managed_profile: bool,
        subscriptions_policy: ManagedSubscriptionsPolicy,
    ) -> Self {
        Self {
            organization_owned_with_managed_profile,
            subscriptions_policy,
        }
    }

    /// Read the state from a policy provider
    pub fn from_provider(provider: &dyn DevicePolicyProvider) -> Self {
        Self::new(
            provider.is_organization_owned_device_with_managed_profile(),
            provider.managed_subscriptions_policy(),
        )
    }

    fn permits_read_sms(&self) -> bool {
        self.organization_owned_with_managed_profile
            && self.subscriptions_policy == ManagedSubscriptionsPolicy::AllManagedSubscriptions
    }
}

/// Pre-resolved inputs to one admin grant decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantInputs<'a> {
    pub permission: &'a str,
    pub group: Option<&'a str>,
    pub is_managed_profile: bool,
    pub sensor_grant_enabled: bool,
    pub managed_sms: ManagedSmsState,
}

impl<'a> GrantInputs<'a> {
    /// Inputs for `permission` with every flag off
    pub fn new(permission: &'a str) -> Self {
        Self {
            permission,
            group: None,
            is_managed_profile: false,
            sensor_grant_enabled: false,
            managed_sms: ManagedSmsState::default(),
        }
    }

    pub fn with_group(mut self, group: Option<&'a str>) -> Self {
        self.group = group;
        self
    }

    pub fn with_managed_profile(mut self, managed: bool) -> Self {
        self.is_managed_profile = managed;
        self
    }

    pub fn with_sensor_grant(mut self, enabled: bool) -> Self {
        self.sensor_grant_enabled = enabled;
        self
    }

    pub fn with_managed_sms(mut self, state: ManagedSmsState) -> Self {
        self.managed_sms = state;
        self
    }
}

/// Why a grant was allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    /// The policy does not exist on this platform
    NotRestrictedForOsVersion,
    /// The permission is not admin-restricted
    NotRestricted,
    /// Restricted, but the admin's sensor-grant toggle is on
    SensorGrantEnabled,
    /// Managed-profile READ_SMS with all subscriptions managed
    ManagedSmsPolicySatisfied,
}

/// Why a grant was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    SensorPolicyDenied,
    ManagedSmsPolicyDenied,
}

/// Outcome of an admin grant decision
///
/// A denial is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum GrantDecision {
    Allowed(AllowReason),
    Denied(DenyReason),
}

impl GrantDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GrantDecision::Allowed(_))
    }

    fn by_toggle(enabled: bool) -> Self {
        if enabled {
            GrantDecision::Allowed(AllowReason::SensorGrantEnabled)
        } else {
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        }
    }
}

impl fmt::Display for GrantDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantDecision::Allowed(reason) => write!(f, "allowed ({:?})", reason),
            GrantDecision::Denied(reason) => write!(f, "denied ({:?})", reason),
        }
    }
}

/// Evaluate the precedence rules against one restricted-set snapshot
fn evaluate(
    gates: &PlatformGates,
    classifier: &PermissionClassifier,
    restricted: &RestrictedSnapshot,
    inputs: &GrantInputs<'_>,
) -> GrantDecision {
    if !gates.admin_restricted_permissions {
        return GrantDecision::Allowed(AllowReason::NotRestrictedForOsVersion);
    }

    if inputs.is_managed_profile && inputs.permission == names::READ_SMS {
        return if inputs.managed_sms.permits_read_sms() {
            GrantDecision::Allowed(AllowReason::ManagedSmsPolicySatisfied)
        } else {
            GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied)
        };
    }

    let group_restricted = inputs
        .group
        .map(|g| classifier.group_has_restricted_member(g, restricted))
        .unwrap_or(false);
    if restricted.contains(inputs.permission) || group_restricted {
        return GrantDecision::by_toggle(inputs.sensor_grant_enabled);
    }

    GrantDecision::Allowed(AllowReason::NotRestricted)
}

/// Admin grant policy over a shared restricted set
#[derive(Debug, Clone)]
pub struct AdminGrantPolicy {
    gates: PlatformGates,
    restricted: Arc<AdminRestrictedSet>,
    classifier: Arc<PermissionClassifier>,
}

impl AdminGrantPolicy {
    pub fn new(
        gates: PlatformGates,
        restricted: Arc<AdminRestrictedSet>,
        classifier: Arc<PermissionClassifier>,
    ) -> Self {
        Self {
            gates,
            restricted,
            classifier,
        }
    }

    /// Decide from pre-resolved inputs
    pub fn decide(&self, inputs: &GrantInputs<'_>) -> GrantDecision {
        let snapshot = self.restricted.snapshot();
        let decision = evaluate(&self.gates, &self.classifier, &snapshot, inputs);
        tracing::debug!(
            permission = inputs.permission,
            managed = inputs.is_managed_profile,
            %decision,
            "Admin grant decision"
        );
        decision
    }

    /// Decide for `permission` in `profile`, resolving policy state itself
    ///
    /// Fails with `ProfileNotFound` if `profile` is not in the topology.
    pub fn may_admin_grant(
        &self,
        permission: &str,
        profile: ProfileId,
        topology: &ProfileTopology,
        device_policy: &dyn DevicePolicyProvider,
    ) -> PolicyResult<GrantDecision> {
        let is_managed = topology.is_managed(profile)?;
        let inputs = GrantInputs::new(permission)
            .with_group(self.classifier.group_of(permission))
            .with_managed_profile(is_managed)
            .with_sensor_grant(device_policy.can_admin_grant_sensors_permissions(profile))
            .with_managed_sms(ManagedSmsState::from_provider(device_policy));
        Ok(self.decide(&inputs))
    }

    /// Register a permission as admin-restricted
    pub fn add_admin_restricted_permission(&self, permission: impl Into<String>) -> bool {
        self.restricted.add(permission)
    }

    /// Whether `group` contains any admin-restricted permission
    pub fn is_restricted_group(&self, group: &str) -> bool {
        self.classifier
            .group_has_restricted_member(group, &self.restricted.snapshot())
    }

    pub fn restricted(&self) -> &Arc<AdminRestrictedSet> {
        &self.restricted
    }

    pub fn classifier(&self) -> &Arc<PermissionClassifier> {
        &self.classifier
    }

    pub fn gates(&self) -> &PlatformGates {
        &self.gates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{API_LEVEL_S, API_LEVEL_T};
    use crate::core::{PrivateProfileSupport, ProfileInfo, ProfileKind};
    use crate::permissions::names::group;
    use crate::permissions::PermissionCatalog;
    use crate::profiles::ProfileSnapshot;
    use crate::snapshot::DevicePolicySnapshot;

    fn policy_with(gates: PlatformGates, restricted: AdminRestrictedSet) -> AdminGrantPolicy {
        let api_level = if gates.background_sensor_permissions {
            API_LEVEL_T
        } else {
            API_LEVEL_S
        };
        let classifier = PermissionCatalog::platform().resolve(api_level).unwrap();
        AdminGrantPolicy::new(gates, Arc::new(restricted), Arc::new(classifier))
    }

    fn baseline_policy() -> AdminGrantPolicy {
        let gates = PlatformGates::all_enabled();
        policy_with(gates, AdminRestrictedSet::with_baseline(&gates))
    }

    fn org_owned_all_managed() -> ManagedSmsState {
        ManagedSmsState::new(true, ManagedSubscriptionsPolicy::AllManagedSubscriptions)
    }

    #[test]
    fn test_baseline_follows_sensor_toggle() {
        let policy = baseline_policy();
        let snapshot = policy.restricted().snapshot();
        assert!(!snapshot.is_empty());

        for permission in snapshot.iter() {
            let denied = policy.decide(&GrantInputs::new(permission).with_sensor_grant(false));
            assert_eq!(
                denied,
                GrantDecision::Denied(DenyReason::SensorPolicyDenied),
                "{}",
                permission
            );

            let allowed = policy.decide(&GrantInputs::new(permission).with_sensor_grant(true));
            assert_eq!(allowed, GrantDecision::Allowed(AllowReason::SensorGrantEnabled));
        }
    }

    #[test]
    fn test_closed_platform_gate_allows_everything() {
        let gates = PlatformGates::legacy();
        let policy = policy_with(gates, AdminRestrictedSet::with_baseline(&gates));

        for permission in [names::CAMERA, names::READ_SMS] {
            let inputs = GrantInputs::new(permission).with_managed_profile(true);
            assert_eq!(
                policy.decide(&inputs),
                GrantDecision::Allowed(AllowReason::NotRestrictedForOsVersion)
            );
        }
    }

    #[test]
    fn test_managed_read_sms_checked_before_sensor_toggle() {
        let policy = baseline_policy();
        let inputs = GrantInputs::new(names::READ_SMS)
            .with_group(Some(group::SMS))
            .with_managed_profile(true)
            .with_sensor_grant(true)
            .with_managed_sms(ManagedSmsState::new(
                true,
                ManagedSubscriptionsPolicy::AllPersonalSubscriptions,
            ));

        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied)
        );
    }

    #[test]
    fn test_managed_read_sms_allowed_when_all_managed() {
        let policy = baseline_policy();
        let inputs = GrantInputs::new(names::READ_SMS)
            .with_managed_profile(true)
            .with_managed_sms(org_owned_all_managed());
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Allowed(AllowReason::ManagedSmsPolicySatisfied)
        );

        let not_org_owned = inputs.with_managed_sms(ManagedSmsState::new(
            false,
            ManagedSubscriptionsPolicy::AllManagedSubscriptions,
        ));
        assert_eq!(
            policy.decide(&not_org_owned),
            GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied)
        );
    }

    #[test]
    fn test_managed_read_sms_allowed_at_api_t() {
        let gates = PlatformGates::for_api_level(API_LEVEL_T);
        let policy = policy_with(gates, AdminRestrictedSet::with_baseline(&gates));
        let inputs = GrantInputs::new(names::READ_SMS)
            .with_managed_profile(true)
            .with_sensor_grant(true)
            .with_managed_sms(org_owned_all_managed());
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Allowed(AllowReason::ManagedSmsPolicySatisfied)
        );
    }

    #[test]
    fn test_read_sms_outside_managed_profile_is_not_restricted() {
        let policy = baseline_policy();
        let inputs = GrantInputs::new(names::READ_SMS).with_group(Some(group::SMS));
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Allowed(AllowReason::NotRestricted)
        );
    }

    #[test]
    fn test_group_membership_restricts_unlisted_permission() {
        let policy = baseline_policy();
        let inputs = GrantInputs::new("com.example.FANCY_LOCATION").with_group(Some(group::LOCATION));
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
        assert!(policy.is_restricted_group(group::LOCATION));
        assert!(!policy.is_restricted_group(group::CONTACTS));
    }

    #[test]
    fn test_ordinary_permission_not_restricted() {
        let policy = baseline_policy();
        let inputs = GrantInputs::new(names::READ_CONTACTS).with_group(Some(group::CONTACTS));
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Allowed(AllowReason::NotRestricted)
        );
    }

    #[test]
    fn test_background_body_sensors_follows_seeding() {
        let gates = PlatformGates::all_enabled();
        let policy = policy_with(
            gates,
            AdminRestrictedSet::from_permissions([names::CAMERA, names::RECORD_AUDIO]),
        );
        let inputs = GrantInputs::new(names::BODY_SENSORS_BACKGROUND);

        let before = policy.decide(&inputs);
        assert_eq!(before, GrantDecision::Allowed(AllowReason::NotRestricted));

        assert!(policy.add_admin_restricted_permission(names::BODY_SENSORS_BACKGROUND));
        assert_eq!(
            policy.decide(&inputs),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
        assert_eq!(
            policy.decide(&inputs.with_sensor_grant(true)),
            GrantDecision::Allowed(AllowReason::SensorGrantEnabled)
        );
        // Earlier results are values, untouched by the registration.
        assert_eq!(before, GrantDecision::Allowed(AllowReason::NotRestricted));

        let seeded = policy_with(gates, AdminRestrictedSet::with_baseline(&gates));
        assert_eq!(
            seeded.decide(&inputs),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
    }

    #[test]
    fn test_resolving_shape_matches_pre_resolved_shape() {
        let topology = ProfileTopology::new(
            ProfileSnapshot::new(vec![
                ProfileInfo::root(0, ProfileKind::Primary),
                ProfileInfo::child(10, ProfileKind::Managed, 0),
            ]),
            PrivateProfileSupport::default(),
        )
        .unwrap();
        let device_policy = DevicePolicySnapshot::new()
            .with_sensor_grant(ProfileId::new(0))
            .with_organization_owned_managed_profile(true)
            .with_subscriptions_policy(ManagedSubscriptionsPolicy::AllPersonalSubscriptions);
        let policy = baseline_policy();

        let cases = [
            (names::CAMERA, 0),
            (names::CAMERA, 10),
            (names::READ_SMS, 0),
            (names::READ_SMS, 10),
            (names::READ_CONTACTS, 10),
        ];
        for (permission, raw) in cases {
            let profile = ProfileId::new(raw);
            let resolved = policy
                .may_admin_grant(permission, profile, &topology, &device_policy)
                .unwrap();
            let inputs = GrantInputs::new(permission)
                .with_group(policy.classifier().group_of(permission))
                .with_managed_profile(topology.is_managed(profile).unwrap())
                .with_sensor_grant(device_policy.can_admin_grant_sensors_permissions(profile))
                .with_managed_sms(ManagedSmsState::from_provider(&device_policy));
            assert_eq!(resolved, policy.decide(&inputs), "{} in {}", permission, profile);
        }

        assert_eq!(
            policy
                .may_admin_grant(names::READ_SMS, ProfileId::new(10), &topology, &device_policy)
                .unwrap(),
            GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied)
        );
        assert_eq!(
            policy
                .may_admin_grant(names::CAMERA, ProfileId::new(10), &topology, &device_policy)
                .unwrap(),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
    }

    #[test]
    fn test_resolving_shape_unknown_profile() {
        let topology = ProfileTopology::new(
            ProfileSnapshot::new(vec![ProfileInfo::root(0, ProfileKind::Primary)]),
            PrivateProfileSupport::default(),
        )
        .unwrap();
        let err = baseline_policy()
            .may_admin_grant(names::CAMERA, ProfileId::new(5), &topology, &DevicePolicySnapshot::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decision_serde() {
        let json = serde_json::to_string(&GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied))
            .unwrap();
        assert_eq!(json, r#"{"decision":"denied","reason":"managed_sms_policy_denied"}"#);
    }
}

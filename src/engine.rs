//! Policy engine
//!
//! Wires the components together along the request path: the access guard
//! authorizes the caller for the target profile, then the grant policy or
//! role resolver answers using the topology and the classifier.

use std::sync::Arc;

use crate::access::{AccessRequest, CallerIdentity, CrossProfileAccessGuard, UserRestrictions};
use crate::core::{EngineConfig, PolicyResult, ProfileId};
use crate::permissions::{
    AdminGrantPolicy, AdminRestrictedSet, DevicePolicyProvider, GrantDecision, PermissionCatalog,
    PermissionClassifier,
};
use crate::profiles::{ProfileSnapshot, ProfileTopology};
use crate::roles::{InstalledApps, RoleAuthority, RoleDefaultsResolver, RoleResolution};
use crate::snapshot::{InstalledPackages, Scenario, StaticRoleAuthority};

/// External collaborators the engine consults
#[derive(Clone)]
pub struct Collaborators {
    pub roles: Arc<dyn RoleAuthority>,
    pub apps: Arc<dyn InstalledApps>,
    pub device_policy: Arc<dyn DevicePolicyProvider>,
    pub restrictions: Arc<dyn UserRestrictions>,
}

/// Profile-aware permission-grant policy engine
pub struct PolicyEngine {
    config: EngineConfig,
    topology: Arc<ProfileTopology>,
    grant_policy: AdminGrantPolicy,
    roles: RoleDefaultsResolver,
    guard: CrossProfileAccessGuard,
    device_policy: Arc<dyn DevicePolicyProvider>,
}

impl PolicyEngine {
    /// Build an engine
    ///
    /// Validates the profile snapshot, resolves the catalog for the configured
    /// API level and seeds the admin-restricted set.
    pub fn new(
        config: EngineConfig,
        profiles: ProfileSnapshot,
        catalog: &PermissionCatalog,
        collaborators: Collaborators,
    ) -> PolicyResult<Self> {
        let gates = config.gates();
        let topology = Arc::new(ProfileTopology::new(
            profiles,
            config.private_profile_support(),
        )?);
        let classifier: Arc<PermissionClassifier> = Arc::new(catalog.resolve(config.api_level)?);

        let restricted = Arc::new(AdminRestrictedSet::with_baseline(&gates));
        for permission in &config.extra_admin_restricted {
            restricted.add(permission.as_str());
        }

        tracing::info!(
            api_level = config.api_level,
            profiles = topology.profiles().len(),
            restricted = restricted.len(),
            "Policy engine ready"
        );

        Ok(Self {
            grant_policy: AdminGrantPolicy::new(gates, restricted, classifier),
            roles: RoleDefaultsResolver::new(
                Arc::clone(&topology),
                collaborators.roles,
                collaborators.apps,
            ),
            guard: CrossProfileAccessGuard::new(
                Arc::clone(&topology),
                collaborators.restrictions,
                Arc::clone(&collaborators.device_policy),
            ),
            device_policy: collaborators.device_policy,
            topology,
            config,
        })
    }

    /// Build an engine from a scenario's data
    pub fn from_scenario(scenario: Scenario) -> PolicyResult<Self> {
        let catalog = scenario.catalog_or_platform();
        let collaborators = Collaborators {
            roles: Arc::new(StaticRoleAuthority::from_definitions(scenario.roles)),
            apps: Arc::new(InstalledPackages::from_entries(scenario.installed)),
            device_policy: Arc::new(scenario.device_policy),
            restrictions: Arc::new(scenario.restrictions),
        };
        Self::new(scenario.config, scenario.profiles, &catalog, collaborators)
    }

    /// Authorize `caller` for `request`
    pub fn authorize(&self, caller: &dyn CallerIdentity, request: AccessRequest) -> PolicyResult<()> {
        self.guard.authorize(caller, request)
    }

    /// May an administrator grant `permission` in `profile`?
    pub fn admin_grant(
        &self,
        caller: &dyn CallerIdentity,
        permission: &str,
        profile: ProfileId,
    ) -> PolicyResult<GrantDecision> {
        self.guard.authorize(caller, AccessRequest::new(profile))?;
        self.grant_policy.may_admin_grant(
            permission,
            profile,
            &self.topology,
            self.device_policy.as_ref(),
        )
    }

    /// Default holders, visibility and qualifying holders of `role` in `profile`
    pub fn role_defaults(
        &self,
        caller: &dyn CallerIdentity,
        role: &str,
        profile: ProfileId,
    ) -> PolicyResult<RoleResolution> {
        self.guard.authorize(caller, AccessRequest::new(profile))?;
        self.roles.resolve(role, profile)
    }

    /// Register an admin-restricted permission for all later decisions
    pub fn add_admin_restricted_permission(&self, permission: impl Into<String>) -> bool {
        self.grant_policy.add_admin_restricted_permission(permission)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn topology(&self) -> &ProfileTopology {
        &self.topology
    }

    pub fn classifier(&self) -> &PermissionClassifier {
        self.grant_policy.classifier()
    }

    pub fn grant_policy(&self) -> &AdminGrantPolicy {
        &self.grant_policy
    }

    pub fn roles(&self) -> &RoleDefaultsResolver {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::UserRestriction;
    use crate::core::{PolicyError, ProfileInfo, ProfileKind};
    use crate::permissions::{names, AllowReason, DenyReason};
    use crate::roles::ApplicationInfo;
    use crate::snapshot::{
        DevicePolicySnapshot, InstalledPackage, RestrictionTable, RoleDefinition, RoleProfileData,
        StaticCaller,
    };

    const BROWSER: &str = "android.app.role.BROWSER";

    fn scenario() -> Scenario {
        Scenario::new(
            ProfileSnapshot::new(vec![
                ProfileInfo::root(0, ProfileKind::Other),
                ProfileInfo::root(10, ProfileKind::Primary),
                ProfileInfo::child(11, ProfileKind::Managed, 10),
            ])
            .with_current(10),
        )
        .with_config(EngineConfig::new().with_admin_restricted(names::NEARBY_WIFI_DEVICES))
        .with_installed(InstalledPackage {
            profile: ProfileId::new(11),
            info: ApplicationInfo::new("com.example.work.browser"),
        })
        .with_role(
            RoleDefinition::new(BROWSER).with_profile(
                RoleProfileData::new(11)
                    .with_default_holders(["com.example.work.browser"])
                    .with_visible(true)
                    .with_candidates(["com.example.personal.browser", "com.example.work.browser"]),
            ),
        )
        .with_device_policy(DevicePolicySnapshot::new().with_sensor_grant(10))
        .with_restrictions(
            RestrictionTable::new().with_restriction(11, UserRestriction::DisallowDebuggingFeatures),
        )
    }

    #[test]
    fn test_admin_grant_self_profile() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let caller = StaticCaller::new(10);

        assert_eq!(
            engine.admin_grant(&caller, names::CAMERA, ProfileId::new(10)).unwrap(),
            GrantDecision::Allowed(AllowReason::SensorGrantEnabled)
        );
        assert_eq!(
            engine
                .admin_grant(&caller, names::NEARBY_WIFI_DEVICES, ProfileId::new(10))
                .unwrap(),
            GrantDecision::Allowed(AllowReason::SensorGrantEnabled)
        );
    }

    #[test]
    fn test_admin_grant_in_restricted_work_profile_is_access_denied() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let caller = StaticCaller::new(10).with_cross_user_capability();

        let err = engine
            .admin_grant(&caller, names::CAMERA, ProfileId::new(11))
            .unwrap_err();
        assert_eq!(err.as_denied().map(|d| d.profile), Some(ProfileId::new(11)));
    }

    #[test]
    fn test_admin_grant_from_work_profile() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let caller = StaticCaller::new(11);

        assert_eq!(
            engine.admin_grant(&caller, names::CAMERA, ProfileId::new(11)).unwrap(),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
        assert_eq!(
            engine.admin_grant(&caller, names::READ_SMS, ProfileId::new(11)).unwrap(),
            GrantDecision::Denied(DenyReason::ManagedSmsPolicyDenied)
        );
    }

    #[test]
    fn test_role_defaults_filters_uninstalled() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let resolution = engine
            .role_defaults(&StaticCaller::new(11), BROWSER, ProfileId::new(11))
            .unwrap();

        assert!(resolution.visible);
        assert_eq!(
            resolution.qualifying_holders.into_vec(),
            vec!["com.example.work.browser".to_string()]
        );
    }

    #[test]
    fn test_unknown_profile_is_invalid_argument() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let caller = StaticCaller::new(10).with_cross_user_capability();
        let err = engine
            .role_defaults(&caller, BROWSER, ProfileId::new(42))
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidArgument(_)));
    }

    #[test]
    fn test_registration_visible_to_later_decisions() {
        let engine = PolicyEngine::from_scenario(scenario()).unwrap();
        let caller = StaticCaller::new(11);

        let before = engine
            .admin_grant(&caller, names::READ_CALENDAR, ProfileId::new(11))
            .unwrap();
        assert_eq!(before, GrantDecision::Allowed(AllowReason::NotRestricted));

        assert!(engine.add_admin_restricted_permission(names::READ_CALENDAR));
        assert_eq!(
            engine
                .admin_grant(&caller, names::READ_CALENDAR, ProfileId::new(11))
                .unwrap(),
            GrantDecision::Denied(DenyReason::SensorPolicyDenied)
        );
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let scenario = Scenario::new(ProfileSnapshot::new(vec![ProfileInfo::root(
            3,
            ProfileKind::Primary,
        )]));
        assert!(matches!(
            PolicyEngine::from_scenario(scenario),
            Err(PolicyError::InvalidArgument(_))
        ));
    }
}

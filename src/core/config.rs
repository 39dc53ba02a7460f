//! Engine configuration
//!
//! Platform API levels are resolved here, once, into plain boolean gates.
//! Nothing downstream of `PlatformGates` looks at a version number.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::PolicyResult;

/// API level that introduced admin-restricted sensor permissions
pub const API_LEVEL_S: u32 = 31;
/// API level that introduced background camera/audio/body-sensor permissions
pub const API_LEVEL_T: u32 = 33;
/// API level that introduced private profiles
pub const API_LEVEL_V: u32 = 35;

/// Platform capability gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformGates {
    /// Admin-restricted permission policy applies at all
    pub admin_restricted_permissions: bool,
    /// Background sensor permissions exist and join the restricted baseline
    pub background_sensor_permissions: bool,
    /// The OS supports private profiles
    pub private_profiles: bool,
}

impl PlatformGates {
    /// Gates for a given platform API level
    pub fn for_api_level(api_level: u32) -> Self {
        Self {
            admin_restricted_permissions: api_level >= API_LEVEL_S,
            background_sensor_permissions: api_level >= API_LEVEL_T,
            private_profiles: api_level >= API_LEVEL_V,
        }
    }

    /// Every gate open
    pub fn all_enabled() -> Self {
        Self {
            admin_restricted_permissions: true,
            background_sensor_permissions: true,
            private_profiles: true,
        }
    }

    /// Every gate closed (pre-policy platform)
    pub fn legacy() -> Self {
        Self {
            admin_restricted_permissions: false,
            background_sensor_permissions: false,
            private_profiles: false,
        }
    }
}

/// The two independent inputs behind `is_private`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivateProfileSupport {
    /// The OS version supports private profiles
    pub os_supported: bool,
    /// The private-profile feature flag is on
    pub feature_enabled: bool,
}

impl PrivateProfileSupport {
    pub fn new(os_supported: bool, feature_enabled: bool) -> Self {
        Self {
            os_supported,
            feature_enabled,
        }
    }

    /// Both inputs satisfied
    pub fn is_enabled(&self) -> bool {
        self.os_supported && self.feature_enabled
    }
}

/// Configuration for a policy engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Platform API level the decisions are made for
    #[serde(default = "default_api_level")]
    pub api_level: u32,

    /// Private-profile feature flag
    #[serde(default)]
    pub private_profile_feature: bool,

    /// Permissions registered as admin-restricted after baseline seeding
    #[serde(default)]
    pub extra_admin_restricted: Vec<String>,
}

fn default_api_level() -> u32 {
    API_LEVEL_V
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_level: default_api_level(),
            private_profile_feature: false,
            extra_admin_restricted: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Set the platform API level
    pub fn with_api_level(mut self, api_level: u32) -> Self {
        self.api_level = api_level;
        self
    }

    /// Set the private-profile feature flag
    pub fn with_private_profile_feature(mut self, enabled: bool) -> Self {
        self.private_profile_feature = enabled;
        self
    }

    /// Register an extra admin-restricted permission at startup
    pub fn with_admin_restricted(mut self, permission: impl Into<String>) -> Self {
        self.extra_admin_restricted.push(permission.into());
        self
    }

    /// Gates resolved from the API level
    pub fn gates(&self) -> PlatformGates {
        PlatformGates::for_api_level(self.api_level)
    }

    /// Private-profile inputs resolved from gates and feature flag
    pub fn private_profile_support(&self) -> PrivateProfileSupport {
        PrivateProfileSupport::new(self.gates().private_profiles, self.private_profile_feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_gates_for_api_level() {
        let s = PlatformGates::for_api_level(API_LEVEL_S);
        assert!(s.admin_restricted_permissions);
        assert!(!s.background_sensor_permissions);

        let r = PlatformGates::for_api_level(30);
        assert_eq!(r, PlatformGates::legacy());

        assert_eq!(PlatformGates::for_api_level(API_LEVEL_V), PlatformGates::all_enabled());
    }

    #[test]
    fn test_private_profile_support_needs_both_inputs() {
        assert!(!PrivateProfileSupport::new(true, false).is_enabled());
        assert!(!PrivateProfileSupport::new(false, true).is_enabled());
        assert!(PrivateProfileSupport::new(true, true).is_enabled());

        let config = EngineConfig::new()
            .with_api_level(API_LEVEL_T)
            .with_private_profile_feature(true);
        assert!(!config.private_profile_support().is_enabled());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.api_level, API_LEVEL_V);
    }

    #[test]
    fn test_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(
            &path,
            r#"{"api_level": 33, "extra_admin_restricted": ["android.permission.NEARBY_WIFI_DEVICES"]}"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.api_level, API_LEVEL_T);
        assert!(!config.private_profile_feature);
        assert_eq!(config.extra_admin_restricted.len(), 1);
    }
}

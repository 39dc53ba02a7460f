//! Collaborators consumed by the role resolver

use serde::{Deserialize, Serialize};

use crate::core::ProfileId;

/// Profile-scoped role authority
///
/// Supplies raw role data for one profile at a time. The per-role behavior
/// flag is opaque to this crate; it only decides between "unset" and the
/// authority's answer.
pub trait RoleAuthority: Send + Sync {
    /// Whether the authority defines `role`
    fn has_role(&self, role: &str) -> bool;

    /// Feature gate for the role's custom behavior
    fn behavior_enabled(&self, role: &str) -> bool;

    /// Raw default holders of `role` in `profile`, primary first
    fn default_holders(&self, role: &str, profile: ProfileId) -> Vec<String>;

    fn is_visible(&self, role: &str, profile: ProfileId) -> bool;

    /// Raw qualifying candidates, not yet filtered by installation
    fn qualifying_candidates(&self, role: &str, profile: ProfileId) -> Vec<String>;
}

/// Basic metadata about an installed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub package_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Disabled packages are installed but not available
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ApplicationInfo {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            label: None,
            enabled: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Installed-application registry
pub trait InstalledApps: Send + Sync {
    /// Metadata for `package` in `profile`, if installed there
    fn application_info(&self, package: &str, profile: ProfileId) -> Option<ApplicationInfo>;

    /// Installed and enabled in `profile`
    fn is_available(&self, package: &str, profile: ProfileId) -> bool {
        self.application_info(package, profile)
            .map(|info| info.enabled)
            .unwrap_or(false)
    }
}

use colored::*;

use crate::core::{AccessDenied, ProfileId, ProfileInfo};
use crate::permissions::{GrantDecision, PermissionCategory};
use crate::roles::{DefaultHolders, RoleResolution};

/// Console handles all terminal output with colored formatting
pub struct Console {
    allowed_color: Color,
    denied_color: Color,
    label_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            allowed_color: Color::Green,
            denied_color: Color::Red,
            label_color: Color::Cyan,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(allowed_color: Color, denied_color: Color, label_color: Color) -> Self {
        Self {
            allowed_color,
            denied_color,
            label_color,
        }
    }

    fn label(&self, text: &str) -> ColoredString {
        text.color(self.label_color).bold()
    }

    /// Print an admin grant decision
    pub fn print_grant(&self, permission: &str, profile: ProfileId, decision: &GrantDecision) {
        let verdict = match decision {
            GrantDecision::Allowed(reason) => {
                format!("ALLOWED ({:?})", reason).color(self.allowed_color).bold()
            }
            GrantDecision::Denied(reason) => {
                format!("DENIED ({:?})", reason).color(self.denied_color).bold()
            }
        };
        println!(
            "{} {} in profile {}: {}",
            self.label("Grant:"),
            permission,
            profile,
            verdict
        );
    }

    /// Print a role resolution
    pub fn print_role(&self, resolution: &RoleResolution) {
        println!(
            "{} {} in profile {}",
            self.label("Role:"),
            resolution.role,
            resolution.profile
        );
        let defaults = match &resolution.default_holders {
            DefaultHolders::Unset => "unset".bright_black().to_string(),
            DefaultHolders::Explicit(set) if set.is_empty() => "none".to_string(),
            DefaultHolders::Explicit(set) => set.iter().collect::<Vec<_>>().join(", "),
        };
        println!("  default holders: {}", defaults);
        println!("  visible:         {}", resolution.visible);
        if resolution.qualifying_holders.is_empty() {
            println!("  qualifying:      {}", "none".bright_black());
        } else {
            for (i, package) in resolution.qualifying_holders.iter().enumerate() {
                let marker = if i == 0 { "*" } else { " " };
                println!("  qualifying:     {} {}", marker, package);
            }
        }
    }

    /// Print a successful authorization
    pub fn print_authorized(&self, target: ProfileId) {
        println!(
            "{} profile {}: {}",
            self.label("Access:"),
            target,
            "AUTHORIZED".color(self.allowed_color).bold()
        );
    }

    /// Print an access denial
    pub fn print_access_denied(&self, denied: &AccessDenied) {
        println!(
            "{} profile {}: {} ({})",
            self.label("Access:"),
            denied.profile,
            "DENIED".color(self.denied_color).bold(),
            denied.reason
        );
    }

    /// Print a permission classification
    pub fn print_classification(
        &self,
        permission: &str,
        group: Option<&str>,
        category: PermissionCategory,
    ) {
        println!("{} {}", self.label("Permission:"), permission);
        println!("  group:    {}", group.unwrap_or("-"));
        println!("  category: {:?}", category);
    }

    /// Print the profile directory
    pub fn print_topology(&self, profiles: &[ProfileInfo], current: ProfileId) {
        println!("{}", self.label("Profiles:"));
        for info in profiles {
            let parent = info
                .parent
                .map(|p| format!("parent {}", p))
                .unwrap_or_else(|| "group parent".to_string());
            let marker = if info.id == current { "*" } else { " " };
            println!("  {} {:>4}  {:<8} {}", marker, info.id, info.kind.to_string(), parent);
        }
    }

    /// Print a list of permission names
    pub fn print_list(&self, title: &str, items: impl IntoIterator<Item = impl AsRef<str>>) {
        println!("{}", self.label(title));
        for item in items {
            println!("  {}", item.as_ref());
        }
    }

    /// Print a system message
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

//! Admin-restricted permission registry
//!
//! The set of permissions a device administrator may only grant when the
//! sensor-grant policy allows it. Seeded once, grows by registration, never
//! shrinks.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use super::names;
use crate::core::PlatformGates;

/// Sensor permissions restricted on every platform where the policy applies
const BASELINE: &[&str] = &[
    names::ACCESS_FINE_LOCATION,
    names::ACCESS_BACKGROUND_LOCATION,
    names::ACCESS_COARSE_LOCATION,
    names::CAMERA,
    names::RECORD_AUDIO,
    names::ACTIVITY_RECOGNITION,
    names::BODY_SENSORS,
];

/// Background variants that only exist once background sensor permissions do
const BACKGROUND_BASELINE: &[&str] = &[
    names::BACKGROUND_CAMERA,
    names::RECORD_BACKGROUND_AUDIO,
    names::BODY_SENSORS_BACKGROUND,
];

/// Immutable view of the restricted set at one point in time
#[derive(Debug, Clone)]
pub struct RestrictedSnapshot {
    permissions: Arc<BTreeSet<String>>,
}

impl RestrictedSnapshot {
    /// Check membership
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Iterate members in name order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Process-wide, append-only set of admin-restricted permissions
///
/// Shared via `Arc<AdminRestrictedSet>`. Appends copy the set and swap the
/// pointer, so readers holding a `RestrictedSnapshot` never observe a
/// partially applied registration.
#[derive(Debug, Default)]
pub struct AdminRestrictedSet {
    permissions: RwLock<Arc<BTreeSet<String>>>,
}

impl AdminRestrictedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set seeded with the platform baseline for `gates`
    pub fn with_baseline(gates: &PlatformGates) -> Self {
        let mut permissions: BTreeSet<String> = BASELINE.iter().map(|p| p.to_string()).collect();
        if gates.background_sensor_permissions {
            permissions.extend(BACKGROUND_BASELINE.iter().map(|p| p.to_string()));
        }
        Self {
            permissions: RwLock::new(Arc::new(permissions)),
        }
    }

    /// Create a set seeded with exactly `permissions`
    pub fn from_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: RwLock::new(Arc::new(permissions.into_iter().map(Into::into).collect())),
        }
    }

    /// Register a permission
    ///
    /// Idempotent. Returns true if the permission was not yet present.
    pub fn add(&self, permission: impl Into<String>) -> bool {
        let permission = permission.into();
        // Poisoning cannot leave the set half-written: the swap below is a
        // single pointer store.
        let mut guard = self
            .permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.contains(&permission) {
            return false;
        }
        tracing::info!("Registering admin-restricted permission: {}", permission);
        let mut next = BTreeSet::clone(&guard);
        next.insert(permission);
        *guard = Arc::new(next);
        true
    }

    /// Check membership against the current state
    pub fn contains(&self, permission: &str) -> bool {
        self.snapshot().contains(permission)
    }

    /// Take an immutable snapshot of the current state
    pub fn snapshot(&self) -> RestrictedSnapshot {
        let guard = self
            .permissions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        RestrictedSnapshot {
            permissions: Arc::clone(&guard),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

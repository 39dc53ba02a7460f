//! Profile identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user profile
///
/// Profile 0 is the system (primary) profile and always exists. Negative
/// values are never live profiles; `ProfileId::ALL` is the only negative id
/// with a meaning, and only where a caller explicitly opts into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(i32);

impl ProfileId {
    /// The system profile
    pub const SYSTEM: ProfileId = ProfileId(0);

    /// Sentinel meaning "every profile"
    pub const ALL: ProfileId = ProfileId(-1);

    /// Wrap a raw profile id
    pub const fn new(raw: i32) -> Self {
        ProfileId(raw)
    }

    /// Raw integer value
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Whether this id could name a live profile (non-negative)
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Whether this is the all-profiles sentinel
    pub const fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            write!(f, "all")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::SYSTEM
    }
}

impl From<i32> for ProfileId {
    fn from(raw: i32) -> Self {
        ProfileId(raw)
    }
}

/// Kind of a profile, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Full user at the root of a profile group
    Primary,
    /// Work profile owned by a device administrator
    Managed,
    /// Private space profile
    Private,
    /// Anything else (secondary users, clones, ...)
    Other,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Primary => write!(f, "primary"),
            ProfileKind::Managed => write!(f, "managed"),
            ProfileKind::Private => write!(f, "private"),
            ProfileKind::Other => write!(f, "other"),
        }
    }
}

/// One entry of the profile directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Profile id
    pub id: ProfileId,

    /// Profile kind
    pub kind: ProfileKind,

    /// Parent profile, if this profile belongs to another profile's group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ProfileId>,
}

impl ProfileInfo {
    /// Create a root profile (no parent)
    pub fn root(id: impl Into<ProfileId>, kind: ProfileKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parent: None,
        }
    }

    /// Create a child profile of `parent`
    pub fn child(id: impl Into<ProfileId>, kind: ProfileKind, parent: impl Into<ProfileId>) -> Self {
        Self {
            id: id.into(),
            kind,
            parent: Some(parent.into()),
        }
    }
}

//! Policy error types

use thiserror::Error;

use super::profile::ProfileId;

/// Why a cross-profile request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Caller does not hold the cross-user capability
    MissingCrossUserCapability,
    /// A profile in scope disallows debugging features
    DebuggingFeaturesDisallowed,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::MissingCrossUserCapability => write!(f, "missing cross-user capability"),
            DenialReason::DebuggingFeaturesDisallowed => write!(f, "debugging features disallowed"),
        }
    }
}

/// Security denial raised by the cross-profile access guard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access to profile {profile} denied: {reason}")]
pub struct AccessDenied {
    /// The offending profile
    pub profile: ProfileId,
    /// Reason tag
    pub reason: DenialReason,
}

impl AccessDenied {
    pub fn new(profile: ProfileId, reason: DenialReason) -> Self {
        Self { profile, reason }
    }
}

/// Errors surfaced by the policy engine
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Profile unknown to the supplied snapshot
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    /// Role unknown to the role authority
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Permission unknown to the catalog
    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    /// Access-control refusal
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Malformed input (bad profile id, inconsistent snapshot, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error while reading a snapshot
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PolicyError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        PolicyError::InvalidArgument(msg.into())
    }

    /// Whether this is one of the not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PolicyError::ProfileNotFound(_)
                | PolicyError::RoleNotFound(_)
                | PolicyError::PermissionNotFound(_)
        )
    }

    /// The access denial, if this error is one
    pub fn as_denied(&self) -> Option<&AccessDenied> {
        match self {
            PolicyError::Denied(denied) => Some(denied),
            _ => None,
        }
    }
}

/// Result type alias for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

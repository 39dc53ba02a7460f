//! Core types for the policy engine
//!
//! This module provides the fundamental types used throughout the crate:
//! - `ProfileId` / `ProfileKind` / `ProfileInfo` - Profile identity
//! - `EngineConfig` / `PlatformGates` - Configuration resolved once at startup
//! - `PolicyError` - Error types

pub mod config;
pub mod error;
pub mod profile;

pub use config::{EngineConfig, PlatformGates, PrivateProfileSupport};
pub use error::{AccessDenied, DenialReason, PolicyError, PolicyResult};
pub use profile::{ProfileId, ProfileInfo, ProfileKind};

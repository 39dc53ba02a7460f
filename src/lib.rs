pub mod core;
pub mod profiles;
pub mod permissions;
pub mod roles;
pub mod access;

// Wires the components into one request path
pub mod engine;

// Serializable device state and in-memory collaborators
pub mod snapshot;

// Optional components
pub mod cli;
pub mod logging;

pub use crate::core::{PolicyError, PolicyResult, ProfileId};
pub use engine::{Collaborators, PolicyEngine};

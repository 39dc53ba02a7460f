//! Profile topology
//!
//! Resolves parent/child, managed, private and current-profile relationships
//! over a snapshot of the profile directory.

mod topology;

pub use topology::{ProfileSnapshot, ProfileTopology};

//! Cross-profile access control

mod guard;

pub use guard::{AccessRequest, CallerIdentity, CrossProfileAccessGuard, UserRestriction, UserRestrictions};

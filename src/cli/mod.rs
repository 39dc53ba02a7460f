//! Command-line interface
//!
//! `grant-policy` loads a scenario file, builds a policy engine from it and
//! answers one query per invocation.

mod commands;
mod console;

pub use commands::{execute, run, AuthorizeArgs, Cli, Commands, GrantArgs, PermissionArgs, RoleArgs};
pub use console::Console;

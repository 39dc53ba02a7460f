use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use super::console::Console;
use crate::access::{AccessRequest, CallerIdentity};
use crate::core::{EngineConfig, PolicyError, ProfileId};
use crate::engine::PolicyEngine;
use crate::permissions::{DevicePolicyProvider, GrantDecision, GrantInputs, ManagedSmsState};
use crate::snapshot::{DevicePolicySnapshot, ScenarioStorage, StaticCaller};

#[derive(Parser, Debug)]
#[command(
    name = "grant-policy",
    version,
    about = "Profile-aware permission grant policy"
)]
pub struct Cli {
    /// Scenario file describing profiles, packages, roles and device policy
    #[arg(long)]
    pub scenario: PathBuf,
    /// Engine configuration file, replacing the scenario's `config` section
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub debug: bool,
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// May an administrator grant a permission in a profile?
    Grant(GrantArgs),
    /// Default and qualifying holders of a role
    Role(RoleArgs),
    /// Check cross-profile access for the scenario caller
    Authorize(AuthorizeArgs),
    /// Group and sensitivity category of a permission
    Classify(PermissionArgs),
    /// List the profile directory
    Topology,
    /// Register an admin-restricted permission
    Register(PermissionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GrantArgs {
    #[arg(long)]
    pub permission: String,
    #[arg(long, allow_negative_numbers = true)]
    pub profile: i32,
    /// Decide as if the permission belonged to this group
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RoleArgs {
    #[arg(long)]
    pub role: String,
    #[arg(long, allow_negative_numbers = true)]
    pub profile: i32,
}

#[derive(Args, Debug, Clone)]
pub struct AuthorizeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub target: i32,
    #[arg(long)]
    pub allow_all: bool,
    #[arg(long)]
    pub enforce_for_group: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PermissionArgs {
    #[arg(long)]
    pub permission: String,
}

#[derive(Debug, Serialize)]
struct GrantReport<'a> {
    permission: &'a str,
    profile: ProfileId,
    #[serde(flatten)]
    decision: GrantDecision,
}

/// Everything a command needs from the loaded scenario
struct Session {
    engine: PolicyEngine,
    caller: StaticCaller,
    device_policy: DevicePolicySnapshot,
}

impl Session {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut scenario = ScenarioStorage::load(&cli.scenario)
            .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
        if let Some(path) = &cli.config {
            scenario.config = EngineConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
        }
        let caller = scenario.caller;
        let device_policy = scenario.device_policy.clone();
        let engine = PolicyEngine::from_scenario(scenario).context("invalid scenario")?;
        Ok(Self {
            engine,
            caller,
            device_policy,
        })
    }
}

/// Run the parsed command line
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = Session::load(cli)?;
    let console = Console::new();
    tracing::debug!(
        caller = %session.caller.calling_profile(),
        command = ?cli.command,
        "Running command"
    );

    match &cli.command {
        Commands::Grant(args) => grant(&session, &console, cli.json, args),
        Commands::Role(args) => role(&session, &console, cli.json, args),
        Commands::Authorize(args) => authorize(&session, &console, cli.json, args),
        Commands::Classify(args) => classify(&session, &console, cli.json, &args.permission),
        Commands::Topology => topology(&session, &console, cli.json),
        Commands::Register(args) => register(&session, &console, cli.json, &args.permission),
    }
}

/// Run and report any failure on the console
///
/// Returns the process exit status so the caller can unwind normally.
pub fn execute(cli: &Cli) -> u8 {
    match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("grant-policy failed: {:#}", err);
            Console::new().print_error(&format!("{:#}", err));
            1
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a denial as output rather than as a failure
fn report_denial(console: &Console, json: bool, err: PolicyError) -> anyhow::Result<()> {
    match err.as_denied() {
        Some(denied) if json => print_json(&json!({
            "authorized": false,
            "profile": denied.profile,
            "reason": denied.reason.to_string(),
        })),
        Some(denied) => {
            console.print_access_denied(denied);
            Ok(())
        }
        None => Err(err.into()),
    }
}

fn grant(session: &Session, console: &Console, json: bool, args: &GrantArgs) -> anyhow::Result<()> {
    let profile = ProfileId::new(args.profile);
    let decision = match &args.group {
        None => session
            .engine
            .admin_grant(&session.caller, &args.permission, profile),
        Some(group) => decide_with_group(session, &args.permission, profile, group),
    };
    let decision = match decision {
        Ok(decision) => decision,
        Err(err) => return report_denial(console, json, err),
    };

    if json {
        print_json(&GrantReport {
            permission: &args.permission,
            profile,
            decision,
        })
    } else {
        console.print_grant(&args.permission, profile, &decision);
        Ok(())
    }
}

/// Authorize, then decide from pre-resolved inputs with an explicit group
fn decide_with_group(
    session: &Session,
    permission: &str,
    profile: ProfileId,
    group: &str,
) -> Result<GrantDecision, PolicyError> {
    session
        .engine
        .authorize(&session.caller, AccessRequest::new(profile))?;
    let provider: &dyn DevicePolicyProvider = &session.device_policy;
    let inputs = GrantInputs::new(permission)
        .with_group(Some(group))
        .with_managed_profile(session.engine.topology().is_managed(profile)?)
        .with_sensor_grant(provider.can_admin_grant_sensors_permissions(profile))
        .with_managed_sms(ManagedSmsState::from_provider(provider));
    Ok(session.engine.grant_policy().decide(&inputs))
}

fn role(session: &Session, console: &Console, json: bool, args: &RoleArgs) -> anyhow::Result<()> {
    let resolution =
        match session
            .engine
            .role_defaults(&session.caller, &args.role, ProfileId::new(args.profile))
        {
            Ok(resolution) => resolution,
            Err(err) => return report_denial(console, json, err),
        };

    if json {
        print_json(&resolution)
    } else {
        console.print_role(&resolution);
        Ok(())
    }
}

fn authorize(
    session: &Session,
    console: &Console,
    json: bool,
    args: &AuthorizeArgs,
) -> anyhow::Result<()> {
    let target = ProfileId::new(args.target);
    let request = AccessRequest::new(target)
        .allow_all(args.allow_all)
        .enforce_for_group(args.enforce_for_group);

    match session.engine.authorize(&session.caller, request) {
        Ok(()) if json => print_json(&json!({ "authorized": true, "profile": target })),
        Ok(()) => {
            console.print_authorized(target);
            Ok(())
        }
        Err(err) => report_denial(console, json, err),
    }
}

fn classify(
    session: &Session,
    console: &Console,
    json: bool,
    permission: &str,
) -> anyhow::Result<()> {
    let classifier = session.engine.classifier();
    let entry = classifier.lookup(permission)?;
    let restricted = session.engine.grant_policy().restricted().snapshot();
    let category = classifier.classify(permission, &restricted);

    if json {
        print_json(&json!({
            "permission": entry.permission,
            "group": entry.group,
            "category": category,
        }))
    } else {
        console.print_classification(entry.permission, entry.group, category);
        Ok(())
    }
}

fn topology(session: &Session, console: &Console, json: bool) -> anyhow::Result<()> {
    let topology = session.engine.topology();
    let current = topology.current_profile();
    let group_parent = topology.current_profile_group_parent()?;
    let work_profile = topology.work_profile_of(group_parent, true)?;

    if json {
        return print_json(&json!({
            "current": current,
            "group_parent": group_parent,
            "work_profile": work_profile,
            "profiles": topology.profiles(),
        }));
    }

    console.print_topology(topology.profiles(), current);
    console.print_separator();
    console.print_system(&format!("current profile group parent: {}", group_parent));
    match work_profile {
        Some(profile) => console.print_system(&format!("work profile: {}", profile)),
        None => console.print_system("no work profile in the current group"),
    }
    Ok(())
}

fn register(
    session: &Session,
    console: &Console,
    json: bool,
    permission: &str,
) -> anyhow::Result<()> {
    let added = session.engine.add_admin_restricted_permission(permission);
    let snapshot = session.engine.grant_policy().restricted().snapshot();

    if json {
        return print_json(&json!({
            "permission": permission,
            "added": added,
            "restricted": snapshot.iter().collect::<Vec<_>>(),
        }));
    }

    if added {
        console.print_system(&format!("registered {}", permission));
    } else {
        console.print_system(&format!("{} was already restricted", permission));
    }
    console.print_list("Admin-restricted permissions:", snapshot.iter());
    Ok(())
}

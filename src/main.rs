use std::process::ExitCode;

use clap::Parser;

use profile_grant_policy::cli::{self, Cli};
use profile_grant_policy::logging::{self, LoggingConfig};

fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();

    let mut logging_config = LoggingConfig::new().with_json(args.log_json);
    if args.debug {
        logging_config = logging_config.with_level("debug");
    }
    if let Some(dir) = &args.log_dir {
        logging_config = logging_config.with_log_dir(dir);
    }
    // Dropped on return so the file writer flushes
    let _guard = logging::init_logging(&logging_config)?;

    tracing::info!("=== grant-policy starting ===");
    let status = cli::execute(&args);
    tracing::info!(status, "=== grant-policy done ===");

    Ok(ExitCode::from(status))
}

//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Installs the tracing subscriber
//! - Builds CliArgs and discovers Config
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, ExitCode, WeightSplitError};
use weightsplit_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On failure: prints the error report (if any) and returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    run_with(cli)
}

/// Run an already-parsed command line.
pub fn run_with(cli: Cli) -> Result<(), ExitCode> {
    if let Err(e) = init_tracing(cli.verbose) {
        // A subscriber may already be installed when embedded; keep going.
        eprintln!("⚠ Logging not initialized: {e}");
    }

    let cli_args = build_cli_args(&cli);
    let operation = cli.command.operation();

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            report_error(&err, "config");
            return Err(exit_code_for(&err));
        }
    };

    let result = match &cli.command {
        Commands::Split { .. } => commands::execute_split_command(&config, false, cli.json),
        Commands::Plan { .. } => commands::execute_split_command(&config, true, cli.json),
        Commands::Parts { asset } => commands::execute_parts_command(asset, cli.json),
        Commands::Config => commands::execute_config_command(&config, cli.json),
    };

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(err) => {
            report_error(&err, operation);
            Err(exit_code_for(&err))
        }
    }
}

/// Translate parsed flags into the configuration layer's CLI overrides.
pub(crate) fn build_cli_args(cli: &Cli) -> CliArgs {
    let prune_stale_parts = match &cli.command {
        Commands::Split { no_prune: true, .. } => Some(false),
        _ => None,
    };

    CliArgs {
        config_path: cli.config.clone(),
        threshold_bytes: cli.threshold_bytes,
        failure_policy: cli.failure_policy,
        prune_stale_parts,
        assets: cli.command.asset_args().to_vec(),
    }
}

/// Exit code for an error that escaped a command handler.
///
/// Anything that is not a [`WeightSplitError`] came from configuration
/// loading or argument handling and maps to `CLI_ARGS`.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<WeightSplitError>()
        .map_or(ExitCode::CLI_ARGS, WeightSplitError::to_exit_code)
}

fn report_error(err: &anyhow::Error, operation: &str) {
    if let Some(ws_error) = err.downcast_ref::<WeightSplitError>() {
        eprintln!("✗ {operation} failed");
        eprint!("{}", ws_error.display_for_user());
        // The outermost context (e.g. which config file) is not part of display_for_user.
        if err.to_string() != ws_error.to_string() {
            eprintln!("\nWhile: {err}");
        }
    } else {
        eprintln!("✗ {operation} failed: {err:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
    }
}

// crates/sealstore-cli/src/main.rs
// ============================================================================
// Module: Sealstore CLI Entry Point
// Description: Maintenance commands for the encrypted messenger store.
// Purpose: Plan, inspect, and run schema migrations from the command line.
// Dependencies: clap, sealstore, serde_json, thiserror, tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! `sealstore` exposes three commands:
//! - `plan` lists the ledger steps an upgrade would run, without a store;
//! - `inspect` opens a store without migrating and prints its schema;
//! - `migrate` opens a store through the messenger lifecycle.
//!
//! The store secret is read from `SEALSTORE_SECRET` (hex) or `--secret` and
//! is never echoed. Logs go to stderr; command output is JSON on stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use sealstore::SchemaSnapshot;
use sealstore::SchemaVersion;
use sealstore::SealstoreConfig;
use sealstore::StoreConfig;
use sealstore::StoreHandle;
use sealstore::StoreSecret;
use sealstore::catalog::CURRENT_VERSION;
use sealstore::catalog::messenger_ledger;
use sealstore::catalog::messenger_lifecycle;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the hex-encoded store secret.
const SECRET_ENV_VAR: &str = "SEALSTORE_SECRET";
/// Log filter used before any configuration is loaded.
const FALLBACK_LOG_FILTER: &str = "sealstore=info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sealstore", disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the migration steps between two versions.
    Plan(PlanCommand),
    /// Print a store's version and schema without migrating it.
    Inspect(StoreArgs),
    /// Bootstrap or upgrade a store to the current version.
    Migrate(StoreArgs),
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Stored version to plan from.
    #[arg(long, value_name = "VERSION")]
    from: u32,
    /// Target version (defaults to the current build's version).
    #[arg(long, value_name = "VERSION")]
    to: Option<u32>,
}

/// Arguments shared by commands that open a store.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Path to `sealstore.toml` (overrides `SEALSTORE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Hex-encoded store secret.
    #[arg(long, env = SECRET_ENV_VAR, hide_env_values = true, value_name = "HEX")]
    secret: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Plan(command) => {
            init_tracing(FALLBACK_LOG_FILTER);
            let plan = plan_json(command.from, command.to)?;
            write_json(&plan)
        }
        Commands::Inspect(args) => {
            let (config, secret) = load_store_args(&args)?;
            init_tracing(&config.log_filter);
            write_json(&inspect_json(&config.store, &secret)?)
        }
        Commands::Migrate(args) => {
            let (config, secret) = load_store_args(&args)?;
            init_tracing(&config.log_filter);
            write_json(&migrate_json(&config.store, &secret)?)
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over `fallback`.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Describes the ledger steps for `from → to` as JSON.
fn plan_json(from: u32, to: Option<u32>) -> CliResult<Value> {
    let ledger = messenger_ledger().map_err(|err| CliError::new(err.to_string()))?;
    let from = SchemaVersion::new(from);
    let to = to.map_or(CURRENT_VERSION, SchemaVersion::new);
    let steps: Vec<Value> = ledger
        .steps_between(from, to)
        .iter()
        .map(|step| {
            let actions: Vec<&str> = step.actions().iter().map(|action| action.kind()).collect();
            json!({
                "threshold": step.threshold(),
                "description": step.description(),
                "actions": actions,
            })
        })
        .collect();
    Ok(json!({
        "from": from,
        "to": to,
        "steps": steps,
    }))
}

/// Opens an existing store without migrating and describes its schema.
fn inspect_json(config: &StoreConfig, secret: &StoreSecret) -> CliResult<Value> {
    if !config.path.is_file() {
        return Err(CliError::new(format!(
            "store file does not exist: {}",
            config.path.display()
        )));
    }
    let handle = StoreHandle::open(config, secret).map_err(|err| CliError::new(err.to_string()))?;
    let snapshot =
        SchemaSnapshot::capture(handle.connection()).map_err(|err| CliError::new(err.to_string()))?;
    info!(version = %snapshot.version, tables = snapshot.tables.len(), "store inspected");
    serde_json::to_value(&snapshot).map_err(|err| CliError::new(err.to_string()))
}

/// Opens the store through the messenger lifecycle and reports the outcome.
fn migrate_json(config: &StoreConfig, secret: &StoreSecret) -> CliResult<Value> {
    let lifecycle = messenger_lifecycle().map_err(|err| CliError::new(err.to_string()))?;
    let opened = lifecycle.open(config, secret).map_err(|err| CliError::new(err.to_string()))?;
    serde_json::to_value(&opened.outcome).map_err(|err| CliError::new(err.to_string()))
}

/// Loads configuration and decodes the secret.
fn load_store_args(args: &StoreArgs) -> CliResult<(SealstoreConfig, StoreSecret)> {
    let config = SealstoreConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let secret =
        StoreSecret::from_hex(args.secret.trim()).map_err(|err| CliError::new(err.to_string()))?;
    Ok((config, secret))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout.
fn write_json(value: &Value) -> CliResult<ExitCode> {
    let text = serde_json::to_string_pretty(value).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&text)
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

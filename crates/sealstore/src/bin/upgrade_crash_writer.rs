// crates/sealstore/src/bin/upgrade_crash_writer.rs
// ============================================================================
// Module: Upgrade Crash Writer
// Description: Creates a release-shaped store and aborts mid-upgrade.
// Purpose: Drive forced-interruption durability checks from tests.
// Dependencies: sealstore
// ============================================================================

//! ## Overview
//! Usage: `upgrade_crash_writer <store-path> <secret-hex>`.
//!
//! The writer creates the store at the release baseline version, then starts
//! an upgrade whose steps 28 through 35 run normally and whose step 36 aborts
//! the process while the transaction is still open. A correct engine discards
//! the whole transaction, so the file reopens at the baseline version.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use sealstore::CustomAction;
use sealstore::MigrationLedger;
use sealstore::MigrationStep;
use sealstore::StoreConfig;
use sealstore::StoreError;
use sealstore::StoreSecret;
use sealstore::catalog::RELEASE_BASELINE_VERSION;
use sealstore::catalog::messenger_steps;
use sealstore::catalog::release_baseline_lifecycle;
use sealstore::upgrade;

/// Last historical step applied before the abort.
const LAST_COMPLETED_STEP: u32 = 35;

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            let mut stderr = std::io::stderr();
            let _ = writeln!(&mut stderr, "upgrade_crash_writer: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the store and runs the aborting upgrade.
fn run() -> Result<(), String> {
    let mut args = std::env::args_os().skip(1);
    let (Some(path), Some(secret)) = (args.next(), args.next()) else {
        return Err("usage: upgrade_crash_writer <store-path> <secret-hex>".to_string());
    };
    let secret = secret.into_string().map_err(|_| "secret must be utf-8 hex".to_string())?;
    let secret = StoreSecret::from_hex(&secret).map_err(|err| err.to_string())?;
    let config = StoreConfig::new(PathBuf::from(path));

    let baseline = release_baseline_lifecycle().map_err(|err| err.to_string())?;
    let mut opened = baseline.open(&config, &secret).map_err(|err| err.to_string())?;

    let abort_step = MigrationStep::new(LAST_COMPLETED_STEP + 1, "abort mid-transaction")
        .then(CustomAction::new("abort", |_| -> Result<(), StoreError> { std::process::abort() }));
    let mut steps: Vec<MigrationStep> = messenger_steps()
        .into_iter()
        .filter(|step| step.threshold().get() <= LAST_COMPLETED_STEP)
        .collect();
    steps.push(abort_step);
    let ledger = MigrationLedger::new(steps).map_err(|err| err.to_string())?;
    let target = ledger.latest_version().unwrap_or(RELEASE_BASELINE_VERSION);

    upgrade(opened.handle.connection_mut(), &ledger, RELEASE_BASELINE_VERSION, target)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

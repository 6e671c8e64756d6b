// crates/sealstore-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for the plan, inspect, and migrate helpers.
// Purpose: Ensure command output is stable and failures stay closed.
// Dependencies: sealstore-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Exercises the JSON-producing helpers behind each subcommand and the
//! argument parser. Stores are created in temp directories.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use sealstore::StoreConfig;
use sealstore::StoreSecret;
use serde_json::json;
use tempfile::TempDir;

use super::Cli;
use super::Commands;
use super::inspect_json;
use super::migrate_json;
use super::plan_json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn secret() -> StoreSecret {
    StoreSecret::from_hex("a1b2c3d4e5f60718").unwrap()
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_plan_range() {
    let cli = Cli::try_parse_from(["sealstore", "plan", "--from", "38", "--to", "40"]).unwrap();
    let Commands::Plan(plan) = cli.command else {
        panic!("expected plan command");
    };
    assert_eq!((plan.from, plan.to), (38, Some(40)));
}

#[test]
fn store_commands_accept_secret_flag() {
    let cli = Cli::try_parse_from(["sealstore", "migrate", "--secret", "abcd", "--config", "x.toml"])
        .unwrap();
    let Commands::Migrate(args) = cli.command else {
        panic!("expected migrate command");
    };
    assert_eq!(args.secret, "abcd");
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("x.toml")));
}

// ============================================================================
// SECTION: Plan
// ============================================================================

#[test]
fn plan_lists_steps_in_range() {
    let plan = plan_json(38, Some(40)).unwrap();
    assert_eq!(plan["from"], json!(38));
    assert_eq!(plan["to"], json!(40));
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["threshold"], json!(39));
    assert_eq!(steps[0]["actions"], json!(["purge"]));
    assert_eq!(steps[1]["actions"], json!(["statements", "custom", "statements", "purge"]));
}

#[test]
fn plan_defaults_to_current_version() {
    let plan = plan_json(27, None).unwrap();
    assert_eq!(plan["to"], json!(41));
    assert_eq!(plan["steps"].as_array().unwrap().len(), 14);
    assert!(plan_json(41, None).unwrap()["steps"].as_array().unwrap().is_empty());
}

// ============================================================================
// SECTION: Inspect And Migrate
// ============================================================================

#[test]
fn inspect_refuses_missing_store() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::new(temp.path().join("missing.db"));
    assert!(inspect_json(&config, &secret()).is_err());
    assert!(!config.path.exists());
}

#[test]
fn migrate_then_inspect_reports_current_schema() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::new(temp.path().join("messenger.db"));

    let outcome = migrate_json(&config, &secret()).unwrap();
    assert_eq!(outcome, json!({"outcome": "bootstrapped", "version": 41}));
    let outcome = migrate_json(&config, &secret()).unwrap();
    assert_eq!(outcome, json!({"outcome": "current", "version": 41}));

    let snapshot = inspect_json(&config, &secret()).unwrap();
    assert_eq!(snapshot["version"], json!(41));
    let tables = snapshot["tables"].as_array().unwrap();
    assert!(tables.iter().any(|table| table["name"] == json!("closed_group_public_keys")));
}

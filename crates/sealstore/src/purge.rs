// crates/sealstore/src/purge.rs
// ============================================================================
// Module: Stale Record Purger
// Description: Removes persisted work items whose kind has been retired.
// Purpose: Keep unrunnable job descriptors from surviving an upgrade.
// Dependencies: rusqlite, tracing
// ============================================================================

//! ## Overview
//! Background work is persisted as rows in `job_spec` with matching rows in
//! `constraint_spec`, both keyed by `factory_key` (the job kind). When a kind
//! is removed from the codebase its rows can no longer be dispatched, so a
//! migration step purges them. Both tables are cleaned inside the enclosing
//! upgrade transaction; the purger refuses to run outside one so the two
//! deletes can never be split.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use rusqlite::Connection;
use rusqlite::params;
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Table of persisted work items.
pub const JOB_SPEC_TABLE: &str = "job_spec";
/// Table of work-item execution constraints.
pub const CONSTRAINT_SPEC_TABLE: &str = "constraint_spec";

// ============================================================================
// SECTION: Purge Spec
// ============================================================================

/// Set of retired work-item kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PurgeSpec {
    /// Kinds matched against `factory_key`.
    kinds: BTreeSet<String>,
}

impl PurgeSpec {
    /// Creates a spec for `kinds`.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(String::as_str)
    }

    /// Returns true when no kinds are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

// ============================================================================
// SECTION: Purge
// ============================================================================

/// Deletes every `job_spec` and `constraint_spec` row whose kind is listed.
///
/// Must run inside the caller's open transaction. Returns the total number of
/// rows removed from both tables.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] when no transaction is open, and the
/// classified engine error when a delete fails.
pub fn purge(connection: &Connection, spec: &PurgeSpec) -> Result<usize, StoreError> {
    if connection.is_autocommit() {
        return Err(StoreError::Invalid(
            "purge must run inside an open transaction".to_string(),
        ));
    }
    let mut delete_jobs = connection
        .prepare_cached(&format!("DELETE FROM {JOB_SPEC_TABLE} WHERE factory_key = ?1"))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let mut delete_constraints = connection
        .prepare_cached(&format!("DELETE FROM {CONSTRAINT_SPEC_TABLE} WHERE factory_key = ?1"))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let mut deleted = 0;
    for kind in spec.kinds() {
        let jobs = delete_jobs.execute(params![kind]).map_err(|err| StoreError::from_sqlite(&err))?;
        let constraints =
            delete_constraints.execute(params![kind]).map_err(|err| StoreError::from_sqlite(&err))?;
        debug!(kind, jobs, constraints, "purged retired work items");
        deleted += jobs + constraints;
    }
    Ok(deleted)
}

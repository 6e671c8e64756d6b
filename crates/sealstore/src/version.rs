// crates/sealstore/src/version.rs
// ============================================================================
// Module: Schema Version
// Description: Schema version value and the engine-maintained version stamp.
// Purpose: Keep version ordering and stamp access in one place.
// Dependencies: rusqlite, serde
// ============================================================================

//! ## Overview
//! The store's schema version is persisted in the `SQLite` header field
//! `user_version`. Zero means the file was never stamped (a fresh file); any
//! other value is the version of the last successful bootstrap or upgrade.
//! The stamp is written inside the same transaction as the schema changes it
//! describes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rusqlite::Connection;
use serde::Deserialize;
use serde::Serialize;

use crate::error::StoreError;

// ============================================================================
// SECTION: Schema Version
// ============================================================================

/// Monotonic schema version of a store.
///
/// # Invariants
/// - The persisted value never decreases across the store's lifetime.
/// - [`SchemaVersion::UNSTAMPED`] is never a valid migration threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SchemaVersion(u32);

impl SchemaVersion {
    /// Version reported by a file that has never been stamped.
    pub const UNSTAMPED: Self = Self(0);

    /// Creates a schema version from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw version value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true when the value denotes an unstamped store.
    #[must_use]
    pub const fn is_unstamped(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SchemaVersion {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Version Stamp
// ============================================================================

/// Reads the store's version stamp.
///
/// # Errors
///
/// Returns [`StoreError`] when the pragma cannot be read or holds a negative
/// value.
pub fn read_version_stamp(connection: &Connection) -> Result<SchemaVersion, StoreError> {
    let raw: i64 = connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    u32::try_from(raw)
        .map(SchemaVersion)
        .map_err(|_| StoreError::Invalid(format!("version stamp out of range: {raw}")))
}

/// Writes the store's version stamp.
///
/// Callers run this as the last statement of the transaction that produced
/// the schema at `version`.
pub(crate) fn write_version_stamp(
    connection: &Connection,
    version: SchemaVersion,
) -> Result<(), StoreError> {
    let raw = i32::try_from(version.get())
        .map_err(|_| StoreError::Invalid(format!("version stamp out of range: {version}")))?;
    connection
        .execute_batch(&format!("PRAGMA user_version = {raw};"))
        .map_err(|err| StoreError::from_sqlite(&err))
}

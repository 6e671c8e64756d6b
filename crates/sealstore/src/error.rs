// crates/sealstore/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Typed failures for opening, bootstrapping, and upgrading.
// Purpose: Give callers a stable taxonomy for store lifecycle failures.
// Dependencies: rusqlite, thiserror
// ============================================================================

//! ## Overview
//! Every fallible operation in this crate returns [`StoreError`]. Engine
//! errors are classified once, in [`StoreError::from_sqlite`], so a wrong
//! secret surfaces as [`StoreError::KeyDerivation`] and filesystem trouble as
//! [`StoreError::Io`] regardless of which statement hit it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::version::SchemaVersion;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store lifecycle errors.
///
/// # Invariants
/// - Error messages never embed the store secret.
/// - `Migration` always names the threshold of the step that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The secret does not unlock the file; the store is unusable.
    #[error("sealstore key derivation error: {0}")]
    KeyDerivation(String),
    /// Filesystem failure while opening, reading, or writing the store.
    #[error("sealstore io error: {0}")]
    Io(String),
    /// Engine error outside the other categories.
    #[error("sealstore db error: {0}")]
    Db(String),
    /// A migration step failed and the whole upgrade was rolled back.
    #[error("sealstore migration to version {at_version} failed: {cause}")]
    Migration {
        /// Threshold of the failing step.
        at_version: SchemaVersion,
        /// Failure reported by the step.
        cause: String,
    },
    /// Invalid input or store state.
    #[error("sealstore invalid: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Classifies a `rusqlite` error into the store taxonomy.
    #[must_use]
    pub fn from_sqlite(error: &rusqlite::Error) -> Self {
        let message = error.to_string();
        match error.sqlite_error_code() {
            Some(ErrorCode::NotADatabase) => Self::KeyDerivation(message),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied,
            ) => Self::Io(message),
            _ => Self::Db(message),
        }
    }

    /// Wraps a step failure with the step's threshold.
    #[must_use]
    pub fn migration(at_version: SchemaVersion, cause: &Self) -> Self {
        Self::Migration {
            at_version,
            cause: cause.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::ffi;

    use super::SchemaVersion;
    use super::StoreError;

    fn sqlite_error(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn not_a_database_maps_to_key_derivation() {
        let error = StoreError::from_sqlite(&sqlite_error(ffi::SQLITE_NOTADB));
        assert!(matches!(error, StoreError::KeyDerivation(_)));
    }

    #[test]
    fn cannot_open_maps_to_io() {
        let error = StoreError::from_sqlite(&sqlite_error(ffi::SQLITE_CANTOPEN));
        assert!(matches!(error, StoreError::Io(_)));
    }

    #[test]
    fn constraint_violation_maps_to_db() {
        let error = StoreError::from_sqlite(&sqlite_error(ffi::SQLITE_CONSTRAINT));
        assert!(matches!(error, StoreError::Db(_)));
    }

    #[test]
    fn migration_error_names_threshold() {
        let error = StoreError::migration(
            SchemaVersion::new(38),
            &StoreError::Db("duplicate column name".to_string()),
        );
        let message = error.to_string();
        assert!(message.contains("version 38"));
        assert!(message.contains("duplicate column name"));
    }
}

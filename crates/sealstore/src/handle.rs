// crates/sealstore/src/handle.rs
// ============================================================================
// Module: Store Handle
// Description: Keyed connection to the encrypted store file.
// Purpose: Apply the cipher and engine settings before any table access.
// Dependencies: rusqlite (SQLCipher), tracing
// ============================================================================

//! ## Overview
//! [`StoreHandle::open`] runs the fixed open sequence:
//! 1. pre-key cipher defaults (KDF iterations, page size);
//! 2. the key itself, derived from the caller's [`StoreSecret`];
//! 3. post-key cipher settings matching those used at creation;
//! 4. a key check against `sqlite_master`;
//! 5. write-ahead logging, page-cache budget, sync mode and busy timeout.
//!
//! The cipher parameters are constants. Changing either for an existing file
//! makes it undecryptable, so they are not configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::secret::StoreSecret;
use crate::version::SchemaVersion;
use crate::version::read_version_stamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key-derivation iteration count baked into every store file.
pub const CIPHER_KDF_ITERATIONS: u32 = 1;
/// Cipher page size in bytes baked into every store file.
pub const CIPHER_PAGE_SIZE: u32 = 4_096;

// ============================================================================
// SECTION: Store Handle
// ============================================================================

/// One open, keyed connection to the store file.
///
/// # Invariants
/// - The connection has been keyed and the key verified.
/// - WAL mode and the configured cache budget are active.
/// - The secret itself is not retained after `open` returns.
#[derive(Debug)]
pub struct StoreHandle {
    /// Keyed `SQLite` connection.
    connection: Connection,
    /// Path of the store file.
    path: PathBuf,
}

impl StoreHandle {
    /// Opens (or creates) the store file and applies the open sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyDerivation`] when `secret` does not unlock an
    /// existing file, [`StoreError::Io`] for filesystem failures, and
    /// [`StoreError::Invalid`] for unusable configuration.
    pub fn open(config: &StoreConfig, secret: &StoreSecret) -> Result<Self, StoreError> {
        config.validate()?;
        ensure_parent_dir(&config.path)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| StoreError::from_sqlite(&err))?;
        apply_cipher_settings(&connection, secret)?;
        verify_key(&connection)?;
        apply_engine_settings(&connection, config)?;
        debug!(path = %config.path.display(), "store opened");
        Ok(Self {
            connection,
            path: config.path.clone(),
        })
    }

    /// Returns the store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns the underlying connection mutably (needed to open transactions).
    pub const fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Releases the underlying connection to the caller.
    #[must_use]
    pub fn into_connection(self) -> Connection {
        self.connection
    }

    /// Reads the store's version stamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stamp cannot be read.
    pub fn schema_version(&self) -> Result<SchemaVersion, StoreError> {
        read_version_stamp(&self.connection)
    }

    /// Returns true when `table` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog query fails.
    pub fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        self.connection
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|err| StoreError::from_sqlite(&err))
    }

    /// Returns true when `table` has a column named `column`.
    ///
    /// A missing table reports `false`; a failing lookup is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the column lookup fails.
    pub fn column_exists(&self, table: &str, column: &str) -> Result<bool, StoreError> {
        column_exists(&self.connection, table, column)
    }

    /// Returns the active journal mode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the pragma cannot be read.
    pub fn journal_mode(&self) -> Result<String, StoreError> {
        self.connection
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .map_err(|err| StoreError::from_sqlite(&err))
    }

    /// Returns the active page-cache budget.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the pragma cannot be read.
    pub fn cache_size(&self) -> Result<i64, StoreError> {
        self.connection
            .query_row("PRAGMA cache_size", [], |row| row.get(0))
            .map_err(|err| StoreError::from_sqlite(&err))
    }
}

/// Returns true when `table` has a column named `column`.
///
/// # Errors
///
/// Returns [`StoreError`] when the column lookup fails.
pub fn column_exists(connection: &Connection, table: &str, column: &str) -> Result<bool, StoreError> {
    connection
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|err| StoreError::from_sqlite(&err))
}

// ============================================================================
// SECTION: Open Sequence
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))
}

/// Applies pre-key settings, the key, and post-key settings.
fn apply_cipher_settings(connection: &Connection, secret: &StoreSecret) -> Result<(), StoreError> {
    connection
        .execute_batch(&format!(
            "PRAGMA cipher_default_kdf_iter = {CIPHER_KDF_ITERATIONS};
             PRAGMA cipher_default_page_size = {CIPHER_PAGE_SIZE};"
        ))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    connection
        .execute_batch(&format!("PRAGMA key = '{}';", secret.passphrase()))
        .map_err(|_| StoreError::KeyDerivation("store key could not be applied".to_string()))?;
    connection
        .execute_batch(&format!(
            "PRAGMA kdf_iter = '{CIPHER_KDF_ITERATIONS}';
             PRAGMA cipher_page_size = {CIPHER_PAGE_SIZE};"
        ))
        .map_err(|err| StoreError::from_sqlite(&err))
}

/// Touches the schema catalog so a wrong key fails before any table access.
fn verify_key(connection: &Connection) -> Result<(), StoreError> {
    connection
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(|err| match StoreError::from_sqlite(&err) {
            StoreError::KeyDerivation(_) => {
                StoreError::KeyDerivation("store secret does not unlock this file".to_string())
            }
            other => other,
        })
}

/// Applies WAL, cache, sync, and busy-timeout settings.
fn apply_engine_settings(connection: &Connection, config: &StoreConfig) -> Result<(), StoreError> {
    connection
        .execute_batch("PRAGMA journal_mode = wal;")
        .map_err(|err| StoreError::from_sqlite(&err))?;
    connection
        .execute_batch(&format!("PRAGMA cache_size = {};", config.cache_size_pages))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| StoreError::from_sqlite(&err))
}

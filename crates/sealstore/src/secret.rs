// crates/sealstore/src/secret.rs
// ============================================================================
// Module: Store Secret
// Description: Caller-owned keying material for the encrypted store.
// Purpose: Carry the secret into the key pragma without ever exposing it.
// Dependencies: hex
// ============================================================================

//! ## Overview
//! [`StoreSecret`] wraps the raw key bytes supplied by the application's key
//! management. The bytes are handed to the cipher as a hex passphrase, which
//! runs them through the store's fixed key-derivation settings. The secret is
//! never persisted by this crate and its `Debug` output is redacted. The
//! wrapped buffer is overwritten on drop as a best effort only: the hex
//! passphrase and the key pragma text are ordinary heap strings that are
//! freed without scrubbing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::error::StoreError;

// ============================================================================
// SECTION: Store Secret
// ============================================================================

/// Opaque keying material for the store.
///
/// # Invariants
/// - Never empty.
/// - Never rendered by `Debug` or `Display`.
/// - Not `Clone`; the bytes live in exactly one buffer.
#[derive(PartialEq, Eq)]
pub struct StoreSecret {
    /// Raw key bytes.
    bytes: Vec<u8>,
}

impl StoreSecret {
    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `bytes` is empty.
    pub fn new(bytes: Vec<u8>) -> Result<Self, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::Invalid("store secret must not be empty".to_string()));
        }
        Ok(Self {
            bytes,
        })
    }

    /// Parses a hex-encoded secret.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the text is not valid hex or is
    /// empty.
    pub fn from_hex(text: &str) -> Result<Self, StoreError> {
        let bytes = hex::decode(text.trim())
            .map_err(|_| StoreError::Invalid("store secret must be hex encoded".to_string()))?;
        Self::new(bytes)
    }

    /// Returns the passphrase handed to the cipher's key pragma.
    ///
    /// The returned string is a plain copy and is not scrubbed when dropped.
    pub(crate) fn passphrase(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for StoreSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreSecret(<redacted>)")
    }
}

/// Overwrites the key bytes before the buffer is released.
impl Drop for StoreSecret {
    fn drop(&mut self) {
        self.bytes.fill(0);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

// crates/sealstore/src/catalog/closed_groups.rs
// ============================================================================
// Module: Closed Group Key Migration
// Description: Converts legacy closed-group private keys into key pairs.
// Purpose: Custom action run by the version 40 step.
// Dependencies: hex, rusqlite, serde_json, tracing
// ============================================================================

//! ## Overview
//! Before version 40 a closed group kept a single private key in
//! `closed_group_private_keys`. From version 40 a group holds a history of
//! encryption key pairs and is registered by public key. The migration:
//! - stores each legacy key as a JSON key pair at timestamp 0;
//! - registers each of those public keys;
//! - registers the public key encoded in every closed-group id in `groups`.
//!
//! Group ids carry the hex of the group public key after a fixed prefix. An
//! id with that prefix whose suffix does not decode fails the migration, and
//! with it the whole upgrade.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::params;
use serde::Serialize;
use tracing::debug;

use crate::error::StoreError;
use crate::ledger::CustomAction;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Group-id prefix used by closed groups.
pub const CLOSED_GROUP_ID_PREFIX: &str = "__textsecure_group__!";
/// Timestamp given to key pairs carried over from legacy private keys.
const LEGACY_KEY_PAIR_TIMESTAMP: i64 = 0;

// ============================================================================
// SECTION: Migration
// ============================================================================

/// Serialized key pair stored in `closed_group_encryption_key_pairs`.
#[derive(Debug, Serialize)]
struct KeyPairRecord<'a> {
    /// Hex-encoded public key.
    public_key: &'a str,
    /// Hex-encoded private key.
    private_key: &'a str,
}

/// Returns the custom action that performs the closed-group key migration.
#[must_use]
pub fn closed_group_key_migration() -> CustomAction {
    CustomAction::new("closed_group_key_migration", migrate_closed_group_keys)
}

/// Encodes a closed-group public key as a `groups.group_id`.
#[must_use]
pub fn closed_group_id(public_key: &str) -> String {
    format!("{CLOSED_GROUP_ID_PREFIX}{}", hex::encode(public_key.as_bytes()))
}

/// Moves legacy keys into key pairs and registers group public keys.
fn migrate_closed_group_keys(connection: &Connection) -> Result<(), StoreError> {
    let legacy = legacy_private_keys(connection)?;
    for (public_key, private_key) in &legacy {
        let key_pair = serde_json::to_string(&KeyPairRecord {
            public_key,
            private_key,
        })
        .map_err(|err| StoreError::Invalid(format!("closed group key pair encoding: {err}")))?;
        connection
            .execute(
                "INSERT OR REPLACE INTO closed_group_encryption_key_pairs \
                 (closed_group_public_key, timestamp, key_pair) VALUES (?1, ?2, ?3)",
                params![public_key, LEGACY_KEY_PAIR_TIMESTAMP, key_pair],
            )
            .map_err(|err| StoreError::from_sqlite(&err))?;
        register_public_key(connection, public_key)?;
    }
    let group_keys = closed_group_public_keys(connection)?;
    for public_key in &group_keys {
        register_public_key(connection, public_key)?;
    }
    debug!(key_pairs = legacy.len(), groups = group_keys.len(), "migrated closed group keys");
    Ok(())
}

/// Reads every legacy closed-group key.
fn legacy_private_keys(connection: &Connection) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = connection
        .prepare(
            "SELECT closed_group_public_key, closed_group_private_key FROM \
             closed_group_private_keys WHERE closed_group_private_key IS NOT NULL ORDER BY \
             closed_group_public_key",
        )
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|err| StoreError::from_sqlite(&err))
}

/// Decodes the public keys embedded in closed-group ids.
fn closed_group_public_keys(connection: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = connection
        .prepare("SELECT group_id FROM groups WHERE substr(group_id, 1, ?1) = ?2 ORDER BY group_id")
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let prefix_len = i64::try_from(CLOSED_GROUP_ID_PREFIX.len())
        .map_err(|_| StoreError::Invalid("closed group prefix too long".to_string()))?;
    let rows = stmt
        .query_map(params![prefix_len, CLOSED_GROUP_ID_PREFIX], |row| row.get::<_, String>(0))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let mut keys = Vec::new();
    for group_id in rows {
        let group_id = group_id.map_err(|err| StoreError::from_sqlite(&err))?;
        let key = decode_group_public_key(&group_id).ok_or_else(|| {
            StoreError::Invalid(format!("closed group id does not encode a public key: {group_id}"))
        })?;
        keys.push(key);
    }
    Ok(keys)
}

/// Returns the public key encoded in `group_id`, if it decodes.
fn decode_group_public_key(group_id: &str) -> Option<String> {
    let encoded = group_id.strip_prefix(CLOSED_GROUP_ID_PREFIX)?;
    let bytes = hex::decode(encoded).ok()?;
    let key = String::from_utf8(bytes).ok()?;
    (!key.is_empty()).then_some(key)
}

/// Registers `public_key` as a closed group.
fn register_public_key(connection: &Connection, public_key: &str) -> Result<(), StoreError> {
    connection
        .execute(
            "INSERT OR IGNORE INTO closed_group_public_keys (public_key) VALUES (?1)",
            params![public_key],
        )
        .map(|_| ())
        .map_err(|err| StoreError::from_sqlite(&err))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::closed_group_id;
    use super::decode_group_public_key;

    #[test]
    fn group_id_round_trips_public_key() {
        let id = closed_group_id("05abcdef");
        assert_eq!(decode_group_public_key(&id).as_deref(), Some("05abcdef"));
    }

    #[test]
    fn undecodable_group_ids_do_not_decode() {
        assert_eq!(decode_group_public_key("__textsecure_group__!zz"), None);
        assert_eq!(decode_group_public_key("__textsecure_group__!"), None);
        assert_eq!(decode_group_public_key("__signal_mms_group__!3035"), None);
    }
}

// crates/sealstore/src/catalog/mod.rs
// ============================================================================
// Module: Messenger Catalog
// Description: Concrete schema, release baseline, and ledger of the messenger.
// Purpose: Supply the lifecycle with the application's table owners and steps.
// Dependencies: rusqlite, serde_json, hex
// ============================================================================

//! ## Overview
//! The messenger store reached public release at version
//! [`RELEASE_BASELINE_VERSION`]. Every later schema change is a step in
//! [`messenger_ledger`], and [`current_schema`] is the shape those steps
//! produce, so a fresh store and an upgraded one converge.
//! [`release_baseline_schema`] recreates the release shape for stores that
//! must be exercised through the full historical chain.
//!
//! The full-text search index (its virtual tables and sync triggers) is not
//! part of this catalog. The search module owns and creates it separately, so
//! neither schema declares a virtual table or trigger.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod closed_groups;
mod steps;
mod tables;

pub use closed_groups::CLOSED_GROUP_ID_PREFIX;
pub use closed_groups::closed_group_id;
pub use closed_groups::closed_group_key_migration;
pub use steps::BACKGROUND_POLL_JOB_KINDS;
pub use steps::PREKEY_AND_MULTI_DEVICE_JOB_KINDS;
pub use steps::PROFILE_JOB_KINDS;
pub use steps::messenger_steps;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::bootstrap::SchemaDefinition;
use crate::error::StoreError;
use crate::ledger::MigrationLedger;
use crate::lifecycle::StoreLifecycle;
use crate::statement::StatementBatch;
use crate::version::SchemaVersion;

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Version expected by this build.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion::new(41);
/// Version of the first public release; the ledger starts after it.
pub const RELEASE_BASELINE_VERSION: SchemaVersion = SchemaVersion::new(27);

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Returns the messenger's relational schema at [`CURRENT_VERSION`].
///
/// Excludes the full-text search index, which is created by its own module.
#[must_use]
pub fn current_schema() -> SchemaDefinition {
    messaging_owners(tables::PART)
        .table(
            "network_caches",
            StatementBatch::from_static(tables::NETWORK_RELEASE_TABLES).extended(
                &StatementBatch::from_static(&[
                    tables::SNODE_POOL,
                    tables::ONION_REQUEST_PATH,
                    tables::LAST_MESSAGE_HASH_VALUE_2,
                    tables::RECEIVED_MESSAGE_HASH_VALUES_3,
                    tables::SESSION_REQUEST_TIMESTAMP_CACHE,
                    tables::SESSION_REQUEST_SENT_TIMESTAMP,
                    tables::SESSION_REQUEST_PROCESSED_TIMESTAMP,
                    tables::OPEN_GROUP_PUBLIC_KEYS,
                    tables::OPEN_GROUP_PROFILE_PICTURES,
                    tables::CLOSED_GROUP_ENCRYPTION_KEY_PAIRS,
                    tables::CLOSED_GROUP_PUBLIC_KEYS,
                ]),
            ),
        )
        .table(
            "message_metadata",
            StatementBatch::from_static(tables::MESSAGE_METADATA_RELEASE_TABLES)
                .with(tables::ERROR_MESSAGE),
        )
        .table("thread_metadata", StatementBatch::from_static(tables::THREAD_METADATA_TABLES))
        .table("users", StatementBatch::from_static(tables::USER_TABLES))
        .table("backup_files", tables::BACKUP_FILES)
        .table(
            "sender_keys",
            StatementBatch::from_static(&[
                tables::OLD_CLOSED_GROUP_RATCHET,
                tables::CLOSED_GROUP_RATCHET,
                tables::CLOSED_GROUP_PRIVATE_KEYS,
            ]),
        )
}

/// Returns the schema as shipped at [`RELEASE_BASELINE_VERSION`].
#[must_use]
pub fn release_baseline_schema() -> SchemaDefinition {
    messaging_owners(tables::PART_RELEASE)
        .table("identities", tables::IDENTITIES_RELEASE)
        .table("network_caches", StatementBatch::from_static(tables::NETWORK_RELEASE_TABLES))
        .table(
            "message_metadata",
            StatementBatch::from_static(tables::MESSAGE_METADATA_RELEASE_TABLES),
        )
        .table("thread_metadata", StatementBatch::from_static(tables::THREAD_METADATA_TABLES))
        .table("users", StatementBatch::from_static(tables::USER_TABLES))
}

/// Owners whose tables have existed since the release, with `part` as given.
fn messaging_owners(part: &'static str) -> SchemaDefinition {
    SchemaDefinition::new()
        .indexed_table("sms", tables::SMS, StatementBatch::from_static(tables::SMS_INDEXES))
        .indexed_table("mms", tables::MMS, StatementBatch::from_static(tables::MMS_INDEXES))
        .indexed_table("attachments", part, StatementBatch::from_static(tables::PART_INDEXES))
        .indexed_table("threads", tables::THREAD, StatementBatch::from_static(tables::THREAD_INDEXES))
        .indexed_table("drafts", tables::DRAFTS, StatementBatch::from_static(tables::DRAFTS_INDEXES))
        .table("push", tables::PUSH)
        .indexed_table("groups", tables::GROUPS, StatementBatch::from_static(tables::GROUPS_INDEXES))
        .table("recipients", tables::RECIPIENT_PREFERENCES)
        .indexed_table(
            "group_receipts",
            tables::GROUP_RECEIPTS,
            StatementBatch::from_static(tables::GROUP_RECEIPTS_INDEXES),
        )
        .table("one_time_prekeys", tables::ONE_TIME_PREKEYS)
        .table("signed_prekeys", tables::SIGNED_PREKEYS)
        .table("sessions", tables::SESSIONS)
        .table("jobs", StatementBatch::from_static(tables::JOB_TABLES))
        .indexed_table(
            "stickers",
            tables::STICKER,
            StatementBatch::from_static(tables::STICKER_INDEXES),
        )
}

// ============================================================================
// SECTION: Ledger And Lifecycles
// ============================================================================

/// Returns the messenger's historical ledger.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the step list violates ledger ordering.
pub fn messenger_ledger() -> Result<MigrationLedger, StoreError> {
    MigrationLedger::new(messenger_steps())
}

/// Returns the lifecycle used by the running build.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the ledger or version is inconsistent.
pub fn messenger_lifecycle() -> Result<StoreLifecycle, StoreError> {
    StoreLifecycle::new(current_schema(), messenger_ledger()?, CURRENT_VERSION)
}

/// Returns a lifecycle that creates stores exactly as the first release did.
///
/// Stores opened through it are stamped [`RELEASE_BASELINE_VERSION`] and can
/// then be moved forward with [`messenger_ledger`].
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the version is inconsistent.
pub fn release_baseline_lifecycle() -> Result<StoreLifecycle, StoreError> {
    StoreLifecycle::new(
        release_baseline_schema(),
        MigrationLedger::default(),
        RELEASE_BASELINE_VERSION,
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

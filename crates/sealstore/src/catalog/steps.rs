// crates/sealstore/src/catalog/steps.rs
// ============================================================================
// Module: Catalog Steps
// Description: Historical migration steps of the messenger store.
// Purpose: Reproduce every schema change shipped after the first release.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Steps are listed in shipping order and must never be edited or removed:
//! stores written by any earlier build replay the tail of this list.

use super::closed_groups::closed_group_key_migration;
use super::tables;
use crate::ledger::MigrationStep;
use crate::purge::PurgeSpec;
use crate::statement::StatementBatch;

/// Work-item kinds retired when background polling moved to a worker.
pub const BACKGROUND_POLL_JOB_KINDS: &[&str] = &["BackgroundPollJob"];

/// Work-item kinds retired with the profile and attribute jobs.
pub const PROFILE_JOB_KINDS: &[&str] = &[
    "RetrieveProfileJob",
    "RefreshAttributesJob",
    "RotateProfileKeyJob",
    "RefreshUnidentifiedDeliveryAbilityJob",
    "RotateCertificateJob",
];

/// Work-item kinds retired with pre-key rotation and multi-device sync.
pub const PREKEY_AND_MULTI_DEVICE_JOB_KINDS: &[&str] = &[
    "CleanPreKeysJob",
    "RefreshPreKeysJob",
    "CreateSignedPreKeyJob",
    "RotateSignedPreKeyJob",
    "MultiDeviceBlockedUpdateJob",
    "MultiDeviceConfigurationUpdateJob",
    "MultiDeviceContactUpdateJob",
    "MultiDeviceGroupUpdateJob",
    "MultiDeviceOpenGroupUpdateJob",
    "MultiDeviceProfileKeyUpdateJob",
    "MultiDeviceReadUpdateJob",
    "MultiDeviceStickerPackOperationJob",
    "MultiDeviceStickerPackSyncJob",
    "MultiDeviceVerifiedUpdateJob",
    "ServiceOutageDetectionJob",
    "SessionRequestMessageSendJob",
];

/// Returns the historical steps, thresholds 28 through 41.
#[must_use]
pub fn messenger_steps() -> Vec<MigrationStep> {
    vec![
        MigrationStep::new(28, "create message error table")
            .then(StatementBatch::from(tables::ERROR_MESSAGE)),
        MigrationStep::new(29, "create session request timestamp cache")
            .then(StatementBatch::from(tables::SESSION_REQUEST_TIMESTAMP_CACHE)),
        MigrationStep::new(30, "create snode pool and onion path caches")
            .then(StatementBatch::from_static(&[tables::SNODE_POOL, tables::ONION_REQUEST_PATH])),
        MigrationStep::new(31, "create session request sent and processed caches").then(
            StatementBatch::from_static(&[
                tables::SESSION_REQUEST_SENT_TIMESTAMP,
                tables::SESSION_REQUEST_PROCESSED_TIMESTAMP,
            ]),
        ),
        MigrationStep::new(32, "create open group public key table")
            .then(StatementBatch::from(tables::OPEN_GROUP_PUBLIC_KEYS)),
        MigrationStep::new(33, "create message hash and closed group ratchet tables").then(
            StatementBatch::from_static(&[
                tables::LAST_MESSAGE_HASH_VALUE_2,
                tables::CLOSED_GROUP_RATCHET,
                tables::CLOSED_GROUP_PRIVATE_KEYS,
            ]),
        ),
        MigrationStep::new(34, "create received message hash table")
            .then(StatementBatch::from(tables::RECEIVED_MESSAGE_HASH_VALUES_3)),
        MigrationStep::new(35, "create backup file table")
            .then(StatementBatch::from(tables::BACKUP_FILES)),
        MigrationStep::new(36, "create retired closed group ratchet table")
            .then(StatementBatch::from(tables::OLD_CLOSED_GROUP_RATCHET)),
        MigrationStep::new(37, "create open group profile picture table")
            .then(StatementBatch::from(tables::OPEN_GROUP_PROFILE_PICTURES)),
        MigrationStep::new(38, "add audio columns to attachments")
            .then(StatementBatch::from_static(tables::PART_AUDIO_COLUMNS)),
        MigrationStep::new(39, "purge background poll jobs")
            .then(PurgeSpec::new(BACKGROUND_POLL_JOB_KINDS.iter().copied())),
        MigrationStep::new(40, "move closed groups to encryption key pairs")
            .then(StatementBatch::from_static(&[
                tables::CLOSED_GROUP_ENCRYPTION_KEY_PAIRS,
                tables::CLOSED_GROUP_PUBLIC_KEYS,
            ]))
            .then(closed_group_key_migration())
            .then(StatementBatch::from(tables::DROP_IDENTITIES))
            .then(PurgeSpec::new(PROFILE_JOB_KINDS.iter().copied())),
        MigrationStep::new(41, "purge pre-key and multi-device jobs")
            .then(PurgeSpec::new(PREKEY_AND_MULTI_DEVICE_JOB_KINDS.iter().copied())),
    ]
}

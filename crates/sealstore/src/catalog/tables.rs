// crates/sealstore/src/catalog/tables.rs
// ============================================================================
// Module: Catalog Tables
// Description: Create-table and create-index statements per table owner.
// Purpose: Shared statement text for bootstrap and historical steps.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Each table owner's statements are defined once here and referenced from
//! both the fresh-store schema and the ledger step that first introduced the
//! table, so an upgraded store and a bootstrapped one converge on the same
//! shape. Columns added later by `ALTER TABLE` are declared last in the
//! current definition, matching where the engine appends them.

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Text messages.
pub(crate) const SMS: &str = "CREATE TABLE sms (_id INTEGER PRIMARY KEY AUTOINCREMENT, thread_id \
                              INTEGER, address TEXT, address_device_id INTEGER DEFAULT 1, person \
                              INTEGER, date INTEGER, date_sent INTEGER, protocol INTEGER, read \
                              INTEGER DEFAULT 0, status INTEGER DEFAULT -1, type INTEGER, \
                              reply_path_present INTEGER, delivery_receipt_count INTEGER DEFAULT \
                              0, subject TEXT, body TEXT, mismatched_identities TEXT DEFAULT \
                              NULL, service_center TEXT, subscription_id INTEGER DEFAULT -1, \
                              expires_in INTEGER DEFAULT 0, expire_started INTEGER DEFAULT 0, \
                              notified INTEGER DEFAULT 0, read_receipt_count INTEGER DEFAULT 0, \
                              unidentified INTEGER DEFAULT 0)";

/// Text message indexes.
pub(crate) const SMS_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS sms_thread_id_index ON sms (thread_id)",
    "CREATE INDEX IF NOT EXISTS sms_read_index ON sms (read)",
    "CREATE INDEX IF NOT EXISTS sms_read_and_notified_thread_id_index ON sms (read, notified, \
     thread_id)",
    "CREATE INDEX IF NOT EXISTS sms_type_index ON sms (type)",
    "CREATE INDEX IF NOT EXISTS sms_date_sent_index ON sms (date_sent)",
    "CREATE INDEX IF NOT EXISTS sms_thread_date_index ON sms (thread_id, date)",
];

/// Media messages.
pub(crate) const MMS: &str = "CREATE TABLE mms (_id INTEGER PRIMARY KEY, thread_id INTEGER, date \
                              INTEGER, date_received INTEGER, msg_box INTEGER, read INTEGER \
                              DEFAULT 0, m_id TEXT, sub TEXT, sub_cs INTEGER, body TEXT, \
                              part_count INTEGER, ct_t TEXT, ct_l TEXT, address TEXT, \
                              address_device_id INTEGER, exp INTEGER, m_cls TEXT, m_type \
                              INTEGER, v INTEGER, m_size INTEGER, pri INTEGER, rr INTEGER, rpt_a \
                              INTEGER, resp_st INTEGER, st INTEGER, tr_id TEXT, retr_st INTEGER, \
                              retr_txt TEXT, retr_txt_cs INTEGER, read_status INTEGER, ct_cls \
                              INTEGER, resp_txt TEXT, d_tm INTEGER, delivery_receipt_count \
                              INTEGER DEFAULT 0, mismatched_identities TEXT DEFAULT NULL, \
                              network_failures TEXT DEFAULT NULL, d_rpt INTEGER, subscription_id \
                              INTEGER DEFAULT -1, expires_in INTEGER DEFAULT 0, expire_started \
                              INTEGER DEFAULT 0, notified INTEGER DEFAULT 0, read_receipt_count \
                              INTEGER DEFAULT 0, quote_id INTEGER DEFAULT 0, quote_author TEXT, \
                              quote_body TEXT, quote_attachment INTEGER DEFAULT -1, \
                              quote_missing INTEGER DEFAULT 0, shared_contacts TEXT, \
                              unidentified INTEGER DEFAULT 0, previews TEXT)";

/// Media message indexes.
pub(crate) const MMS_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS mms_thread_id_index ON mms (thread_id)",
    "CREATE INDEX IF NOT EXISTS mms_read_index ON mms (read)",
    "CREATE INDEX IF NOT EXISTS mms_read_and_notified_thread_id_index ON mms (read, notified, \
     thread_id)",
    "CREATE INDEX IF NOT EXISTS mms_message_box_index ON mms (msg_box)",
    "CREATE INDEX IF NOT EXISTS mms_date_sent_index ON mms (date)",
    "CREATE INDEX IF NOT EXISTS mms_thread_date_index ON mms (thread_id, date_received)",
];

// ============================================================================
// SECTION: Attachments
// ============================================================================

/// Attachment columns shared by every historical shape of `part`.
macro_rules! part_columns {
    () => {
        "_id INTEGER PRIMARY KEY, mid INTEGER, seq INTEGER DEFAULT 0, ct TEXT, name TEXT, chset \
         INTEGER, cd TEXT, fn TEXT, cid TEXT, cl TEXT, ctt_s INTEGER, ctt_t TEXT, encrypted \
         INTEGER, pending_push INTEGER, _data TEXT, data_size INTEGER, file_name TEXT, thumbnail \
         TEXT, aspect_ratio REAL, unique_id INTEGER NOT NULL, digest BLOB, fast_preflight_id \
         TEXT, voice_note INTEGER DEFAULT 0, data_random BLOB, thumbnail_random BLOB, quote \
         INTEGER DEFAULT 0, width INTEGER DEFAULT 0, height INTEGER DEFAULT 0, caption TEXT \
         DEFAULT NULL, sticker_pack_id TEXT DEFAULT NULL, sticker_pack_key DEFAULT NULL, \
         sticker_id INTEGER DEFAULT -1, url TEXT"
    };
}

/// Attachments as shipped in the first public release.
pub(crate) const PART_RELEASE: &str = concat!("CREATE TABLE part (", part_columns!(), ")");

/// Attachments with audio waveform columns.
pub(crate) const PART: &str = concat!(
    "CREATE TABLE part (",
    part_columns!(),
    ", audio_visual_samples BLOB, audio_duration INTEGER)"
);

/// Audio columns appended to `part` on existing stores.
pub(crate) const PART_AUDIO_COLUMNS: &[&str] = &[
    "ALTER TABLE part ADD COLUMN audio_visual_samples BLOB",
    "ALTER TABLE part ADD COLUMN audio_duration INTEGER",
];

/// Attachment indexes.
pub(crate) const PART_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS part_mms_id_index ON part (mid)",
    "CREATE INDEX IF NOT EXISTS pending_push_index ON part (pending_push)",
    "CREATE INDEX IF NOT EXISTS part_sticker_pack_id_index ON part (sticker_pack_id)",
];

// ============================================================================
// SECTION: Conversations
// ============================================================================

/// Conversation threads.
pub(crate) const THREAD: &str = "CREATE TABLE thread (_id INTEGER PRIMARY KEY, date INTEGER \
                                 DEFAULT 0, message_count INTEGER DEFAULT 0, recipient_ids TEXT, \
                                 snippet TEXT, snippet_cs INTEGER DEFAULT 0, type INTEGER DEFAULT \
                                 0, error INTEGER DEFAULT 0, snippet_type INTEGER DEFAULT 0, \
                                 snippet_uri TEXT DEFAULT NULL, archived INTEGER DEFAULT 0, \
                                 status INTEGER DEFAULT 0, delivery_receipt_count INTEGER \
                                 DEFAULT 0, expires_in INTEGER DEFAULT 0, last_seen INTEGER \
                                 DEFAULT 0, has_sent INTEGER DEFAULT 0, read_receipt_count \
                                 INTEGER DEFAULT 0, unread_count INTEGER DEFAULT 0)";

/// Thread indexes.
pub(crate) const THREAD_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS thread_recipient_ids_index ON thread (recipient_ids)",
    "CREATE INDEX IF NOT EXISTS archived_count_index ON thread (archived, message_count)",
];

/// Unsent drafts.
pub(crate) const DRAFTS: &str = "CREATE TABLE drafts (_id INTEGER PRIMARY KEY, thread_id \
                                 INTEGER, type TEXT, value TEXT)";

/// Draft indexes.
pub(crate) const DRAFTS_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS draft_thread_index ON drafts (thread_id)"];

/// Undecrypted inbound envelopes.
pub(crate) const PUSH: &str = "CREATE TABLE push (_id INTEGER PRIMARY KEY, type INTEGER, source \
                               TEXT, device_id INTEGER, body TEXT, content TEXT, timestamp \
                               INTEGER, server_timestamp INTEGER DEFAULT 0, server_guid TEXT \
                               DEFAULT NULL)";

/// Groups.
pub(crate) const GROUPS: &str = "CREATE TABLE groups (_id INTEGER PRIMARY KEY, group_id TEXT, \
                                 title TEXT, members TEXT, avatar BLOB, avatar_id INTEGER, \
                                 avatar_key BLOB, avatar_content_type TEXT, avatar_relay TEXT, \
                                 timestamp INTEGER, active INTEGER DEFAULT 1, avatar_digest \
                                 BLOB, mms INTEGER DEFAULT 0, admins TEXT)";

/// Group indexes.
pub(crate) const GROUPS_INDEXES: &[&str] =
    &["CREATE UNIQUE INDEX IF NOT EXISTS group_id_index ON groups (group_id)"];

/// Per-recipient preferences.
pub(crate) const RECIPIENT_PREFERENCES: &str = "CREATE TABLE recipient_preferences (_id INTEGER \
                                                PRIMARY KEY, recipient_ids TEXT UNIQUE, block \
                                                INTEGER DEFAULT 0, notification TEXT DEFAULT \
                                                NULL, vibrate INTEGER DEFAULT 0, mute_until \
                                                INTEGER DEFAULT 0, color TEXT DEFAULT NULL, \
                                                seen_invite_reminder INTEGER DEFAULT 0, \
                                                default_subscription_id INTEGER DEFAULT -1, \
                                                expire_messages INTEGER DEFAULT 0, registered \
                                                INTEGER DEFAULT 0, system_display_name TEXT \
                                                DEFAULT NULL, signal_profile_name TEXT DEFAULT \
                                                NULL, signal_profile_avatar TEXT DEFAULT NULL, \
                                                profile_key TEXT DEFAULT NULL, \
                                                unidentified_access_mode INTEGER DEFAULT 0)";

/// Group delivery and read receipts.
pub(crate) const GROUP_RECEIPTS: &str = "CREATE TABLE group_receipts (_id INTEGER PRIMARY KEY, \
                                         mms_id INTEGER, address TEXT, status INTEGER, timestamp \
                                         INTEGER, unidentified INTEGER DEFAULT 0)";

/// Group receipt indexes.
pub(crate) const GROUP_RECEIPTS_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS group_receipt_mms_id_index ON group_receipts (mms_id)"];

// ============================================================================
// SECTION: Key Material
// ============================================================================

/// One-time pre-keys.
pub(crate) const ONE_TIME_PREKEYS: &str = "CREATE TABLE one_time_prekeys (_id INTEGER PRIMARY \
                                           KEY, key_id INTEGER UNIQUE, public_key TEXT NOT \
                                           NULL, private_key TEXT NOT NULL)";

/// Signed pre-keys.
pub(crate) const SIGNED_PREKEYS: &str = "CREATE TABLE signed_prekeys (_id INTEGER PRIMARY KEY, \
                                         key_id INTEGER UNIQUE, public_key TEXT NOT NULL, \
                                         private_key TEXT NOT NULL, signature TEXT NOT NULL, \
                                         timestamp INTEGER DEFAULT 0)";

/// Ratchet sessions.
pub(crate) const SESSIONS: &str = "CREATE TABLE sessions (_id INTEGER PRIMARY KEY, address TEXT \
                                   NOT NULL, device INTEGER NOT NULL, record BLOB NOT NULL, \
                                   UNIQUE(address, device) ON CONFLICT REPLACE)";

/// Legacy identity keys, dropped when closed groups moved to key pairs.
pub(crate) const IDENTITIES_RELEASE: &str = "CREATE TABLE identities (_id INTEGER PRIMARY KEY, \
                                             address TEXT UNIQUE NOT NULL, key TEXT NOT NULL, \
                                             first_use INTEGER DEFAULT 0, timestamp INTEGER \
                                             DEFAULT 0, verified INTEGER DEFAULT 0, \
                                             nonblocking_approval INTEGER DEFAULT 0)";

/// Drops the legacy identity table.
pub(crate) const DROP_IDENTITIES: &str = "DROP TABLE identities";

// ============================================================================
// SECTION: Jobs
// ============================================================================

/// Persisted job queue.
pub(crate) const JOB_TABLES: &[&str] = &[
    "CREATE TABLE job_spec (_id INTEGER PRIMARY KEY AUTOINCREMENT, job_spec_id TEXT UNIQUE, \
     factory_key TEXT, queue_key TEXT, create_time INTEGER, next_run_attempt_time INTEGER, \
     run_attempt INTEGER, max_attempts INTEGER, max_backoff INTEGER, max_instances INTEGER, \
     lifespan INTEGER, serialized_data TEXT, is_running INTEGER)",
    "CREATE TABLE constraint_spec (_id INTEGER PRIMARY KEY AUTOINCREMENT, job_spec_id TEXT, \
     factory_key TEXT, UNIQUE(job_spec_id, factory_key))",
    "CREATE TABLE dependency_spec (_id INTEGER PRIMARY KEY AUTOINCREMENT, job_spec_id TEXT, \
     depends_on_job_spec_id TEXT, UNIQUE(job_spec_id, depends_on_job_spec_id))",
];

// ============================================================================
// SECTION: Stickers
// ============================================================================

/// Installed sticker packs.
pub(crate) const STICKER: &str = "CREATE TABLE sticker (_id INTEGER PRIMARY KEY AUTOINCREMENT, \
                                  pack_id TEXT NOT NULL, pack_key TEXT NOT NULL, pack_title TEXT \
                                  NOT NULL, pack_author TEXT NOT NULL, sticker_id INTEGER, cover \
                                  INTEGER, emoji TEXT NOT NULL, last_used INTEGER, installed \
                                  INTEGER, file_path TEXT NOT NULL, file_length INTEGER, \
                                  file_random BLOB, UNIQUE(pack_id, sticker_id, cover) ON \
                                  CONFLICT IGNORE)";

/// Sticker indexes.
pub(crate) const STICKER_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS sticker_pack_id_index ON sticker (pack_id)",
    "CREATE INDEX IF NOT EXISTS sticker_sticker_id_index ON sticker (sticker_id)",
];

// ============================================================================
// SECTION: Network Caches
// ============================================================================

/// Tables present since the first public release.
pub(crate) const NETWORK_RELEASE_TABLES: &[&str] = &[
    "CREATE TABLE loki_api_swarm_cache (hex_encoded_public_key TEXT PRIMARY KEY, swarm TEXT)",
    "CREATE TABLE loki_api_group_chat_auth_token_database (server TEXT PRIMARY KEY, token TEXT)",
    "CREATE TABLE loki_api_last_message_server_id_cache (server TEXT PRIMARY KEY, \
     last_message_server_id INTEGER DEFAULT 0)",
    "CREATE TABLE loki_api_last_deletion_server_id_cache (server TEXT PRIMARY KEY, \
     last_deletion_server_id INTEGER DEFAULT 0)",
    "CREATE TABLE loki_pairing_authorisation_cache (primary_device TEXT, secondary_device TEXT, \
     request_signature TEXT, grant_signature TEXT, PRIMARY KEY (primary_device, \
     secondary_device))",
    "CREATE TABLE loki_user_count_cache (public_chat_id TEXT PRIMARY KEY, user_count INTEGER)",
];

/// Snode pool cache.
pub(crate) const SNODE_POOL: &str =
    "CREATE TABLE loki_snode_pool_cache (dummy_key TEXT PRIMARY KEY, snode_pool_key TEXT)";

/// Onion request path cache.
pub(crate) const ONION_REQUEST_PATH: &str =
    "CREATE TABLE loki_path_cache (path_index TEXT PRIMARY KEY, path TEXT)";

/// Last fetched message hash per swarm node.
pub(crate) const LAST_MESSAGE_HASH_VALUE_2: &str =
    "CREATE TABLE last_message_hash_value_table (public_key TEXT, snode TEXT, \
     last_message_hash_value TEXT, PRIMARY KEY (public_key, snode))";

/// Received message hashes per key.
pub(crate) const RECEIVED_MESSAGE_HASH_VALUES_3: &str =
    "CREATE TABLE received_message_hash_values_table_3 (public_key TEXT, snode TEXT, \
     received_message_hash_values TEXT, PRIMARY KEY (public_key, snode))";

/// Session request timestamps.
pub(crate) const SESSION_REQUEST_TIMESTAMP_CACHE: &str =
    "CREATE TABLE session_request_timestamp_cache (public_key TEXT PRIMARY KEY, timestamp \
     INTEGER)";

/// Sent session request timestamps.
pub(crate) const SESSION_REQUEST_SENT_TIMESTAMP: &str =
    "CREATE TABLE session_request_sent_timestamp_cache (public_key TEXT PRIMARY KEY, timestamp \
     INTEGER)";

/// Processed session request timestamps.
pub(crate) const SESSION_REQUEST_PROCESSED_TIMESTAMP: &str =
    "CREATE TABLE session_request_processed_timestamp_cache (public_key TEXT PRIMARY KEY, \
     timestamp INTEGER)";

/// Open group server public keys.
pub(crate) const OPEN_GROUP_PUBLIC_KEYS: &str =
    "CREATE TABLE open_group_public_keys (server TEXT PRIMARY KEY, public_key TEXT)";

/// Open group profile pictures.
pub(crate) const OPEN_GROUP_PROFILE_PICTURES: &str =
    "CREATE TABLE open_group_profile_pictures (server TEXT PRIMARY KEY, profile_picture TEXT)";

/// Closed group encryption key pairs keyed by group and time.
pub(crate) const CLOSED_GROUP_ENCRYPTION_KEY_PAIRS: &str =
    "CREATE TABLE closed_group_encryption_key_pairs (closed_group_public_key TEXT, timestamp \
     INTEGER, key_pair TEXT, PRIMARY KEY (closed_group_public_key, timestamp))";

/// Registered closed group public keys.
pub(crate) const CLOSED_GROUP_PUBLIC_KEYS: &str =
    "CREATE TABLE closed_group_public_keys (public_key TEXT PRIMARY KEY)";

// ============================================================================
// SECTION: Message And Thread Metadata
// ============================================================================

/// Message metadata tables present since the first public release.
pub(crate) const MESSAGE_METADATA_RELEASE_TABLES: &[&str] = &[
    "CREATE TABLE loki_message_friend_request_database (message_id INTEGER PRIMARY KEY, \
     server_id INTEGER DEFAULT 0)",
    "CREATE TABLE loki_message_thread_mapping_database (message_id INTEGER PRIMARY KEY, \
     thread_id INTEGER)",
];

/// Message error descriptions.
pub(crate) const ERROR_MESSAGE: &str =
    "CREATE TABLE loki_error_message_database (message_id INTEGER PRIMARY KEY, error_message \
     TEXT)";

/// Thread metadata tables.
pub(crate) const THREAD_METADATA_TABLES: &[&str] = &[
    "CREATE TABLE loki_thread_session_reset_database (thread_id INTEGER PRIMARY KEY, \
     session_reset_status INTEGER DEFAULT 0)",
    "CREATE TABLE loki_public_chat_database (thread_id INTEGER PRIMARY KEY, public_chat TEXT)",
];

/// Display name tables.
pub(crate) const USER_TABLES: &[&str] = &[
    "CREATE TABLE loki_user_display_name_database (hex_encoded_public_key TEXT PRIMARY KEY, \
     display_name TEXT)",
    "CREATE TABLE loki_user_server_display_name_database (public_key TEXT, server_id TEXT, \
     display_name TEXT, PRIMARY KEY (public_key, server_id))",
];

/// Backup file registry.
pub(crate) const BACKUP_FILES: &str = "CREATE TABLE backup_files (_id INTEGER PRIMARY KEY \
                                       AUTOINCREMENT, name TEXT NOT NULL, size INTEGER NOT \
                                       NULL, timestamp INTEGER NOT NULL)";

// ============================================================================
// SECTION: Shared Sender Keys
// ============================================================================

/// Current closed group sender ratchets.
pub(crate) const CLOSED_GROUP_RATCHET: &str =
    "CREATE TABLE closed_group_ratchet_table (closed_group_public_key TEXT, sender_public_key \
     TEXT, ratchet TEXT, PRIMARY KEY (closed_group_public_key, sender_public_key))";

/// Retired closed group sender ratchets.
pub(crate) const OLD_CLOSED_GROUP_RATCHET: &str =
    "CREATE TABLE old_closed_group_ratchet_table (closed_group_public_key TEXT, \
     sender_public_key TEXT, ratchet TEXT, PRIMARY KEY (closed_group_public_key, \
     sender_public_key))";

/// Legacy closed group private keys.
pub(crate) const CLOSED_GROUP_PRIVATE_KEYS: &str =
    "CREATE TABLE closed_group_private_keys (closed_group_public_key TEXT PRIMARY KEY, \
     closed_group_private_key TEXT)";

//! Typed access to the shared round documents.
//!
//! Reads are forgiving: a missing, unreadable or malformed document yields the
//! default value and a warning, so no screen ever fails to render because of
//! storage. Writes report their failure and let the caller decide.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::dao::{
    kv_store::KeyValueStore,
    models::{
        ArchiveJournal, ArchivedSubmission, FinalizedHoles, FixRequests, PlayerEntryState,
        RoundConfig, SubmissionPacket,
    },
    storage::{StorageError, StorageResult},
};

const ROUND_KEY: &str = "skins.round";
const SUBMISSIONS_KEY: &str = "skins.submissions";
const HISTORY_KEY: &str = "skins.history";
const FIX_REQUESTS_KEY: &str = "skins.fix_requests";
const FINALIZED_KEY: &str = "skins.finalized";
const JOURNAL_KEY: &str = "skins.archive_journal";
const ENTRY_PREFIX: &str = "skins.entry.";

/// Repository exposing one accessor pair per shared document.
#[derive(Clone)]
pub struct RoundStore {
    store: Arc<dyn KeyValueStore>,
}

impl RoundStore {
    /// Wrap a backend shared with every other session.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Decode the document under `key`, distinguishing absence from failure.
    fn load<T>(&self, key: &str) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.store.get_raw(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::malformed(key, source)),
        }
    }

    /// Decode the document under `key`, falling back to `T::default()` on any failure.
    fn load_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_optional(key).unwrap_or_default()
    }

    fn load_optional<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.load(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "falling back to default value");
                None
            }
        }
    }

    fn save<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: ?Sized + Serialize,
    {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::malformed(key, source))?;
        self.store.set_raw(key, raw)
    }

    /// Active round, if one was ever saved.
    pub fn round(&self) -> Option<RoundConfig> {
        self.load_optional(ROUND_KEY)
    }

    /// Replace the active round.
    pub fn save_round(&self, round: &RoundConfig) -> StorageResult<()> {
        self.save(ROUND_KEY, round)
    }

    /// Entry persisted by the device identified by `device_id`.
    pub fn entry(&self, device_id: &str) -> Option<PlayerEntryState> {
        self.load_optional(&entry_key(device_id))
    }

    /// Persist the in-progress entry of `device_id`.
    pub fn save_entry(&self, device_id: &str, entry: &PlayerEntryState) -> StorageResult<()> {
        self.save(&entry_key(device_id), entry)
    }

    /// Submissions log in append order.
    pub fn submissions(&self) -> Vec<SubmissionPacket> {
        self.load_or_default(SUBMISSIONS_KEY)
    }

    /// Append one packet to the submissions log.
    ///
    /// A log that cannot be read or decoded aborts the append: rewriting it
    /// would drop every packet already in it.
    pub fn append_submission(&self, packet: SubmissionPacket) -> StorageResult<()> {
        let mut log: Vec<SubmissionPacket> = self.load(SUBMISSIONS_KEY)?.unwrap_or_default();
        log.push(packet);
        self.save(SUBMISSIONS_KEY, &log)
    }

    /// Overwrite the whole log. Only archival prunes it.
    pub fn replace_submissions(&self, log: &[SubmissionPacket]) -> StorageResult<()> {
        self.save(SUBMISSIONS_KEY, log)
    }

    /// Archived packets of every finalized hole, oldest first.
    pub fn history(&self) -> Vec<ArchivedSubmission> {
        self.load_or_default(HISTORY_KEY)
    }

    /// Overwrite the archive.
    pub fn save_history(&self, history: &[ArchivedSubmission]) -> StorageResult<()> {
        self.save(HISTORY_KEY, history)
    }

    /// Fix requests keyed by player; stale holes included.
    pub fn fix_requests(&self) -> FixRequests {
        self.load_or_default(FIX_REQUESTS_KEY)
    }

    /// Replace the fix request map.
    pub fn save_fix_requests(&self, fixes: &FixRequests) -> StorageResult<()> {
        self.save(FIX_REQUESTS_KEY, fixes)
    }

    /// Holes locked so far.
    pub fn finalized_holes(&self) -> FinalizedHoles {
        self.load_or_default(FINALIZED_KEY)
    }

    /// Replace the finalized hole map.
    pub fn save_finalized_holes(&self, finalized: &FinalizedHoles) -> StorageResult<()> {
        self.save(FINALIZED_KEY, finalized)
    }

    /// Archival left unfinished by a previous scorekeeper session, if any.
    pub fn archive_journal(&self) -> Option<ArchiveJournal> {
        self.load_optional(JOURNAL_KEY)
    }

    /// Record an archival about to start.
    pub fn save_archive_journal(&self, journal: &ArchiveJournal) -> StorageResult<()> {
        self.save(JOURNAL_KEY, journal)
    }

    /// Drop the journal once its archival completed.
    pub fn clear_archive_journal(&self) -> StorageResult<()> {
        self.store.remove(JOURNAL_KEY)
    }
}

fn entry_key(device_id: &str) -> String {
    format!("{ENTRY_PREFIX}{device_id}")
}

//! Hole archival: move a finalized hole out of the live log and advance the round.
//!
//! The store has no multi-key transaction, so the procedure is journaled. The
//! journal is written first and removed last, and every step in between is
//! idempotent; replaying an interrupted journal finishes the job without
//! duplicating or losing packets.

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{ArchiveJournal, ArchivedSubmission, RoundConfig},
        round_store::RoundStore,
    },
    error::ServiceError,
};

/// Finalize `hole` and archive its submissions. Returns the advanced round.
pub fn archive_hole(store: &RoundStore, hole: u32) -> Result<RoundConfig, ServiceError> {
    if let Some(pending) = store.archive_journal() {
        return Err(ServiceError::InvalidState(format!(
            "archival of hole {} is still pending",
            pending.hole
        )));
    }

    let journal = ArchiveJournal {
        archive_id: Uuid::new_v4(),
        hole,
        finalized_at: OffsetDateTime::now_utc(),
    };
    store.save_archive_journal(&journal)?;
    apply_journal(store, &journal)
}

/// Finish an archival interrupted by a previous session, if one is pending.
pub fn recover(store: &RoundStore) -> Result<Option<RoundConfig>, ServiceError> {
    let Some(journal) = store.archive_journal() else {
        return Ok(None);
    };
    warn!(
        hole = journal.hole,
        archive_id = %journal.archive_id,
        "resuming interrupted hole archival"
    );
    apply_journal(store, &journal).map(Some)
}

fn apply_journal(store: &RoundStore, journal: &ArchiveJournal) -> Result<RoundConfig, ServiceError> {
    let hole = journal.hole;

    let mut finalized = store.finalized_holes();
    if finalized.get(&hole) != Some(&true) {
        finalized.insert(hole, true);
        store.save_finalized_holes(&finalized)?;
    }

    let log = store.submissions();
    let (archived, remaining): (Vec<_>, Vec<_>) =
        log.into_iter().partition(|packet| packet.hole == hole);

    let mut history = store.history();
    let fresh: Vec<ArchivedSubmission> = {
        let already: Vec<_> = history
            .iter()
            .filter(|entry| entry.archive_id == journal.archive_id)
            .map(|entry| &entry.packet)
            .collect();
        archived
            .iter()
            .filter(|packet| !already.contains(packet))
            .cloned()
            .map(|packet| ArchivedSubmission {
                packet,
                archive_id: journal.archive_id,
                finalized_at: journal.finalized_at,
            })
            .collect()
    };
    if !fresh.is_empty() {
        history.extend(fresh);
        store.save_history(&history)?;
    }

    if !archived.is_empty() {
        store.replace_submissions(&remaining)?;
    }

    let mut fixes = store.fix_requests();
    let before = fixes.len();
    fixes.retain(|_, fix| fix.hole != hole);
    if fixes.len() != before {
        store.save_fix_requests(&fixes)?;
    }

    let mut round = store.round().unwrap_or_default();
    if round.hole == hole {
        round.hole = hole + 1;
        round.revision += 1;
        store.save_round(&round)?;
    }

    store.clear_archive_journal()?;
    info!(
        hole,
        archived = archived.len(),
        next_hole = round.hole,
        "hole finalized and archived"
    );
    Ok(round)
}

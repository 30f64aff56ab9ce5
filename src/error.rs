use thiserror::Error;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
///
/// None of these is fatal: screens surface them and keep running.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The shared store rejected a read or write.
    #[error("storage failure")]
    Storage(#[from] StorageError),
    /// The caller asked for something that makes no sense for the round.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The round moved on since this screen last rendered it.
    #[error(
        "round changed since last render (expected hole {expected_hole} rev {expected_revision}, \
         found hole {actual_hole} rev {actual_revision})"
    )]
    StaleRound {
        /// Hole the screen rendered.
        expected_hole: u32,
        /// Revision the screen rendered.
        expected_revision: u64,
        /// Hole now in the store.
        actual_hole: u32,
        /// Revision now in the store.
        actual_revision: u64,
    },
}

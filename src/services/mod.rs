/// Hole archival with journal-based recovery.
pub mod archive_service;
/// Player screen bound to the shared store.
pub mod player_service;
/// Periodic scorekeeper re-derivation.
pub mod poller;
/// Round resolution and persistence.
pub mod round_service;
/// Scorekeeper aggregation and finalize gating.
pub mod scorekeeper_service;

/// Scorekeeper board derivation.
pub mod board;
/// Player entry session state machine.
pub mod entry;
/// Round configuration resolver.
pub mod round;
/// Cancellable delayed actions.
pub mod timers;

pub use self::board::{Board, PlayerStatus, derive_board};
pub use self::entry::{EntrySession, EntryTimings, Flag};
pub use self::round::{RoundOverrides, resolve_round};

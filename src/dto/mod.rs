//! View models handed to whatever renders the player and scorekeeper screens.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod board;
pub mod player;

/// Placeholder shown where no score exists yet. Never a zero.
pub const BLANK_SCORE: &str = "—";

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

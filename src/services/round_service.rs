use tracing::{info, warn};

use crate::{
    dao::{models::RoundConfig, round_store::RoundStore},
    state::round::{RoundOverrides, resolve_round},
};

/// Resolve the active round from the store and the page overrides, saving it back
/// when the overrides changed anything. A failed save is logged, not returned.
pub fn load_round(
    store: &RoundStore,
    defaults: &RoundConfig,
    overrides: &RoundOverrides,
) -> RoundConfig {
    let stored = store.round();
    let round = resolve_round(stored.clone(), defaults, overrides);

    if stored.as_ref() != Some(&round) {
        match store.save_round(&round) {
            Ok(()) => info!(
                hole = round.hole,
                par = round.par,
                revision = round.revision,
                "round configuration saved"
            ),
            Err(err) => warn!(error = %err, "failed to save round configuration"),
        }
    }
    round
}

//! Round configuration resolution: stored round, overridden by query parameters.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;
use validator::{Validate, ValidationError};

use crate::dao::models::{ROSTER_SIZE, RoundConfig};

/// Optional overrides read once from the page query string.
///
/// Invalid values are discarded one by one; the remaining ones still apply.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RoundOverrides {
    /// Hole number.
    #[validate(range(min = 1))]
    pub hole: Option<i64>,
    /// Par of the hole.
    #[validate(range(min = 1))]
    pub par: Option<i64>,
    /// Stake label.
    #[validate(custom(function = "validate_label"))]
    pub pot: Option<String>,
    /// Skins count.
    #[validate(range(min = 1))]
    pub skins: Option<i64>,
    /// Captain name.
    #[validate(custom(function = "validate_label"))]
    pub captain: Option<String>,
    /// First roster slot.
    #[validate(custom(function = "validate_label"))]
    pub p1: Option<String>,
    /// Second roster slot.
    #[validate(custom(function = "validate_label"))]
    pub p2: Option<String>,
    /// Third roster slot.
    #[validate(custom(function = "validate_label"))]
    pub p3: Option<String>,
    /// Fourth roster slot.
    #[validate(custom(function = "validate_label"))]
    pub p4: Option<String>,
}

/// Names and labels must contain something other than whitespace.
fn validate_label(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

impl RoundOverrides {
    /// Parse a query string such as `?hole=6&par=4&p1=Mike`.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut overrides = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            match &*key {
                "hole" => overrides.hole = parse_number(&key, &value),
                "par" => overrides.par = parse_number(&key, &value),
                "skins" => overrides.skins = parse_number(&key, &value),
                "pot" => overrides.pot = Some(value),
                "captain" => overrides.captain = Some(value),
                "p1" => overrides.p1 = Some(value),
                "p2" => overrides.p2 = Some(value),
                "p3" => overrides.p3 = Some(value),
                "p4" => overrides.p4 = Some(value),
                _ => {}
            }
        }

        overrides.discard_invalid();
        overrides
    }

    /// Drop every field that fails validation.
    fn discard_invalid(&mut self) {
        let Err(errors) = self.validate() else {
            return;
        };
        let rejected: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        for field in rejected {
            warn!(field = %field, "ignoring invalid round override");
            match field.as_str() {
                "hole" => self.hole = None,
                "par" => self.par = None,
                "pot" => self.pot = None,
                "skins" => self.skins = None,
                "captain" => self.captain = None,
                "p1" => self.p1 = None,
                "p2" => self.p2 = None,
                "p3" => self.p3 = None,
                "p4" => self.p4 = None,
                _ => {}
            }
        }
    }

    /// Player overrides indexed by roster slot.
    fn players(&self) -> [Option<&String>; ROSTER_SIZE] {
        [
            self.p1.as_ref(),
            self.p2.as_ref(),
            self.p3.as_ref(),
            self.p4.as_ref(),
        ]
    }
}

fn parse_number(key: &str, value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!(field = key, value, "ignoring non-numeric round override");
            None
        }
    }
}

fn to_positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|number| *number > 0)
}

/// Build the active round from the stored one (or `defaults`), then apply `overrides`.
///
/// A roster override that would duplicate a name is rejected as a whole so the
/// roster stays four unique names. Moving the round to another hole bumps the
/// revision so screens rendered against the old hole cannot finalize it.
pub fn resolve_round(
    stored: Option<RoundConfig>,
    defaults: &RoundConfig,
    overrides: &RoundOverrides,
) -> RoundConfig {
    let base = stored.unwrap_or_else(|| defaults.clone());
    let mut round = base.clone();

    if let Some(hole) = overrides.hole.and_then(to_positive) {
        round.hole = hole;
    }
    if let Some(par) = overrides.par.and_then(to_positive) {
        round.par = par;
    }
    if let Some(skins) = overrides.skins.and_then(to_positive) {
        round.skins = skins;
    }
    if let Some(pot) = &overrides.pot {
        round.pot = pot.clone();
    }
    if let Some(captain) = &overrides.captain {
        round.captain = captain.clone();
    }

    let mut players = round.players.clone();
    for (slot, name) in overrides.players().into_iter().enumerate() {
        if let Some(name) = name {
            players[slot] = name.clone();
        }
    }
    if roster_is_unique(&players) {
        round.players = players;
    } else {
        warn!(?players, "ignoring roster override with duplicate names");
    }

    if round.hole != base.hole {
        round.revision = base.revision + 1;
    }
    round
}

fn roster_is_unique(players: &[String; ROSTER_SIZE]) -> bool {
    let mut seen = HashSet::new();
    players.iter().all(|name| seen.insert(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> RoundConfig {
        RoundConfig {
            hole: 5,
            par: 3,
            pot: "$10".into(),
            skins: 2,
            captain: "Mike".into(),
            players: ["Mike", "Ben", "Dave", "Rob"].map(String::from),
            revision: 4,
        }
    }

    #[test]
    fn parses_and_trims_query_values() {
        let overrides = RoundOverrides::from_query("?hole=6&par=4&p2=+Benny+&pot=%2430");
        assert_eq!(overrides.hole, Some(6));
        assert_eq!(overrides.par, Some(4));
        assert_eq!(overrides.p2.as_deref(), Some("Benny"));
        assert_eq!(overrides.pot.as_deref(), Some("$30"));
    }

    #[test]
    fn invalid_values_are_dropped_individually() {
        let overrides = RoundOverrides::from_query("hole=0&par=abc&skins=3&p1=%20%20&captain=Rob");
        assert_eq!(overrides.hole, None);
        assert_eq!(overrides.par, None);
        assert_eq!(overrides.skins, Some(3));
        assert_eq!(overrides.p1, None);
        assert_eq!(overrides.captain.as_deref(), Some("Rob"));
    }

    #[test]
    fn empty_query_keeps_stored_round() {
        let overrides = RoundOverrides::from_query("");
        assert_eq!(overrides, RoundOverrides::default());
        let round = resolve_round(Some(stored()), &RoundConfig::default(), &overrides);
        assert_eq!(round, stored());
    }

    #[test]
    fn missing_store_uses_defaults() {
        let round = resolve_round(None, &RoundConfig::default(), &RoundOverrides::default());
        assert_eq!(round, RoundConfig::default());
    }

    #[test]
    fn hole_override_bumps_revision() {
        let overrides = RoundOverrides::from_query("hole=6&par=4");
        let round = resolve_round(Some(stored()), &RoundConfig::default(), &overrides);
        assert_eq!(round.hole, 6);
        assert_eq!(round.par, 4);
        assert_eq!(round.revision, 5);
    }

    #[test]
    fn duplicate_roster_override_is_rejected() {
        let overrides = RoundOverrides::from_query("p4=Mike");
        let round = resolve_round(Some(stored()), &RoundConfig::default(), &overrides);
        assert_eq!(round.players, stored().players);
    }

    #[test]
    fn player_overrides_keep_slot_order() {
        let overrides = RoundOverrides::from_query("p3=Dan");
        let round = resolve_round(Some(stored()), &RoundConfig::default(), &overrides);
        assert_eq!(round.players, ["Mike", "Ben", "Dan", "Rob"].map(String::from));
    }
}

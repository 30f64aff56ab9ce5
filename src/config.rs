//! Application-level configuration loading: store location, poll period and the default round.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::{ROSTER_SIZE, RoundConfig};

/// Default location on disk where the binary looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/skins.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SKINS_SCOREKEEPER_CONFIG_PATH";
const DEFAULT_STORE_DIR: &str = ".skins-store";
/// Scorekeeper re-derivation period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Directory of the file store.
    pub store_dir: PathBuf,
    /// Scorekeeper refresh period; never zero.
    pub poll_interval: Duration,
    /// Round used when the store holds none yet.
    pub default_round: RoundConfig,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                Self::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_round: RoundConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    store_dir: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
    default_round: Option<RawRound>,
}

#[derive(Debug, Deserialize)]
/// Default round entry inside the configuration file.
struct RawRound {
    hole: u32,
    par: u32,
    pot: String,
    skins: u32,
    captain: Option<String>,
    players: [String; ROSTER_SIZE],
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            store_dir: value
                .store_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            poll_interval: positive_millis(
                "poll_interval_ms",
                value.poll_interval_ms,
                DEFAULT_POLL_INTERVAL,
            ),
            default_round: value
                .default_round
                .map(Into::into)
                .unwrap_or_default(),
        }
    }
}

impl From<RawRound> for RoundConfig {
    fn from(value: RawRound) -> Self {
        let captain = value
            .captain
            .unwrap_or_else(|| value.players[0].clone());
        Self {
            hole: value.hole.max(1),
            par: value.par.max(1),
            pot: value.pot,
            skins: value.skins.max(1),
            captain,
            players: value.players,
            revision: 0,
        }
    }
}

/// Millisecond setting that must stay positive; zero falls back to `fallback`.
fn positive_millis(field: &str, value: Option<u64>, fallback: Duration) -> Duration {
    match value {
        Some(0) => {
            warn!(
                field,
                fallback_ms = fallback.as_millis() as u64,
                "zero duration is not allowed; using default"
            );
            fallback
        }
        Some(ms) => Duration::from_millis(ms),
        None => fallback,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn overrides_poll_interval_and_round() {
        let config = AppConfig::from_json(
            r#"{
                "store_dir": "/tmp/skins",
                "poll_interval_ms": 500,
                "default_round": {
                    "hole": 1, "par": 5, "pot": "$40", "skins": 2,
                    "players": ["Mike", "Ben", "Dave", "Rob"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.store_dir, PathBuf::from("/tmp/skins"));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.default_round.par, 5);
        assert_eq!(config.default_round.captain, "Mike");
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let config = AppConfig::from_json(r#"{"poll_interval_ms": 0}"#).unwrap();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn short_roster_is_rejected() {
        let result = AppConfig::from_json(
            r#"{"default_round": {"hole": 1, "par": 4, "pot": "$5", "skins": 1,
                "players": ["Mike", "Ben"]}}"#,
        );
        assert!(result.is_err());
    }
}

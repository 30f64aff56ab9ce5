//! skins-scorekeeper binary: watches the shared store and logs the scorekeeper board.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skins_scorekeeper::{
    config::AppConfig,
    dao::{
        kv_store::{KeyValueStore, MemoryStore},
        round_store::RoundStore,
    },
    dto::board::BoardView,
    services::{poller, round_service, scorekeeper_service::ScorekeeperScreen},
    state::RoundOverrides,
};

/// Environment variable read when no query string is passed on the command line.
const QUERY_ENV: &str = "SKINS_QUERY";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = RoundStore::new(open_store(&config));

    let query = env::args()
        .nth(1)
        .or_else(|| env::var(QUERY_ENV).ok())
        .unwrap_or_default();
    let overrides = RoundOverrides::from_query(&query);
    let round = round_service::load_round(&store, &config.default_round, &overrides);
    info!(
        hole = round.hole,
        par = round.par,
        pot = %round.pot,
        skins = round.skins,
        captain = %round.captain,
        players = ?round.players,
        "scorekeeper ready"
    );

    let screen = Arc::new(Mutex::new(ScorekeeperScreen::open(store, round)));
    let (handle, mut board) = poller::spawn(screen, config.poll_interval).await;
    log_board(&board.borrow());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = board.changed() => {
                if changed.is_err() {
                    break;
                }
                log_board(&board.borrow_and_update());
            }
        }
    }

    drop(board);
    handle.await.context("joining poller task")?;
    info!("scorekeeper stopped");
    Ok(())
}

/// Open the durable store, or run on a process-local one when it is unavailable.
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    #[cfg(feature = "file-store")]
    {
        use skins_scorekeeper::dao::kv_store::FileStore;

        match FileStore::open(&config.store_dir) {
            Ok(store) => {
                info!(path = %store.root().display(), "using file store");
                return Arc::new(store);
            }
            Err(err) => {
                warn!(error = %err, "file store unavailable; scores will not survive a restart");
            }
        }
    }
    #[cfg(not(feature = "file-store"))]
    {
        let _ = config;
        warn!("built without file-store; scores will not survive a restart");
    }
    Arc::new(MemoryStore::new())
}

fn log_board(view: &BoardView) {
    match serde_json::to_string(view) {
        Ok(json) => info!(
            hole = view.hole,
            green = view.green,
            amber = view.amber,
            red = view.red,
            can_finalize = view.can_finalize,
            board = %json,
            "{}",
            view.finalize_hint
        ),
        Err(err) => warn!(error = %err, "failed to encode board"),
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

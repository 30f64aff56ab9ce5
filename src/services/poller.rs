use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_POLL_INTERVAL, dto::board::BoardView,
    services::scorekeeper_service::ScorekeeperScreen,
};

/// Scorekeeper screen shared between the poll loop and user actions.
pub type SharedScorekeeper = Arc<Mutex<ScorekeeperScreen>>;

/// Re-derive the board every `period` and publish it when it changes.
///
/// Other sessions never notify us; the staleness window is one period. The
/// loop stops once every receiver has been dropped. A zero `period` runs at
/// [`DEFAULT_POLL_INTERVAL`].
pub async fn spawn(
    screen: SharedScorekeeper,
    period: Duration,
) -> (JoinHandle<()>, watch::Receiver<BoardView>) {
    let period = if period.is_zero() {
        warn!("zero poll interval; using default");
        DEFAULT_POLL_INTERVAL
    } else {
        period
    };
    let initial = screen.lock().await.render();
    let (tx, rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {
                    let view = screen.lock().await.render();
                    tx.send_if_modified(|current| {
                        if *current == view {
                            return false;
                        }
                        debug!(hole = view.hole, green = view.green, amber = view.amber, "board changed");
                        *current = view;
                        true
                    });
                }
            }
        }
        debug!("scorekeeper poller stopped");
    });

    (handle, rx)
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::dao::{
        kv_store::MemoryStore,
        models::{RoundConfig, SubmissionPacket},
        round_store::RoundStore,
    };

    #[tokio::test]
    async fn publishes_submissions_from_other_sessions() {
        let store = RoundStore::new(Arc::new(MemoryStore::new()));
        let round = RoundConfig {
            hole: 2,
            players: ["Mike", "Ben", "Dave", "Rob"].map(String::from),
            ..RoundConfig::default()
        };
        let screen = Arc::new(Mutex::new(ScorekeeperScreen::open(store.clone(), round)));
        let (handle, mut rx) = spawn(screen, Duration::from_millis(10)).await;
        assert_eq!(rx.borrow().red, 4);

        store
            .append_submission(SubmissionPacket {
                player_name: "Rob".into(),
                hole: 2,
                par: 4,
                score: 4,
                fairway_hit: false,
                sand_shot: false,
                green_in_regulation: false,
                putts: 2,
                penalty_strokes: 0,
                submitted_at: OffsetDateTime::now_utc(),
            })
            .unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("poller should publish within the timeout")
            .unwrap();
        assert_eq!(rx.borrow().green, 1);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("poller should stop once unobserved")
            .unwrap();
    }

    #[tokio::test]
    async fn zero_period_does_not_kill_the_loop() {
        let store = RoundStore::new(Arc::new(MemoryStore::new()));
        let screen = Arc::new(Mutex::new(ScorekeeperScreen::open(
            store,
            RoundConfig::default(),
        )));
        let (handle, rx) = spawn(screen, Duration::ZERO).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("poller should stop once unobserved")
            .unwrap();
    }
}

//! Background task keeping the dashboard view in sync with the device.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use crate::{
    device::{DeviceApi, NetworkResult},
    services::sse_events,
    state::{
        SharedState,
        bank::{CoinSnapshot, GameHistoryEntry},
        connectivity::{ConnectionStatus, Connectivity},
    },
};

/// What started a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// Regular cadence tick.
    Timer,
    /// User-requested connection check; connectivity shows `checking` meanwhile.
    Manual,
}

/// Result of a single [`poll_once`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion; the next tick should come after `next_interval`.
    Completed {
        /// Whether both device reads succeeded.
        connected: bool,
        /// Cadence chosen by the tracker after this cycle.
        next_interval: Duration,
    },
    /// Another cycle was still in flight.
    Skipped,
    /// Teardown started before the result could be applied.
    Abandoned,
}

/// Owns the spawned poll loop.
pub struct PollerHandle {
    state: SharedState,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop polling and wait for the loop to exit. An in-flight result is discarded.
    pub async fn shutdown(self) {
        self.state.begin_teardown();
        if let Err(err) = self.task.await {
            warn!(error = %err, "device poller task ended abnormally");
        }
    }
}

/// Spawn the poll loop on the current runtime.
pub fn spawn(state: SharedState) -> PollerHandle {
    let task = tokio::spawn(run(state.clone()));
    PollerHandle { state, task }
}

/// Poll the device until teardown, switching between the normal and backoff cadence.
///
/// The first cycle starts immediately.
pub async fn run(state: SharedState) {
    let teardown = state.teardown_signal();
    tokio::pin!(teardown);

    let mut watcher = state.connectivity_watcher();
    let mut cadence = state.connectivity().poll_interval;
    let mut ticker = new_ticker(Instant::now(), cadence);
    info!(interval_ms = millis(cadence), "device poller started");

    loop {
        tokio::select! {
            _ = &mut teardown => break,
            // A manual check may have moved the cadence between ticks.
            changed = watcher.changed() => {
                if changed.is_err() {
                    break;
                }
                let interval = watcher.borrow_and_update().poll_interval;
                reschedule(&mut ticker, &mut cadence, interval);
                continue;
            }
            _ = ticker.tick() => {}
        }

        let next_interval = match poll_once(&state, CycleTrigger::Timer).await {
            CycleOutcome::Completed { next_interval, .. } => next_interval,
            CycleOutcome::Skipped => continue,
            CycleOutcome::Abandoned => break,
        };
        reschedule(&mut ticker, &mut cadence, next_interval);
    }

    state.poll_gate().lock().await.stop();
    info!("device poller stopped");
}

/// Run one poll cycle: fetch coins then history, fold them into the view and
/// update connectivity.
///
/// Cycles never overlap; a call made while another is in flight returns
/// [`CycleOutcome::Skipped`] without touching the device.
pub async fn poll_once(state: &SharedState, trigger: CycleTrigger) -> CycleOutcome {
    let Ok(mut tracker) = state.poll_gate().try_lock() else {
        debug!(?trigger, "poll cycle already in flight; skipping");
        return CycleOutcome::Skipped;
    };
    if state.is_torn_down() {
        return CycleOutcome::Abandoned;
    }

    match trigger {
        CycleTrigger::Timer => tracker.begin_cycle(),
        CycleTrigger::Manual => {
            tracker.begin_check();
            publish(state, tracker.connectivity());
        }
    }

    let device = state.device();
    let fetched = tokio::select! {
        _ = state.teardown_signal() => None,
        result = fetch_device_state(device.as_ref()) => Some(result),
    };
    let Some(result) = fetched.filter(|_| !state.is_torn_down()) else {
        debug!("teardown in progress; discarding poll result");
        return CycleOutcome::Abandoned;
    };

    match result {
        Ok((coins, history)) => {
            if tracker.connectivity().status != ConnectionStatus::Connected {
                info!("device reachable");
            }
            tracker.record_success(state.now());
            let changes = state.apply_device_snapshot(coins, history).await;
            debug!(
                coins = changes.coins,
                history = changes.history,
                math = changes.math,
                "poll cycle applied"
            );
            sse_events::broadcast_view_changes(state, changes).await;
        }
        Err(err) => {
            let entered_backoff = tracker.record_failure();
            let failures = tracker.connectivity().consecutive_failures;
            warn!(error = %err, failures, "device poll failed");
            if entered_backoff {
                warn!(
                    failures,
                    interval_ms = millis(tracker.current_interval()),
                    "device unreachable; slowing poll cadence"
                );
            }
        }
    }

    publish(state, tracker.connectivity());
    CycleOutcome::Completed {
        connected: tracker.connectivity().status == ConnectionStatus::Connected,
        next_interval: tracker.current_interval(),
    }
}

async fn fetch_device_state(
    device: &dyn DeviceApi,
) -> NetworkResult<(CoinSnapshot, Vec<GameHistoryEntry>)> {
    let coins = device.fetch_coin_snapshot().await?;
    let history = device.fetch_game_history().await?;
    Ok((coins, history))
}

fn publish(state: &SharedState, connectivity: &Connectivity) {
    if state.publish_connectivity(connectivity) {
        sse_events::broadcast_connectivity(state, connectivity);
    }
}

/// Restart `ticker` one period from now when the cadence changed.
fn reschedule(ticker: &mut Interval, cadence: &mut Duration, next: Duration) {
    if next == *cadence {
        return;
    }
    info!(
        from_ms = millis(*cadence),
        to_ms = millis(next),
        "changing device poll cadence"
    );
    *cadence = next;
    *ticker = new_ticker(Instant::now() + next, next);
}

fn new_ticker(start: Instant, period: Duration) -> Interval {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::sleep;

    use super::*;
    use crate::{
        config::AppConfig,
        device::testing::FakeDevice,
        state::{
            AppState,
            bank::GameResult,
            connectivity::{DEFAULT_BACKOFF_INTERVAL, DEFAULT_POLL_INTERVAL, PollPolicy},
            dashboard::DashboardView,
        },
    };
    use time::OffsetDateTime;

    fn state_with(device: &Arc<FakeDevice>) -> SharedState {
        AppState::new(Arc::new(device.clone()), AppConfig::default())
    }

    fn math_entry(id: &str, correct: u32, incorrect: u32) -> GameHistoryEntry {
        GameHistoryEntry {
            id: id.to_string(),
            game: "Math Game".to_string(),
            result: GameResult::Win,
            amount: 10,
            date: "01/02/2025".to_string(),
            timestamp: None,
            correct: Some(correct),
            incorrect: Some(incorrect),
            total: Some(correct + incorrect),
        }
    }

    #[tokio::test]
    async fn successful_cycle_populates_view_and_connects() {
        let device = FakeDevice::new();
        device.set_coins([(20, 3), (100, 1)].into_iter().collect());
        device.set_history(vec![math_entry("a", 8, 2)]);
        let state = state_with(&device);

        let outcome = poll_once(&state, CycleTrigger::Timer).await;

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                connected: true,
                next_interval: DEFAULT_POLL_INTERVAL
            }
        );
        let connectivity = state.connectivity();
        assert_eq!(connectivity.status, ConnectionStatus::Connected);
        assert!(connectivity.last_updated.is_some());
        let (balance, sessions) = state
            .read_dashboard(|view| (view.balance(), view.math_sessions().len()))
            .await;
        assert_eq!(balance, 160);
        assert_eq!(sessions, 1);
    }

    #[tokio::test]
    async fn switches_to_backoff_after_threshold_and_recovers() {
        let device = FakeDevice::new();
        device.set_failing(true);
        let state = state_with(&device);

        for _ in 0..4 {
            let outcome = poll_once(&state, CycleTrigger::Timer).await;
            assert!(matches!(
                outcome,
                CycleOutcome::Completed { connected: false, next_interval } if next_interval == DEFAULT_POLL_INTERVAL
            ));
        }
        assert_eq!(state.connectivity().consecutive_failures, 4);

        let outcome = poll_once(&state, CycleTrigger::Timer).await;
        assert!(matches!(
            outcome,
            CycleOutcome::Completed { next_interval, .. } if next_interval == DEFAULT_BACKOFF_INTERVAL
        ));
        assert_eq!(state.connectivity().status, ConnectionStatus::Disconnected);
        assert_eq!(state.connectivity().poll_interval, DEFAULT_BACKOFF_INTERVAL);

        device.set_failing(false);
        let outcome = poll_once(&state, CycleTrigger::Timer).await;
        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                connected: true,
                next_interval: DEFAULT_POLL_INTERVAL
            }
        );
        assert_eq!(state.connectivity().consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn identical_polls_keep_revisions_but_refresh_timestamp() {
        let device = FakeDevice::new();
        device.set_coins([(50, 2)].into_iter().collect());
        device.set_history(vec![math_entry("a", 5, 5)]);
        let started = tokio::time::Instant::now();
        let state = AppState::with_clock(
            Arc::new(device.clone()),
            AppConfig::default(),
            Arc::new(move || OffsetDateTime::UNIX_EPOCH + started.elapsed()),
        );
        let revisions = |view: &DashboardView| {
            (
                view.coins_revision(),
                view.history_revision(),
                view.math_revision(),
            )
        };

        poll_once(&state, CycleTrigger::Timer).await;
        let first_seen = state.connectivity().last_updated;
        let before = state.read_dashboard(revisions).await;

        sleep(Duration::from_secs(2)).await;
        poll_once(&state, CycleTrigger::Timer).await;

        assert_eq!(state.read_dashboard(revisions).await, before);
        assert_eq!(
            state.connectivity().last_updated,
            first_seen.map(|seen| seen + Duration::from_secs(2))
        );
    }

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let device = FakeDevice::new();
        let release = device.hold_fetches();
        let state = state_with(&device);

        let in_flight = tokio::spawn({
            let state = state.clone();
            async move { poll_once(&state, CycleTrigger::Timer).await }
        });
        while device.fetches() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            poll_once(&state, CycleTrigger::Manual).await,
            CycleOutcome::Skipped
        );
        assert_eq!(device.fetches(), 1);

        release.notify_one();
        let outcome = in_flight.await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Completed {
                connected: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn teardown_discards_in_flight_result() {
        let device = FakeDevice::new();
        device.set_coins([(200, 5)].into_iter().collect());
        let _release = device.hold_fetches();
        let state = state_with(&device);

        let in_flight = tokio::spawn({
            let state = state.clone();
            async move { poll_once(&state, CycleTrigger::Timer).await }
        });
        while device.fetches() == 0 {
            tokio::task::yield_now().await;
        }

        state.begin_teardown();

        assert_eq!(in_flight.await.unwrap(), CycleOutcome::Abandoned);
        assert_eq!(state.read_dashboard(|view| view.balance()).await, 0);
        assert_eq!(state.connectivity().status, ConnectionStatus::Checking);
        assert_eq!(
            poll_once(&state, CycleTrigger::Timer).await,
            CycleOutcome::Abandoned
        );
    }

    #[tokio::test]
    async fn manual_check_publishes_checking_before_result() {
        let device = FakeDevice::new();
        let state = state_with(&device);
        let mut watcher = state.connectivity_watcher();

        device.set_failing(true);
        poll_once(&state, CycleTrigger::Timer).await;
        assert_eq!(state.connectivity().status, ConnectionStatus::Disconnected);
        let _ = watcher.borrow_and_update();

        device.set_failing(false);
        let release = device.hold_fetches();
        let check = tokio::spawn({
            let state = state.clone();
            async move { poll_once(&state, CycleTrigger::Manual).await }
        });

        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow_and_update().status, ConnectionStatus::Checking);

        release.notify_one();
        check.await.unwrap();
        assert_eq!(state.connectivity().status, ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_slows_down_while_unreachable() {
        let device = FakeDevice::new();
        device.set_failing(true);
        let state = state_with(&device);

        let poller = spawn(state.clone());

        // Ticks at 0s, 2s, 4s, 6s and 8s; the fifth failure switches to backoff.
        sleep(Duration::from_millis(8_500)).await;
        assert_eq!(device.fetches(), 5);
        assert_eq!(state.connectivity().poll_interval, DEFAULT_BACKOFF_INTERVAL);

        sleep(Duration::from_millis(9_000)).await;
        assert_eq!(device.fetches(), 5);

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(device.fetches(), 6);

        poller.shutdown().await;
        assert!(state.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_success_restores_baseline_cadence_immediately() {
        let device = FakeDevice::new();
        device.set_failing(true);
        let state = state_with(&device);
        let poller = spawn(state.clone());

        // Fifth failure at 8s; the next timer tick would be at 18s.
        sleep(Duration::from_millis(8_500)).await;
        assert_eq!(device.fetches(), 5);

        device.set_failing(false);
        let outcome = poll_once(&state, CycleTrigger::Manual).await;
        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                connected: true,
                next_interval: DEFAULT_POLL_INTERVAL
            }
        );
        assert_eq!(device.fetches(), 6);

        // Timer resumes 2s after the manual check, at 10.5s.
        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(device.fetches(), 7);
        assert_eq!(state.connectivity().poll_interval, DEFAULT_POLL_INTERVAL);

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_policy_still_polls_at_default_cadence() {
        let device = FakeDevice::new();
        let config = AppConfig {
            polling: PollPolicy {
                interval: Duration::ZERO,
                backoff_interval: Duration::ZERO,
                failure_threshold: 0,
            },
            ..AppConfig::default()
        };
        let state = AppState::new(Arc::new(device.clone()), config);
        let poller = spawn(state.clone());

        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(device.fetches(), 2);
        assert_eq!(state.connectivity().status, ConnectionStatus::Connected);

        poller.shutdown().await;
    }
}

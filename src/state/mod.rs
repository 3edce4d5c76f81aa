/// Device data models.
pub mod bank;
/// Poll tracking and connectivity.
pub mod connectivity;
/// Dashboard view and its projections.
pub mod dashboard;
mod sse;

use std::{future::Future, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig,
    device::DeviceApi,
    state::{
        bank::{CoinSnapshot, GameHistoryEntry},
        connectivity::{Connectivity, PollTracker},
        dashboard::{DashboardView, ViewChanges},
    },
};

pub use self::sse::SseHub;

/// Shared handle to [`AppState`].
pub type SharedState = Arc<AppState>;

/// Source of wall-clock time used to stamp successful polls.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Capacity of the broadcast channel feeding SSE subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Central application state: the device handle, the dashboard view and its connectivity.
///
/// The poll scheduler is the only writer of the view and of connectivity; HTTP handlers
/// read projections of both.
pub struct AppState {
    device: Arc<dyn DeviceApi>,
    config: AppConfig,
    dashboard: RwLock<DashboardView>,
    connectivity: watch::Sender<Connectivity>,
    poll_gate: Mutex<PollTracker>,
    events: SseHub,
    teardown: watch::Sender<bool>,
    clock: Clock,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Connectivity starts as `Checking` until the first poll cycle completes.
    pub fn new(device: Arc<dyn DeviceApi>, config: AppConfig) -> SharedState {
        Self::with_clock(device, config, Arc::new(OffsetDateTime::now_utc))
    }

    /// Like [`AppState::new`], reading the current time from `clock`.
    pub fn with_clock(
        device: Arc<dyn DeviceApi>,
        config: AppConfig,
        clock: Clock,
    ) -> SharedState {
        let tracker = PollTracker::new(config.polling);
        let (connectivity_tx, _rx) = watch::channel(tracker.connectivity().clone());
        let (teardown_tx, _rx) = watch::channel(false);

        Arc::new(Self {
            device,
            config,
            dashboard: RwLock::new(DashboardView::default()),
            connectivity: connectivity_tx,
            poll_gate: Mutex::new(tracker),
            events: SseHub::new(EVENT_CHANNEL_CAPACITY),
            teardown: teardown_tx,
            clock,
        })
    }

    /// Handle to the device API.
    pub fn device(&self) -> Arc<dyn DeviceApi> {
        self.device.clone()
    }

    /// Current time according to the configured clock.
    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Gate guarding the poll tracker; holding it means owning the only in-flight cycle.
    pub fn poll_gate(&self) -> &Mutex<PollTracker> {
        &self.poll_gate
    }

    /// Latest published connectivity snapshot.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity.borrow().clone()
    }

    /// Subscribe to connectivity updates.
    pub fn connectivity_watcher(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    /// Publish a connectivity snapshot, returning whether it differed from the last one.
    pub fn publish_connectivity(&self, connectivity: &Connectivity) -> bool {
        self.connectivity.send_if_modified(|current| {
            if current == connectivity {
                return false;
            }
            *current = connectivity.clone();
            true
        })
    }

    /// Merge a polled device snapshot into the dashboard view.
    pub async fn apply_device_snapshot(
        &self,
        coins: CoinSnapshot,
        history: Vec<GameHistoryEntry>,
    ) -> ViewChanges {
        let mut view = self.dashboard.write().await;
        view.apply(coins, history, self.config.trend_policy)
    }

    /// Run `f` against the dashboard view under a read lock.
    pub async fn read_dashboard<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DashboardView) -> R,
    {
        let view = self.dashboard.read().await;
        f(&view)
    }

    /// Broadcast hub feeding the SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Signal the poll scheduler to stop; in-flight results are discarded from now on.
    pub fn begin_teardown(&self) {
        self.teardown.send_replace(true);
    }

    /// Whether teardown has begun.
    pub fn is_torn_down(&self) -> bool {
        *self.teardown.borrow()
    }

    /// Future resolving once [`AppState::begin_teardown`] has been called.
    pub fn teardown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.teardown.subscribe();
        async move {
            loop {
                let torn_down = *receiver.borrow_and_update();
                if torn_down {
                    return;
                }
                if receiver.changed().await.is_err() {
                    // Sender dropped with the state; nothing can tear us down anymore.
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

//! In-memory [`DeviceApi`] used by unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::{
    device::{DeviceApi, NetworkError, NetworkResult},
    state::bank::{CoinSnapshot, GameHistoryEntry},
};

#[derive(Default)]
pub struct FakeDevice {
    coins: Mutex<CoinSnapshot>,
    history: Mutex<Vec<GameHistoryEntry>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
    commands: Mutex<Vec<String>>,
    /// When set, coin fetches wait for a notification before answering.
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_coins(&self, coins: CoinSnapshot) {
        *self.coins.lock().unwrap() = coins;
    }

    pub fn set_history(&self, history: Vec<GameHistoryEntry>) {
        *self.history.lock().unwrap() = history;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of coin snapshot requests received so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Make the next coin fetches block until the returned handle is notified.
    pub fn hold_fetches(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    fn outcome<T>(&self, path: &str, value: T) -> NetworkResult<T> {
        if self.failing.load(Ordering::SeqCst) {
            Err(NetworkError::Status {
                path: path.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            })
        } else {
            Ok(value)
        }
    }

    fn command(&self, description: String) -> BoxFuture<'static, NetworkResult<()>> {
        let result = self.outcome(&description, ());
        if result.is_ok() {
            self.commands.lock().unwrap().push(description);
        }
        Box::pin(async move { result })
    }
}

impl DeviceApi for Arc<FakeDevice> {
    fn fetch_coin_snapshot(&self) -> BoxFuture<'static, NetworkResult<CoinSnapshot>> {
        let device = self.clone();
        Box::pin(async move {
            device.fetches.fetch_add(1, Ordering::SeqCst);
            let hold = device.hold.lock().unwrap().clone();
            if let Some(hold) = hold {
                hold.notified().await;
            }
            let coins = device.coins.lock().unwrap().clone();
            device.outcome("api/bankvalues", coins)
        })
    }

    fn fetch_game_history(&self) -> BoxFuture<'static, NetworkResult<Vec<GameHistoryEntry>>> {
        let history = self.history.lock().unwrap().clone();
        let result = self.outcome("api/gamehistory", history);
        Box::pin(async move { result })
    }

    fn dispense_exact(&self, amount: u32) -> BoxFuture<'static, NetworkResult<()>> {
        self.command(format!("exact:{amount}"))
    }

    fn dispense_denomination(
        &self,
        denomination: u32,
        count: u32,
    ) -> BoxFuture<'static, NetworkResult<()>> {
        self.command(format!("denomination:{denomination}x{count}"))
    }

    fn empty_bank(&self) -> BoxFuture<'static, NetworkResult<()>> {
        self.command("empty".to_string())
    }

    fn update_lock_status(&self, locked: bool) -> BoxFuture<'static, NetworkResult<()>> {
        self.command(format!("lock:{locked}"))
    }
}

/// HTTP implementation of [`DeviceApi`].
pub mod client;
/// Failure type shared by every device request.
pub mod error;
/// Wire payloads exchanged with the device firmware.
pub mod models;
#[cfg(test)]
pub(crate) mod testing;

use futures::future::BoxFuture;

use crate::state::bank::{CoinSnapshot, GameHistoryEntry};

pub use self::client::HttpDeviceClient;
pub use self::error::{NetworkError, NetworkResult};

/// Abstraction over the Piggy Bank Plus REST API.
pub trait DeviceApi: Send + Sync {
    /// `GET /api/bankvalues`.
    fn fetch_coin_snapshot(&self) -> BoxFuture<'static, NetworkResult<CoinSnapshot>>;
    /// `GET /api/gamehistory`, normalized.
    fn fetch_game_history(&self) -> BoxFuture<'static, NetworkResult<Vec<GameHistoryEntry>>>;
    /// `POST /api/exactdispense` with an amount in pence.
    fn dispense_exact(&self, amount: u32) -> BoxFuture<'static, NetworkResult<()>>;
    /// `POST /api/denominationdispense`.
    fn dispense_denomination(
        &self,
        denomination: u32,
        count: u32,
    ) -> BoxFuture<'static, NetworkResult<()>>;
    /// `DELETE /api/emptybank`.
    fn empty_bank(&self) -> BoxFuture<'static, NetworkResult<()>>;
    /// `POST /api/lock`.
    fn update_lock_status(&self, locked: bool) -> BoxFuture<'static, NetworkResult<()>>;
}

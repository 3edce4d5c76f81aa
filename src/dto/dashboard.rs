//! Read-only projections of the dashboard view served to front-ends.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_timestamp,
    services::aggregation::{BalanceSummary, CoinBreakdownLine, MathSummary},
    state::{
        bank::{GameHistoryEntry, GameResult},
        connectivity::{ConnectionStatus, Connectivity},
    },
};

/// Connectivity between this service and the device.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectivityResponse {
    /// Current link state.
    pub status: ConnectionStatus,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
    /// RFC 3339 time of the last successful poll.
    pub last_updated: Option<String>,
    /// Cadence the scheduler currently polls at, in milliseconds.
    pub poll_interval_ms: u64,
}

impl From<&Connectivity> for ConnectivityResponse {
    fn from(value: &Connectivity) -> Self {
        Self {
            status: value.status,
            consecutive_failures: value.consecutive_failures,
            last_updated: value.last_updated.map(format_timestamp),
            poll_interval_ms: u64::try_from(value.poll_interval.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// A game history entry as shown in the history card.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntrySummary {
    /// Device id, or a stable generated one when the device omits it.
    pub id: String,
    /// Category label.
    pub game: String,
    /// Win or loss.
    pub result: GameResult,
    /// Amount in pence.
    pub amount: i64,
    /// Display date (`dd/mm/yyyy`).
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Raw firmware timestamp, when present.
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Correct answers, for math games.
    pub correct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Incorrect answers, for math games.
    pub incorrect: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Total answers as reported by the device.
    pub total: Option<u32>,
}

impl From<&GameHistoryEntry> for HistoryEntrySummary {
    fn from(entry: &GameHistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            game: entry.game.clone(),
            result: entry.result,
            amount: entry.amount,
            date: entry.date.clone(),
            timestamp: entry.timestamp.clone(),
            correct: entry.correct,
            incorrect: entry.incorrect,
            total: entry.total,
        }
    }
}

/// Coin counts per denomination.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoinsResponse {
    /// Denominations holding coins, smallest first.
    pub coins: Vec<CoinBreakdownLine>,
    /// Number of denominations currently holding coins.
    pub coin_types: usize,
}

/// Game history, oldest first as reported by the device.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Entries in device order.
    pub entries: Vec<HistoryEntrySummary>,
}

/// Everything the dashboard renders, in one payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Balance and goal progress.
    pub balance: BalanceSummary,
    /// Coin breakdown, smallest denomination first.
    pub coins: Vec<CoinBreakdownLine>,
    /// Normalized game history.
    pub history: Vec<HistoryEntrySummary>,
    /// Math game statistics.
    pub math: MathSummary,
    /// Device connectivity.
    pub connectivity: ConnectivityResponse,
}

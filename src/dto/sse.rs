use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::dashboard::HistoryEntrySummary,
    services::aggregation::{BalanceSummary, CoinBreakdownLine, MathSummary},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; `None` sends a default `message` event.
    pub event: Option<String>,
    /// SSE `data:` field.
    pub data: String,
}

impl ServerEvent {
    /// Build an event whose data field is plain text.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the coin counts in the bank changed.
pub struct BankUpdatedEvent {
    /// Balance after the change.
    pub balance: BalanceSummary,
    /// Coin breakdown after the change.
    pub coins: Vec<CoinBreakdownLine>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the device reported a different game history.
pub struct HistoryUpdatedEvent {
    /// Full history as now reported.
    pub entries: Vec<HistoryEntrySummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast when the math game statistics changed.
pub struct MathUpdatedEvent(pub MathSummary);

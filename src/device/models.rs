use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, macros::format_description};
use uuid::Uuid;

use crate::state::bank::{GameHistoryEntry, GameResult};

/// Label used when the firmware omits the game name.
const DEFAULT_GAME_LABEL: &str = "Math Game";

/// Body of `GET /api/gamehistory`.
///
/// Older firmware answers with a bare array, newer firmware wraps it as `{"games": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    /// Plain JSON array of entries.
    Bare(Vec<Value>),
    /// Array wrapped in a `games` object.
    Wrapped { games: Vec<Value> },
    /// Anything else; treated as an empty history.
    Unrecognized(Value),
}

impl HistoryPayload {
    /// Normalize every entry, filling defaults for missing fields.
    ///
    /// `today` is used as the display date of entries carrying neither `date` nor
    /// `timestamp`. Unrecognized payloads yield an empty history.
    pub fn normalize(self, today: &str) -> Vec<GameHistoryEntry> {
        let items = match self {
            HistoryPayload::Bare(items) | HistoryPayload::Wrapped { games: items } => items,
            HistoryPayload::Unrecognized(_) => Vec::new(),
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| normalize_entry(index, item, today))
            .collect()
    }
}

/// Body of `POST /api/exactdispense`.
#[derive(Debug, Serialize)]
pub struct ExactDispenseBody {
    /// Amount in pence.
    pub amount: u32,
}

/// Body of `POST /api/denominationdispense`.
#[derive(Debug, Serialize)]
pub struct DenominationDispenseBody {
    /// Denomination in pence.
    pub denomination: u32,
    /// Number of coins to dispense.
    pub count: u32,
}

/// Body of `POST /api/lock`.
#[derive(Debug, Serialize)]
pub struct LockBody {
    /// `true` locks the coin slot.
    pub locked: bool,
}

/// Today's local date as `dd/mm/yyyy`, falling back to UTC when the offset is unknown.
pub fn local_date_string() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| "unknown-date".into())
}

/// Stable id for an entry the firmware sent without one: the same entry at the
/// same position keeps its id across polls.
fn derived_id(index: usize, item: &Value) -> String {
    let name = format!("{index}:{item}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
        .simple()
        .to_string()
}

fn normalize_entry(index: usize, item: &Value, today: &str) -> GameHistoryEntry {
    let timestamp = text_field(item, "timestamp");

    GameHistoryEntry {
        id: text_field(item, "id").unwrap_or_else(|| derived_id(index, item)),
        game: text_field(item, "game").unwrap_or_else(|| DEFAULT_GAME_LABEL.to_string()),
        result: match item.get("result").and_then(Value::as_str) {
            Some("loss") => GameResult::Loss,
            _ => GameResult::Win,
        },
        amount: item.get("amount").and_then(integer).unwrap_or(0),
        date: text_field(item, "date")
            .or_else(|| timestamp.clone())
            .unwrap_or_else(|| today.to_string()),
        timestamp,
        correct: count_field(item, "correct"),
        incorrect: count_field(item, "incorrect"),
        total: count_field(item, "total"),
    }
}

/// Non-empty string field; numbers are accepted and rendered as text.
fn text_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|float| float.round() as i64))
}

/// Non-negative whole number that fits the answer counters.
fn count_field(item: &Value, key: &str) -> Option<u32> {
    let value = item.get(key)?;
    let whole = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|float| *float >= 0.0 && float.fract() == 0.0)
            .map(|float| float as u64)
    })?;
    u32::try_from(whole).ok()
}

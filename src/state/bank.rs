use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coin counts reported by the device, keyed by denomination in pence.
///
/// The device encodes denominations as JSON object keys (`{"100": 2}`); serde_json
/// parses those string keys into integers and rejects anything non-numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinSnapshot(BTreeMap<u32, u32>);

impl CoinSnapshot {
    /// Count stored for `denomination`, if the device reported it.
    pub fn get(&self, denomination: u32) -> Option<u32> {
        self.0.get(&denomination).copied()
    }

    /// Iterate `(denomination, count)` pairs in ascending denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(denomination, count)| (*denomination, *count))
    }

    /// Denominations the device reported, including those at zero.
    pub fn denominations(&self) -> btree_map::Keys<'_, u32, u32> {
        self.0.keys()
    }

    /// Number of denominations reported.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the device reported no denominations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, u32)> for CoinSnapshot {
    fn from_iter<T: IntoIterator<Item = (u32, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of a game played on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[default]
    /// The game was won; also assumed when the device omits the result.
    Win,
    /// The game was lost.
    Loss,
}

/// A single normalized entry of the device's game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistoryEntry {
    /// Device id, or a generated one.
    pub id: String,
    /// Category label such as `Math Medium` or `Memory Game`.
    pub game: String,
    /// Win or loss; `win` when the device omits it.
    pub result: GameResult,
    /// Amount won or lost, in pence.
    pub amount: i64,
    /// Display date.
    pub date: String,
    /// Raw timestamp as sent by the device firmware.
    pub timestamp: Option<String>,
    /// Correct answers, present on math games.
    pub correct: Option<u32>,
    /// Incorrect answers, present on math games.
    pub incorrect: Option<u32>,
    /// Total answers when the device sends them.
    pub total: Option<u32>,
}

/// Math game session derived from a history entry carrying answer counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MathGameSession {
    /// Id of the originating history entry.
    pub id: String,
    /// Display date of the originating history entry.
    pub date: String,
    /// Correct answers.
    pub correct: u32,
    /// Incorrect answers.
    pub incorrect: u32,
    /// `correct + incorrect`.
    pub total: u32,
}

//! Decides whether a freshly polled device snapshot differs from what is already shown,
//! so identical polls do not trigger recomputation or broadcasts.

use crate::state::bank::{CoinSnapshot, GameHistoryEntry, MathGameSession};

/// Whether the coin counts changed between two polls.
///
/// True when any count reported in `next` differs from `prev`, when a denomination
/// disappeared, or when the previous snapshot was empty and the new one is not.
pub fn coins_changed(prev: &CoinSnapshot, next: &CoinSnapshot) -> bool {
    let count_differs = next
        .iter()
        .any(|(denomination, count)| prev.get(denomination) != Some(count));
    let denomination_removed = prev
        .denominations()
        .any(|denomination| next.get(*denomination).is_none());
    let first_data = prev.is_empty() && !next.is_empty();

    count_differs || denomination_removed || first_data
}

/// Whether the history sequences differ in length or in any entry's fields.
pub fn history_changed(prev: &[GameHistoryEntry], next: &[GameHistoryEntry]) -> bool {
    prev != next
}

/// Whether the derived math sessions differ.
pub fn sessions_changed(prev: &[MathGameSession], next: &[MathGameSession]) -> bool {
    prev != next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::bank::GameResult;

    fn coins(pairs: &[(u32, u32)]) -> CoinSnapshot {
        pairs.iter().copied().collect()
    }

    fn entry(id: &str, amount: i64) -> GameHistoryEntry {
        GameHistoryEntry {
            id: id.into(),
            game: "Math Easy".into(),
            result: GameResult::Win,
            amount,
            date: "03/04/2026".into(),
            timestamp: None,
            correct: Some(4),
            incorrect: Some(1),
            total: None,
        }
    }

    #[test]
    fn identical_snapshots_are_unchanged() {
        let snapshot = coins(&[(1, 3), (100, 2)]);
        assert!(!coins_changed(&snapshot, &snapshot.clone()));
        assert!(!coins_changed(&CoinSnapshot::default(), &CoinSnapshot::default()));
    }

    #[test]
    fn first_data_and_removals_are_changes() {
        assert!(coins_changed(&CoinSnapshot::default(), &coins(&[(5, 1)])));
        assert!(coins_changed(&coins(&[(5, 1)]), &CoinSnapshot::default()));
        assert!(coins_changed(&coins(&[(5, 1), (10, 2)]), &coins(&[(5, 1)])));
    }

    #[test]
    fn count_updates_and_new_denominations_are_changes() {
        assert!(coins_changed(&coins(&[(5, 1)]), &coins(&[(5, 2)])));
        assert!(coins_changed(&coins(&[(5, 1)]), &coins(&[(5, 1), (20, 0)])));
    }

    #[test]
    fn history_compares_structurally() {
        let prev = vec![entry("a", 10), entry("b", 20)];
        assert!(!history_changed(&prev, &prev.clone()));
        assert!(history_changed(&prev, &prev[..1]));
        assert!(history_changed(&prev, &[entry("a", 10), entry("b", 25)]));
        assert!(history_changed(&[], &prev));
    }
}

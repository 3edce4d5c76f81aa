use crate::services::{
    aggregation::{self, CoinBreakdownLine, EmptyHalfPolicy, MathSummary},
    change_detector,
};
use crate::state::bank::{CoinSnapshot, GameHistoryEntry, MathGameSession};

/// Dashboard view of the device: raw snapshots plus the projections derived from them.
///
/// Derived fields are recomputed only when their source changed; the revision counters
/// record how often that happened.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    coins: CoinSnapshot,
    balance: u64,
    breakdown: Vec<CoinBreakdownLine>,
    history: Vec<GameHistoryEntry>,
    math_sessions: Vec<MathGameSession>,
    math: MathSummary,
    coins_revision: u64,
    history_revision: u64,
    math_revision: u64,
}

/// Which parts of the view were replaced by [`DashboardView::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewChanges {
    /// Coin snapshot and balance were replaced.
    pub coins: bool,
    /// History was replaced.
    pub history: bool,
    /// Math sessions were recomputed.
    pub math: bool,
}

impl ViewChanges {
    /// Whether anything changed.
    pub fn any(&self) -> bool {
        self.coins || self.history || self.math
    }
}

impl DashboardView {
    /// Merge a freshly polled device snapshot, recomputing only what changed.
    pub fn apply(
        &mut self,
        coins: CoinSnapshot,
        history: Vec<GameHistoryEntry>,
        policy: EmptyHalfPolicy,
    ) -> ViewChanges {
        let mut changes = ViewChanges::default();

        if change_detector::coins_changed(&self.coins, &coins) {
            self.balance = aggregation::compute_balance(&coins);
            self.breakdown = aggregation::coin_breakdown(&coins);
            self.coins = coins;
            self.coins_revision += 1;
            changes.coins = true;
        }

        if change_detector::history_changed(&self.history, &history) {
            self.history = history;
            self.history_revision += 1;
            changes.history = true;

            let sessions = aggregation::derive_math_sessions(&self.history);
            if change_detector::sessions_changed(&self.math_sessions, &sessions) {
                self.math = aggregation::math_summary(&sessions, policy);
                self.math_sessions = sessions;
                self.math_revision += 1;
                changes.math = true;
            }
        }

        changes
    }

    /// Raw coin snapshot from the last poll that changed it.
    pub fn coins(&self) -> &CoinSnapshot {
        &self.coins
    }

    /// Total balance in pence.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Coin breakdown derived from the snapshot.
    pub fn breakdown(&self) -> &[CoinBreakdownLine] {
        &self.breakdown
    }

    /// Normalized history from the device.
    pub fn history(&self) -> &[GameHistoryEntry] {
        &self.history
    }

    /// Math sessions derived from the history.
    pub fn math_sessions(&self) -> &[MathGameSession] {
        &self.math_sessions
    }

    /// Aggregated math statistics.
    pub fn math(&self) -> &MathSummary {
        &self.math
    }

    /// Times the coin projections were recomputed.
    pub fn coins_revision(&self) -> u64 {
        self.coins_revision
    }

    /// Times the history was replaced.
    pub fn history_revision(&self) -> u64 {
        self.history_revision
    }

    /// Times the math statistics were recomputed.
    pub fn math_revision(&self) -> u64 {
        self.math_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::bank::GameResult;

    fn entry(id: &str, game: &str, correct: u32, incorrect: u32) -> GameHistoryEntry {
        GameHistoryEntry {
            id: id.into(),
            game: game.into(),
            result: GameResult::Win,
            amount: 20,
            date: "05/06/2026".into(),
            timestamp: None,
            correct: Some(correct),
            incorrect: Some(incorrect),
            total: None,
        }
    }

    #[test]
    fn identical_poll_does_not_recompute() {
        let mut view = DashboardView::default();
        let coins: CoinSnapshot = [(1, 3), (100, 2)].into_iter().collect();
        let history = vec![entry("a", "Math Easy", 3, 1)];

        let first = view.apply(coins.clone(), history.clone(), EmptyHalfPolicy::Absent);
        assert_eq!(
            first,
            ViewChanges {
                coins: true,
                history: true,
                math: true
            }
        );
        assert_eq!(view.balance(), 203);
        assert_eq!(view.breakdown().len(), 2);
        assert_eq!(view.math().accuracy, 75);

        let second = view.apply(coins, history, EmptyHalfPolicy::Absent);
        assert!(!second.any());
        assert_eq!(view.coins_revision(), 1);
        assert_eq!(view.history_revision(), 1);
        assert_eq!(view.math_revision(), 1);
    }

    #[test]
    fn non_math_history_change_keeps_math_summary() {
        let mut view = DashboardView::default();
        let mut history = vec![entry("a", "Math Easy", 3, 1)];
        view.apply(CoinSnapshot::default(), history.clone(), EmptyHalfPolicy::Absent);

        history.push(entry("b", "Memory Game", 2, 0));
        let changes = view.apply(CoinSnapshot::default(), history, EmptyHalfPolicy::Absent);

        assert!(changes.history);
        assert!(!changes.math);
        assert!(!changes.coins);
        assert_eq!(view.history().len(), 2);
        assert_eq!(view.math_sessions().len(), 1);
    }

    #[test]
    fn emptied_bank_resets_balance() {
        let mut view = DashboardView::default();
        view.apply(
            [(50, 2)].into_iter().collect(),
            Vec::new(),
            EmptyHalfPolicy::Absent,
        );
        let changes = view.apply(CoinSnapshot::default(), Vec::new(), EmptyHalfPolicy::Absent);

        assert!(changes.coins);
        assert_eq!(view.balance(), 0);
        assert!(view.breakdown().is_empty());
        assert!(view.coins().is_empty());
    }
}

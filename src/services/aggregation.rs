//! Derived views computed from raw device snapshots: balances, coin breakdowns and
//! math game statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::bank::{CoinSnapshot, GameHistoryEntry, MathGameSession};

/// Coin types accepted by the device coin mechanism, in pence.
pub const KNOWN_DENOMINATIONS: [u32; 8] = [1, 2, 5, 10, 20, 50, 100, 200];
/// Marker matched (case-insensitively) against history `game` labels.
const MATH_GAME_MARKER: &str = "math";
/// Improvement above which the dashboard celebrates.
const CELEBRATION_THRESHOLD: i64 = 10;

/// Behavior of the improvement trend when one half of the sessions holds no answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyHalfPolicy {
    /// Report no trend at all.
    #[default]
    Absent,
    /// Treat the empty half as 0% accurate.
    Zero,
}

/// One row of the coin breakdown card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CoinBreakdownLine {
    /// Denomination in pence.
    pub denomination: u32,
    /// Display label such as `20p` or `£2`.
    pub label: String,
    /// Coins of this denomination.
    pub count: u32,
    /// `denomination × count`, in pence.
    pub value: u64,
}

/// Balance with progress towards the configured savings goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BalanceSummary {
    /// Total balance in pence.
    pub balance: u64,
    /// Goal in pence, when one is configured.
    pub savings_goal: Option<u64>,
    /// Percentage of the goal reached, capped at 100.
    pub goal_progress: u32,
}

/// Chart point for a single math game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MathSessionPoint {
    /// History entry id.
    pub id: String,
    /// Display date.
    pub date: String,
    /// Correct answers.
    pub correct: u32,
    /// Incorrect answers.
    pub incorrect: u32,
    /// Answers given.
    pub total: u32,
    /// Rounded percentage of correct answers.
    pub accuracy: u32,
}

/// Aggregated statistics over every math game session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MathSummary {
    /// One point per session, in history order.
    pub sessions: Vec<MathSessionPoint>,
    /// Answers given across all sessions.
    pub total_answers: u64,
    /// Correct answers across all sessions.
    pub total_correct: u64,
    /// Rounded overall accuracy.
    pub accuracy: u32,
    /// Accuracy change between the earlier and later half of the sessions, in points.
    pub improvement: Option<i64>,
    /// Set when the improvement exceeds 10 points.
    pub celebrate: bool,
}

/// Sum of `denomination × count` over the snapshot, in pence.
pub fn compute_balance(snapshot: &CoinSnapshot) -> u64 {
    snapshot
        .iter()
        .map(|(denomination, count)| u64::from(denomination) * u64::from(count))
        .fold(0, u64::saturating_add)
}

/// Human readable label for a denomination in pence.
pub fn denomination_label(denomination: u32) -> String {
    match (denomination / 100, denomination % 100) {
        (0, pence) => format!("{pence}p"),
        (pounds, 0) => format!("£{pounds}"),
        (pounds, pence) => format!("£{pounds}.{pence:02}"),
    }
}

/// Breakdown of every denomination currently holding coins, smallest first.
pub fn coin_breakdown(snapshot: &CoinSnapshot) -> Vec<CoinBreakdownLine> {
    snapshot
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(denomination, count)| CoinBreakdownLine {
            denomination,
            label: denomination_label(denomination),
            count,
            value: u64::from(denomination) * u64::from(count),
        })
        .collect()
}

/// Summarize `balance` against `savings_goal`, capping progress at 100%.
pub fn balance_summary(balance: u64, savings_goal: Option<u64>) -> BalanceSummary {
    let goal_progress = match savings_goal {
        Some(goal) if goal > 0 => rounded_percentage(balance, goal).min(100) as u32,
        _ => 0,
    };

    BalanceSummary {
        balance,
        savings_goal,
        goal_progress,
    }
}

/// Extract math game sessions, keeping history order.
///
/// Only entries whose label mentions math and that carry both answer counts qualify.
pub fn derive_math_sessions(history: &[GameHistoryEntry]) -> Vec<MathGameSession> {
    history
        .iter()
        .filter(|entry| entry.game.to_lowercase().contains(MATH_GAME_MARKER))
        .filter_map(|entry| {
            let (correct, incorrect) = entry.correct.zip(entry.incorrect)?;
            Some(MathGameSession {
                id: entry.id.clone(),
                date: entry.date.clone(),
                correct,
                incorrect,
                total: correct.saturating_add(incorrect),
            })
        })
        .collect()
}

/// Overall accuracy as a rounded percentage; 0 when no answers were given.
pub fn compute_accuracy(sessions: &[MathGameSession]) -> u32 {
    let (correct, total) = answer_totals(sessions);
    if total == 0 {
        return 0;
    }
    rounded_percentage(correct, total) as u32
}

/// Accuracy of a single session; 0 when it holds no answers.
pub fn session_accuracy(session: &MathGameSession) -> u32 {
    if session.total == 0 {
        return 0;
    }
    rounded_percentage(u64::from(session.correct), u64::from(session.total)) as u32
}

/// Difference between the accuracy of the later and earlier half of the sessions.
///
/// The first half holds `floor(n / 2)` sessions. Needs at least two sessions; an
/// empty half is resolved through `policy`.
pub fn compute_improvement_trend(
    sessions: &[MathGameSession],
    policy: EmptyHalfPolicy,
) -> Option<i64> {
    if sessions.len() < 2 {
        return None;
    }

    let (first, second) = sessions.split_at(sessions.len() / 2);
    let first = half_accuracy(first, policy)?;
    let second = half_accuracy(second, policy)?;
    Some(round_half_up(second - first) as i64)
}

/// Full math statistics block shown on the dashboard.
pub fn math_summary(sessions: &[MathGameSession], policy: EmptyHalfPolicy) -> MathSummary {
    let (total_correct, total_answers) = answer_totals(sessions);
    let improvement = compute_improvement_trend(sessions, policy);

    MathSummary {
        sessions: sessions
            .iter()
            .map(|session| MathSessionPoint {
                id: session.id.clone(),
                date: session.date.clone(),
                correct: session.correct,
                incorrect: session.incorrect,
                total: session.total,
                accuracy: session_accuracy(session),
            })
            .collect(),
        total_answers,
        total_correct,
        accuracy: compute_accuracy(sessions),
        improvement,
        celebrate: improvement.is_some_and(|value| value > CELEBRATION_THRESHOLD),
    }
}

fn answer_totals(sessions: &[MathGameSession]) -> (u64, u64) {
    sessions.iter().fold((0, 0), |(correct, total), session| {
        (
            correct + u64::from(session.correct),
            total + u64::from(session.total),
        )
    })
}

fn half_accuracy(half: &[MathGameSession], policy: EmptyHalfPolicy) -> Option<f64> {
    let (correct, total) = answer_totals(half);
    if total == 0 {
        return match policy {
            EmptyHalfPolicy::Absent => None,
            EmptyHalfPolicy::Zero => Some(0.0),
        };
    }
    Some(correct as f64 / total as f64 * 100.0)
}

/// `round(100 × part / whole)` with halves rounded up; `whole` must be non-zero.
fn rounded_percentage(part: u64, whole: u64) -> u64 {
    let (part, whole) = (u128::from(part), u128::from(whole));
    u64::try_from((200 * part + whole) / (2 * whole)).unwrap_or(u64::MAX)
}

/// Rounds halves towards positive infinity, so `-2.5` becomes `-2`.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

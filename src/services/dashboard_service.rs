//! Read-only projections of the dashboard view.

use crate::{
    dto::dashboard::{
        CoinsResponse, ConnectivityResponse, DashboardResponse, HistoryEntrySummary,
        HistoryResponse,
    },
    services::aggregation::{BalanceSummary, MathSummary, balance_summary},
    state::SharedState,
};

/// Everything the dashboard renders, taken from one consistent view.
pub async fn get_dashboard(state: &SharedState) -> DashboardResponse {
    let savings_goal = state.config().savings_goal;
    let connectivity = ConnectivityResponse::from(&state.connectivity());

    state
        .read_dashboard(|view| DashboardResponse {
            balance: balance_summary(view.balance(), savings_goal),
            coins: view.breakdown().to_vec(),
            history: view.history().iter().map(HistoryEntrySummary::from).collect(),
            math: view.math().clone(),
            connectivity,
        })
        .await
}

/// Current balance and savings goal progress.
pub async fn get_balance(state: &SharedState) -> BalanceSummary {
    let savings_goal = state.config().savings_goal;
    let balance = state.read_dashboard(|view| view.balance()).await;
    balance_summary(balance, savings_goal)
}

/// Coin breakdown with the number of denominations holding coins.
pub async fn get_coins(state: &SharedState) -> CoinsResponse {
    state
        .read_dashboard(|view| CoinsResponse {
            coins: view.breakdown().to_vec(),
            coin_types: view.breakdown().len(),
        })
        .await
}

/// Normalized history in device order.
pub async fn get_history(state: &SharedState) -> HistoryResponse {
    state
        .read_dashboard(|view| HistoryResponse {
            entries: view.history().iter().map(HistoryEntrySummary::from).collect(),
        })
        .await
}

/// Math game statistics.
pub async fn get_math(state: &SharedState) -> MathSummary {
    state.read_dashboard(|view| view.math().clone()).await
}

/// Latest connectivity snapshot.
pub fn get_connectivity(state: &SharedState) -> ConnectivityResponse {
    ConnectivityResponse::from(&state.connectivity())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        device::testing::FakeDevice,
        services::poll_scheduler::{CycleTrigger, poll_once},
        state::{
            AppState,
            bank::{GameHistoryEntry, GameResult},
            connectivity::ConnectionStatus,
        },
    };

    fn entry(game: &str, correct: u32, incorrect: u32) -> GameHistoryEntry {
        GameHistoryEntry {
            id: format!("{game}-{correct}"),
            game: game.to_string(),
            result: GameResult::Win,
            amount: 20,
            date: "03/04/2025".to_string(),
            timestamp: None,
            correct: Some(correct),
            incorrect: Some(incorrect),
            total: None,
        }
    }

    #[tokio::test]
    async fn empty_view_before_first_poll() {
        let state = AppState::new(Arc::new(FakeDevice::new()), AppConfig::default());

        let dashboard = get_dashboard(&state).await;

        assert_eq!(dashboard.balance.balance, 0);
        assert!(dashboard.coins.is_empty());
        assert!(dashboard.history.is_empty());
        assert_eq!(dashboard.math.improvement, None);
        assert_eq!(dashboard.connectivity.status, ConnectionStatus::Checking);
    }

    #[tokio::test]
    async fn projections_follow_polled_snapshot() {
        let device = FakeDevice::new();
        device.set_coins([(1, 4), (50, 2), (200, 0)].into_iter().collect());
        device.set_history(vec![
            entry("Math Game", 2, 2),
            entry("Coin Toss", 0, 0),
            entry("math quiz", 4, 0),
        ]);
        let state = AppState::new(Arc::new(device.clone()), AppConfig::default());
        poll_once(&state, CycleTrigger::Timer).await;

        let balance = get_balance(&state).await;
        let coins = get_coins(&state).await;
        let history = get_history(&state).await;
        let math = get_math(&state).await;

        assert_eq!(balance.balance, 104);
        assert_eq!(coins.coin_types, 2);
        assert_eq!(coins.coins[0].label, "1p");
        assert_eq!(history.entries.len(), 3);
        assert_eq!(math.sessions.len(), 2);
        assert_eq!(math.accuracy, 75);
        assert_eq!(math.improvement, Some(50));
        assert_eq!(
            get_connectivity(&state).status,
            ConnectionStatus::Connected
        );
    }
}

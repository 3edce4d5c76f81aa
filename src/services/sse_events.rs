use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        command::CommandResponse,
        dashboard::{ConnectivityResponse, HistoryEntrySummary},
        sse::{BankUpdatedEvent, HistoryUpdatedEvent, MathUpdatedEvent, ServerEvent},
    },
    services::aggregation::balance_summary,
    state::{SharedState, connectivity::Connectivity, dashboard::ViewChanges},
};

const EVENT_CONNECTIVITY: &str = "connectivity";
const EVENT_BANK_UPDATED: &str = "bank.updated";
const EVENT_HISTORY_UPDATED: &str = "history.updated";
const EVENT_MATH_UPDATED: &str = "math.updated";
const EVENT_COMMAND_RESULT: &str = "command.result";

/// Broadcast the current connectivity state.
pub fn broadcast_connectivity(state: &SharedState, connectivity: &Connectivity) {
    let payload = ConnectivityResponse::from(connectivity);
    send_event(state, EVENT_CONNECTIVITY, &payload);
}

/// Broadcast the parts of the dashboard view that changed during the last poll.
pub async fn broadcast_view_changes(state: &SharedState, changes: ViewChanges) {
    if !changes.any() {
        return;
    }

    let savings_goal = state.config().savings_goal;
    let (bank, history, math) = state
        .read_dashboard(|view| {
            let bank = changes.coins.then(|| BankUpdatedEvent {
                balance: balance_summary(view.balance(), savings_goal),
                coins: view.breakdown().to_vec(),
            });
            let history = changes.history.then(|| HistoryUpdatedEvent {
                entries: view.history().iter().map(HistoryEntrySummary::from).collect(),
            });
            let math = changes
                .math
                .then(|| MathUpdatedEvent(view.math().clone()));
            (bank, history, math)
        })
        .await;

    if let Some(payload) = bank {
        send_event(state, EVENT_BANK_UPDATED, &payload);
    }
    if let Some(payload) = history {
        send_event(state, EVENT_HISTORY_UPDATED, &payload);
    }
    if let Some(payload) = math {
        send_event(state, EVENT_MATH_UPDATED, &payload);
    }
}

/// Broadcast the outcome of a device command so front-ends can notify the user.
pub fn broadcast_command_result(state: &SharedState, result: &CommandResponse) {
    send_event(state, EVENT_COMMAND_RESULT, result);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, post},
};
use validator::Validate;

use crate::{
    dto::{
        command::{CommandResponse, DenominationDispenseRequest, ExactDispenseRequest, LockRequest},
        dashboard::ConnectivityResponse,
    },
    error::AppError,
    services::{
        command_service::{self, DeviceCommand},
        dashboard_service,
        poll_scheduler::{self, CycleTrigger},
    },
    state::SharedState,
};

/// Endpoints that act on the device.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/device/refresh", post(refresh))
        .route("/device/dispense/exact", post(dispense_exact))
        .route("/device/dispense/denomination", post(dispense_denomination))
        .route("/device/bank", delete(empty_bank))
        .route("/device/lock", post(update_lock))
}

type CommandReply = (StatusCode, Json<CommandResponse>);

fn reply(response: CommandResponse) -> CommandReply {
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(response))
}

#[utoipa::path(
    post,
    path = "/device/refresh",
    tag = "device",
    responses((status = 200, description = "Connectivity after the check", body = ConnectivityResponse))
)]
/// Check the connection now instead of waiting for the next tick.
///
/// A check requested while a cycle is already running returns the current state.
pub async fn refresh(State(state): State<SharedState>) -> Json<ConnectivityResponse> {
    poll_scheduler::poll_once(&state, CycleTrigger::Manual).await;
    Json(dashboard_service::get_connectivity(&state))
}

#[utoipa::path(
    post,
    path = "/device/dispense/exact",
    tag = "device",
    request_body = ExactDispenseRequest,
    responses(
        (status = 200, description = "Amount dispensed", body = CommandResponse),
        (status = 400, description = "Amount below one penny"),
        (status = 502, description = "Device failed the request", body = CommandResponse)
    )
)]
/// Dispense coins adding up to an exact amount.
pub async fn dispense_exact(
    State(state): State<SharedState>,
    Json(payload): Json<ExactDispenseRequest>,
) -> Result<CommandReply, AppError> {
    payload.validate()?;
    let command = DeviceCommand::DispenseExact {
        amount: payload.amount,
    };
    Ok(reply(command_service::execute(&state, command).await?))
}

#[utoipa::path(
    post,
    path = "/device/dispense/denomination",
    tag = "device",
    request_body = DenominationDispenseRequest,
    responses(
        (status = 200, description = "Coins dispensed", body = CommandResponse),
        (status = 400, description = "Unknown denomination or count outside 1..=99"),
        (status = 502, description = "Device failed the request", body = CommandResponse)
    )
)]
/// Dispense a number of coins of one denomination.
pub async fn dispense_denomination(
    State(state): State<SharedState>,
    Json(payload): Json<DenominationDispenseRequest>,
) -> Result<CommandReply, AppError> {
    payload.validate()?;
    let command = DeviceCommand::DispenseDenomination {
        denomination: payload.denomination,
        count: payload.count,
    };
    Ok(reply(command_service::execute(&state, command).await?))
}

#[utoipa::path(
    delete,
    path = "/device/bank",
    tag = "device",
    responses(
        (status = 200, description = "Every coin dispensed", body = CommandResponse),
        (status = 502, description = "Device failed the request", body = CommandResponse)
    )
)]
/// Dispense every coin in the bank.
pub async fn empty_bank(State(state): State<SharedState>) -> Result<CommandReply, AppError> {
    Ok(reply(
        command_service::execute(&state, DeviceCommand::EmptyBank).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/device/lock",
    tag = "device",
    request_body = LockRequest,
    responses(
        (status = 200, description = "Lock state updated", body = CommandResponse),
        (status = 502, description = "Device failed the request", body = CommandResponse)
    )
)]
/// Lock or unlock the coin slot.
pub async fn update_lock(
    State(state): State<SharedState>,
    Json(payload): Json<LockRequest>,
) -> Result<CommandReply, AppError> {
    let command = DeviceCommand::SetLock {
        locked: payload.locked,
    };
    Ok(reply(command_service::execute(&state, command).await?))
}

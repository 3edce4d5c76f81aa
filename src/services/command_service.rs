//! Forwards user commands to the device and reports their outcome.

use tracing::{info, warn};

use crate::{
    dto::{
        command::{CommandKind, CommandResponse},
        validation::{validate_coin_count, validate_denomination},
    },
    error::ServiceError,
    services::{aggregation::denomination_label, sse_events},
    state::SharedState,
};

/// A command the dashboard can send to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Dispense coins adding up to `amount` pence.
    DispenseExact { amount: u32 },
    /// Dispense `count` coins of one denomination.
    DispenseDenomination { denomination: u32, count: u32 },
    /// Dispense every coin in the bank.
    EmptyBank,
    /// Lock or unlock the coin slot.
    SetLock { locked: bool },
}

impl DeviceCommand {
    fn kind(&self) -> CommandKind {
        match self {
            DeviceCommand::DispenseExact { .. } => CommandKind::DispenseExact,
            DeviceCommand::DispenseDenomination { .. } => CommandKind::DispenseDenomination,
            DeviceCommand::EmptyBank => CommandKind::EmptyBank,
            DeviceCommand::SetLock { .. } => CommandKind::Lock,
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        match *self {
            DeviceCommand::DispenseExact { amount: 0 } => Err(ServiceError::InvalidInput(
                "amount must be at least 1 penny".to_string(),
            )),
            DeviceCommand::DispenseDenomination {
                denomination,
                count,
            } => validate_denomination(denomination)
                .and_then(|_| validate_coin_count(count))
                .map_err(|err| ServiceError::InvalidInput(err.to_string())),
            _ => Ok(()),
        }
    }

    fn success_message(&self) -> String {
        match *self {
            DeviceCommand::DispenseExact { amount } => {
                format!("Dispensed £{}.{:02}", amount / 100, amount % 100)
            }
            DeviceCommand::DispenseDenomination {
                denomination,
                count,
            } => format!("Dispensed {count} × {}", denomination_label(denomination)),
            DeviceCommand::EmptyBank => "All coins dispensed successfully".to_string(),
            DeviceCommand::SetLock { locked: true } => "Device locked successfully".to_string(),
            DeviceCommand::SetLock { locked: false } => {
                "Device unlocked successfully".to_string()
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            DeviceCommand::DispenseExact { .. } => {
                "Could not dispense the requested amount. Please try again."
            }
            DeviceCommand::DispenseDenomination { .. } => {
                "Could not dispense the requested coins. Please try again."
            }
            DeviceCommand::EmptyBank => "Could not empty the Piggy Bank. Please try again.",
            DeviceCommand::SetLock { .. } => {
                "Could not update device lock status. Please try again."
            }
        }
    }
}

/// Send `command` to the device once and broadcast its outcome as a `command.result` event.
///
/// Device failures are reported in the returned response rather than as an error;
/// only invalid input is rejected with [`ServiceError::InvalidInput`], before the
/// device is contacted.
pub async fn execute(
    state: &SharedState,
    command: DeviceCommand,
) -> Result<CommandResponse, ServiceError> {
    command.validate()?;

    let device = state.device();
    let result = match command {
        DeviceCommand::DispenseExact { amount } => device.dispense_exact(amount).await,
        DeviceCommand::DispenseDenomination {
            denomination,
            count,
        } => device.dispense_denomination(denomination, count).await,
        DeviceCommand::EmptyBank => device.empty_bank().await,
        DeviceCommand::SetLock { locked } => device.update_lock_status(locked).await,
    };

    let response = match result {
        Ok(()) => {
            info!(?command, "device command succeeded");
            CommandResponse {
                command: command.kind(),
                success: true,
                message: command.success_message(),
            }
        }
        Err(err) => {
            warn!(
                ?command,
                status = ?err.status(),
                error = %err,
                "device command failed"
            );
            CommandResponse {
                command: command.kind(),
                success: false,
                message: command.failure_message().to_string(),
            }
        }
    };

    sse_events::broadcast_command_result(state, &response);
    Ok(response)
}

//! DTO definitions for the device command endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::{validate_coin_count, validate_denomination};

/// Request to dispense an exact amount.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ExactDispenseRequest {
    /// Amount in pence.
    #[validate(range(min = 1))]
    pub amount: u32,
}

/// Request to dispense a number of coins of one denomination.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DenominationDispenseRequest {
    /// Coin value in pence; must be one of the coin types the device accepts.
    pub denomination: u32,
    /// Between 1 and 99 coins.
    pub count: u32,
}

impl Validate for DenominationDispenseRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_denomination(self.denomination) {
            errors.add("denomination", e);
        }
        if let Err(e) = validate_coin_count(self.count) {
            errors.add("count", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request to lock or unlock the device.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LockRequest {
    /// `true` locks the coin slot, `false` unlocks it.
    pub locked: bool,
}

/// Commands that can be forwarded to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// `POST /device/dispense/exact`.
    DispenseExact,
    /// `POST /device/dispense/denomination`.
    DispenseDenomination,
    /// `DELETE /device/bank`.
    EmptyBank,
    /// `POST /device/lock`.
    Lock,
}

/// Outcome of a device command, also broadcast as a `command.result` event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommandResponse {
    /// Command that was forwarded.
    pub command: CommandKind,
    /// Whether the device accepted the command.
    pub success: bool,
    /// Message suitable for a user notification.
    pub message: String,
}

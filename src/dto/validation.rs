//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::services::aggregation::KNOWN_DENOMINATIONS;

/// Largest number of coins a single denomination dispense may request.
const MAX_COIN_COUNT: u32 = 99;

/// Validates that a denomination is one of the coin types the device handles.
///
/// # Examples
///
/// ```ignore
/// validate_denomination(20)  // Ok
/// validate_denomination(200) // Ok
/// validate_denomination(3)   // Err - no 3p coin
/// ```
pub fn validate_denomination(denomination: u32) -> Result<(), ValidationError> {
    if KNOWN_DENOMINATIONS.contains(&denomination) {
        return Ok(());
    }

    let mut err = ValidationError::new("denomination_unknown");
    err.message = Some(
        format!(
            "Denomination must be one of {:?} pence (got {})",
            KNOWN_DENOMINATIONS, denomination
        )
        .into(),
    );
    Err(err)
}

/// Validates that a coin count lies between 1 and [`MAX_COIN_COUNT`].
pub fn validate_coin_count(count: u32) -> Result<(), ValidationError> {
    if (1..=MAX_COIN_COUNT).contains(&count) {
        return Ok(());
    }

    let mut err = ValidationError::new("coin_count_range");
    err.message = Some(format!("Coin count must be between 1 and {MAX_COIN_COUNT} (got {count})").into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_denomination_valid() {
        assert!(validate_denomination(1).is_ok());
        assert!(validate_denomination(50).is_ok());
        assert!(validate_denomination(200).is_ok());
    }

    #[test]
    fn test_validate_denomination_invalid() {
        assert!(validate_denomination(0).is_err());
        assert!(validate_denomination(3).is_err());
        assert!(validate_denomination(500).is_err());
    }

    #[test]
    fn test_validate_coin_count() {
        assert!(validate_coin_count(1).is_ok());
        assert!(validate_coin_count(99).is_ok());
        assert!(validate_coin_count(0).is_err());
        assert!(validate_coin_count(100).is_err());
    }
}

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;

/// Largest value a `DECIMAL(8, 2)` money column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Non-negative, at most two fraction digits and within the column range.
pub fn validate_amount(field: &str, amount: Decimal) -> AppResult<()> {
    if amount.is_sign_negative() {
        return Err(AppError::field(field, "must not be negative"));
    }
    if amount.normalize().scale() > 2 {
        return Err(AppError::field(field, "must have at most 2 decimal places"));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::field(field, format!("must not exceed {MAX_AMOUNT}")));
    }
    Ok(())
}

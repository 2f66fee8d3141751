//! Money rounding with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` stored as `NUMERIC(12,2)`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

//! Price breakdown calculation.
//!
//! CRITICAL: all arithmetic is `Decimal`; every output is rounded to cents.

use playdesk_shared::PricingConfig;
use playdesk_shared::types::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of pricing one order.
///
/// Invariant: `final_price == total_price - discount_amount` and
/// `final_price >= 0` for non-negative inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Price per hour.
    pub unit_price: Decimal,
    /// `unit_price × duration`, rounded.
    pub total_price: Decimal,
    /// Exclusive discount taken off the total.
    pub discount_amount: Decimal,
    /// Amount to settle.
    pub final_price: Decimal,
    /// Whether the exclusive discount was applied.
    pub exclusive_discount: bool,
}

/// Pure pricing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCalculator {
    exclusive_discount_rate: Decimal,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl PricingCalculator {
    /// Creates a calculator with the given exclusive discount rate.
    ///
    /// The rate is clamped to `[0, 1]` so the final price never goes negative.
    #[must_use]
    pub fn new(exclusive_discount_rate: Decimal) -> Self {
        Self {
            exclusive_discount_rate: exclusive_discount_rate.clamp(Decimal::ZERO, Decimal::ONE),
        }
    }

    /// Creates a calculator from the configured pricing policy.
    #[must_use]
    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.exclusive_discount_rate)
    }

    /// Returns the exclusive discount rate in use.
    #[must_use]
    pub const fn exclusive_discount_rate(&self) -> Decimal {
        self.exclusive_discount_rate
    }

    /// Prices an order.
    ///
    /// Callers reject non-positive `unit_price` or `duration_hours` first.
    #[must_use]
    pub fn calculate(
        &self,
        unit_price: Decimal,
        duration_hours: Decimal,
        exclusive_discount: bool,
    ) -> PriceBreakdown {
        let total_price = round_money(unit_price * duration_hours);
        let discount_amount = if exclusive_discount {
            round_money(total_price * self.exclusive_discount_rate)
        } else {
            Decimal::ZERO
        };

        PriceBreakdown {
            unit_price,
            total_price,
            discount_amount,
            final_price: total_price - discount_amount,
            exclusive_discount,
        }
    }
}

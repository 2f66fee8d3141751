//! Property-based tests for order pricing.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::PricingCalculator;

/// Strategy for unit prices from 0.01 to 10,000.00.
fn unit_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for durations from 0.25 to 99.75 hours in quarter steps.
fn duration() -> impl Strategy<Value = Decimal> {
    (1i64..400i64).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}

/// Strategy for discount rates from 0.00 to 1.00.
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=100i64).prop_map(|pct| Decimal::new(pct, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Pricing the same inputs twice gives identical results.
    #[test]
    fn prop_pricing_is_deterministic(
        price in unit_price(),
        hours in duration(),
        flag in any::<bool>(),
        r in rate(),
    ) {
        let calculator = PricingCalculator::new(r);
        prop_assert_eq!(
            calculator.calculate(price, hours, flag),
            calculator.calculate(price, hours, flag)
        );
    }

    /// final = total - discount, and final is never negative.
    #[test]
    fn prop_final_is_total_minus_discount(
        price in unit_price(),
        hours in duration(),
        flag in any::<bool>(),
        r in rate(),
    ) {
        let pricing = PricingCalculator::new(r).calculate(price, hours, flag);
        prop_assert_eq!(pricing.final_price, pricing.total_price - pricing.discount_amount);
        prop_assert!(pricing.final_price >= Decimal::ZERO);
        prop_assert!(pricing.discount_amount <= pricing.total_price);
    }

    /// No discount is taken when the exclusive flag is off.
    #[test]
    fn prop_no_discount_without_flag(price in unit_price(), hours in duration(), r in rate()) {
        let pricing = PricingCalculator::new(r).calculate(price, hours, false);
        prop_assert_eq!(pricing.discount_amount, Decimal::ZERO);
        prop_assert_eq!(pricing.final_price, pricing.total_price);
    }

    /// All outputs are rounded to cents.
    #[test]
    fn prop_outputs_have_two_decimals(
        price in unit_price(),
        hours in duration(),
        flag in any::<bool>(),
        r in rate(),
    ) {
        let pricing = PricingCalculator::new(r).calculate(price, hours, flag);
        prop_assert_eq!(pricing.total_price, pricing.total_price.round_dp(2));
        prop_assert_eq!(pricing.discount_amount, pricing.discount_amount.round_dp(2));
        prop_assert_eq!(pricing.final_price, pricing.final_price.round_dp(2));
    }
}

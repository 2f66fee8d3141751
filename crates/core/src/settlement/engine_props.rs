//! Property-based tests for the settlement engine.

use chrono::Utc;
use playdesk_shared::types::{CustomerId, OrderId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::{SettlementEngine, effective_discount_percent};
use super::types::{CustomerFinancialInfo, CustomerPreferences, OrderPaymentInfo};

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account(balance: Decimal) -> CustomerFinancialInfo {
    CustomerFinancialInfo {
        customer_id: CustomerId(1),
        total_real_charge: balance,
        total_consumption: Decimal::ZERO,
        current_balance: balance,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any ratio outside [0, 100] behaves exactly like no discount.
    #[test]
    fn prop_out_of_range_ratio_is_zero(ratio in prop_oneof![i32::MIN..0i32, 101i32..=i32::MAX]) {
        prop_assert_eq!(effective_discount_percent(ratio), 0);
    }

    /// In-range ratios are used as given.
    #[test]
    fn prop_in_range_ratio_is_kept(ratio in 0i32..=100) {
        prop_assert_eq!(i32::from(effective_discount_percent(ratio)), ratio);
    }

    /// A settlement either fails without mutation or leaves a non-negative balance
    /// and moves exactly the charged amount from balance to consumption.
    #[test]
    fn prop_balance_never_negative(
        balance in amount(),
        price in amount(),
        ratio in -50i32..200,
    ) {
        let mut financial = account(balance);
        let preferences = CustomerPreferences { customer_id: CustomerId(1), exclusive_discount_ratio: ratio };
        let mut payment = OrderPaymentInfo::pending(OrderId(1), price);
        let before = financial.clone();

        match SettlementEngine::settle_from_balance(price, &mut financial, &preferences, &mut payment, Utc::now()) {
            Ok(summary) => {
                prop_assert!(financial.current_balance >= Decimal::ZERO);
                prop_assert!(summary.actual_amount <= price);
                prop_assert_eq!(before.current_balance - financial.current_balance, summary.actual_amount);
                prop_assert_eq!(financial.total_consumption - before.total_consumption, summary.actual_amount);
            }
            Err(_) => {
                prop_assert_eq!(financial, before);
            }
        }
    }
}

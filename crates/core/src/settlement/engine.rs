//! Settlement engine for approved orders.
//!
//! Pure functions: the caller loads the records (locking the financial row)
//! and persists them afterwards inside the approval's unit of work.

use chrono::{DateTime, Utc};
use playdesk_shared::types::round_money;
use rust_decimal::Decimal;

use crate::settlement::types::{
    BalanceDebit, CustomerFinancialInfo, CustomerPreferences, OrderPaymentInfo, PaymentMethod,
    PaymentStatus, PaymentSummary,
};
use crate::workflow::error::WorkflowError;

/// Returns the usable discount percent for a stored ratio.
///
/// Ratios outside `[0, 100]` are treated as no discount.
#[must_use]
pub fn effective_discount_percent(ratio: i32) -> u8 {
    u8::try_from(ratio).ok().filter(|pct| *pct <= 100).unwrap_or(0)
}

/// Stateless settlement rules.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Computes the balance debit for an order and checks it is covered.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientBalance` with the diagnostic amounts
    /// when the balance is below the discounted charge.
    pub fn plan_balance_debit(
        final_price: Decimal,
        financial: &CustomerFinancialInfo,
        preferences: &CustomerPreferences,
    ) -> Result<BalanceDebit, WorkflowError> {
        let discount_percent = effective_discount_percent(preferences.exclusive_discount_ratio);
        let hundred = Decimal::ONE_HUNDRED;
        let actual_amount = round_money(
            final_price * (hundred - Decimal::from(discount_percent)) / hundred,
        );

        if financial.current_balance < actual_amount {
            return Err(WorkflowError::InsufficientBalance {
                balance: financial.current_balance,
                original_price: final_price,
                discounted_price: actual_amount,
                discount_percent,
            });
        }

        Ok(BalanceDebit {
            original_price: final_price,
            discount_percent,
            actual_amount,
        })
    }

    /// Settles an order from the customer's balance.
    ///
    /// On error neither record is modified.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientBalance` if the balance does not
    /// cover the discounted charge.
    pub fn settle_from_balance(
        final_price: Decimal,
        financial: &mut CustomerFinancialInfo,
        preferences: &CustomerPreferences,
        payment: &mut OrderPaymentInfo,
        paid_at: DateTime<Utc>,
    ) -> Result<PaymentSummary, WorkflowError> {
        let debit = Self::plan_balance_debit(final_price, financial, preferences)?;

        financial.current_balance -= debit.actual_amount;
        financial.total_consumption += debit.actual_amount;

        mark_paid(payment, PaymentMethod::Balance, debit.actual_amount, paid_at);

        Ok(PaymentSummary {
            order_id: payment.order_id,
            method: PaymentMethod::Balance,
            original_price: debit.original_price,
            discount_percent: debit.discount_percent,
            actual_amount: debit.actual_amount,
        })
    }

    /// Settles an order paid outside the system. No balance is touched.
    pub fn settle_direct(
        final_price: Decimal,
        payment: &mut OrderPaymentInfo,
        paid_at: DateTime<Utc>,
    ) -> PaymentSummary {
        mark_paid(payment, PaymentMethod::Direct, final_price, paid_at);

        PaymentSummary {
            order_id: payment.order_id,
            method: PaymentMethod::Direct,
            original_price: final_price,
            discount_percent: 0,
            actual_amount: final_price,
        }
    }
}

fn mark_paid(
    payment: &mut OrderPaymentInfo,
    method: PaymentMethod,
    amount: Decimal,
    paid_at: DateTime<Utc>,
) {
    payment.payment_method = Some(method);
    payment.payment_status = PaymentStatus::Paid;
    payment.payment_amount = amount;
    payment.payment_time = Some(paid_at);
}

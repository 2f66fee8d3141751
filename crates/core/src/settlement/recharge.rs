//! Balance credit from a customer recharge.

use chrono::{DateTime, Utc};
use playdesk_shared::types::{CustomerId, MemberId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settlement::types::CustomerFinancialInfo;
use crate::workflow::error::WorkflowError;

/// Amounts credited by one recharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RechargeCredit {
    /// Real money paid in.
    pub real_amount: Decimal,
    /// Bonus credit on top of the real amount.
    pub gift_amount: Decimal,
    /// `real_amount + gift_amount`.
    pub total_amount: Decimal,
}

/// A recharge history row about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRechargeRecord {
    /// Recharged customer.
    pub customer_id: CustomerId,
    /// Real money paid in.
    pub real_amount: Decimal,
    /// Bonus credit.
    pub gift_amount: Decimal,
    /// Credited to the balance.
    pub total_amount: Decimal,
    /// Balance after the credit.
    pub balance_after: Decimal,
    /// Payment channel, e.g. `wechat` or `cash`.
    pub payment_channel: Option<String>,
    /// External transaction reference.
    pub transaction_ref: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Member who booked the recharge.
    pub operator_id: MemberId,
    /// When it was booked.
    pub recharged_at: DateTime<Utc>,
}

/// Credits a recharge to a customer's account.
///
/// The real amount counts toward `total_real_charge`; real and gift both
/// go to the spendable balance.
///
/// # Errors
///
/// Returns `WorkflowError::Validation` if `real_amount` is not positive or
/// `gift_amount` is negative.
pub fn apply_recharge(
    financial: &mut CustomerFinancialInfo,
    real_amount: Decimal,
    gift_amount: Decimal,
) -> Result<RechargeCredit, WorkflowError> {
    if real_amount <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "recharge amount must be positive".to_string(),
        ));
    }
    if gift_amount < Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "gift amount cannot be negative".to_string(),
        ));
    }

    let real_amount = round_money(real_amount);
    let gift_amount = round_money(gift_amount);
    let total_amount = real_amount + gift_amount;

    financial.total_real_charge += real_amount;
    financial.current_balance += total_amount;

    Ok(RechargeCredit {
        real_amount,
        gift_amount,
        total_amount,
    })
}

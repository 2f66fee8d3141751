//! Settlement domain types.

use chrono::{DateTime, Utc};
use playdesk_shared::types::{CustomerId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an order's payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid outside the system.
    Direct,
    /// Drawn from the customer's prepaid balance.
    Balance,
}

impl PaymentMethod {
    /// Returns the storage token of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Balance => "balance",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not yet settled.
    Pending,
    /// Settled.
    Paid,
    /// Settlement failed.
    Failed,
    /// Money returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Returns the storage token of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment record attached 1:1 to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaymentInfo {
    /// The order being paid for.
    pub order_id: OrderId,
    /// Amount due, then amount actually paid.
    pub payment_amount: Decimal,
    /// `None` until the order is settled.
    pub payment_method: Option<PaymentMethod>,
    /// Current payment status.
    pub payment_status: PaymentStatus,
    /// When the payment was settled.
    pub payment_time: Option<DateTime<Utc>>,
    /// External payment reference, if any.
    pub transaction_ref: Option<String>,
}

impl OrderPaymentInfo {
    /// Creates the unsettled payment record for a new order.
    #[must_use]
    pub fn pending(order_id: OrderId, amount: Decimal) -> Self {
        Self {
            order_id,
            payment_amount: amount,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            payment_time: None,
            transaction_ref: None,
        }
    }
}

/// A customer's prepaid account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFinancialInfo {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Sum of real money ever recharged.
    pub total_real_charge: Decimal,
    /// Sum of all balance debits.
    pub total_consumption: Decimal,
    /// Spendable balance, including gifts.
    pub current_balance: Decimal,
}

impl CustomerFinancialInfo {
    /// Creates an empty account for a customer's first recharge.
    #[must_use]
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            total_real_charge: Decimal::ZERO,
            total_consumption: Decimal::ZERO,
            current_balance: Decimal::ZERO,
        }
    }
}

/// A customer's pricing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Percent off balance settlements. Values outside `[0, 100]` mean no discount.
    pub exclusive_discount_ratio: i32,
}

/// Planned debit against a customer's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDebit {
    /// Order final price before the customer discount.
    pub original_price: Decimal,
    /// Customer discount in percent.
    pub discount_percent: u8,
    /// Amount to take from the balance.
    pub actual_amount: Decimal,
}

/// Outcome of settling an approved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// The settled order.
    pub order_id: OrderId,
    /// How the order was paid.
    pub method: PaymentMethod,
    /// Order final price.
    pub original_price: Decimal,
    /// Customer discount applied, in percent.
    pub discount_percent: u8,
    /// Amount actually charged.
    pub actual_amount: Decimal,
}

impl PaymentSummary {
    /// Returns the success message shown to the approving operator.
    #[must_use]
    pub fn message(&self) -> String {
        match self.method {
            PaymentMethod::Balance => format!(
                "Order approved! Original price: {:.2}, discount: {}%, charged: {:.2}",
                self.original_price, self.discount_percent, self.actual_amount
            ),
            PaymentMethod::Direct => format!(
                "Order approved without balance payment, order ID: {}",
                self.order_id
            ),
        }
    }
}

//! Order settlement.
//!
//! When an order is approved its payment is settled either directly or by
//! drawing down the customer's prepaid balance with the customer's personal
//! discount applied. Recharges credit the same balance.
//!
//! # Modules
//!
//! - `types` - Financial records, payment info and settlement results
//! - `engine` - Discount clamping, balance debit and payment settlement
//! - `recharge` - Balance credit from a recharge

pub mod engine;
pub mod recharge;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{SettlementEngine, effective_discount_percent};
pub use recharge::{NewRechargeRecord, RechargeCredit, apply_recharge};
pub use types::{
    BalanceDebit, CustomerFinancialInfo, CustomerPreferences, OrderPaymentInfo, PaymentMethod,
    PaymentStatus, PaymentSummary,
};

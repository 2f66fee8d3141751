//! Workflow error types for the order lifecycle.
//!
//! Every failure of an order operation is a `WorkflowError`. Each variant
//! belongs to one [`ErrorKind`], which decides the HTTP status and whether a
//! batch run may continue past it.

use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::workflow::types::OrderStatus;

/// Broad classification of workflow errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The order's current status forbids the operation.
    StateConflict,
    /// Input is missing or malformed.
    Validation,
    /// The customer's balance does not cover the charge.
    InsufficientBalance,
    /// The backing store failed.
    Store,
}

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Order not found.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Customer not found.
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// Order category not found.
    #[error("Order category {0} not found")]
    CategoryNotFound(CategoryId),

    /// Operating member not found.
    #[error("Operator {0} not found")]
    OperatorNotFound(MemberId),

    /// Balance payment requested but the customer was never recharged.
    #[error("Customer {0} has no financial record, recharge first")]
    FinancialRecordMissing(CustomerId),

    /// Balance payment requested but the customer has no preference record.
    #[error("Customer {0} has no preference record")]
    PreferencesMissing(CustomerId),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: OrderStatus,
        /// The attempted target status.
        to: OrderStatus,
    },

    /// Attempted to edit an order that is no longer pending.
    #[error("Only pending orders can be edited, order is {0}")]
    OrderNotEditable(OrderStatus),

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// An order id token could not be parsed.
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),

    /// Any other invalid input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Balance does not cover the discounted charge.
    #[error(
        "Insufficient balance: current balance {balance:.2}, original price {original_price:.2}, \
         discounted amount {discounted_price:.2} ({discount_percent}% discount)"
    )]
    InsufficientBalance {
        /// Balance at the time of the check.
        balance: Decimal,
        /// Order final price before the customer discount.
        original_price: Decimal,
        /// Amount that would have been charged.
        discounted_price: Decimal,
        /// Customer discount applied, in percent.
        discount_percent: u8,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OrderNotFound(_)
            | Self::CustomerNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::OperatorNotFound(_)
            | Self::FinancialRecordMissing(_)
            | Self::PreferencesMissing(_) => ErrorKind::NotFound,

            Self::InvalidTransition { .. } | Self::OrderNotEditable(_) => {
                ErrorKind::StateConflict
            }

            Self::RejectionReasonRequired | Self::InvalidOrderId(_) | Self::Validation(_) => {
                ErrorKind::Validation
            }

            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,

            Self::Database(_) => ErrorKind::Store,
        }
    }

    /// Returns true if the error means the store itself is unusable.
    #[must_use]
    pub fn is_systemic(&self) -> bool {
        self.kind() == ErrorKind::Store
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::StateConflict => 409,
            ErrorKind::Validation => 400,
            ErrorKind::InsufficientBalance => 422,
            ErrorKind::Store => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::OperatorNotFound(_) => "OPERATOR_NOT_FOUND",
            Self::FinancialRecordMissing(_) => "FINANCIAL_RECORD_MISSING",
            Self::PreferencesMissing(_) => "PREFERENCES_MISSING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::OrderNotEditable(_) => "ORDER_NOT_EDITABLE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::InvalidOrderId(_) => "INVALID_ORDER_ID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

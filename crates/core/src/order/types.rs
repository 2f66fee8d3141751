//! Order records and the inputs and outputs of the approval service.

use chrono::{DateTime, Utc};
use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;
use crate::settlement::types::OrderPaymentInfo;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::OrderWorkflow;

/// A service order reported by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Member who reported the order.
    pub reporter_id: MemberId,
    /// Customer being served.
    pub customer_id: CustomerId,
    /// Service category.
    pub category_id: CategoryId,
    /// Game or project the session was for.
    pub project_category: String,
    /// Session start.
    pub start_time: DateTime<Utc>,
    /// Session end.
    pub end_time: DateTime<Utc>,
    /// Billed hours. Fixed at creation.
    pub duration_hours: Decimal,
    /// Notes visible to the customer.
    pub service_notes: Option<String>,
    /// Notes for staff only.
    pub internal_notes: Option<String>,
    /// General order notes.
    pub order_notes: Option<String>,
    /// When the order was reported.
    pub report_time: DateTime<Utc>,
    /// Settle from the customer's prepaid balance on approval.
    pub use_balance_payment: bool,
}

/// An order about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Member who reported the order.
    pub reporter_id: MemberId,
    /// Customer being served.
    pub customer_id: CustomerId,
    /// Service category.
    pub category_id: CategoryId,
    /// Game or project the session was for.
    pub project_category: String,
    /// Session start.
    pub start_time: DateTime<Utc>,
    /// Session end.
    pub end_time: DateTime<Utc>,
    /// Billed hours.
    pub duration_hours: Decimal,
    /// Notes visible to the customer.
    pub service_notes: Option<String>,
    /// Notes for staff only.
    pub internal_notes: Option<String>,
    /// General order notes.
    pub order_notes: Option<String>,
    /// When the order was reported.
    pub report_time: DateTime<Utc>,
    /// Settle from the customer's prepaid balance on approval.
    pub use_balance_payment: bool,
}

impl OrderDraft {
    /// Attaches the store-assigned id.
    #[must_use]
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            reporter_id: self.reporter_id,
            customer_id: self.customer_id,
            category_id: self.category_id,
            project_category: self.project_category,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_hours: self.duration_hours,
            service_notes: self.service_notes,
            internal_notes: self.internal_notes,
            order_notes: self.order_notes,
            report_time: self.report_time,
            use_balance_payment: self.use_balance_payment,
        }
    }
}

/// Pricing record attached 1:1 to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    /// The priced order.
    pub order_id: OrderId,
    /// Price per hour.
    pub unit_price: Decimal,
    /// `unit_price × duration_hours`.
    pub total_price: Decimal,
    /// Exclusive-service discount.
    pub discount_amount: Decimal,
    /// `total_price - discount_amount`.
    pub final_price: Decimal,
    /// Whether the exclusive-service discount applies.
    pub exclusive_discount: bool,
}

impl OrderPricing {
    /// Builds the record from a computed breakdown.
    #[must_use]
    pub fn from_breakdown(order_id: OrderId, breakdown: PriceBreakdown) -> Self {
        Self {
            order_id,
            unit_price: breakdown.unit_price,
            total_price: breakdown.total_price,
            discount_amount: breakdown.discount_amount,
            final_price: breakdown.final_price,
            exclusive_discount: breakdown.exclusive_discount,
        }
    }
}

/// Input for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    /// Customer being served.
    pub customer_id: CustomerId,
    /// Service category.
    pub category_id: CategoryId,
    /// Game or project the session was for.
    pub project_category: String,
    /// Session start.
    pub start_time: DateTime<Utc>,
    /// Session end.
    pub end_time: DateTime<Utc>,
    /// Billed hours.
    pub duration_hours: Decimal,
    /// Price per hour.
    pub unit_price: Decimal,
    /// Whether the exclusive-service discount applies.
    #[serde(default)]
    pub exclusive_discount: bool,
    /// Settle from the customer's prepaid balance on approval.
    #[serde(default)]
    pub use_balance_payment: bool,
    /// Notes visible to the customer.
    pub service_notes: Option<String>,
    /// Notes for staff only.
    pub internal_notes: Option<String>,
    /// General order notes.
    pub order_notes: Option<String>,
}

impl NewOrder {
    /// Checks the input before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Validation` describing the first bad field.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.project_category.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "project category is required".to_string(),
            ));
        }
        if self.duration_hours <= Decimal::ZERO {
            return Err(WorkflowError::Validation(
                "duration must be positive".to_string(),
            ));
        }
        validate_unit_price(self.unit_price)?;
        validate_schedule(self.start_time, self.end_time)
    }

    /// Converts the input into an order draft. Pricing fields are not carried.
    #[must_use]
    pub fn into_draft(self, reporter_id: MemberId, report_time: DateTime<Utc>) -> OrderDraft {
        OrderDraft {
            reporter_id,
            customer_id: self.customer_id,
            category_id: self.category_id,
            project_category: self.project_category.trim().to_string(),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_hours: self.duration_hours,
            service_notes: self.service_notes,
            internal_notes: self.internal_notes,
            order_notes: self.order_notes,
            report_time,
            use_balance_payment: self.use_balance_payment,
        }
    }
}

/// Partial update of a pending order. `None` leaves a field unchanged.
///
/// Notes are doubly optional: an explicit JSON `null` deserializes to
/// `Some(None)` and clears the note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPatch {
    /// New project category.
    pub project_category: Option<String>,
    /// New session start.
    pub start_time: Option<DateTime<Utc>>,
    /// New session end.
    pub end_time: Option<DateTime<Utc>>,
    /// New price per hour; triggers repricing.
    pub unit_price: Option<Decimal>,
    /// New discount flag; triggers repricing.
    pub exclusive_discount: Option<bool>,
    /// New customer-visible notes.
    #[serde(default, deserialize_with = "present")]
    pub service_notes: Option<Option<String>>,
    /// New internal notes.
    #[serde(default, deserialize_with = "present")]
    pub internal_notes: Option<Option<String>>,
    /// New order notes.
    #[serde(default, deserialize_with = "present")]
    pub order_notes: Option<Option<String>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl OrderPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if the patch changes a pricing input.
    #[must_use]
    pub fn reprices(&self) -> bool {
        self.unit_price.is_some() || self.exclusive_discount.is_some()
    }

    /// Applies the non-pricing fields to `order` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Validation` if the patched order would be
    /// invalid; `order` is left unchanged in that case.
    pub fn apply(&self, order: &mut Order) -> Result<(), WorkflowError> {
        let mut patched = order.clone();
        if let Some(category) = &self.project_category {
            if category.trim().is_empty() {
                return Err(WorkflowError::Validation(
                    "project category is required".to_string(),
                ));
            }
            patched.project_category = category.trim().to_string();
        }
        if let Some(start) = self.start_time {
            patched.start_time = start;
        }
        if let Some(end) = self.end_time {
            patched.end_time = end;
        }
        validate_schedule(patched.start_time, patched.end_time)?;
        if let Some(price) = self.unit_price {
            validate_unit_price(price)?;
        }
        if let Some(notes) = &self.service_notes {
            patched.service_notes.clone_from(notes);
        }
        if let Some(notes) = &self.internal_notes {
            patched.internal_notes.clone_from(notes);
        }
        if let Some(notes) = &self.order_notes {
            patched.order_notes.clone_from(notes);
        }
        *order = patched;
        Ok(())
    }
}

fn validate_unit_price(unit_price: Decimal) -> Result<(), WorkflowError> {
    if unit_price <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "unit price must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), WorkflowError> {
    if end <= start {
        return Err(WorkflowError::Validation(
            "end time must be after start time".to_string(),
        ));
    }
    Ok(())
}

/// An order with all of its 1:1 records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    /// The order.
    pub order: Order,
    /// Its pricing.
    pub pricing: OrderPricing,
    /// Its workflow state.
    pub workflow: OrderWorkflow,
    /// Its payment record, if one was written.
    pub payment: Option<OrderPaymentInfo>,
}

/// What a batch run does to each order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    /// Approve every order.
    Approve,
    /// Reject every order with the same reason.
    Reject,
}

impl BatchAction {
    /// Parses `approve` or `reject`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// One order that a batch run could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// The token as submitted.
    pub order_id: String,
    /// Why it failed.
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// True when every order succeeded.
    pub success: bool,
    /// Orders committed.
    pub success_count: usize,
    /// Orders that failed.
    pub failure_count: usize,
    /// Per-order failures in input order.
    pub failures: Vec<BatchFailure>,
}

impl BatchResult {
    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_failure(&mut self, token: &str, error: &WorkflowError) {
        self.failure_count += 1;
        self.failures.push(BatchFailure {
            order_id: token.to_string(),
            error: error.to_string(),
        });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.success = self.failure_count == 0;
        self
    }
}

//! Persistence boundary for order operations.
//!
//! Every service operation runs inside one [`OrderUnitOfWork`]: all reads and
//! writes of the operation either commit together or not at all. `lock_*`
//! reads take an exclusive row lock held until the unit ends, which is what
//! serializes concurrent approvals of the same order and concurrent debits of
//! the same customer.

use async_trait::async_trait;
use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};
use tracing::warn;

use crate::history::NewApprovalHistory;
use crate::order::types::{Order, OrderDraft, OrderPricing};
use crate::settlement::recharge::NewRechargeRecord;
use crate::settlement::types::{CustomerFinancialInfo, CustomerPreferences, OrderPaymentInfo};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::OrderWorkflow;

/// Opens units of work.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// The unit of work type.
    type Unit: OrderUnitOfWork;

    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Self::Unit, WorkflowError>;
}

/// Reads and writes inside one atomic unit.
#[async_trait]
pub trait OrderUnitOfWork: Send {
    /// Loads an order.
    async fn get_order(&mut self, id: OrderId) -> Result<Option<Order>, WorkflowError>;

    /// Loads an order's pricing.
    async fn get_pricing(&mut self, id: OrderId) -> Result<Option<OrderPricing>, WorkflowError>;

    /// Loads an order's workflow without locking it.
    async fn get_workflow(&mut self, id: OrderId) -> Result<Option<OrderWorkflow>, WorkflowError>;

    /// Loads an order's workflow and locks it for the rest of the unit.
    async fn lock_workflow(&mut self, id: OrderId)
    -> Result<Option<OrderWorkflow>, WorkflowError>;

    /// Loads an order's payment record.
    async fn get_payment_info(
        &mut self,
        id: OrderId,
    ) -> Result<Option<OrderPaymentInfo>, WorkflowError>;

    /// Loads a customer's financial record without locking it.
    async fn get_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError>;

    /// Creates an empty financial record for the customer unless one exists.
    ///
    /// Lets concurrent first recharges serialize on the row lock instead of
    /// each inserting their own record.
    async fn ensure_financial_info(&mut self, customer_id: CustomerId) -> Result<(), WorkflowError>;

    /// Loads a customer's financial record and locks it for the rest of the unit.
    async fn lock_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError>;

    /// Loads a customer's preferences.
    async fn get_preferences(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerPreferences>, WorkflowError>;

    /// Returns a member's display name.
    async fn get_operator_name(
        &mut self,
        member_id: MemberId,
    ) -> Result<Option<String>, WorkflowError>;

    /// Returns true if the customer exists.
    async fn customer_exists(&mut self, customer_id: CustomerId) -> Result<bool, WorkflowError>;

    /// Returns true if the category exists.
    async fn category_exists(&mut self, category_id: CategoryId) -> Result<bool, WorkflowError>;

    /// Inserts an order and returns it with its assigned id.
    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, WorkflowError>;

    /// Inserts an order's pricing.
    async fn insert_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError>;

    /// Inserts an order's workflow.
    async fn insert_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError>;

    /// Inserts an order's payment record.
    async fn insert_payment_info(&mut self, payment: &OrderPaymentInfo)
    -> Result<(), WorkflowError>;

    /// Overwrites an order.
    async fn save_order(&mut self, order: &Order) -> Result<(), WorkflowError>;

    /// Overwrites an order's pricing.
    async fn save_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError>;

    /// Overwrites an order's workflow.
    async fn save_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError>;

    /// Inserts or overwrites an order's payment record.
    async fn save_payment_info(&mut self, payment: &OrderPaymentInfo)
    -> Result<(), WorkflowError>;

    /// Inserts or overwrites a customer's financial record.
    async fn save_financial_info(
        &mut self,
        financial: &CustomerFinancialInfo,
    ) -> Result<(), WorkflowError>;

    /// Appends an approval history entry.
    async fn append_history(&mut self, entry: NewApprovalHistory) -> Result<(), WorkflowError>;

    /// Appends a recharge history row.
    async fn append_recharge(&mut self, record: NewRechargeRecord) -> Result<(), WorkflowError>;

    /// Makes every write of the unit durable.
    async fn commit(self) -> Result<(), WorkflowError>;

    /// Discards every write of the unit.
    async fn rollback(self) -> Result<(), WorkflowError>;
}

/// Ends a unit according to the operation's result.
///
/// `Ok` commits; a failed commit is returned instead of the value. `Err`
/// rolls back and returns the original error. A failed rollback is only
/// logged since the store discards the unit anyway.
///
/// # Errors
///
/// Returns the operation's error, or the commit error.
pub async fn finish_unit<U, T>(
    unit: U,
    result: Result<T, WorkflowError>,
) -> Result<T, WorkflowError>
where
    U: OrderUnitOfWork,
{
    match result {
        Ok(value) => {
            unit.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back unit of work");
            }
            Err(err)
        }
    }
}

//! Order approval service.
//!
//! Orchestrates pricing, the workflow state machine, settlement and the audit
//! trail over an [`OrderStore`]. Each public operation is one unit of work.

use chrono::Utc;
use playdesk_shared::types::{MemberId, OrderId};
use tracing::{info, warn};

use crate::history::ApprovalHistoryRecorder;
use crate::order::store::{OrderStore, OrderUnitOfWork, finish_unit};
use crate::order::types::{
    BatchAction, BatchResult, NewOrder, OrderDetails, OrderPatch, OrderPricing,
};
use crate::pricing::PricingCalculator;
use crate::settlement::engine::SettlementEngine;
use crate::settlement::types::{OrderPaymentInfo, PaymentStatus, PaymentSummary};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{OrderStatus, OrderWorkflow, WorkflowAction};

/// Order approval service.
pub struct OrderApprovalService<S> {
    store: S,
    pricing: PricingCalculator,
}

impl<S: OrderStore> OrderApprovalService<S> {
    /// Creates a service over `store`.
    #[must_use]
    pub const fn new(store: S, pricing: PricingCalculator) -> Self {
        Self { store, pricing }
    }

    /// Creates a pending order with its pricing, workflow and payment records.
    ///
    /// # Errors
    ///
    /// - `Validation` for bad input
    /// - `CustomerNotFound` / `CategoryNotFound` for unknown references
    /// - `Database` if the store fails
    pub async fn create_order(
        &self,
        reporter_id: MemberId,
        input: NewOrder,
    ) -> Result<OrderDetails, WorkflowError> {
        input.validate()?;
        let mut unit = self.store.begin().await?;
        let result = self.create_in(&mut unit, reporter_id, input).await;
        let details = finish_unit(unit, result).await?;
        info!(order_id = %details.order.id, reporter_id = %reporter_id, "Order created");
        Ok(details)
    }

    async fn create_in(
        &self,
        unit: &mut S::Unit,
        reporter_id: MemberId,
        input: NewOrder,
    ) -> Result<OrderDetails, WorkflowError> {
        if !unit.customer_exists(input.customer_id).await? {
            return Err(WorkflowError::CustomerNotFound(input.customer_id));
        }
        if !unit.category_exists(input.category_id).await? {
            return Err(WorkflowError::CategoryNotFound(input.category_id));
        }

        let breakdown =
            self.pricing
                .calculate(input.unit_price, input.duration_hours, input.exclusive_discount);
        let order = unit
            .insert_order(input.into_draft(reporter_id, Utc::now()))
            .await?;

        let pricing = OrderPricing::from_breakdown(order.id, breakdown);
        let workflow = OrderWorkflow::pending(order.id);
        let payment = OrderPaymentInfo::pending(order.id, pricing.final_price);
        unit.insert_pricing(&pricing).await?;
        unit.insert_workflow(&workflow).await?;
        unit.insert_payment_info(&payment).await?;

        Ok(OrderDetails {
            order,
            pricing,
            workflow,
            payment: Some(payment),
        })
    }

    /// Edits a pending order, repricing it when the unit price or discount
    /// flag changes.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order does not exist
    /// - `OrderNotEditable` if it is no longer pending
    /// - `Validation` if the patch is empty or invalid
    /// - `Database` if the store fails
    pub async fn update_order(
        &self,
        order_id: OrderId,
        patch: OrderPatch,
    ) -> Result<OrderDetails, WorkflowError> {
        if patch.is_empty() {
            return Err(WorkflowError::Validation("nothing to update".to_string()));
        }
        let mut unit = self.store.begin().await?;
        let result = self.update_in(&mut unit, order_id, &patch).await;
        let details = finish_unit(unit, result).await?;
        info!(order_id = %order_id, "Order updated");
        Ok(details)
    }

    async fn update_in(
        &self,
        unit: &mut S::Unit,
        order_id: OrderId,
        patch: &OrderPatch,
    ) -> Result<OrderDetails, WorkflowError> {
        let workflow = unit
            .lock_workflow(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        WorkflowService::ensure_editable(workflow.status)?;

        let mut order = unit
            .get_order(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let mut pricing = unit
            .get_pricing(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let mut payment = unit.get_payment_info(order_id).await?;

        patch.apply(&mut order)?;
        unit.save_order(&order).await?;

        if patch.reprices() {
            let breakdown = self.pricing.calculate(
                patch.unit_price.unwrap_or(pricing.unit_price),
                order.duration_hours,
                patch.exclusive_discount.unwrap_or(pricing.exclusive_discount),
            );
            pricing = OrderPricing::from_breakdown(order_id, breakdown);
            unit.save_pricing(&pricing).await?;

            if let Some(payment) = payment
                .as_mut()
                .filter(|p| p.payment_status == PaymentStatus::Pending)
            {
                payment.payment_amount = pricing.final_price;
                unit.save_payment_info(payment).await?;
            }
        }

        Ok(OrderDetails {
            order,
            pricing,
            workflow,
            payment,
        })
    }

    /// Loads an order with all of its records.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order does not exist
    /// - `Database` if the store fails
    pub async fn get_order_details(&self, order_id: OrderId) -> Result<OrderDetails, WorkflowError> {
        let mut unit = self.store.begin().await?;
        let result = Self::details_in(&mut unit, order_id).await;
        finish_unit(unit, result).await
    }

    async fn details_in(
        unit: &mut S::Unit,
        order_id: OrderId,
    ) -> Result<OrderDetails, WorkflowError> {
        let order = unit
            .get_order(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let pricing = unit
            .get_pricing(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let workflow = unit
            .get_workflow(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let payment = unit.get_payment_info(order_id).await?;
        Ok(OrderDetails {
            order,
            pricing,
            workflow,
            payment,
        })
    }

    /// Approves a pending order and settles its payment.
    ///
    /// With balance payment the customer's discount is applied and the
    /// balance is debited under a row lock; otherwise the order is marked
    /// paid directly.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order does not exist
    /// - `InvalidTransition` if it is not pending
    /// - `OperatorNotFound` if the operator does not exist
    /// - `FinancialRecordMissing` / `PreferencesMissing` for balance payment
    ///   without the customer's records
    /// - `InsufficientBalance` if the balance does not cover the charge
    /// - `Database` if the store fails
    pub async fn approve_order(
        &self,
        order_id: OrderId,
        operator_id: MemberId,
        notes: Option<String>,
    ) -> Result<PaymentSummary, WorkflowError> {
        let mut unit = self.store.begin().await?;
        let result = Self::approve_in(&mut unit, order_id, operator_id, notes).await;
        let summary = finish_unit(unit, result).await?;
        info!(
            order_id = %order_id,
            operator_id = %operator_id,
            method = %summary.method,
            amount = %summary.actual_amount,
            "Order approved"
        );
        Ok(summary)
    }

    async fn approve_in(
        unit: &mut S::Unit,
        order_id: OrderId,
        operator_id: MemberId,
        notes: Option<String>,
    ) -> Result<PaymentSummary, WorkflowError> {
        let mut workflow = unit
            .lock_workflow(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let from_status = workflow.status;
        let action = WorkflowService::approve(from_status, operator_id, notes)?;
        let operator_name = operator_name(unit, operator_id).await?;

        let order = unit
            .get_order(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let pricing = unit
            .get_pricing(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let mut payment = unit
            .get_payment_info(order_id)
            .await?
            .unwrap_or_else(|| OrderPaymentInfo::pending(order_id, pricing.final_price));

        let paid_at = action.occurred_at();
        let summary = if order.use_balance_payment {
            let mut financial = unit
                .lock_financial_info(order.customer_id)
                .await?
                .ok_or(WorkflowError::FinancialRecordMissing(order.customer_id))?;
            let preferences = unit
                .get_preferences(order.customer_id)
                .await?
                .ok_or(WorkflowError::PreferencesMissing(order.customer_id))?;
            let summary = SettlementEngine::settle_from_balance(
                pricing.final_price,
                &mut financial,
                &preferences,
                &mut payment,
                paid_at,
            )?;
            unit.save_financial_info(&financial).await?;
            summary
        } else {
            SettlementEngine::settle_direct(pricing.final_price, &mut payment, paid_at)
        };
        unit.save_payment_info(&payment).await?;

        workflow.apply(&action);
        unit.save_workflow(&workflow).await?;
        ApprovalHistoryRecorder::record(unit, order_id, &operator_name, from_status, &action)
            .await?;

        Ok(summary)
    }

    /// Rejects a pending order.
    ///
    /// # Errors
    ///
    /// - `RejectionReasonRequired` if the reason is blank
    /// - `OrderNotFound` if the order does not exist
    /// - `InvalidTransition` if it is not pending
    /// - `OperatorNotFound` if the operator does not exist
    /// - `Database` if the store fails
    pub async fn reject_order(
        &self,
        order_id: OrderId,
        operator_id: MemberId,
        reason: String,
        notes: Option<String>,
    ) -> Result<OrderWorkflow, WorkflowError> {
        if reason.trim().is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }
        let mut unit = self.store.begin().await?;
        let result = Self::transition_in(&mut unit, order_id, operator_id, |status| {
            WorkflowService::reject(status, operator_id, reason, notes)
        })
        .await;
        let workflow = finish_unit(unit, result).await?;
        info!(order_id = %order_id, operator_id = %operator_id, "Order rejected");
        Ok(workflow)
    }

    /// Sets an order's status administratively, bypassing the approve/reject
    /// rules. No settlement or refund happens.
    ///
    /// # Errors
    ///
    /// - `RejectionReasonRequired` when moving to `Rejected` without a reason
    /// - `OrderNotFound` if the order does not exist
    /// - `OperatorNotFound` if the operator does not exist
    /// - `Database` if the store fails
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        operator_id: MemberId,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<OrderWorkflow, WorkflowError> {
        let mut unit = self.store.begin().await?;
        let result = Self::transition_in(&mut unit, order_id, operator_id, |status| {
            WorkflowService::set_status(status, new_status, operator_id, reason, notes)
        })
        .await;
        let workflow = finish_unit(unit, result).await?;
        info!(
            order_id = %order_id,
            operator_id = %operator_id,
            status = %new_status,
            "Order status changed"
        );
        Ok(workflow)
    }

    async fn transition_in<F>(
        unit: &mut S::Unit,
        order_id: OrderId,
        operator_id: MemberId,
        decide: F,
    ) -> Result<OrderWorkflow, WorkflowError>
    where
        F: FnOnce(OrderStatus) -> Result<WorkflowAction, WorkflowError> + Send,
    {
        let mut workflow = unit
            .lock_workflow(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let from_status = workflow.status;
        let action = decide(from_status)?;
        let operator_name = operator_name(unit, operator_id).await?;

        workflow.apply(&action);
        unit.save_workflow(&workflow).await?;
        ApprovalHistoryRecorder::record(unit, order_id, &operator_name, from_status, &action)
            .await?;

        Ok(workflow)
    }

    /// Approves or rejects each order in turn, each in its own unit of work.
    ///
    /// A failing order is reported and skipped; orders already processed
    /// stay committed. Tokens that are not valid order ids fail with
    /// `InvalidOrderId`.
    ///
    /// # Errors
    ///
    /// Returns `Database` and stops at the first store failure; orders
    /// committed before it stay committed.
    pub async fn batch_approve(
        &self,
        order_ids: &[String],
        action: BatchAction,
        reason: Option<String>,
        notes: Option<String>,
        operator_id: MemberId,
    ) -> Result<BatchResult, WorkflowError> {
        let mut result = BatchResult::default();

        for token in order_ids {
            let outcome = match token.parse::<OrderId>() {
                Err(_) => Err(WorkflowError::InvalidOrderId(token.clone())),
                Ok(order_id) => match action {
                    BatchAction::Approve => self
                        .approve_order(order_id, operator_id, notes.clone())
                        .await
                        .map(|_| ()),
                    BatchAction::Reject => self
                        .reject_order(
                            order_id,
                            operator_id,
                            reason.clone().unwrap_or_default(),
                            notes.clone(),
                        )
                        .await
                        .map(|_| ()),
                },
            };

            match outcome {
                Ok(()) => result.record_success(),
                Err(e) if e.is_systemic() => {
                    warn!(
                        order_id = %token,
                        succeeded = result.success_count,
                        error = %e,
                        "Batch aborted on store failure"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(order_id = %token, error = %e, "Batch item failed");
                    result.record_failure(token, &e);
                }
            }
        }

        info!(
            action = ?action,
            operator_id = %operator_id,
            succeeded = result.success_count,
            failed = result.failure_count,
            "Batch processed"
        );
        Ok(result.finish())
    }
}

async fn operator_name<U: OrderUnitOfWork>(
    unit: &mut U,
    operator_id: MemberId,
) -> Result<String, WorkflowError> {
    unit.get_operator_name(operator_id)
        .await?
        .ok_or(WorkflowError::OperatorNotFound(operator_id))
}

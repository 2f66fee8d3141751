//! Customer balance operations.

use chrono::Utc;
use playdesk_shared::types::{CustomerId, MemberId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::order::store::{OrderStore, OrderUnitOfWork, finish_unit};
use crate::settlement::recharge::{NewRechargeRecord, RechargeCredit, apply_recharge};
use crate::settlement::types::CustomerFinancialInfo;
use crate::workflow::error::WorkflowError;

/// Input for a recharge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RechargeRequest {
    /// Real money paid in.
    pub real_amount: Decimal,
    /// Bonus credit.
    #[serde(default)]
    pub gift_amount: Decimal,
    /// Payment channel.
    pub payment_channel: Option<String>,
    /// External transaction reference.
    pub transaction_ref: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Result of a recharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RechargeOutcome {
    /// Real amount credited.
    pub real_amount: Decimal,
    /// Gift amount credited.
    pub gift_amount: Decimal,
    /// Total credited to the balance.
    pub total_amount: Decimal,
    /// The account after the credit.
    pub account: CustomerFinancialInfo,
}

impl RechargeOutcome {
    fn new(credit: RechargeCredit, account: CustomerFinancialInfo) -> Self {
        Self {
            real_amount: credit.real_amount,
            gift_amount: credit.gift_amount,
            total_amount: credit.total_amount,
            account,
        }
    }
}

/// Customer balance service.
pub struct CustomerAccountService<S> {
    store: S,
}

impl<S: OrderStore> CustomerAccountService<S> {
    /// Creates a service over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Credits a recharge, creating the financial record on first use.
    ///
    /// The financial row is locked for the unit, so a recharge and a balance
    /// approval of the same customer serialize.
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive real amount or negative gift
    /// - `CustomerNotFound` if the customer does not exist
    /// - `Database` if the store fails
    pub async fn recharge(
        &self,
        customer_id: CustomerId,
        operator_id: MemberId,
        request: RechargeRequest,
    ) -> Result<RechargeOutcome, WorkflowError> {
        let mut unit = self.store.begin().await?;
        let result = Self::recharge_in(&mut unit, customer_id, operator_id, request).await;
        let outcome = finish_unit(unit, result).await?;
        info!(
            customer_id = %customer_id,
            operator_id = %operator_id,
            amount = %outcome.total_amount,
            balance = %outcome.account.current_balance,
            "Customer recharged"
        );
        Ok(outcome)
    }

    async fn recharge_in(
        unit: &mut S::Unit,
        customer_id: CustomerId,
        operator_id: MemberId,
        request: RechargeRequest,
    ) -> Result<RechargeOutcome, WorkflowError> {
        if !unit.customer_exists(customer_id).await? {
            return Err(WorkflowError::CustomerNotFound(customer_id));
        }
        unit.ensure_financial_info(customer_id).await?;
        let mut account = unit
            .lock_financial_info(customer_id)
            .await?
            .unwrap_or_else(|| CustomerFinancialInfo::empty(customer_id));

        let credit = apply_recharge(&mut account, request.real_amount, request.gift_amount)?;
        unit.save_financial_info(&account).await?;
        unit.append_recharge(NewRechargeRecord {
            customer_id,
            real_amount: credit.real_amount,
            gift_amount: credit.gift_amount,
            total_amount: credit.total_amount,
            balance_after: account.current_balance,
            payment_channel: request.payment_channel,
            transaction_ref: request.transaction_ref,
            notes: request.notes,
            operator_id,
            recharged_at: Utc::now(),
        })
        .await?;

        Ok(RechargeOutcome::new(credit, account))
    }

    /// Returns a customer's financial record.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    /// - `FinancialRecordMissing` if the customer was never recharged
    /// - `Database` if the store fails
    pub async fn financial_info(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerFinancialInfo, WorkflowError> {
        let mut unit = self.store.begin().await?;
        let result = Self::financial_in(&mut unit, customer_id).await;
        finish_unit(unit, result).await
    }

    async fn financial_in(
        unit: &mut S::Unit,
        customer_id: CustomerId,
    ) -> Result<CustomerFinancialInfo, WorkflowError> {
        if !unit.customer_exists(customer_id).await? {
            return Err(WorkflowError::CustomerNotFound(customer_id));
        }
        unit.get_financial_info(customer_id)
            .await?
            .ok_or(WorkflowError::FinancialRecordMissing(customer_id))
    }
}

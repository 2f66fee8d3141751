//! In-memory store for service tests.
//!
//! A unit holds the store mutex for its whole lifetime and works on a copy of
//! the state, which replaces the shared state on commit. That gives the same
//! all-or-nothing and serialization guarantees as the row-locked database
//! store, at coarser granularity.

use async_trait::async_trait;
use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::history::{ApprovalHistoryEntry, NewApprovalHistory};
use crate::order::store::{OrderStore, OrderUnitOfWork};
use crate::order::types::{Order, OrderDraft, OrderPricing};
use crate::settlement::recharge::NewRechargeRecord;
use crate::settlement::types::{CustomerFinancialInfo, CustomerPreferences, OrderPaymentInfo};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::OrderWorkflow;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub next_order_id: i64,
    pub orders: BTreeMap<OrderId, Order>,
    pub pricing: BTreeMap<OrderId, OrderPricing>,
    pub workflows: BTreeMap<OrderId, OrderWorkflow>,
    pub payments: BTreeMap<OrderId, OrderPaymentInfo>,
    pub financial: BTreeMap<CustomerId, CustomerFinancialInfo>,
    pub preferences: BTreeMap<CustomerId, CustomerPreferences>,
    pub customers: BTreeSet<CustomerId>,
    pub categories: BTreeSet<CategoryId>,
    pub members: BTreeMap<MemberId, String>,
    pub history: Vec<ApprovalHistoryEntry>,
    pub recharges: Vec<NewRechargeRecord>,
    /// Orders whose history append fails with a store error.
    pub broken_history: BTreeSet<OrderId>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(state: MemoryState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn update(&self, f: impl FnOnce(&mut MemoryState)) {
        f(&mut *self.state.lock().await);
    }
}

pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl OrderStore for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> Result<MemoryUnit, WorkflowError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryUnit { guard, work })
    }
}

#[async_trait]
impl OrderUnitOfWork for MemoryUnit {
    async fn get_order(&mut self, id: OrderId) -> Result<Option<Order>, WorkflowError> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn get_pricing(&mut self, id: OrderId) -> Result<Option<OrderPricing>, WorkflowError> {
        Ok(self.work.pricing.get(&id).cloned())
    }

    async fn get_workflow(&mut self, id: OrderId) -> Result<Option<OrderWorkflow>, WorkflowError> {
        Ok(self.work.workflows.get(&id).cloned())
    }

    async fn lock_workflow(
        &mut self,
        id: OrderId,
    ) -> Result<Option<OrderWorkflow>, WorkflowError> {
        self.get_workflow(id).await
    }

    async fn get_payment_info(
        &mut self,
        id: OrderId,
    ) -> Result<Option<OrderPaymentInfo>, WorkflowError> {
        Ok(self.work.payments.get(&id).cloned())
    }

    async fn get_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError> {
        Ok(self.work.financial.get(&customer_id).cloned())
    }

    async fn ensure_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<(), WorkflowError> {
        self.work
            .financial
            .entry(customer_id)
            .or_insert_with(|| CustomerFinancialInfo::empty(customer_id));
        Ok(())
    }

    async fn lock_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError> {
        self.get_financial_info(customer_id).await
    }

    async fn get_preferences(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerPreferences>, WorkflowError> {
        Ok(self.work.preferences.get(&customer_id).cloned())
    }

    async fn get_operator_name(
        &mut self,
        member_id: MemberId,
    ) -> Result<Option<String>, WorkflowError> {
        Ok(self.work.members.get(&member_id).cloned())
    }

    async fn customer_exists(&mut self, customer_id: CustomerId) -> Result<bool, WorkflowError> {
        Ok(self.work.customers.contains(&customer_id))
    }

    async fn category_exists(&mut self, category_id: CategoryId) -> Result<bool, WorkflowError> {
        Ok(self.work.categories.contains(&category_id))
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, WorkflowError> {
        self.work.next_order_id += 1;
        let order = draft.into_order(OrderId(self.work.next_order_id));
        self.work.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn insert_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError> {
        self.work.pricing.insert(pricing.order_id, pricing.clone());
        Ok(())
    }

    async fn insert_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError> {
        self.work.workflows.insert(workflow.order_id, workflow.clone());
        Ok(())
    }

    async fn insert_payment_info(
        &mut self,
        payment: &OrderPaymentInfo,
    ) -> Result<(), WorkflowError> {
        self.save_payment_info(payment).await
    }

    async fn save_order(&mut self, order: &Order) -> Result<(), WorkflowError> {
        self.work.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn save_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError> {
        self.insert_pricing(pricing).await
    }

    async fn save_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError> {
        self.insert_workflow(workflow).await
    }

    async fn save_payment_info(
        &mut self,
        payment: &OrderPaymentInfo,
    ) -> Result<(), WorkflowError> {
        self.work.payments.insert(payment.order_id, payment.clone());
        Ok(())
    }

    async fn save_financial_info(
        &mut self,
        financial: &CustomerFinancialInfo,
    ) -> Result<(), WorkflowError> {
        self.work
            .financial
            .insert(financial.customer_id, financial.clone());
        Ok(())
    }

    async fn append_history(&mut self, entry: NewApprovalHistory) -> Result<(), WorkflowError> {
        if self.work.broken_history.contains(&entry.order_id) {
            return Err(WorkflowError::Database("history table unavailable".to_string()));
        }
        let id = i64::try_from(self.work.history.len()).unwrap_or(i64::MAX) + 1;
        self.work.history.push(ApprovalHistoryEntry { id, entry });
        Ok(())
    }

    async fn append_recharge(&mut self, record: NewRechargeRecord) -> Result<(), WorkflowError> {
        self.work.recharges.push(record);
        Ok(())
    }

    async fn commit(mut self) -> Result<(), WorkflowError> {
        *self.guard = self.work;
        Ok(())
    }

    async fn rollback(self) -> Result<(), WorkflowError> {
        Ok(())
    }
}

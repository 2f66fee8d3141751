//! `SeaORM` implementation of the order store.
//!
//! A unit of work is one database transaction. `lock_*` reads use
//! `SELECT ... FOR UPDATE`, so the row stays locked until commit or rollback.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    NotSet, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use playdesk_core::history::NewApprovalHistory;
use playdesk_core::order::{Order, OrderDraft, OrderPricing, OrderStore, OrderUnitOfWork};
use playdesk_core::settlement::{
    CustomerFinancialInfo, CustomerPreferences, NewRechargeRecord, OrderPaymentInfo,
};
use playdesk_core::workflow::{OrderWorkflow, WorkflowError};
use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};

use crate::entities::{
    customer_financial_info, customer_preferences, customer_recharge_history, customers,
    internal_members, order_approval_history, order_categories, order_payment_info,
    order_pricing, order_workflow, orders,
};

pub(crate) fn store_err(e: DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

pub(crate) fn utc(ts: DateTime<FixedOffset>) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

pub(crate) fn order_from_model(model: orders::Model) -> Order {
    Order {
        id: OrderId(model.id),
        reporter_id: MemberId(model.reporter_id),
        customer_id: CustomerId(model.customer_id),
        category_id: CategoryId(model.order_category_id),
        project_category: model.project_category,
        start_time: utc(model.start_time),
        end_time: utc(model.end_time),
        duration_hours: model.duration_hours,
        service_notes: model.service_additional_info,
        internal_notes: model.internal_notes,
        order_notes: model.order_notes,
        report_time: utc(model.report_time),
        use_balance_payment: model.use_balance_payment,
    }
}

pub(crate) fn pricing_from_model(model: order_pricing::Model) -> OrderPricing {
    OrderPricing {
        order_id: OrderId(model.order_id),
        unit_price: model.unit_price,
        total_price: model.total_price,
        discount_amount: model.discount_amount,
        final_price: model.final_price,
        exclusive_discount: model.exclusive_discount,
    }
}

pub(crate) fn workflow_from_model(model: order_workflow::Model) -> OrderWorkflow {
    OrderWorkflow {
        order_id: OrderId(model.order_id),
        status: model.status.into(),
        approver_id: model.approver_id.map(MemberId),
        approval_time: model.approval_time.map(utc),
        rejection_reason: model.rejection_reason,
    }
}

pub(crate) fn payment_from_model(model: order_payment_info::Model) -> OrderPaymentInfo {
    OrderPaymentInfo {
        order_id: OrderId(model.order_id),
        payment_amount: model.payment_amount,
        payment_method: model.payment_method.map(Into::into),
        payment_status: model.payment_status.into(),
        payment_time: model.payment_time.map(utc),
        transaction_ref: model.transaction_id,
    }
}

pub(crate) fn financial_from_model(model: customer_financial_info::Model) -> CustomerFinancialInfo {
    CustomerFinancialInfo {
        customer_id: CustomerId(model.customer_id),
        total_real_charge: model.total_real_charge,
        total_consumption: model.total_consumption,
        current_balance: model.current_balance,
    }
}

/// Order store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmOrderStore {
    db: DatabaseConnection,
}

impl SeaOrmOrderStore {
    /// Creates a store over `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for SeaOrmOrderStore {
    type Unit = SeaOrmUnit;

    async fn begin(&self) -> Result<SeaOrmUnit, WorkflowError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        Ok(SeaOrmUnit { txn })
    }
}

/// One database transaction.
pub struct SeaOrmUnit {
    txn: DatabaseTransaction,
}

#[async_trait]
impl OrderUnitOfWork for SeaOrmUnit {
    async fn get_order(&mut self, id: OrderId) -> Result<Option<Order>, WorkflowError> {
        let model = orders::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(order_from_model))
    }

    async fn get_pricing(&mut self, id: OrderId) -> Result<Option<OrderPricing>, WorkflowError> {
        let model = order_pricing::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(pricing_from_model))
    }

    async fn get_workflow(&mut self, id: OrderId) -> Result<Option<OrderWorkflow>, WorkflowError> {
        let model = order_workflow::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(workflow_from_model))
    }

    async fn lock_workflow(
        &mut self,
        id: OrderId,
    ) -> Result<Option<OrderWorkflow>, WorkflowError> {
        let model = order_workflow::Entity::find_by_id(id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(workflow_from_model))
    }

    async fn get_payment_info(
        &mut self,
        id: OrderId,
    ) -> Result<Option<OrderPaymentInfo>, WorkflowError> {
        let model = order_payment_info::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(payment_from_model))
    }

    async fn get_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError> {
        let model = customer_financial_info::Entity::find_by_id(customer_id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(financial_from_model))
    }

    async fn ensure_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<(), WorkflowError> {
        let empty = CustomerFinancialInfo::empty(customer_id);
        let model = customer_financial_info::ActiveModel {
            customer_id: Set(empty.customer_id.0),
            total_real_charge: Set(empty.total_real_charge),
            total_consumption: Set(empty.total_consumption),
            current_balance: Set(empty.current_balance),
            updated_at: Set(Utc::now().into()),
        };
        // Blocks on a concurrent uncommitted insert, then does nothing.
        customer_financial_info::Entity::insert(model)
            .on_conflict(
                OnConflict::column(customer_financial_info::Column::CustomerId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn lock_financial_info(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerFinancialInfo>, WorkflowError> {
        let model = customer_financial_info::Entity::find_by_id(customer_id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(financial_from_model))
    }

    async fn get_preferences(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerPreferences>, WorkflowError> {
        let model = customer_preferences::Entity::find_by_id(customer_id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(|m| CustomerPreferences {
            customer_id: CustomerId(m.customer_id),
            exclusive_discount_ratio: m.exclusive_discount_ratio,
        }))
    }

    async fn get_operator_name(
        &mut self,
        member_id: MemberId,
    ) -> Result<Option<String>, WorkflowError> {
        let model = internal_members::Entity::find_by_id(member_id.0)
            .filter(internal_members::Column::IsActive.eq(true))
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.map(|m| m.name))
    }

    async fn customer_exists(&mut self, customer_id: CustomerId) -> Result<bool, WorkflowError> {
        let model = customers::Entity::find_by_id(customer_id.0)
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.is_some())
    }

    async fn category_exists(&mut self, category_id: CategoryId) -> Result<bool, WorkflowError> {
        let model = order_categories::Entity::find_by_id(category_id.0)
            .filter(order_categories::Column::IsActive.eq(true))
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(model.is_some())
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, WorkflowError> {
        let now = Utc::now().into();
        let model = orders::ActiveModel {
            id: NotSet,
            reporter_id: Set(draft.reporter_id.0),
            customer_id: Set(draft.customer_id.0),
            order_category_id: Set(draft.category_id.0),
            project_category: Set(draft.project_category),
            start_time: Set(draft.start_time.into()),
            end_time: Set(draft.end_time.into()),
            duration_hours: Set(draft.duration_hours),
            service_additional_info: Set(draft.service_notes),
            internal_notes: Set(draft.internal_notes),
            order_notes: Set(draft.order_notes),
            report_time: Set(draft.report_time.into()),
            use_balance_payment: Set(draft.use_balance_payment),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.txn)
        .await
        .map_err(store_err)?;
        Ok(order_from_model(model))
    }

    async fn insert_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError> {
        pricing_active(pricing)
            .insert(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn insert_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError> {
        workflow_active(workflow)
            .insert(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn insert_payment_info(
        &mut self,
        payment: &OrderPaymentInfo,
    ) -> Result<(), WorkflowError> {
        payment_active(payment)
            .insert(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn save_order(&mut self, order: &Order) -> Result<(), WorkflowError> {
        orders::ActiveModel {
            id: Set(order.id.0),
            project_category: Set(order.project_category.clone()),
            start_time: Set(order.start_time.into()),
            end_time: Set(order.end_time.into()),
            service_additional_info: Set(order.service_notes.clone()),
            internal_notes: Set(order.internal_notes.clone()),
            order_notes: Set(order.order_notes.clone()),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn save_pricing(&mut self, pricing: &OrderPricing) -> Result<(), WorkflowError> {
        pricing_active(pricing)
            .update(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn save_workflow(&mut self, workflow: &OrderWorkflow) -> Result<(), WorkflowError> {
        workflow_active(workflow)
            .update(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn save_payment_info(
        &mut self,
        payment: &OrderPaymentInfo,
    ) -> Result<(), WorkflowError> {
        order_payment_info::Entity::insert(payment_active(payment))
            .on_conflict(
                OnConflict::column(order_payment_info::Column::OrderId)
                    .update_columns([
                        order_payment_info::Column::PaymentAmount,
                        order_payment_info::Column::PaymentMethod,
                        order_payment_info::Column::PaymentStatus,
                        order_payment_info::Column::PaymentTime,
                        order_payment_info::Column::TransactionId,
                    ])
                    .to_owned(),
            )
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn save_financial_info(
        &mut self,
        financial: &CustomerFinancialInfo,
    ) -> Result<(), WorkflowError> {
        let model = customer_financial_info::ActiveModel {
            customer_id: Set(financial.customer_id.0),
            total_real_charge: Set(financial.total_real_charge),
            total_consumption: Set(financial.total_consumption),
            current_balance: Set(financial.current_balance),
            updated_at: Set(Utc::now().into()),
        };
        customer_financial_info::Entity::insert(model)
            .on_conflict(
                OnConflict::column(customer_financial_info::Column::CustomerId)
                    .update_columns([
                        customer_financial_info::Column::TotalRealCharge,
                        customer_financial_info::Column::TotalConsumption,
                        customer_financial_info::Column::CurrentBalance,
                    ])
                    .to_owned(),
            )
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn append_history(&mut self, entry: NewApprovalHistory) -> Result<(), WorkflowError> {
        order_approval_history::ActiveModel {
            id: NotSet,
            order_id: Set(entry.order_id.0),
            operator_id: Set(entry.operator_id.0),
            operator_name: Set(entry.operator_name),
            action: Set(entry.action.into()),
            from_status: Set(entry.from_status.into()),
            to_status: Set(entry.to_status.into()),
            reason: Set(entry.reason),
            notes: Set(entry.notes),
            created_at: Set(entry.created_at.into()),
        }
        .insert(&self.txn)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn append_recharge(&mut self, record: NewRechargeRecord) -> Result<(), WorkflowError> {
        customer_recharge_history::ActiveModel {
            id: NotSet,
            customer_id: Set(record.customer_id.0),
            real_amount: Set(record.real_amount),
            gift_amount: Set(record.gift_amount),
            total_amount: Set(record.total_amount),
            balance_after: Set(record.balance_after),
            payment_channel: Set(record.payment_channel),
            transaction_ref: Set(record.transaction_ref),
            notes: Set(record.notes),
            operator_id: Set(record.operator_id.0),
            recharged_at: Set(record.recharged_at.into()),
        }
        .insert(&self.txn)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), WorkflowError> {
        self.txn.commit().await.map_err(store_err)
    }

    async fn rollback(self) -> Result<(), WorkflowError> {
        self.txn.rollback().await.map_err(store_err)
    }
}

fn pricing_active(pricing: &OrderPricing) -> order_pricing::ActiveModel {
    order_pricing::ActiveModel {
        order_id: Set(pricing.order_id.0),
        unit_price: Set(pricing.unit_price),
        total_price: Set(pricing.total_price),
        discount_amount: Set(pricing.discount_amount),
        final_price: Set(pricing.final_price),
        exclusive_discount: Set(pricing.exclusive_discount),
        updated_at: Set(Utc::now().into()),
    }
}

fn workflow_active(workflow: &OrderWorkflow) -> order_workflow::ActiveModel {
    order_workflow::ActiveModel {
        order_id: Set(workflow.order_id.0),
        status: Set(workflow.status.into()),
        approver_id: Set(workflow.approver_id.map(MemberId::into_inner)),
        approval_time: Set(workflow.approval_time.map(Into::into)),
        rejection_reason: Set(workflow.rejection_reason.clone()),
        updated_at: Set(Utc::now().into()),
    }
}

fn payment_active(payment: &OrderPaymentInfo) -> order_payment_info::ActiveModel {
    order_payment_info::ActiveModel {
        order_id: Set(payment.order_id.0),
        payment_amount: Set(payment.payment_amount),
        payment_method: Set(payment.payment_method.map(Into::into)),
        payment_status: Set(payment.payment_status.into()),
        payment_time: Set(payment.payment_time.map(Into::into)),
        transaction_id: Set(payment.transaction_ref.clone()),
        updated_at: Set(Utc::now().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums;
    use chrono::TimeZone;
    use playdesk_core::settlement::{PaymentMethod, PaymentStatus};
    use playdesk_core::workflow::OrderStatus;
    use rust_decimal_macros::dec;

    fn offset_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 1, 20, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_workflow_from_model_normalizes_to_utc() {
        let workflow = workflow_from_model(order_workflow::Model {
            order_id: 5,
            status: sea_orm_active_enums::OrderStatus::Confirmed,
            approver_id: Some(2),
            approval_time: Some(offset_time()),
            rejection_reason: None,
            updated_at: offset_time(),
        });

        assert_eq!(workflow.order_id, OrderId(5));
        assert_eq!(workflow.status, OrderStatus::Confirmed);
        assert_eq!(workflow.approver_id, Some(MemberId(2)));
        assert_eq!(
            workflow.approval_time,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_payment_from_model() {
        let payment = payment_from_model(order_payment_info::Model {
            order_id: 3,
            payment_amount: dec!(40.00),
            payment_method: Some(sea_orm_active_enums::PaymentMethod::Balance),
            payment_status: sea_orm_active_enums::PaymentStatus::Paid,
            payment_time: None,
            transaction_id: Some("tx-1".to_string()),
            updated_at: offset_time(),
        });

        assert_eq!(payment.payment_method, Some(PaymentMethod::Balance));
        assert_eq!(payment.payment_status, PaymentStatus::Paid);
        assert_eq!(payment.transaction_ref.as_deref(), Some("tx-1"));
    }

    #[test]
    fn test_store_err_is_systemic() {
        let err = store_err(DbErr::Custom("connection reset".to_string()));
        assert!(err.is_systemic());
    }
}

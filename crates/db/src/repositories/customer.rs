//! Customer account queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use playdesk_shared::types::{CustomerId, MemberId, PageRequest, PageResponse};

use crate::entities::{customer_recharge_history, customers};
use crate::store::utc;

/// One recharge as listed to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RechargeRecord {
    /// Record identifier.
    pub id: i64,
    /// Real money paid in.
    pub real_amount: Decimal,
    /// Bonus credit.
    pub gift_amount: Decimal,
    /// Credited to the balance.
    pub total_amount: Decimal,
    /// Balance after the credit.
    pub balance_after: Decimal,
    /// Payment channel.
    pub payment_channel: Option<String>,
    /// External transaction reference.
    pub transaction_ref: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Member who booked it.
    pub operator_id: MemberId,
    /// When it was booked.
    pub recharged_at: DateTime<Utc>,
}

impl From<customer_recharge_history::Model> for RechargeRecord {
    fn from(model: customer_recharge_history::Model) -> Self {
        Self {
            id: model.id,
            real_amount: model.real_amount,
            gift_amount: model.gift_amount,
            total_amount: model.total_amount,
            balance_after: model.balance_after,
            payment_channel: model.payment_channel,
            transaction_ref: model.transaction_ref,
            notes: model.notes,
            operator_id: MemberId(model.operator_id),
            recharged_at: utc(model.recharged_at),
        }
    }
}

/// Read access to customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: CustomerId) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find_by_id(id.0).one(&self.db).await
    }

    /// Lists a customer's recharges, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recharge_history(
        &self,
        id: CustomerId,
        page: PageRequest,
    ) -> Result<PageResponse<RechargeRecord>, DbErr> {
        let page = page.normalized();
        let query = customer_recharge_history::Entity::find()
            .filter(customer_recharge_history::Column::CustomerId.eq(id.0));
        let total = query.clone().count(&self.db).await?;

        let models = query
            .order_by_desc(customer_recharge_history::Column::RechargedAt)
            .order_by_desc(customer_recharge_history::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            models.into_iter().map(RechargeRecord::from).collect(),
            page,
            total,
        ))
    }
}

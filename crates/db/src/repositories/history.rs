//! Approval history queries.

use chrono::{Days, NaiveDate, NaiveTime};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use playdesk_core::history::{ApprovalHistoryEntry, NewApprovalHistory};
use playdesk_core::workflow::ApprovalAction;
use playdesk_shared::types::{MemberId, OrderId, PageRequest, PageResponse};

use crate::entities::order_approval_history;
use crate::entities::sea_orm_active_enums;
use crate::store::utc;

/// Filter options for listing history entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Entries of one order.
    pub order_id: Option<OrderId>,
    /// Entries by one operator.
    pub operator_id: Option<MemberId>,
    /// Entries of one action.
    pub action: Option<ApprovalAction>,
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
}

fn entry_from_model(model: order_approval_history::Model) -> ApprovalHistoryEntry {
    ApprovalHistoryEntry {
        id: model.id,
        entry: NewApprovalHistory {
            order_id: OrderId(model.order_id),
            operator_id: MemberId(model.operator_id),
            operator_name: model.operator_name,
            action: model.action.into(),
            from_status: model.from_status.into(),
            to_status: model.to_status.into(),
            reason: model.reason,
            notes: model.notes,
            created_at: utc(model.created_at),
        },
    }
}

fn filtered(filter: &HistoryFilter) -> Select<order_approval_history::Entity> {
    let mut query = order_approval_history::Entity::find();

    if let Some(order_id) = filter.order_id {
        query = query.filter(order_approval_history::Column::OrderId.eq(order_id.0));
    }
    if let Some(operator_id) = filter.operator_id {
        query = query.filter(order_approval_history::Column::OperatorId.eq(operator_id.0));
    }
    if let Some(action) = filter.action {
        query = query.filter(
            order_approval_history::Column::Action
                .eq(sea_orm_active_enums::ApprovalAction::from(action)),
        );
    }
    if let Some(start) = filter.start_date {
        query = query.filter(
            order_approval_history::Column::CreatedAt.gte(start.and_time(NaiveTime::MIN).and_utc()),
        );
    }
    if let Some(end) = filter.end_date.and_then(|d| d.checked_add_days(Days::new(1))) {
        query = query.filter(
            order_approval_history::Column::CreatedAt.lt(end.and_time(NaiveTime::MIN).and_utc()),
        );
    }
    query
}

/// Read access to the approval audit trail.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    db: DatabaseConnection,
}

impl HistoryRepository {
    /// Creates a new history repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &HistoryFilter,
        page: PageRequest,
    ) -> Result<PageResponse<ApprovalHistoryEntry>, DbErr> {
        let page = page.normalized();
        let total = filtered(filter).count(&self.db).await?;

        let models = filtered(filter)
            .order_by_desc(order_approval_history::Column::CreatedAt)
            .order_by_desc(order_approval_history::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            models.into_iter().map(entry_from_model).collect(),
            page,
            total,
        ))
    }

    /// Returns every entry of one order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_order(&self, order_id: OrderId) -> Result<Vec<ApprovalHistoryEntry>, DbErr> {
        let models = order_approval_history::Entity::find()
            .filter(order_approval_history::Column::OrderId.eq(order_id.0))
            .order_by_asc(order_approval_history::Column::CreatedAt)
            .order_by_asc(order_approval_history::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(entry_from_model).collect())
    }
}

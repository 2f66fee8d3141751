//! Order listing and statistics queries.
//!
//! Writes go through [`crate::SeaOrmOrderStore`]; this repository only reads.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;

use playdesk_core::statistics::{OrderStatistics, StatisticsRow};
use playdesk_core::workflow::OrderStatus;
use playdesk_shared::types::{
    CategoryId, CustomerId, MemberId, OrderId, PageRequest, PageResponse,
};

use crate::entities::sea_orm_active_enums::{self, PaymentMethod, PaymentStatus};
use crate::entities::{
    customers, internal_members, order_categories, order_payment_info, order_pricing,
    order_workflow, orders,
};
use crate::store::utc;

/// Which timestamp a date range filters on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateField {
    /// The order's report time.
    #[default]
    Submitted,
    /// The workflow's approval time.
    Approved,
}

impl DateField {
    /// Parses `submit` or `approve`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "submit" => Some(Self::Submitted),
            "approve" => Some(Self::Approved),
            _ => None,
        }
    }
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Exact order.
    pub order_id: Option<OrderId>,
    /// Workflow status.
    pub status: Option<OrderStatus>,
    /// Reporting member.
    pub reporter_id: Option<MemberId>,
    /// Customer.
    pub customer_id: Option<CustomerId>,
    /// Substring of the category name.
    pub category_name: Option<String>,
    /// First day of the date range, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day of the date range, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Which timestamp the date range applies to.
    pub date_field: DateField,
    /// Lowest final price, inclusive.
    pub min_amount: Option<Decimal>,
    /// Highest final price, inclusive.
    pub max_amount: Option<Decimal>,
}

/// One row of the order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListItem {
    /// Order identifier.
    pub id: OrderId,
    /// Reporting member.
    pub reporter_id: MemberId,
    /// Reporting member's name.
    pub reporter_name: String,
    /// Customer.
    pub customer_id: CustomerId,
    /// Customer's name.
    pub customer_name: String,
    /// Category.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Game or project.
    pub project_category: String,
    /// Session start.
    pub start_time: DateTime<Utc>,
    /// Session end.
    pub end_time: DateTime<Utc>,
    /// Billed hours.
    pub duration_hours: Decimal,
    /// Price per hour.
    pub unit_price: Decimal,
    /// Price after the exclusive discount.
    pub final_price: Decimal,
    /// Whether the exclusive discount applies.
    pub exclusive_discount: bool,
    /// Workflow status.
    pub status: OrderStatus,
    /// Display label of the status.
    pub status_label: &'static str,
    /// Last approver.
    pub approver_id: Option<MemberId>,
    /// When the decision was made.
    pub approval_time: Option<DateTime<Utc>>,
    /// Reason, when rejected.
    pub rejection_reason: Option<String>,
    /// Payment status, once a payment record exists.
    pub payment_status: Option<playdesk_core::settlement::PaymentStatus>,
    /// Payment method, once settled.
    pub payment_method: Option<playdesk_core::settlement::PaymentMethod>,
    /// Settle from balance on approval.
    pub use_balance_payment: bool,
    /// When the order was reported.
    pub report_time: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
struct OrderListRow {
    id: i64,
    reporter_id: i64,
    customer_id: i64,
    order_category_id: i64,
    project_category: String,
    start_time: DateTime<chrono::FixedOffset>,
    end_time: DateTime<chrono::FixedOffset>,
    duration_hours: Decimal,
    report_time: DateTime<chrono::FixedOffset>,
    use_balance_payment: bool,
    reporter_name: String,
    customer_name: String,
    category_name: String,
    unit_price: Decimal,
    final_price: Decimal,
    exclusive_discount: bool,
    status: sea_orm_active_enums::OrderStatus,
    approver_id: Option<i64>,
    approval_time: Option<DateTime<chrono::FixedOffset>>,
    rejection_reason: Option<String>,
    payment_status: Option<PaymentStatus>,
    payment_method: Option<PaymentMethod>,
}

impl From<OrderListRow> for OrderListItem {
    fn from(row: OrderListRow) -> Self {
        let status = OrderStatus::from(row.status);
        Self {
            id: OrderId(row.id),
            reporter_id: MemberId(row.reporter_id),
            reporter_name: row.reporter_name,
            customer_id: CustomerId(row.customer_id),
            customer_name: row.customer_name,
            category_id: CategoryId(row.order_category_id),
            category_name: row.category_name,
            project_category: row.project_category,
            start_time: utc(row.start_time),
            end_time: utc(row.end_time),
            duration_hours: row.duration_hours,
            unit_price: row.unit_price,
            final_price: row.final_price,
            exclusive_discount: row.exclusive_discount,
            status,
            status_label: status.label(),
            approver_id: row.approver_id.map(MemberId),
            approval_time: row.approval_time.map(utc),
            rejection_reason: row.rejection_reason,
            payment_status: row.payment_status.map(Into::into),
            payment_method: row.payment_method.map(Into::into),
            use_balance_payment: row.use_balance_payment,
            report_time: utc(row.report_time),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct StatisticsQueryRow {
    status: sea_orm_active_enums::OrderStatus,
    report_date: NaiveDate,
    order_count: i64,
    duration_hours: Decimal,
    final_price: Decimal,
}

/// Report day of an order in UTC.
fn report_day() -> SimpleExpr {
    Expr::cust(r#"("orders"."report_time" AT TIME ZONE 'UTC')::date"#)
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Orders joined with every 1:1 record the list needs.
fn joined() -> Select<orders::Entity> {
    orders::Entity::find()
        .join(JoinType::InnerJoin, orders::Relation::OrderWorkflow.def())
        .join(JoinType::InnerJoin, orders::Relation::OrderPricing.def())
        .join(JoinType::InnerJoin, orders::Relation::Customers.def())
        .join(JoinType::InnerJoin, orders::Relation::OrderCategories.def())
        .join(JoinType::InnerJoin, orders::Relation::Reporter.def())
        .join(JoinType::LeftJoin, orders::Relation::OrderPaymentInfo.def())
}

fn apply_filter(mut query: Select<orders::Entity>, filter: &OrderFilter) -> Select<orders::Entity> {
    if let Some(order_id) = filter.order_id {
        query = query.filter(orders::Column::Id.eq(order_id.0));
    }
    if let Some(status) = filter.status {
        query = query.filter(
            order_workflow::Column::Status.eq(sea_orm_active_enums::OrderStatus::from(status)),
        );
    }
    if let Some(reporter_id) = filter.reporter_id {
        query = query.filter(orders::Column::ReporterId.eq(reporter_id.0));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(orders::Column::CustomerId.eq(customer_id.0));
    }
    if let Some(name) = filter.category_name.as_deref().map(str::trim)
        && !name.is_empty()
    {
        query = query.filter(order_categories::Column::Name.contains(name));
    }

    query = match filter.date_field {
        DateField::Submitted => date_range(query, orders::Column::ReportTime, filter),
        DateField::Approved => date_range(query, order_workflow::Column::ApprovalTime, filter),
    };

    if let Some(min) = filter.min_amount {
        query = query.filter(order_pricing::Column::FinalPrice.gte(min));
    }
    if let Some(max) = filter.max_amount {
        query = query.filter(order_pricing::Column::FinalPrice.lte(max));
    }
    query
}

fn date_range<C: ColumnTrait>(
    mut query: Select<orders::Entity>,
    column: C,
    filter: &OrderFilter,
) -> Select<orders::Entity> {
    if let Some(start) = filter.start_date {
        query = query.filter(column.gte(day_start(start)));
    }
    if let Some(end) = filter.end_date.and_then(|d| d.checked_add_days(Days::new(1))) {
        query = query.filter(column.lt(day_start(end)));
    }
    query
}

/// Read-side order queries.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists orders matching `filter`, newest report first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<PageResponse<OrderListItem>, DbErr> {
        let page = page.normalized();
        let total = apply_filter(joined(), filter).count(&self.db).await?;

        let rows = apply_filter(joined(), filter)
            .column_as(internal_members::Column::Name, "reporter_name")
            .column_as(customers::Column::Name, "customer_name")
            .column_as(order_categories::Column::Name, "category_name")
            .column(order_pricing::Column::UnitPrice)
            .column(order_pricing::Column::FinalPrice)
            .column(order_pricing::Column::ExclusiveDiscount)
            .column(order_workflow::Column::Status)
            .column(order_workflow::Column::ApproverId)
            .column(order_workflow::Column::ApprovalTime)
            .column(order_workflow::Column::RejectionReason)
            .column(order_payment_info::Column::PaymentStatus)
            .column(order_payment_info::Column::PaymentMethod)
            .order_by_desc(orders::Column::ReportTime)
            .order_by_desc(orders::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .into_model::<OrderListRow>()
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            rows.into_iter().map(OrderListItem::from).collect(),
            page,
            total,
        ))
    }

    /// Lists orders waiting for review.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pending(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<PageResponse<OrderListItem>, DbErr> {
        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            ..filter.clone()
        };
        self.list_orders(&filter, page).await
    }

    /// Aggregates the orders matching `filter`.
    ///
    /// Counts and sums are grouped by status and report day in SQL. The status
    /// filter narrows the totals and trend but not the status distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn statistics(
        &self,
        filter: &OrderFilter,
        commission_rate: Decimal,
    ) -> Result<OrderStatistics, DbErr> {
        let unfiltered_status = OrderFilter {
            status: None,
            ..filter.clone()
        };
        let rows = apply_filter(joined(), &unfiltered_status)
            .select_only()
            .column(order_workflow::Column::Status)
            .column_as(report_day(), "report_date")
            .column_as(orders::Column::Id.count(), "order_count")
            .column_as(orders::Column::DurationHours.sum(), "duration_hours")
            .column_as(order_pricing::Column::FinalPrice.sum(), "final_price")
            .group_by(order_workflow::Column::Status)
            .group_by(report_day())
            .into_model::<StatisticsQueryRow>()
            .all(&self.db)
            .await?;

        let rows: Vec<StatisticsRow> = rows
            .into_iter()
            .map(|row| StatisticsRow {
                status: row.status.into(),
                report_date: row.report_date,
                order_count: u64::try_from(row.order_count).unwrap_or_default(),
                duration_hours: row.duration_hours,
                final_price: row.final_price,
            })
            .collect();

        Ok(OrderStatistics::compute(
            &rows,
            filter.status,
            commission_rate,
            Utc::now().date_naive(),
        ))
    }
}

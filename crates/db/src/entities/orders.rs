//! `SeaORM` Entity for orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub reporter_id: i64,
    pub customer_id: i64,
    pub order_category_id: i64,
    pub project_category: String,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub duration_hours: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub service_additional_info: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub internal_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub order_notes: Option<String>,
    pub report_time: DateTimeWithTimeZone,
    pub use_balance_payment: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::internal_members::Entity",
        from = "Column::ReporterId",
        to = "super::internal_members::Column::Id"
    )]
    Reporter,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::order_categories::Entity",
        from = "Column::OrderCategoryId",
        to = "super::order_categories::Column::Id"
    )]
    OrderCategories,
    #[sea_orm(has_one = "super::order_pricing::Entity")]
    OrderPricing,
    #[sea_orm(has_one = "super::order_workflow::Entity")]
    OrderWorkflow,
    #[sea_orm(has_one = "super::order_payment_info::Entity")]
    OrderPaymentInfo,
    #[sea_orm(has_many = "super::order_approval_history::Entity")]
    OrderApprovalHistory,
}

impl Related<super::internal_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::order_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderCategories.def()
    }
}

impl Related<super::order_pricing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPricing.def()
    }
}

impl Related<super::order_workflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderWorkflow.def()
    }
}

impl Related<super::order_payment_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPaymentInfo.def()
    }
}

impl Related<super::order_approval_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderApprovalHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

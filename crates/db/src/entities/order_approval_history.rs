//! `SeaORM` Entity for order_approval_history table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApprovalAction, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_approval_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub operator_id: i64,
    pub operator_name: String,
    pub action: ApprovalAction,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_delete = "Cascade"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::internal_members::Entity",
        from = "Column::OperatorId",
        to = "super::internal_members::Column::Id"
    )]
    InternalMembers,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::internal_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InternalMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

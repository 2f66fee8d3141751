//! `SeaORM` Entity for customer_recharge_history table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_recharge_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub real_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub gift_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance_after: Decimal,
    pub payment_channel: Option<String>,
    pub transaction_ref: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub operator_id: i64,
    pub recharged_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::internal_members::Entity",
        from = "Column::OperatorId",
        to = "super::internal_members::Column::Id"
    )]
    InternalMembers,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::internal_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InternalMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

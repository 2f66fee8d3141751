//! `SeaORM` Entity for customers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_one = "super::customer_financial_info::Entity")]
    CustomerFinancialInfo,
    #[sea_orm(has_one = "super::customer_preferences::Entity")]
    CustomerPreferences,
    #[sea_orm(has_many = "super::customer_recharge_history::Entity")]
    CustomerRechargeHistory,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::customer_financial_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerFinancialInfo.def()
    }
}

impl Related<super::customer_preferences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerPreferences.def()
    }
}

impl Related<super::customer_recharge_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerRechargeHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

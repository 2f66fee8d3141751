//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod customer_financial_info;
pub mod customer_preferences;
pub mod customer_recharge_history;
pub mod customers;
pub mod internal_members;
pub mod order_approval_history;
pub mod order_categories;
pub mod order_payment_info;
pub mod order_pricing;
pub mod order_workflow;
pub mod orders;
pub mod sea_orm_active_enums;

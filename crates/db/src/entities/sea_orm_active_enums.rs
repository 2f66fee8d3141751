//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use playdesk_core::settlement::types as settlement;
use playdesk_core::workflow::types as workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "returned")]
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "direct")]
    Direct,
    #[sea_orm(string_value = "balance")]
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_action")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    #[sea_orm(string_value = "approve")]
    Approve,
    #[sea_orm(string_value = "reject")]
    Reject,
    #[sea_orm(string_value = "status_change")]
    StatusChange,
}

impl From<OrderStatus> for workflow::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Confirmed => Self::Confirmed,
            OrderStatus::Rejected => Self::Rejected,
            OrderStatus::Returned => Self::Returned,
        }
    }
}

impl From<workflow::OrderStatus> for OrderStatus {
    fn from(status: workflow::OrderStatus) -> Self {
        match status {
            workflow::OrderStatus::Pending => Self::Pending,
            workflow::OrderStatus::Confirmed => Self::Confirmed,
            workflow::OrderStatus::Rejected => Self::Rejected,
            workflow::OrderStatus::Returned => Self::Returned,
        }
    }
}

impl From<PaymentMethod> for settlement::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Direct => Self::Direct,
            PaymentMethod::Balance => Self::Balance,
        }
    }
}

impl From<settlement::PaymentMethod> for PaymentMethod {
    fn from(method: settlement::PaymentMethod) -> Self {
        match method {
            settlement::PaymentMethod::Direct => Self::Direct,
            settlement::PaymentMethod::Balance => Self::Balance,
        }
    }
}

impl From<PaymentStatus> for settlement::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<settlement::PaymentStatus> for PaymentStatus {
    fn from(status: settlement::PaymentStatus) -> Self {
        match status {
            settlement::PaymentStatus::Pending => Self::Pending,
            settlement::PaymentStatus::Paid => Self::Paid,
            settlement::PaymentStatus::Failed => Self::Failed,
            settlement::PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<ApprovalAction> for workflow::ApprovalAction {
    fn from(action: ApprovalAction) -> Self {
        match action {
            ApprovalAction::Approve => Self::Approve,
            ApprovalAction::Reject => Self::Reject,
            ApprovalAction::StatusChange => Self::StatusChange,
        }
    }
}

impl From<workflow::ApprovalAction> for ApprovalAction {
    fn from(action: workflow::ApprovalAction) -> Self {
        match action {
            workflow::ApprovalAction::Approve => Self::Approve,
            workflow::ApprovalAction::Reject => Self::Reject,
            workflow::ApprovalAction::StatusChange => Self::StatusChange,
        }
    }
}

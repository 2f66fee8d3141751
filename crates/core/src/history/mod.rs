//! Approval audit trail.
//!
//! One entry is appended for every committed approve, reject or status
//! override. Entries are never updated or deleted, and they are written inside
//! the same unit of work as the transition so a rolled-back transition leaves
//! no entry behind.

use chrono::{DateTime, Utc};
use playdesk_shared::types::{MemberId, OrderId};
use serde::{Deserialize, Serialize};

use crate::order::store::OrderUnitOfWork;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalAction, OrderStatus, WorkflowAction};

/// A history entry about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApprovalHistory {
    /// Order the transition applied to.
    pub order_id: OrderId,
    /// Member who performed it.
    pub operator_id: MemberId,
    /// Member name at the time of the action.
    pub operator_name: String,
    /// What kind of transition it was.
    pub action: ApprovalAction,
    /// Status before.
    pub from_status: OrderStatus,
    /// Status after.
    pub to_status: OrderStatus,
    /// Reason given, if any.
    pub reason: Option<String>,
    /// Free-text notes, if any.
    pub notes: Option<String>,
    /// When the transition happened.
    pub created_at: DateTime<Utc>,
}

/// A stored history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalHistoryEntry {
    /// Store-assigned identifier.
    pub id: i64,
    /// The appended data.
    #[serde(flatten)]
    pub entry: NewApprovalHistory,
}

/// Appends audit entries.
pub struct ApprovalHistoryRecorder;

impl ApprovalHistoryRecorder {
    /// Builds the entry describing a validated workflow action.
    #[must_use]
    pub fn entry_for(
        order_id: OrderId,
        operator_name: &str,
        from_status: OrderStatus,
        action: &WorkflowAction,
    ) -> NewApprovalHistory {
        NewApprovalHistory {
            order_id,
            operator_id: action.operator_id(),
            operator_name: operator_name.to_string(),
            action: action.history_action(),
            from_status,
            to_status: action.new_status(),
            reason: action.reason().map(str::to_string),
            notes: action.notes().map(str::to_string),
            created_at: action.occurred_at(),
        }
    }

    /// Appends the entry for `action` inside the caller's unit of work.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the store rejects the write; the
    /// caller must then roll the whole unit back.
    pub async fn record<U: OrderUnitOfWork>(
        unit: &mut U,
        order_id: OrderId,
        operator_name: &str,
        from_status: OrderStatus,
        action: &WorkflowAction,
    ) -> Result<(), WorkflowError> {
        unit.append_history(Self::entry_for(order_id, operator_name, from_status, action))
            .await
    }
}

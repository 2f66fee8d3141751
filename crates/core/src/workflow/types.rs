//! Workflow domain types for the order lifecycle.
//!
//! This module defines the order status enumeration, the audit action tags,
//! the workflow record attached to each order, and the actions produced by
//! [`crate::workflow::WorkflowService`].

use chrono::{DateTime, Utc};
use playdesk_shared::types::{MemberId, OrderId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the approval workflow.
///
/// Orders start `Pending`. Approval moves them to `Confirmed`, rejection to
/// `Rejected`. `Confirmed`, `Rejected` and `Returned` are terminal for the
/// approve/reject path; only the administrative override leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Waiting for review. The only editable state.
    Pending,
    /// Approved and settled.
    Confirmed,
    /// Rejected with a reason.
    Rejected,
    /// Sent back to the reporter.
    Returned,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Confirmed, Self::Rejected, Self::Returned];

    /// Returns the storage token of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Returned => "returned",
        }
    }

    /// Returns the text shown to staff.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending review",
            Self::Confirmed => "Confirmed",
            Self::Rejected => "Rejected",
            Self::Returned => "Returned",
        }
    }

    /// Parses a status from its storage token.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }

    /// Returns true if the order's details may still be changed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if approve/reject can no longer move the order.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_editable()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action tag recorded in the approval history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    /// Pending order approved.
    Approve,
    /// Pending order rejected.
    Reject,
    /// Administrative status override.
    StatusChange,
}

impl ApprovalAction {
    /// Returns the storage token of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::StatusChange => "status_change",
        }
    }

    /// Parses an action from its storage token.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "status_change" => Some(Self::StatusChange),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow record attached 1:1 to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWorkflow {
    /// The order this workflow belongs to.
    pub order_id: OrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Member who last approved, rejected or overrode the order.
    pub approver_id: Option<MemberId>,
    /// When that decision was made.
    pub approval_time: Option<DateTime<Utc>>,
    /// Reason given for the rejection, when rejected.
    pub rejection_reason: Option<String>,
}

impl OrderWorkflow {
    /// Creates the initial pending workflow for a new order.
    #[must_use]
    pub fn pending(order_id: OrderId) -> Self {
        Self {
            order_id,
            status: OrderStatus::Pending,
            approver_id: None,
            approval_time: None,
            rejection_reason: None,
        }
    }

    /// Applies a validated action to the record.
    pub fn apply(&mut self, action: &WorkflowAction) {
        self.status = action.new_status();
        self.approver_id = Some(action.operator_id());
        self.approval_time = Some(action.occurred_at());
        match action {
            WorkflowAction::Approve { .. } => {}
            WorkflowAction::Reject {
                rejection_reason, ..
            } => self.rejection_reason = Some(rejection_reason.clone()),
            WorkflowAction::StatusChange {
                new_status, reason, ..
            } => {
                if *new_status == OrderStatus::Rejected {
                    self.rejection_reason.clone_from(reason);
                }
            }
        }
    }
}

/// Workflow action representing a state transition with audit data.
///
/// Each variant captures the resulting status and the audit trail
/// information (who, when, why).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Approve a pending order.
    Approve {
        /// The new status after approval.
        new_status: OrderStatus,
        /// The member who approved the order.
        approved_by: MemberId,
        /// When the order was approved.
        approved_at: DateTime<Utc>,
        /// Optional notes from the approver.
        notes: Option<String>,
    },
    /// Reject a pending order.
    Reject {
        /// The new status after rejection.
        new_status: OrderStatus,
        /// The member who rejected the order.
        rejected_by: MemberId,
        /// When the order was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        rejection_reason: String,
        /// Optional notes.
        notes: Option<String>,
    },
    /// Administrative override to any status.
    StatusChange {
        /// The status before the override.
        from_status: OrderStatus,
        /// The status after the override.
        new_status: OrderStatus,
        /// The member who changed the status.
        changed_by: MemberId,
        /// When the status was changed.
        changed_at: DateTime<Utc>,
        /// Optional reason; required when moving to `Rejected`.
        reason: Option<String>,
        /// Optional notes.
        notes: Option<String>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> OrderStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::StatusChange { new_status, .. } => *new_status,
        }
    }

    /// Returns the history tag for this action.
    #[must_use]
    pub fn history_action(&self) -> ApprovalAction {
        match self {
            Self::Approve { .. } => ApprovalAction::Approve,
            Self::Reject { .. } => ApprovalAction::Reject,
            Self::StatusChange { .. } => ApprovalAction::StatusChange,
        }
    }

    /// Returns the member who performed the action.
    #[must_use]
    pub fn operator_id(&self) -> MemberId {
        match self {
            Self::Approve { approved_by, .. } => *approved_by,
            Self::Reject { rejected_by, .. } => *rejected_by,
            Self::StatusChange { changed_by, .. } => *changed_by,
        }
    }

    /// Returns when the action happened.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Approve { approved_at, .. } => *approved_at,
            Self::Reject { rejected_at, .. } => *rejected_at,
            Self::StatusChange { changed_at, .. } => *changed_at,
        }
    }

    /// Returns the reason attached to the action, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Approve { .. } => None,
            Self::Reject {
                rejection_reason, ..
            } => Some(rejection_reason),
            Self::StatusChange { reason, .. } => reason.as_deref(),
        }
    }

    /// Returns the notes attached to the action, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Approve { notes, .. }
            | Self::Reject { notes, .. }
            | Self::StatusChange { notes, .. } => notes.as_deref(),
        }
    }
}

//! Workflow service for order state transitions.
//!
//! This module implements the core state machine logic for moving orders
//! through the approval workflow.

use chrono::Utc;
use playdesk_shared::types::MemberId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{OrderStatus, WorkflowAction};

/// Stateless service for managing order workflow transitions.
///
/// All methods are associated functions that validate a transition and
/// return the `WorkflowAction` carrying the audit trail information. They
/// never touch storage; callers apply the action inside their unit of work.
pub struct WorkflowService;

impl WorkflowService {
    /// Approve a pending order.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the order
    /// * `approved_by` - The member approving the order
    /// * `notes` - Optional notes from the approver
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Approve)` if the transition is valid
    /// * `Err(WorkflowError::InvalidTransition)` if not in Pending status
    pub fn approve(
        current_status: OrderStatus,
        approved_by: MemberId,
        notes: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            OrderStatus::Pending => Ok(WorkflowAction::Approve {
                new_status: OrderStatus::Confirmed,
                approved_by,
                approved_at: Utc::now(),
                notes,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: OrderStatus::Confirmed,
            }),
        }
    }

    /// Reject a pending order.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the order
    /// * `rejected_by` - The member rejecting the order
    /// * `rejection_reason` - The reason for rejection (required)
    /// * `notes` - Optional notes
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Reject)` if the transition is valid
    /// * `Err(WorkflowError::RejectionReasonRequired)` if reason is blank
    /// * `Err(WorkflowError::InvalidTransition)` if not in Pending status
    pub fn reject(
        current_status: OrderStatus,
        rejected_by: MemberId,
        rejection_reason: String,
        notes: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        if rejection_reason.trim().is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        match current_status {
            OrderStatus::Pending => Ok(WorkflowAction::Reject {
                new_status: OrderStatus::Rejected,
                rejected_by,
                rejected_at: Utc::now(),
                rejection_reason: rejection_reason.trim().to_string(),
                notes,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: OrderStatus::Rejected,
            }),
        }
    }

    /// Administratively override an order's status.
    ///
    /// Any status may move to any status. Moving to `Rejected` still needs a
    /// reason so a rejected workflow always carries one.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::StatusChange)` for every source/target pair
    /// * `Err(WorkflowError::RejectionReasonRequired)` if the target is
    ///   `Rejected` and the reason is blank
    pub fn set_status(
        current_status: OrderStatus,
        new_status: OrderStatus,
        changed_by: MemberId,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if new_status == OrderStatus::Rejected && reason.is_none() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        Ok(WorkflowAction::StatusChange {
            from_status: current_status,
            new_status,
            changed_by,
            changed_at: Utc::now(),
            reason,
            notes,
        })
    }

    /// Check that an order in `current_status` may still be edited.
    ///
    /// # Errors
    /// Returns `WorkflowError::OrderNotEditable` unless the order is pending.
    pub fn ensure_editable(current_status: OrderStatus) -> Result<(), WorkflowError> {
        if current_status.is_editable() {
            Ok(())
        } else {
            Err(WorkflowError::OrderNotEditable(current_status))
        }
    }

    /// Check if a transition is reachable through approve or reject.
    ///
    /// Valid transitions:
    /// - Pending → Confirmed (approve)
    /// - Pending → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (
                OrderStatus::Pending,
                OrderStatus::Confirmed | OrderStatus::Rejected
            )
        )
    }
}

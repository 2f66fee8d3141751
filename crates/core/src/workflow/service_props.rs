//! Property-based tests for WorkflowService.
//!
//! Randomized checks that approve/reject only ever leave `Pending` and that
//! the override always produces a history-ready action.

use playdesk_shared::types::MemberId;
use proptest::prelude::*;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{ApprovalAction, OrderStatus};

/// Strategy for generating random OrderStatus values.
fn arb_status() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::Confirmed),
        Just(OrderStatus::Rejected),
        Just(OrderStatus::Returned),
    ]
}

fn arb_member() -> impl Strategy<Value = MemberId> {
    (1i64..1_000_000).prop_map(MemberId)
}

/// Strategy for generating non-empty strings (for reasons).
fn arb_non_empty_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approve succeeds exactly when the order is pending.
    #[test]
    fn prop_approve_only_from_pending(status in arb_status(), member in arb_member()) {
        let result = WorkflowService::approve(status, member, None);
        if status == OrderStatus::Pending {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), OrderStatus::Confirmed);
            prop_assert_eq!(action.operator_id(), member);
            prop_assert_eq!(action.history_action(), ApprovalAction::Approve);
        } else {
            let is_conflict = matches!(result, Err(WorkflowError::InvalidTransition { .. }));
            prop_assert!(is_conflict);
        }
    }

    /// Reject with a reason succeeds exactly when the order is pending.
    #[test]
    fn prop_reject_only_from_pending(
        status in arb_status(),
        member in arb_member(),
        reason in arb_non_empty_string(),
    ) {
        let result = WorkflowService::reject(status, member, reason.clone(), None);
        prop_assert_eq!(result.is_ok(), status == OrderStatus::Pending);
        if let Ok(action) = result {
            prop_assert_eq!(action.reason(), Some(reason.as_str()));
        }
    }

    /// Whitespace-only reasons are always refused, whatever the status.
    #[test]
    fn prop_blank_reason_rejected(status in arb_status(), spaces in " {0,10}") {
        let result = WorkflowService::reject(status, MemberId(1), spaces, None);
        prop_assert_eq!(result.unwrap_err(), WorkflowError::RejectionReasonRequired);
    }

    /// The override reaches every target except Rejected-without-reason.
    #[test]
    fn prop_set_status_any_to_any(
        from in arb_status(),
        to in arb_status(),
        reason in proptest::option::of(arb_non_empty_string()),
    ) {
        let result = WorkflowService::set_status(from, to, MemberId(1), reason.clone(), None);
        if to == OrderStatus::Rejected && reason.is_none() {
            prop_assert_eq!(result.unwrap_err(), WorkflowError::RejectionReasonRequired);
        } else {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), to);
            prop_assert_eq!(action.history_action(), ApprovalAction::StatusChange);
        }
    }

    /// Only reachable approve/reject targets are reported as valid transitions.
    #[test]
    fn prop_valid_transition_matches_service(from in arb_status(), to in arb_status()) {
        let via_service = WorkflowService::approve(from, MemberId(1), None)
            .map(|a| a.new_status() == to)
            .unwrap_or(false)
            || WorkflowService::reject(from, MemberId(1), "r".into(), None)
                .map(|a| a.new_status() == to)
                .unwrap_or(false);
        prop_assert_eq!(WorkflowService::is_valid_transition(from, to), via_service);
    }
}

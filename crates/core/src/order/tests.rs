//! Scenario tests for the order services over the in-memory store.

use chrono::{Duration, Utc};
use playdesk_shared::types::{CategoryId, CustomerId, MemberId, OrderId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use super::account::{CustomerAccountService, RechargeRequest};
use super::memory::{MemoryState, MemoryStore};
use super::service::OrderApprovalService;
use super::types::{BatchAction, NewOrder, OrderPatch};
use crate::pricing::PricingCalculator;
use crate::settlement::types::{
    CustomerFinancialInfo, CustomerPreferences, PaymentMethod, PaymentStatus,
};
use crate::workflow::error::{ErrorKind, WorkflowError};
use crate::workflow::types::{ApprovalAction, OrderStatus};

const RICH: CustomerId = CustomerId(1);
const NEW_CUSTOMER: CustomerId = CustomerId(2);
const REVIEWER: MemberId = MemberId(1);
const REPORTER: MemberId = MemberId(2);

fn account(customer_id: CustomerId, balance: Decimal) -> CustomerFinancialInfo {
    CustomerFinancialInfo {
        customer_id,
        total_real_charge: balance,
        total_consumption: Decimal::ZERO,
        current_balance: balance,
    }
}

fn seeded(balance: Decimal, ratio: i32) -> MemoryState {
    let mut state = MemoryState::default();
    state.customers.extend([RICH, NEW_CUSTOMER]);
    state.categories.insert(CategoryId(1));
    state.members.insert(REVIEWER, "Avery".to_string());
    state.members.insert(REPORTER, "Jordan".to_string());
    state.financial.insert(RICH, account(RICH, balance));
    state.preferences.insert(
        RICH,
        CustomerPreferences {
            customer_id: RICH,
            exclusive_discount_ratio: ratio,
        },
    );
    state
}

fn setup(balance: Decimal, ratio: i32) -> (OrderApprovalService<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new(seeded(balance, ratio));
    let service = OrderApprovalService::new(store.clone(), PricingCalculator::default());
    (service, store)
}

/// 2 hours at 25.00 is a final price of 50.00.
fn order_input(customer_id: CustomerId, use_balance_payment: bool) -> NewOrder {
    let start = Utc::now() - Duration::hours(3);
    NewOrder {
        customer_id,
        category_id: CategoryId(1),
        project_category: "Ranked duo".to_string(),
        start_time: start,
        end_time: start + Duration::hours(2),
        duration_hours: dec!(2),
        unit_price: dec!(25.00),
        exclusive_discount: false,
        use_balance_payment,
        service_notes: None,
        internal_notes: None,
        order_notes: None,
    }
}

async fn create(
    service: &OrderApprovalService<MemoryStore>,
    customer_id: CustomerId,
    use_balance_payment: bool,
) -> OrderId {
    service
        .create_order(REPORTER, order_input(customer_id, use_balance_payment))
        .await
        .unwrap()
        .order
        .id
}

#[tokio::test]
async fn test_create_order_writes_pending_records() {
    let (service, store) = setup(dec!(100.00), 20);
    let mut input = order_input(RICH, true);
    input.exclusive_discount = true;

    let details = service.create_order(REPORTER, input).await.unwrap();

    assert_eq!(details.order.reporter_id, REPORTER);
    assert_eq!(details.workflow.status, OrderStatus::Pending);
    assert_eq!(details.pricing.total_price, dec!(50.00));
    assert_eq!(details.pricing.discount_amount, dec!(5.00));
    assert_eq!(details.pricing.final_price, dec!(45.00));

    let payment = details.payment.unwrap();
    assert_eq!(payment.payment_status, PaymentStatus::Pending);
    assert_eq!(payment.payment_amount, dec!(45.00));
    assert_eq!(payment.payment_method, None);

    let state = store.snapshot().await;
    assert_eq!(state.orders.len(), 1);
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_create_order_unknown_references_write_nothing() {
    let (service, store) = setup(dec!(100.00), 20);

    let err = service
        .create_order(REPORTER, order_input(CustomerId(99), false))
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::CustomerNotFound(CustomerId(99)));

    let mut input = order_input(RICH, false);
    input.category_id = CategoryId(7);
    let err = service.create_order(REPORTER, input).await.unwrap_err();
    assert_eq!(err, WorkflowError::CategoryNotFound(CategoryId(7)));

    assert!(store.snapshot().await.orders.is_empty());
}

#[tokio::test]
async fn test_balance_settlement_end_to_end() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;

    let summary = service
        .approve_order(order_id, REVIEWER, Some("checked vod".to_string()))
        .await
        .unwrap();

    assert_eq!(summary.method, PaymentMethod::Balance);
    assert_eq!(summary.original_price, dec!(50.00));
    assert_eq!(summary.discount_percent, 20);
    assert_eq!(summary.actual_amount, dec!(40.00));

    let state = store.snapshot().await;
    let financial = &state.financial[&RICH];
    assert_eq!(financial.current_balance, dec!(60.00));
    assert_eq!(financial.total_consumption, dec!(40.00));

    let payment = &state.payments[&order_id];
    assert_eq!(payment.payment_status, PaymentStatus::Paid);
    assert_eq!(payment.payment_method, Some(PaymentMethod::Balance));
    assert_eq!(payment.payment_amount, dec!(40.00));

    let workflow = &state.workflows[&order_id];
    assert_eq!(workflow.status, OrderStatus::Confirmed);
    assert_eq!(workflow.approver_id, Some(REVIEWER));
    assert!(workflow.approval_time.is_some());

    assert_eq!(state.history.len(), 1);
    let entry = &state.history[0].entry;
    assert_eq!(entry.action, ApprovalAction::Approve);
    assert_eq!(entry.from_status, OrderStatus::Pending);
    assert_eq!(entry.to_status, OrderStatus::Confirmed);
    assert_eq!(entry.operator_name, "Avery");
    assert_eq!(entry.notes.as_deref(), Some("checked vod"));
}

#[tokio::test]
async fn test_second_approval_fails_without_second_debit() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;

    service.approve_order(order_id, REVIEWER, None).await.unwrap();
    let err = service
        .approve_order(order_id, REVIEWER, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StateConflict);
    let state = store.snapshot().await;
    assert_eq!(state.financial[&RICH].current_balance, dec!(60.00));
    assert_eq!(state.history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_of_one_order_settle_once() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.approve_order(order_id, REVIEWER, None).await })
        })
        .collect();
    let results = futures::future::join_all(handles).await;

    let successes = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(Result::is_ok)
        .count();
    assert_eq!(successes, 1);

    let state = store.snapshot().await;
    assert_eq!(state.financial[&RICH].current_balance, dec!(60.00));
    assert_eq!(state.history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_never_overdraw() {
    // Each order charges 40.00 against a balance of 100.00.
    let (service, store) = setup(dec!(100.00), 20);
    let mut order_ids = Vec::new();
    for _ in 0..5 {
        order_ids.push(create(&service, RICH, true).await);
    }
    let service = Arc::new(service);

    let handles: Vec<_> = order_ids
        .iter()
        .map(|order_id| {
            let service = Arc::clone(&service);
            let order_id = *order_id;
            tokio::spawn(async move { service.approve_order(order_id, REVIEWER, None).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 2);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::InsufficientBalance)
    );

    let state = store.snapshot().await;
    let financial = &state.financial[&RICH];
    assert_eq!(financial.current_balance, dec!(20.00));
    assert_eq!(financial.total_consumption, dec!(80.00));
    assert!(financial.current_balance >= Decimal::ZERO);
}

#[tokio::test]
async fn test_insufficient_balance_leaves_no_trace() {
    let (service, store) = setup(dec!(30.00), 20);
    let order_id = create(&service, RICH, true).await;
    let before = store.snapshot().await;

    let err = service
        .approve_order(order_id, REVIEWER, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WorkflowError::InsufficientBalance {
            balance: dec!(30.00),
            original_price: dec!(50.00),
            discounted_price: dec!(40.00),
            discount_percent: 20,
        }
    );
    let after = store.snapshot().await;
    assert_eq!(after.financial, before.financial);
    assert_eq!(after.workflows, before.workflows);
    assert_eq!(after.payments, before.payments);
    assert!(after.history.is_empty());
}

#[tokio::test]
async fn test_out_of_range_discount_charges_full_price() {
    for ratio in [150, -5] {
        let (service, store) = setup(dec!(100.00), ratio);
        let order_id = create(&service, RICH, true).await;

        let summary = service.approve_order(order_id, REVIEWER, None).await.unwrap();

        assert_eq!(summary.discount_percent, 0);
        assert_eq!(summary.actual_amount, dec!(50.00));
        assert_eq!(
            store.snapshot().await.financial[&RICH].current_balance,
            dec!(50.00)
        );
    }
}

#[tokio::test]
async fn test_direct_payment_leaves_account_untouched() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, false).await;

    let summary = service.approve_order(order_id, REVIEWER, None).await.unwrap();

    assert_eq!(summary.method, PaymentMethod::Direct);
    assert_eq!(summary.actual_amount, dec!(50.00));
    let state = store.snapshot().await;
    assert_eq!(state.financial[&RICH], account(RICH, dec!(100.00)));
    let payment = &state.payments[&order_id];
    assert_eq!(payment.payment_status, PaymentStatus::Paid);
    assert_eq!(payment.payment_method, Some(PaymentMethod::Direct));
}

#[tokio::test]
async fn test_balance_payment_requires_customer_records() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, NEW_CUSTOMER, true).await;

    let err = service
        .approve_order(order_id, REVIEWER, None)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::FinancialRecordMissing(NEW_CUSTOMER));

    store
        .update(|state| {
            state
                .financial
                .insert(NEW_CUSTOMER, account(NEW_CUSTOMER, dec!(100.00)));
        })
        .await;
    let err = service
        .approve_order(order_id, REVIEWER, None)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::PreferencesMissing(NEW_CUSTOMER));
    assert_eq!(
        store.snapshot().await.workflows[&order_id].status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn test_unknown_operator_is_rejected() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;

    let err = service
        .approve_order(order_id, MemberId(42), None)
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::OperatorNotFound(MemberId(42)));
    assert_eq!(
        store.snapshot().await.financial[&RICH].current_balance,
        dec!(100.00)
    );
}

#[tokio::test]
async fn test_reject_records_reason() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;

    let err = service
        .reject_order(order_id, REVIEWER, "   ".to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::RejectionReasonRequired);
    assert!(store.snapshot().await.history.is_empty());

    let workflow = service
        .reject_order(order_id, REVIEWER, " duplicate report ".to_string(), None)
        .await
        .unwrap();
    assert_eq!(workflow.status, OrderStatus::Rejected);
    assert_eq!(workflow.rejection_reason.as_deref(), Some("duplicate report"));

    let state = store.snapshot().await;
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].entry.action, ApprovalAction::Reject);
    assert_eq!(
        state.history[0].entry.reason.as_deref(),
        Some("duplicate report")
    );
    assert_eq!(state.financial[&RICH].current_balance, dec!(100.00));
}

#[tokio::test]
async fn test_status_override_does_not_refund() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;
    service.approve_order(order_id, REVIEWER, None).await.unwrap();

    let workflow = service
        .update_order_status(
            order_id,
            OrderStatus::Returned,
            REVIEWER,
            None,
            Some("customer dispute".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(workflow.status, OrderStatus::Returned);
    let state = store.snapshot().await;
    assert_eq!(state.financial[&RICH].current_balance, dec!(60.00));
    assert_eq!(state.history.len(), 2);
    let entry = &state.history[1].entry;
    assert_eq!(entry.action, ApprovalAction::StatusChange);
    assert_eq!(entry.from_status, OrderStatus::Confirmed);
    assert_eq!(entry.to_status, OrderStatus::Returned);
}

#[tokio::test]
async fn test_status_override_to_rejected_needs_reason() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, false).await;

    let err = service
        .update_order_status(order_id, OrderStatus::Rejected, REVIEWER, None, None)
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::RejectionReasonRequired);
    assert!(store.snapshot().await.history.is_empty());
}

#[tokio::test]
async fn test_update_reprices_pending_order() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, true).await;

    let details = service
        .update_order(
            order_id,
            OrderPatch {
                unit_price: Some(dec!(30.00)),
                exclusive_discount: Some(true),
                order_notes: Some(Some("rate corrected".to_string())),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(details.pricing.total_price, dec!(60.00));
    assert_eq!(details.pricing.final_price, dec!(54.00));
    assert_eq!(details.order.order_notes.as_deref(), Some("rate corrected"));
    let state = store.snapshot().await;
    assert_eq!(state.payments[&order_id].payment_amount, dec!(54.00));
    assert_eq!(state.pricing[&order_id].final_price, dec!(54.00));
}

#[tokio::test]
async fn test_update_clears_notes() {
    let (service, store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, false).await;

    service
        .update_order(
            order_id,
            OrderPatch {
                internal_notes: Some(Some("needs a duo partner".to_string())),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();

    let details = service
        .update_order(
            order_id,
            OrderPatch {
                internal_notes: Some(None),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(details.order.internal_notes, None);
    assert_eq!(store.snapshot().await.orders[&order_id].internal_notes, None);
}

#[tokio::test]
async fn test_update_only_while_pending() {
    let (service, _store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, false).await;
    service.approve_order(order_id, REVIEWER, None).await.unwrap();

    let err = service
        .update_order(
            order_id,
            OrderPatch {
                unit_price: Some(dec!(1.00)),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::OrderNotEditable(OrderStatus::Confirmed));
    let details = service.get_order_details(order_id).await.unwrap();
    assert_eq!(details.pricing.final_price, dec!(50.00));
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let (service, _store) = setup(dec!(100.00), 20);
    let order_id = create(&service, RICH, false).await;

    let err = service
        .update_order(order_id, OrderPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_get_order_details_not_found() {
    let (service, _store) = setup(dec!(100.00), 20);
    let err = service.get_order_details(OrderId(404)).await.unwrap_err();
    assert_eq!(err, WorkflowError::OrderNotFound(OrderId(404)));
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    // A settles, B is already confirmed, C cannot be covered after A.
    let (service, store) = setup(dec!(70.00), 20);
    let a = create(&service, RICH, true).await;
    let b = create(&service, RICH, false).await;
    let c = create(&service, RICH, true).await;
    service.approve_order(b, REVIEWER, None).await.unwrap();

    let tokens = vec![a.to_string(), b.to_string(), c.to_string()];
    let result = service
        .batch_approve(&tokens, BatchAction::Approve, None, None, REVIEWER)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 2);
    assert_eq!(result.failures[0].order_id, b.to_string());
    assert!(result.failures[0].error.contains("Invalid status transition"));
    assert_eq!(result.failures[1].order_id, c.to_string());
    assert!(result.failures[1].error.contains("Insufficient balance"));

    let state = store.snapshot().await;
    assert_eq!(state.workflows[&a].status, OrderStatus::Confirmed);
    assert_eq!(state.workflows[&c].status, OrderStatus::Pending);
    assert_eq!(state.financial[&RICH].current_balance, dec!(30.00));
    // B's own approval plus A's.
    assert_eq!(state.history.len(), 2);
}

#[tokio::test]
async fn test_batch_reports_bad_tokens_and_missing_orders() {
    let (service, _store) = setup(dec!(100.00), 20);
    let a = create(&service, RICH, false).await;

    let tokens = vec!["abc".to_string(), a.to_string(), "999".to_string()];
    let result = service
        .batch_approve(&tokens, BatchAction::Approve, None, None, REVIEWER)
        .await
        .unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 2);
    assert_eq!(result.failures[0].order_id, "abc");
    assert_eq!(
        result.failures[0].error,
        WorkflowError::InvalidOrderId("abc".to_string()).to_string()
    );
    assert_eq!(result.failures[1].order_id, "999");
    assert_eq!(
        result.failures[1].error,
        WorkflowError::OrderNotFound(OrderId(999)).to_string()
    );
}

#[tokio::test]
async fn test_batch_reject_without_reason_fails_every_item() {
    let (service, store) = setup(dec!(100.00), 20);
    let a = create(&service, RICH, false).await;
    let b = create(&service, RICH, false).await;

    let tokens = vec![a.to_string(), b.to_string()];
    let result = service
        .batch_approve(&tokens, BatchAction::Reject, None, None, REVIEWER)
        .await
        .unwrap();
    assert_eq!(result.success_count, 0);
    assert_eq!(result.failure_count, 2);
    assert!(store.snapshot().await.history.is_empty());

    let result = service
        .batch_approve(
            &tokens,
            BatchAction::Reject,
            Some("no show".to_string()),
            None,
            REVIEWER,
        )
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.success_count, 2);
}

#[tokio::test]
async fn test_batch_stops_on_store_failure() {
    let (service, store) = setup(dec!(100.00), 20);
    let a = create(&service, RICH, true).await;
    let b = create(&service, RICH, true).await;
    let c = create(&service, RICH, true).await;
    store
        .update(|state| {
            state.broken_history.insert(b);
        })
        .await;

    let tokens = vec![a.to_string(), b.to_string(), c.to_string()];
    let err = service
        .batch_approve(&tokens, BatchAction::Approve, None, None, REVIEWER)
        .await
        .unwrap_err();

    assert!(err.is_systemic());
    let state = store.snapshot().await;
    assert_eq!(state.workflows[&a].status, OrderStatus::Confirmed);
    assert_eq!(state.workflows[&b].status, OrderStatus::Pending);
    assert_eq!(state.workflows[&c].status, OrderStatus::Pending);
    // Only A was debited; B's debit rolled back with its failed history write.
    assert_eq!(state.financial[&RICH].current_balance, dec!(60.00));
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_recharge_creates_account_then_enables_balance_payment() {
    let (service, store) = setup(dec!(100.00), 20);
    let accounts = CustomerAccountService::new(store.clone());

    let err = accounts.financial_info(NEW_CUSTOMER).await.unwrap_err();
    assert_eq!(err, WorkflowError::FinancialRecordMissing(NEW_CUSTOMER));

    let outcome = accounts
        .recharge(
            NEW_CUSTOMER,
            REVIEWER,
            RechargeRequest {
                real_amount: dec!(80),
                gift_amount: dec!(20),
                payment_channel: Some("cash".to_string()),
                transaction_ref: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.total_amount, dec!(100.00));
    assert_eq!(outcome.account.current_balance, dec!(100.00));
    assert_eq!(outcome.account.total_real_charge, dec!(80.00));

    store
        .update(|state| {
            state.preferences.insert(
                NEW_CUSTOMER,
                CustomerPreferences {
                    customer_id: NEW_CUSTOMER,
                    exclusive_discount_ratio: 0,
                },
            );
        })
        .await;
    let order_id = create(&service, NEW_CUSTOMER, true).await;
    service.approve_order(order_id, REVIEWER, None).await.unwrap();

    let financial = accounts.financial_info(NEW_CUSTOMER).await.unwrap();
    assert_eq!(financial.current_balance, dec!(50.00));
    let state = store.snapshot().await;
    assert_eq!(state.recharges.len(), 1);
    assert_eq!(state.recharges[0].balance_after, dec!(100.00));
}

#[tokio::test]
async fn test_recharge_validation() {
    let (_service, store) = setup(dec!(100.00), 20);
    let accounts = CustomerAccountService::new(store.clone());
    let request = |real: Decimal| RechargeRequest {
        real_amount: real,
        gift_amount: Decimal::ZERO,
        payment_channel: None,
        transaction_ref: None,
        notes: None,
    };

    let err = accounts
        .recharge(CustomerId(99), REVIEWER, request(dec!(10)))
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::CustomerNotFound(CustomerId(99)));

    let err = accounts
        .recharge(RICH, REVIEWER, request(Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // A rejected first recharge does not leave an empty account behind.
    let err = accounts
        .recharge(NEW_CUSTOMER, REVIEWER, request(dec!(-5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let state = store.snapshot().await;
    assert!(state.recharges.is_empty());
    assert_eq!(state.financial[&RICH].current_balance, dec!(100.00));
    assert!(!state.financial.contains_key(&NEW_CUSTOMER));
}

//! Order approval routes.
//!
//! Lists, single and batch decisions, the status override, the audit trail
//! and statistics.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::routes::{bad_request, query_error_response, workflow_error_response};
use crate::{AppState, middleware::AuthUser};
use playdesk_core::order::BatchAction;
use playdesk_core::workflow::{ApprovalAction, OrderStatus};
use playdesk_db::repositories::{DateField, HistoryFilter, OrderFilter};
use playdesk_db::{HistoryRepository, OrderRepository};
use playdesk_shared::types::{CustomerId, MemberId, OrderId, PageRequest};

/// Creates the approval routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order-approval", get(list_orders))
        .route("/order-approval/pending", get(list_pending))
        .route("/order-approval/history", get(list_history))
        .route("/order-approval/statistics", get(statistics))
        .route("/order-approval/batch", post(batch_approve))
        .route("/order-approval/{order_id}/approve", post(approve_order))
        .route("/order-approval/{order_id}/reject", post(reject_order))
        .route("/order-approval/{order_id}/status", patch(update_status))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters shared by the order lists and statistics.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    /// Exact order.
    pub order_id: Option<i64>,
    /// Status: pending, confirmed, rejected or returned.
    pub status: Option<String>,
    /// Reporting member.
    pub reporter_id: Option<i64>,
    /// Customer.
    pub customer_id: Option<i64>,
    /// Substring of the category name.
    pub category: Option<String>,
    /// Range start (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Range end, inclusive (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
    /// Date the range applies to: `submit` (default) or `approve`.
    pub date_field: Option<String>,
    /// Lowest final price.
    pub min_amount: Option<Decimal>,
    /// Highest final price.
    pub max_amount: Option<Decimal>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

impl OrderListQuery {
    fn to_filter(&self) -> Result<OrderFilter, Response> {
        let status = match self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            None => None,
            Some(raw) => Some(OrderStatus::parse(raw).ok_or_else(|| {
                bad_request("invalid_status", format!("Unknown order status: {raw}"))
            })?),
        };
        let date_field = match self.date_field.as_deref() {
            None => DateField::default(),
            Some(raw) => DateField::parse(raw).ok_or_else(|| {
                bad_request("invalid_date_field", "date_field must be submit or approve")
            })?,
        };

        Ok(OrderFilter {
            order_id: self.order_id.map(OrderId),
            status,
            reporter_id: self.reporter_id.map(MemberId),
            customer_id: self.customer_id.map(CustomerId),
            category_name: self.category.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            date_field,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        })
    }

    fn page(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.per_page)
    }
}

/// Query parameters for the audit trail.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Entries of one order.
    pub order_id: Option<i64>,
    /// Entries by one operator.
    pub operator_id: Option<i64>,
    /// Action: approve, reject or status_change.
    pub action: Option<String>,
    /// Range start (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Range end, inclusive (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for approving an order.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// Request body for rejecting an order.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the order was rejected.
    #[serde(default)]
    pub reason: String,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// Request body for a batch decision.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Order ids, as numbers or strings.
    pub order_ids: Vec<Value>,
    /// `approve` or `reject`.
    pub action: String,
    /// Rejection reason shared by every order.
    pub reason: Option<String>,
    /// Notes shared by every order.
    pub notes: Option<String>,
}

/// Request body for the status override.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status.
    pub status: String,
    /// Required when moving to rejected.
    pub reason: Option<String>,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// Turns a JSON id into the token the batch parses.
fn id_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/order-approval` - Orders in any status.
async fn list_orders(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Response {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    let repo = OrderRepository::new((*state.db).clone());

    match repo.list_orders(&filter, query.page()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => query_error_response(&e, "list orders"),
    }
}

/// GET `/order-approval/pending` - Orders waiting for review.
async fn list_pending(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Response {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    let repo = OrderRepository::new((*state.db).clone());

    match repo.list_pending(&filter, query.page()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => query_error_response(&e, "list pending orders"),
    }
}

/// GET `/order-approval/statistics` - Aggregates over the filtered orders.
async fn statistics(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Response {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    let repo = OrderRepository::new((*state.db).clone());

    match repo.statistics(&filter, state.pricing.commission_rate).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => query_error_response(&e, "order statistics"),
    }
}

/// GET `/order-approval/history` - The approval audit trail.
async fn list_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let action = match query.action.as_deref().filter(|s| !s.trim().is_empty()) {
        None => None,
        Some(raw) => match ApprovalAction::parse(raw) {
            Some(action) => Some(action),
            None => return bad_request("invalid_action", format!("Unknown action: {raw}")),
        },
    };
    let filter = HistoryFilter {
        order_id: query.order_id.map(OrderId),
        operator_id: query.operator_id.map(MemberId),
        action,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let repo = HistoryRepository::new((*state.db).clone());

    match repo
        .list(&filter, PageRequest::from_query(query.page, query.per_page))
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => query_error_response(&e, "list approval history"),
    }
}

/// POST `/order-approval/{order_id}/approve` - Approve and settle an order.
async fn approve_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i64>,
    body: Option<Json<ApproveRequest>>,
) -> Response {
    let Json(request) = body.unwrap_or_default();

    match state
        .orders
        .approve_order(OrderId(order_id), auth.member_id(), request.notes)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "message": summary.message(),
                "payment": summary
            })),
        )
            .into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/order-approval/{order_id}/reject` - Reject a pending order.
async fn reject_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> Response {
    match state
        .orders
        .reject_order(
            OrderId(order_id),
            auth.member_id(),
            request.reason,
            request.notes,
        )
        .await
    {
        Ok(workflow) => (StatusCode::OK, Json(workflow)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PATCH `/order-approval/{order_id}/status` - Administrative status override.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> Response {
    let Some(status) = OrderStatus::parse(&request.status) else {
        return bad_request(
            "invalid_status",
            format!("Unknown order status: {}", request.status),
        );
    };

    match state
        .orders
        .update_order_status(
            OrderId(order_id),
            status,
            auth.member_id(),
            request.reason,
            request.notes,
        )
        .await
    {
        Ok(workflow) => (StatusCode::OK, Json(workflow)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/order-approval/batch` - Approve or reject many orders in turn.
async fn batch_approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<BatchRequest>,
) -> Response {
    let Some(action) = BatchAction::parse(&request.action) else {
        return bad_request("invalid_action", "action must be approve or reject");
    };
    if request.order_ids.is_empty() {
        return bad_request("empty_batch", "order_ids must not be empty");
    }

    let tokens: Vec<String> = request.order_ids.iter().map(id_token).collect();
    match state
        .orders
        .batch_approve(
            &tokens,
            action,
            request.reason,
            request.notes,
            auth.member_id(),
        )
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

//! Customer balance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use crate::routes::{query_error_response, workflow_error_response};
use crate::{AppState, middleware::AuthUser};
use playdesk_core::order::RechargeRequest;
use playdesk_core::workflow::WorkflowError;
use playdesk_db::CustomerRepository;
use playdesk_shared::types::{CustomerId, PageRequest};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers/{customer_id}/recharge", post(recharge))
        .route("/customers/{customer_id}/recharges", get(list_recharges))
        .route("/customers/{customer_id}/financial", get(financial_info))
}

/// Query parameters for paged lists.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// POST `/customers/{customer_id}/recharge` - Credit a customer's balance.
async fn recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(customer_id): Path<i64>,
    Json(request): Json<RechargeRequest>,
) -> impl IntoResponse {
    match state
        .accounts
        .recharge(CustomerId(customer_id), auth.member_id(), request)
        .await
    {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/customers/{customer_id}/recharges` - Recharge history, newest first.
async fn list_recharges(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(customer_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    let customer_id = CustomerId(customer_id);
    let page = PageRequest::from_query(query.page, query.per_page);

    match repo.find_by_id(customer_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return workflow_error_response(&WorkflowError::CustomerNotFound(customer_id)),
        Err(e) => return query_error_response(&e, "customer"),
    }

    match repo.recharge_history(customer_id, page).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => query_error_response(&e, "recharge history"),
    }
}

/// GET `/customers/{customer_id}/financial` - Balance and lifetime totals.
async fn financial_info(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(customer_id): Path<i64>,
) -> impl IntoResponse {
    match state.accounts.financial_info(CustomerId(customer_id)).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

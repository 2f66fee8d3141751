//! Order entry routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::routes::workflow_error_response;
use crate::{AppState, middleware::AuthUser};
use playdesk_core::order::{NewOrder, OrderPatch};
use playdesk_shared::types::OrderId;

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order).put(update_order))
}

/// POST `/orders` - Report a finished session as a pending order.
async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<NewOrder>,
) -> impl IntoResponse {
    match state.orders.create_order(auth.member_id(), input).await {
        Ok(details) => (StatusCode::CREATED, Json(details)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/orders/{order_id}` - Order with its pricing, workflow and payment.
async fn get_order(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(order_id): Path<i64>,
) -> impl IntoResponse {
    match state.orders.get_order_details(OrderId(order_id)).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PUT `/orders/{order_id}` - Edit an order while it is pending.
async fn update_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> impl IntoResponse {
    let order_id = OrderId(order_id);
    match state.orders.update_order(order_id, patch).await {
        Ok(details) => {
            info!(order_id = %order_id, member_id = %auth.member_id(), "Order updated");
            (StatusCode::OK, Json(details)).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

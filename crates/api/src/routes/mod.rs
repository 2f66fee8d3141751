//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth_middleware};
use playdesk_core::workflow::WorkflowError;

pub mod approval;
pub mod customers;
pub mod health;
pub mod orders;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(orders::routes())
        .merge(approval::routes())
        .merge(customers::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Renders a workflow error with its own status and code.
pub(crate) fn workflow_error_response(err: &WorkflowError) -> Response {
    if err.is_systemic() {
        error!(error = %err, "Order operation failed");
        return internal_error_response();
    }

    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Logs a failed read query and renders a generic 500.
pub(crate) fn query_error_response(err: &DbErr, context: &str) -> Response {
    error!(error = %err, context, "Query failed");
    internal_error_response()
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// Renders a 400 for a malformed request field.
pub(crate) fn bad_request(error: &str, message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message.into() })),
    )
        .into_response()
}

//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for orders, approvals and customer balances
//! - Authentication middleware
//! - JSON error rendering for workflow errors

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use playdesk_core::order::{CustomerAccountService, OrderApprovalService};
use playdesk_core::pricing::PricingCalculator;
use playdesk_db::SeaOrmOrderStore;
use playdesk_shared::{JwtService, PricingConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Order approval service.
    pub orders: Arc<OrderApprovalService<SeaOrmOrderStore>>,
    /// Customer balance service.
    pub accounts: Arc<CustomerAccountService<SeaOrmOrderStore>>,
    /// Pricing and reporting rates.
    pub pricing: PricingConfig,
}

impl AppState {
    /// Builds the state and its services over one connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, pricing: PricingConfig) -> Self {
        let store = SeaOrmOrderStore::new(db.clone());
        Self {
            orders: Arc::new(OrderApprovalService::new(
                store.clone(),
                PricingCalculator::new(pricing.exclusive_discount_rate),
            )),
            accounts: Arc::new(CustomerAccountService::new(store)),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            pricing,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use playdesk_shared::JwtConfig;
    use playdesk_shared::types::MemberId;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(
            DatabaseConnection::Disconnected,
            JwtService::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            }),
            PricingConfig::default(),
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = create_router(test_state())
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let response = create_router(test_state())
            .oneshot(
                Request::get("/api/v1/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let response = create_router(test_state())
            .oneshot(
                Request::get("/api/v1/order-approval/pending")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "missing_token");
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let response = create_router(test_state())
            .oneshot(
                Request::get("/api/v1/orders/1")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "invalid_token");
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let state = test_state();
        let token = state
            .jwt_service
            .generate_refresh_token(MemberId(1), "reviewer", "staff")
            .unwrap();

        let response = create_router(state)
            .oneshot(
                Request::get("/api/v1/orders/1")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_batch_rejects_unknown_action() {
        let state = test_state();
        let token = state
            .jwt_service
            .generate_access_token(MemberId(1), "reviewer", "staff")
            .unwrap();

        let response = create_router(state)
            .oneshot(
                Request::post("/api/v1/order-approval/batch")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"order_ids": ["1", "2"], "action": "archive"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_action");
    }

    #[tokio::test]
    async fn test_status_override_rejects_unknown_status() {
        let state = test_state();
        let token = state
            .jwt_service
            .generate_access_token(MemberId(1), "reviewer", "staff")
            .unwrap();

        let response = create_router(state)
            .oneshot(
                Request::patch("/api/v1/order-approval/7/status")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "archived"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_status");
    }
}

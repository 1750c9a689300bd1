//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing span, request logging, CORS)
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::crm::CrmClient;
use crate::http::error::ErrorResponse;
use crate::http::handlers;
use crate::http::request::{request_id, MakeHexRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<CrmClient>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around a shared CRM client.
    pub fn new(crm: Arc<CrmClient>) -> Self {
        let router = Self::build_router(AppState { crm });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers([HeaderName::from_static("x-requested-with"), X_REQUEST_ID])
            .expose_headers([X_REQUEST_ID]);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/health/upstream", get(handlers::upstream_health))
            .route(
                "/clients",
                get(handlers::list_clients).post(handlers::create_client),
            )
            .route("/clients/{client_id}/orders", get(handlers::list_client_orders))
            .route("/orders", post(handlers::create_order))
            .route("/orders/payments", post(handlers::attach_payment))
            .with_state(state)
            .layer(middleware::from_fn(log_requests))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeHexRequestId))
            .layer(cors_layer)
    }

    /// Borrow the router, e.g. to serve it from a test.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Log each request on arrival and completion with its latency.
async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    tracing::info!("Request received '{} {}'", method, path);
    let response = next.run(request).await;
    let elapsed = started.elapsed();

    tracing::info!(
        status = response.status().as_u16(),
        "Request '{} {}' completed ({:.4} sec)",
        method,
        path,
        elapsed.as_secs_f64()
    );
    metrics::record_request(method.as_str(), response.status().as_u16(), elapsed);

    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Unhandled exception");

    let body = ErrorResponse {
        error: "internal_error".to_string(),
        message: "Internal server error".to_string(),
        details: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use axum::http::header;
    use tower::ServiceExt;

    fn router() -> Router {
        let mut config = GatewayConfig::default();
        config.crm.api_key = "key".to_string();
        config.crm.base_url = Some("http://127.0.0.1:9/api/v5".to_string());
        let crm = CrmClient::from_config(&config).unwrap();
        HttpServer::new(Arc::new(crm)).router()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_gets_request_id() {
        let response = router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(&X_REQUEST_ID).unwrap();
        assert_eq!(id.len(), 32);
    }

    #[tokio::test]
    async fn test_bad_query_is_rejected_before_upstream() {
        let response = router()
            .oneshot(get("/clients?date_of_signup_from=2023-12-31&date_of_signup_to=2023-01-01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router().oneshot(get("/customers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_panic_response_matches_error_shape() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/clients")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let origin = &response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN];
        assert_eq!(origin.to_str().unwrap(), "*");
    }
}

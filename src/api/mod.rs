use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod extract;
pub mod handlers;
pub mod uploads;
pub mod verification;

/// Largest accepted request body (multipart uploads included).
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the idea API router.
/// All routes are relative; the caller mounts this under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/ideas",
            get(handlers::list_ideas).post(handlers::submit_idea),
        )
        .route(
            "/ideas/:id",
            get(handlers::get_idea).patch(handlers::patch_idea),
        )
        .route("/priority-board", get(handlers::priority_board))
        .route("/update-idea/:id", post(handlers::update_status))
        .route("/update-priority/:id", post(handlers::update_priority))
        .route("/update-comment/:id", post(handlers::update_comment))
        .route("/delete-idea/:id", delete(handlers::delete_idea))
        .route(
            "/send-verification-code",
            post(verification::send_verification_code),
        )
        .route("/verify-code", post(verification::verify_code))
        .route("/uploads/*key", get(uploads::get_upload))
        .fallback(fallback_404)
}

/// The complete application: API, uploads, health probes and middleware.
pub fn app(state: Arc<AppState>) -> Router {
    let dashboard_origin = state.config.dashboard_origin.clone();

    Router::new()
        .route("/", get(|| async { "Backend is running! Use API routes like /api/ideas" }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readiness_check))
        .route("/uploads/*key", get(uploads::get_upload))
        .nest("/api", api_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(dashboard_origin))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    if let Some(db) = &state.db {
        db.ping().await.map_err(|e| {
            tracing::warn!("readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;
    }
    Ok("ok")
}

/// Only the dashboard origin and local development hosts may call the API.
fn cors_layer(dashboard_origin: String) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            origin_str == dashboard_origin
                || origin_str.starts_with("http://localhost:")
                || origin_str.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-request-id"),
        ])
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
    );
    headers.remove("server");

    resp
}

pub mod api;
pub mod attrs;
pub mod auth;
pub mod db;
pub mod image;
pub mod models;
pub mod schema;
pub mod users;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
pub type AppState = Arc<db::DbPool>;

/// Assembles the full application router: public routes, protected routes
/// behind the auth middleware, and the Swagger UI.
pub fn app(pool: AppState) -> Router {
    // Public routes (no auth required)
    let public_router = api::public::router();

    // Protected routes (auth required before any handler logic)
    let protected_router = Router::new()
        .nest("/api/test", api::testing::router())
        .nest("/api/users", api::users::router())
        .nest("/api/tags", api::tags::router())
        .nest("/api/ingredients", api::ingredients::router())
        .nest("/api/recipes", api::recipes::router())
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth::require_auth,
        ));

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(public_router)
        .merge(protected_router)
        .merge(swagger_ui)
        .with_state(pool)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Don't create a span at all for noisy endpoints
                    if matched_path == "/api/test/unauthed-ping" {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        // Skip logging for noisy endpoints (trace-level spans)
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        )
}

pub mod register;
pub mod token;
pub mod unauthed_ping;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/test/unauthed-ping", get(unauthed_ping::unauthed_ping))
        .route("/api/users", post(register::register))
        .route("/api/users/token", post(token::token))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register::register,
        token::token,
        unauthed_ping::unauthed_ping,
    ),
    components(schemas(
        register::RegisterRequest,
        register::RegisterResponse,
        token::TokenRequest,
        token::TokenResponse,
        unauthed_ping::UnauthedPingResponse,
    ))
)]
pub struct ApiDoc;

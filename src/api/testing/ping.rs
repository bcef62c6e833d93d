use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Echoes who the token belongs to, so a client can smoke-test both the
/// route and its credentials in one call.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PingResponse {
    pub message: String,
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/api/test/ping",
    tag = "testing",
    responses(
        (status = 200, description = "Authenticated ping response", body = PingResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ping(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(PingResponse {
        message: "pong".to_string(),
        email: user.email,
    })
}

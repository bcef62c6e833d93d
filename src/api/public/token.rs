use crate::api::ErrorResponse;
use crate::auth::{create_session, verify_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use crate::users::normalize_email;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Every failure path returns the same body so callers cannot probe
/// which addresses have accounts.
fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Invalid credentials".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/users/token",
    tag = "users",
    request_body(content = TokenRequest, example = json!({"email": "user@company.com", "password": "password"})),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn token(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<TokenRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // Emails are stored lowercased, so normalizing the input makes the
    // lookup case-insensitive.
    let user: User = match users::table
        .filter(users::email.eq(normalize_email(&req.email)))
        .filter(users::is_active.eq(true))
        .select(User::as_select())
        .first(&mut conn)
    {
        Ok(u) => u,
        Err(_) => return invalid_credentials(),
    };

    if !verify_password(&req.password, &user.password_hash) {
        return invalid_credentials();
    }

    let token = match create_session(&mut conn, user.id) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create session".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(TokenResponse { token })).into_response()
}

use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::users::{create_user, CreateUserError};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// The password is never echoed back.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body(content = RegisterRequest, example = json!({"email": "user@company.com", "password": "password", "name": "User"})),
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    match create_user(&mut conn, &req.email, &req.password, req.name.trim()) {
        Ok(user) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                id: user.id,
                email: user.email,
                name: user.name,
            }),
        )
            .into_response(),
        Err(CreateUserError::EmptyEmail) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Email cannot be empty".to_string(),
            }),
        )
            .into_response(),
        Err(CreateUserError::EmailTaken) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Email already registered".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create user".to_string(),
                }),
            )
                .into_response()
        }
    }
}

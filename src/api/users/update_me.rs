use crate::api::public::register::MIN_PASSWORD_LEN;
use crate::api::users::me::ProfileResponse;
use crate::api::ErrorResponse;
use crate::auth::{hash_password, AuthUser};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Partial profile update; the email is immutable.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
struct ProfileChanges<'a> {
    name: Option<&'a str>,
    password_hash: Option<&'a str>,
    updated_at: chrono::DateTime<Utc>,
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let password_hash = match &req.password {
        Some(password) => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
                    }),
                )
                    .into_response();
            }
            match hash_password(password) {
                Ok(h) => Some(h),
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to hash password".to_string(),
                        }),
                    )
                        .into_response()
                }
            }
        }
        None => None,
    };

    let changes = ProfileChanges {
        name: req.name.as_deref().map(str::trim),
        password_hash: password_hash.as_deref(),
        updated_at: Utc::now(),
    };

    let mut conn = get_conn!(pool);

    let result: Result<(String, String), _> = diesel::update(users::table.find(user.id))
        .set(&changes)
        .returning((users::email, users::name))
        .get_result(&mut conn);

    match result {
        Ok((email, name)) => (
            StatusCode::OK,
            Json(ProfileResponse {
                id: user.id,
                email,
                name,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update profile: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update profile".to_string(),
                }),
            )
                .into_response()
        }
    }
}

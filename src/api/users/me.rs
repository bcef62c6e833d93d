use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
    })
}

use crate::api::ErrorResponse;
use crate::attrs::{self, AttrItem, CreateAttrRequest};
use crate::auth::AuthUser;
use crate::models::Tag;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "tags",
    request_body = CreateAttrRequest,
    responses(
        (status = 201, description = "Tag created successfully", body = AttrItem),
        (status = 400, description = "Invalid request (empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_tag(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Json(request): Json<CreateAttrRequest>,
) -> impl IntoResponse {
    attrs::create_attr::<Tag>(user, pool, request).await
}

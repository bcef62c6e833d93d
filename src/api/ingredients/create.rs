use crate::api::ErrorResponse;
use crate::attrs::{self, AttrItem, CreateAttrRequest};
use crate::auth::AuthUser;
use crate::models::Ingredient;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = "ingredients",
    request_body = CreateAttrRequest,
    responses(
        (status = 201, description = "Ingredient created successfully", body = AttrItem),
        (status = 400, description = "Invalid request (empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Json(request): Json<CreateAttrRequest>,
) -> impl IntoResponse {
    attrs::create_attr::<Ingredient>(user, pool, request).await
}

use crate::api::ErrorResponse;
use crate::attrs::{self, AttrItem};
use crate::auth::AuthUser;
use crate::models::Ingredient;
use crate::AppState;
use axum::{extract::State, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    responses(
        (status = 200, description = "The caller's ingredients, name descending", body = [AttrItem]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
) -> impl IntoResponse {
    attrs::list_attrs::<Ingredient>(user, pool).await
}

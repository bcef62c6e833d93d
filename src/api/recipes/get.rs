use crate::api::ErrorResponse;
use crate::attrs::AttrItem;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    /// Decimal string, e.g. "5.50"
    pub price: String,
    pub tags: Vec<AttrItem>,
    pub ingredients: Vec<AttrItem>,
    pub image_path: Option<String>,
}

/// Loads a recipe's detail payload. Callers must already have checked
/// that `recipe` belongs to the requester.
pub(crate) fn load_detail(conn: &mut PgConnection, recipe: Recipe) -> QueryResult<RecipeDetail> {
    let tag_items: Vec<(Uuid, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq(recipe.id))
        .order(tags::name.desc())
        .select((tags::id, tags::name))
        .load(conn)?;

    let ingredient_items: Vec<(Uuid, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe.id))
        .order(ingredients::name.desc())
        .select((ingredients::id, ingredients::name))
        .load(conn)?;

    Ok(RecipeDetail {
        id: recipe.id,
        title: recipe.title,
        time_minutes: recipe.time_minutes,
        price: recipe.price.to_string(),
        tags: tag_items
            .into_iter()
            .map(|(id, name)| AttrItem { id, name })
            .collect(),
        ingredients: ingredient_items
            .into_iter()
            .map(|(id, name)| AttrItem { id, name })
            .collect(),
        image_path: recipe.image_path,
    })
}

/// Fetches a recipe owned by the caller, or responds 404. Another user's
/// recipe id looks exactly like a nonexistent one.
pub(crate) fn find_owned_recipe(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<Recipe, Response> {
    let recipe: Option<Recipe> = recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .first(conn)
        .optional()
        .map_err(|e| {
            tracing::error!("Failed to fetch recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        })?;

    recipe.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response()
    })
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetail),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let recipe = match find_owned_recipe(&mut conn, user.id, id) {
        Ok(r) => r,
        Err(response) => return response,
    };

    match load_detail(&mut conn, recipe) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load recipe detail: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

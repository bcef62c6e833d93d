use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeItem {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    /// Decimal string, e.g. "5.50"
    pub price: String,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
    pub image_path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "The caller's recipes, newest first", body = [RecipeItem]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::user_id.eq(user.id))
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    // One query per join table instead of one per recipe
    let tag_links: Vec<(Uuid, Uuid)> = match recipe_tags::table
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .select((recipe_tags::recipe_id, recipe_tags::tag_id))
        .load(&mut conn)
    {
        Ok(links) => links,
        Err(e) => {
            tracing::error!("Failed to fetch recipe tags: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ingredient_links: Vec<(Uuid, Uuid)> = match recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::ingredient_id,
        ))
        .load(&mut conn)
    {
        Ok(links) => links,
        Err(e) => {
            tracing::error!("Failed to fetch recipe ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut tags_by_recipe: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (recipe_id, tag_id) in tag_links {
        tags_by_recipe.entry(recipe_id).or_default().push(tag_id);
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (recipe_id, ingredient_id) in ingredient_links {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(ingredient_id);
    }

    let items: Vec<RecipeItem> = rows
        .into_iter()
        .map(|recipe| RecipeItem {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price.to_string(),
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            ingredients: ingredients_by_recipe
                .remove(&recipe.id)
                .unwrap_or_default(),
            image_path: recipe.image_path,
        })
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::get::{find_owned_recipe, load_detail, RecipeDetail};
use super::{all_ingredients_owned, all_tags_owned, dedup_ids, replace_recipe_ingredients, replace_recipe_tags};

/// Partial update: absent fields are left untouched; `tags` and
/// `ingredients`, when present, replace the whole set.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    /// Decimal string, e.g. "5.50"
    pub price: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
struct RecipeChanges<'a> {
    title: Option<&'a str>,
    time_minutes: Option<i32>,
    price: Option<BigDecimal>,
    updated_at: chrono::DateTime<Utc>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    let title = request.title.as_deref().map(str::trim);
    if title == Some("") {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Title cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    let price = match request.price.as_deref().map(BigDecimal::from_str) {
        None => None,
        Some(Ok(p)) => Some(p),
        Some(Err(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Price must be a decimal number".to_string(),
                }),
            )
                .into_response()
        }
    };

    let tag_ids = request.tags.map(dedup_ids);
    let ingredient_ids = request.ingredients.map(dedup_ids);

    let mut conn = get_conn!(pool);

    if let Err(response) = find_owned_recipe(&mut conn, user.id, id) {
        return response;
    }

    if let Some(ids) = &tag_ids {
        match all_tags_owned(&mut conn, user.id, ids) {
            Ok(true) => {}
            Ok(false) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Unknown tag id".to_string(),
                    }),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!("Failed to validate tag ids: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to update recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    if let Some(ids) = &ingredient_ids {
        match all_ingredients_owned(&mut conn, user.id, ids) {
            Ok(true) => {}
            Ok(false) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Unknown ingredient id".to_string(),
                    }),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!("Failed to validate ingredient ids: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to update recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let changes = RecipeChanges {
            title,
            time_minutes: request.time_minutes,
            price,
            updated_at: Utc::now(),
        };

        let recipe: Recipe = diesel::update(recipes::table.find(id))
            .set(&changes)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        if let Some(ids) = &tag_ids {
            replace_recipe_tags(conn, id, ids)?;
        }
        if let Some(ids) = &ingredient_ids {
            replace_recipe_ingredients(conn, id, ids)?;
        }

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_detail(&mut conn, recipe) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load recipe detail: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

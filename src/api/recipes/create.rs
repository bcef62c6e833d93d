use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::NewRecipe;
use crate::schema::recipes;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{all_ingredients_owned, all_tags_owned, dedup_ids, replace_recipe_ingredients, replace_recipe_tags};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    /// Decimal string, e.g. "5.50"
    pub price: String,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    let title = request.title.trim();
    if title.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Title cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    let price = match BigDecimal::from_str(&request.price) {
        Ok(p) => p,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Price must be a decimal number".to_string(),
                }),
            )
                .into_response()
        }
    };

    let tag_ids = dedup_ids(request.tags.unwrap_or_default());
    let ingredient_ids = dedup_ids(request.ingredients.unwrap_or_default());

    let mut conn = get_conn!(pool);

    // Attribute ids from other users are rejected the same way as ids
    // that don't exist at all.
    match all_tags_owned(&mut conn, user.id, &tag_ids) {
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
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    match all_ingredients_owned(&mut conn, user.id, &ingredient_ids) {
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
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    // Recipe row and join rows land atomically
    let result: Result<Uuid, diesel::result::Error> = conn.transaction(|conn| {
        let new_recipe = NewRecipe {
            user_id: user.id,
            title,
            time_minutes: request.time_minutes,
            price,
        };

        let recipe_id: Uuid = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(recipes::id)
            .get_result(conn)?;

        replace_recipe_tags(conn, recipe_id, &tag_ids)?;
        replace_recipe_ingredients(conn, recipe_id, &ingredient_ids)?;

        Ok(recipe_id)
    });

    match result {
        Ok(recipe_id) => (
            StatusCode::CREATED,
            Json(CreateRecipeResponse { id: recipe_id }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

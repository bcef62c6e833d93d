pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;
pub mod upload_image;

use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use std::collections::BTreeSet;
use utoipa::OpenApi;
use uuid::Uuid;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/image", post(upload_image::upload_image))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        upload_image::upload_image,
    ),
    components(schemas(
        list::RecipeItem,
        create::CreateRecipeRequest,
        create::CreateRecipeResponse,
        get::RecipeDetail,
        update::UpdateRecipeRequest,
        upload_image::UploadImageRequest,
        upload_image::UploadImageResponse,
    ))
)]
pub struct ApiDoc;

pub(crate) fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let set: BTreeSet<Uuid> = ids.into_iter().collect();
    set.into_iter().collect()
}

/// True when every id in `ids` is a tag owned by `user_id`. Referencing
/// another user's tags is indistinguishable from referencing ids that
/// don't exist.
pub(crate) fn all_tags_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    ids: &[Uuid],
) -> QueryResult<bool> {
    if ids.is_empty() {
        return Ok(true);
    }
    let owned: i64 = tags::table
        .filter(tags::user_id.eq(user_id))
        .filter(tags::id.eq_any(ids))
        .count()
        .get_result(conn)?;
    Ok(owned == ids.len() as i64)
}

pub(crate) fn all_ingredients_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    ids: &[Uuid],
) -> QueryResult<bool> {
    if ids.is_empty() {
        return Ok(true);
    }
    let owned: i64 = ingredients::table
        .filter(ingredients::user_id.eq(user_id))
        .filter(ingredients::id.eq_any(ids))
        .count()
        .get_result(conn)?;
    Ok(owned == ids.len() as i64)
}

pub(crate) fn replace_recipe_tags(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    let rows: Vec<crate::models::NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| crate::models::NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

pub(crate) fn replace_recipe_ingredients(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    ingredient_ids: &[Uuid],
) -> QueryResult<()> {
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)?;
    let rows: Vec<crate::models::NewRecipeIngredient> = ingredient_ids
        .iter()
        .map(|&ingredient_id| crate::models::NewRecipeIngredient {
            recipe_id,
            ingredient_id,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

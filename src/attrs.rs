//! Ownership-scoped query layer for user-owned recipe attributes.
//!
//! Tags and ingredients have identical list/create behavior: every read is
//! filtered to the requester's rows (name descending) and every create
//! assigns the requester as owner. That policy lives here exactly once;
//! the per-entity API modules are thin instantiations.

use crate::api::ErrorResponse;
use crate::get_conn;
use crate::models::{Ingredient, NewIngredient, NewTag, Tag, User};
use crate::schema::{ingredients, tags};
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttrItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAttrRequest {
    pub name: String,
}

/// Descriptor for a user-owned named attribute table.
pub trait UserOwnedAttr {
    /// Resource noun used in error messages and logs.
    const RESOURCE: &'static str;

    fn list_for_user(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<AttrItem>>;

    fn insert_for_user(conn: &mut PgConnection, user_id: Uuid, name: &str)
        -> QueryResult<AttrItem>;
}

impl UserOwnedAttr for Tag {
    const RESOURCE: &'static str = "Tag";

    fn list_for_user(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<AttrItem>> {
        let rows: Vec<(Uuid, String)> = tags::table
            .filter(tags::user_id.eq(user_id))
            .order(tags::name.desc())
            .select((tags::id, tags::name))
            .load(conn)?;
        Ok(rows.into_iter().map(|(id, name)| AttrItem { id, name }).collect())
    }

    fn insert_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
    ) -> QueryResult<AttrItem> {
        let (id, name) = diesel::insert_into(tags::table)
            .values(NewTag { user_id, name })
            .returning((tags::id, tags::name))
            .get_result::<(Uuid, String)>(conn)?;
        Ok(AttrItem { id, name })
    }
}

impl UserOwnedAttr for Ingredient {
    const RESOURCE: &'static str = "Ingredient";

    fn list_for_user(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<AttrItem>> {
        let rows: Vec<(Uuid, String)> = ingredients::table
            .filter(ingredients::user_id.eq(user_id))
            .order(ingredients::name.desc())
            .select((ingredients::id, ingredients::name))
            .load(conn)?;
        Ok(rows.into_iter().map(|(id, name)| AttrItem { id, name }).collect())
    }

    fn insert_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
    ) -> QueryResult<AttrItem> {
        let (id, name) = diesel::insert_into(ingredients::table)
            .values(NewIngredient { user_id, name })
            .returning((ingredients::id, ingredients::name))
            .get_result::<(Uuid, String)>(conn)?;
        Ok(AttrItem { id, name })
    }
}

/// Shared list handler body: only the caller's rows, name descending.
pub async fn list_attrs<T: UserOwnedAttr>(user: User, pool: AppState) -> Response {
    let mut conn = get_conn!(pool);

    match T::list_for_user(&mut conn, user.id) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            tracing::error!("Failed to list {} rows: {}", T::RESOURCE, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch {}s", T::RESOURCE.to_lowercase()),
                }),
            )
                .into_response()
        }
    }
}

/// Shared create handler body: the caller always becomes the owner; the
/// payload carries only the name.
pub async fn create_attr<T: UserOwnedAttr>(
    user: User,
    pool: AppState,
    request: CreateAttrRequest,
) -> Response {
    let name = request.name.trim();

    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("{} name cannot be empty", T::RESOURCE),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    match T::insert_for_user(&mut conn, user.id, name) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => {
            tracing::error!("Failed to create {}: {}", T::RESOURCE, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create {}", T::RESOURCE.to_lowercase()),
                }),
            )
                .into_response()
        }
    }
}

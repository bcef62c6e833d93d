use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::image::recipe_image_path;
use crate::schema::recipes;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub id: Uuid,
    pub image_path: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

fn media_root() -> std::path::PathBuf {
    std::env::var("MEDIA_ROOT")
        .unwrap_or_else(|_| "media".to_string())
        .into()
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/image",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(user): AuthUser,
    State(pool): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No file provided".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Multipart read error: {}", e);
            return (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Failed to read multipart data: {}", e.body_text()),
                }),
            )
                .into_response();
        }
    };

    // The client filename only ever contributes an extension; grab it
    // before the field is consumed.
    let original_filename = field.file_name().unwrap_or_default().to_string();

    let data = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Field read error: {}", e);
            return (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Failed to read file data: {}", e.body_text()),
                }),
            )
                .into_response();
        }
    };

    if data.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No file provided".to_string(),
            }),
        )
            .into_response();
    }

    {
        let mut conn = get_conn!(pool);
        if let Err(response) = super::get::find_owned_recipe(&mut conn, user.id, id) {
            return response;
        }
    }

    let image_path = recipe_image_path(&Uuid::new_v4().to_string(), &original_filename);
    let full_path = media_root().join(&image_path);

    if let Some(parent) = full_path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::error!("Failed to create media directory: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store image".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Err(e) = tokio::fs::write(&full_path, &data).await {
        tracing::error!("Failed to write image file: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to store image".to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    let updated = diesel::update(
        recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::user_id.eq(user.id)),
    )
    .set((
        recipes::image_path.eq(&image_path),
        recipes::updated_at.eq(Utc::now()),
    ))
    .execute(&mut conn);

    match updated {
        // The recipe went away between the ownership check and the update;
        // don't leave an orphaned file behind.
        Ok(0) => {
            if let Err(e) = tokio::fs::remove_file(&full_path).await {
                tracing::warn!("Failed to remove orphaned image file: {}", e);
            }
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Ok(_) => (
            StatusCode::OK,
            Json(UploadImageResponse { id, image_path }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to record image path: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store image".to_string(),
                }),
            )
                .into_response()
        }
    }
}

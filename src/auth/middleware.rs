use crate::api::ErrorResponse;
use crate::db::DbPool;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::db::get_user_from_token;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Middleware that requires a valid auth token for all requests.
/// Rejects before any handler logic runs; handlers still use the
/// AuthUser extractor to learn who the caller is.
pub async fn require_auth(
    State(pool): State<Arc<DbPool>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = match request.headers().get(header::AUTHORIZATION) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return unauthorized("Invalid Authorization header"),
    };

    let token = match auth_str.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization header format"),
    };

    if get_user_from_token(&pool, token).await.is_none() {
        return unauthorized("Invalid or expired token");
    }

    next.run(request).await
}

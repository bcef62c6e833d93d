pub mod me;
pub mod update_me;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for authenticated profile endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me::me).patch(update_me::update_me))
}

#[derive(OpenApi)]
#[openapi(
    paths(me::me, update_me::update_me),
    components(schemas(me::ProfileResponse, update_me::UpdateProfileRequest))
)]
pub struct ApiDoc;

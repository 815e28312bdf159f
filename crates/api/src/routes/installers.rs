use axum::routing::{get, post};
use axum::Router;

use crate::handlers::installers;
use crate::state::AppState;

/// Routes mounted at `/installers`.
///
/// ```text
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// GET    /{id}/revisions           -> list_revisions
/// POST   /{id}/fork                -> fork
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(installers::get_by_id).put(installers::update))
        .route("/{id}/revisions", get(installers::list_revisions))
        .route("/{id}/fork", post(installers::fork))
}

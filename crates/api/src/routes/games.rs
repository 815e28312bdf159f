use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{games, installers};
use crate::state::AppState;

/// Routes mounted at `/games`.
///
/// ```text
/// POST   /                         -> create
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// POST   /{id}/edits               -> suggest_edit
/// POST   /{id}/screenshots         -> add_screenshot
/// GET    /{id}/installers          -> installers::list_for_game
/// POST   /{id}/installers          -> installers::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(games::create))
        .route("/{id}", get(games::get_by_id).put(games::update))
        .route("/{id}/edits", post(games::suggest_edit))
        .route("/{id}/screenshots", post(games::add_screenshot))
        .route(
            "/{id}/installers",
            get(installers::list_for_game).post(installers::create),
        )
}

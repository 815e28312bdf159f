use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// Routes mounted at `/library`.
///
/// ```text
/// GET    /                         -> list
/// GET    /options                  -> options
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(library::list))
        .route("/options", get(library::options))
}

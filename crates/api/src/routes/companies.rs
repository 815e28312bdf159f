use axum::routing::get;
use axum::Router;

use crate::handlers::companies;
use crate::state::AppState;

/// Routes mounted at `/companies`.
///
/// ```text
/// GET    /search?q=&limit=         -> search
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(companies::search))
}

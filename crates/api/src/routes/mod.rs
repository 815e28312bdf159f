pub mod companies;
pub mod games;
pub mod health;
pub mod installers;
pub mod library;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /library                                         filtered list of public games
/// /library/options                                 filter choice lists
///
/// /companies/search?q=                             typeahead search
///
/// /games                                           submit (POST)
/// /games/{id}                                      get, admin update (PUT)
/// /games/{id}/edits                                suggest an edit (POST)
/// /games/{id}/screenshots                          add a screenshot (POST)
/// /games/{id}/installers                           list, submit (GET, POST)
///
/// /installers/{id}                                 get, edit (PUT, stored as a revision)
/// /installers/{id}/revisions                       pending revisions (GET)
/// /installers/{id}/fork                            copy into another game (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/library", library::router())
        .nest("/companies", companies::router())
        .nest("/games", games::router())
        .nest("/installers", installers::router())
}

//! Handlers for the public game library.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::forms::library::{
    clean_library_filter, requested_ids, LibraryChoices, LibraryFilterInput, LibraryOptions,
};
use catalog_core::search::{clamp_limit, clamp_offset, DEFAULT_LIBRARY_LIMIT, MAX_LIBRARY_LIMIT};
use catalog_db::models::lookup::LookupRow;
use catalog_db::repositories::{CompanyRepo, GameRepo, GenreRepo, PlatformRepo};

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn ids(rows: &[LookupRow]) -> impl Iterator<Item = i64> + '_ {
    rows.iter().map(|row| row.id)
}

/// GET /api/v1/library?q=&platforms=1,2&genres=&companies=&years=&flags=&limit=&offset=
///
/// List public games matching the filter, ordered by name.
pub async fn list(
    State(state): State<AppState>,
    Query(input): Query<LibraryFilterInput>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let platforms = PlatformRepo::list(&state.pool).await?;
    let genres = GenreRepo::list(&state.pool).await?;
    let companies =
        CompanyRepo::existing_ids(&state.pool, &requested_ids(input.companies.as_deref())).await?;

    let choices = LibraryChoices {
        platforms: ids(&platforms).collect(),
        genres: ids(&genres).collect(),
        companies: companies.into_iter().collect(),
    };
    let today = chrono::Utc::now().date_naive();
    let filter = clean_library_filter(&input, &choices, today)?;

    let limit = clamp_limit(page.limit, DEFAULT_LIBRARY_LIMIT, MAX_LIBRARY_LIMIT);
    let offset = clamp_offset(page.offset);
    let games = GameRepo::list_library(&state.pool, &filter, limit, offset).await?;

    tracing::debug!(count = games.len(), ?filter, "Library listed");
    Ok(Json(DataResponse { data: games }))
}

/// GET /api/v1/library/options
///
/// Choice lists for the library filter: platforms, genres, years, flags.
pub async fn options(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let platforms = PlatformRepo::list(&state.pool).await?;
    let genres = GenreRepo::list(&state.pool).await?;

    let options = LibraryOptions::new(
        platforms.into_iter().map(Into::into).collect(),
        genres.into_iter().map(Into::into).collect(),
        chrono::Utc::now().date_naive(),
    );
    Ok(Json(DataResponse { data: options }))
}

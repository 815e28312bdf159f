//! Handlers for the `/companies` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::search::{clamp_limit, DEFAULT_TYPEAHEAD_LIMIT, MAX_TYPEAHEAD_LIMIT};
use catalog_db::models::company::Company;
use catalog_db::repositories::CompanyRepo;

use crate::error::AppResult;
use crate::query::CompanySearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/companies/search?q=&limit=
///
/// Company autocomplete for the developer and publisher fields. A blank
/// query returns no suggestions.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<CompanySearchParams>,
) -> AppResult<impl IntoResponse> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(DataResponse {
            data: Vec::<Company>::new(),
        }));
    }

    let limit = clamp_limit(params.limit, DEFAULT_TYPEAHEAD_LIMIT, MAX_TYPEAHEAD_LIMIT);
    let companies = CompanyRepo::search(&state.pool, term, limit).await?;
    Ok(Json(DataResponse { data: companies }))
}

//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `catalog_core::search::clamp_limit` /
/// `clamp_offset` before reaching the repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the company autocomplete (`?q=&limit=`).
#[derive(Debug, Deserialize)]
pub struct CompanySearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

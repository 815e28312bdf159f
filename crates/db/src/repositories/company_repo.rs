//! Repository for the `companies` table.

use catalog_core::search::{contains_pattern, prefix_pattern};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::{Company, CreateCompany};

/// Column list for companies queries.
const COLUMNS: &str = "id, name, slug, website, created_at, updated_at";

/// Provides lookups for developers and publishers.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Find a non-deleted company by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Autocomplete: companies whose name contains `term`, case-insensitive.
    /// Names starting with the term sort first.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companies \
             WHERE deleted_at IS NULL AND name ILIKE $1 \
             ORDER BY (name ILIKE $2) DESC, name ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(contains_pattern(term))
            .bind(prefix_pattern(term))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Which of `ids` belong to non-deleted companies.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM companies WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Create a new company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name, slug, website) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.website)
            .fetch_one(pool)
            .await
    }
}

//! Sibling slug lookups for collision-free slug assignment.

use catalog_core::search::prefix_pattern;
use catalog_core::slug::{explicit_candidate, search_prefix, EntityKind, SlugRecord};
use catalog_core::types::DbId;
use sqlx::PgPool;

/// Fetches the records a new slug could collide with.
pub struct SlugRepo;

impl SlugRepo {
    /// Non-deleted records of `kind` whose slug starts with the search prefix
    /// of `base`, plus the record holding the slug `explicit` resolves to
    /// (see [`explicit_candidate`]) if any.
    ///
    /// This is the sibling set [`catalog_core::slug::assign_slug`] expects.
    pub async fn siblings(
        pool: &PgPool,
        kind: EntityKind,
        base: &str,
        explicit: Option<&str>,
    ) -> Result<Vec<SlugRecord>, sqlx::Error> {
        let query = format!(
            "SELECT id, slug FROM {} \
             WHERE deleted_at IS NULL AND (slug LIKE $1 OR slug = $2)",
            kind.table()
        );
        let rows: Vec<(DbId, String)> = sqlx::query_as(&query)
            .bind(prefix_pattern(search_prefix(base)))
            .bind(explicit.and_then(explicit_candidate).unwrap_or_default())
            .fetch_all(pool)
            .await?;

        tracing::debug!(kind = ?kind, base, count = rows.len(), "Fetched slug siblings");
        Ok(rows
            .into_iter()
            .map(|(id, slug)| SlugRecord::new(id, slug))
            .collect())
    }
}

//! Repositories for the choice tables: platforms, genres and runners.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::lookup::LookupRow;

async fn list(pool: &PgPool, table: &str) -> Result<Vec<LookupRow>, sqlx::Error> {
    let query = format!("SELECT id, name, slug FROM {table} ORDER BY name ASC, id ASC");
    sqlx::query_as::<_, LookupRow>(&query).fetch_all(pool).await
}

async fn existing_ids(pool: &PgPool, table: &str, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = format!("SELECT id FROM {table} WHERE id = ANY($1)");
    let rows: Vec<(DbId,)> = sqlx::query_as(&query).bind(ids).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Platforms a game runs on.
pub struct PlatformRepo;

impl PlatformRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<LookupRow>, sqlx::Error> {
        list(pool, "platforms").await
    }

    /// Which of `ids` are known platforms.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        existing_ids(pool, "platforms", ids).await
    }
}

/// Game genres.
pub struct GenreRepo;

impl GenreRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<LookupRow>, sqlx::Error> {
        list(pool, "genres").await
    }

    /// Which of `ids` are known genres.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        existing_ids(pool, "genres", ids).await
    }
}

/// Runners installers can target.
pub struct RunnerRepo;

impl RunnerRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<LookupRow>, sqlx::Error> {
        list(pool, "runners").await
    }

    /// Slugs of all runners.
    pub async fn slugs(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT slug FROM runners ORDER BY slug")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }
}

//! Repository for the `games` table and its platform/genre links.

use catalog_core::forms::library::LibraryFilter;
use catalog_core::search::contains_pattern;
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::game::{CreateGame, Game, UpdateGame};

/// Column list for games queries.
const COLUMNS: &str = "id, name, slug, year, developer_id, publisher_id, website, \
    description, title_logo, gogid, flags, is_public, deleted_at, created_at, updated_at";

/// Provides CRUD and library queries for games.
pub struct GameRepo;

impl GameRepo {
    /// Find a non-deleted game by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Game>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM games WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the non-deleted game holding `slug`.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Game>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM games WHERE slug = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Game>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new unpublished game together with its platform and genre
    /// links.
    pub async fn create(pool: &PgPool, input: &CreateGame) -> Result<Game, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO games \
                (name, slug, year, developer_id, publisher_id, website, description, \
                 title_logo, gogid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let game = sqlx::query_as::<_, Game>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.year)
            .bind(input.developer_id)
            .bind(input.publisher_id)
            .bind(&input.website)
            .bind(&input.description)
            .bind(&input.title_logo)
            .bind(input.gogid)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_links_inner(&mut tx, game.id, &input.platform_ids, &input.genre_ids).await?;

        tx.commit().await?;
        tracing::info!(game_id = game.id, slug = %game.slug, "Game created");
        Ok(game)
    }

    /// Replace a game's editable fields and links.
    ///
    /// Returns `None` if no non-deleted game with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGame,
    ) -> Result<Option<Game>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE games SET \
                name = $2, slug = $3, year = $4, developer_id = $5, publisher_id = $6, \
                website = $7, description = $8, title_logo = COALESCE($9, title_logo), \
                gogid = $10, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let game = sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.year)
            .bind(input.developer_id)
            .bind(input.publisher_id)
            .bind(&input.website)
            .bind(&input.description)
            .bind(&input.title_logo)
            .bind(input.gogid)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref game) = game {
            Self::set_links_inner(&mut tx, game.id, &input.platform_ids, &input.genre_ids)
                .await?;
        }

        tx.commit().await?;
        Ok(game)
    }

    /// Mark a game as published. Returns `true` if a row changed.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE games SET is_public = true, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL AND is_public = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a game. Returns `true` if a row changed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE games SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a game's flag bits.
    pub async fn set_flags(pool: &PgPool, id: DbId, flags: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE games SET flags = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(flags)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Platform ids linked to a game, ascending.
    pub async fn platform_ids(pool: &PgPool, game_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT platform_id FROM game_platforms WHERE game_id = $1 ORDER BY platform_id",
        )
        .bind(game_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Genre ids linked to a game, ascending.
    pub async fn genre_ids(pool: &PgPool, game_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT genre_id FROM game_genres WHERE game_id = $1 ORDER BY genre_id",
        )
        .bind(game_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Public games matching `filter`, ordered by name.
    ///
    /// Empty lists in the filter do not restrict; a game matches a list
    /// filter when it matches any of its values. All flag bits in
    /// `filter.flags` must be set.
    pub async fn list_library(
        pool: &PgPool,
        filter: &LibraryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Game>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM games \
             WHERE deleted_at IS NULL AND is_public = true \
               AND ($1::text IS NULL OR name ILIKE $1) \
               AND (cardinality($2::bigint[]) = 0 OR EXISTS ( \
                    SELECT 1 FROM game_platforms gp \
                    WHERE gp.game_id = games.id AND gp.platform_id = ANY($2))) \
               AND (cardinality($3::bigint[]) = 0 OR EXISTS ( \
                    SELECT 1 FROM game_genres gg \
                    WHERE gg.game_id = games.id AND gg.genre_id = ANY($3))) \
               AND (cardinality($4::bigint[]) = 0 \
                    OR developer_id = ANY($4) OR publisher_id = ANY($4)) \
               AND (cardinality($5::int[]) = 0 OR year = ANY($5)) \
               AND (flags & $6) = $6 \
             ORDER BY name ASC, id ASC \
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(filter.q.as_deref().map(contains_pattern))
            .bind(&filter.platforms)
            .bind(&filter.genres)
            .bind(&filter.companies)
            .bind(&filter.years)
            .bind(filter.flags)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace platform and genre links within an existing transaction.
    async fn set_links_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game_id: DbId,
        platform_ids: &[DbId],
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM game_platforms WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO game_platforms (game_id, platform_id) \
             SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING",
        )
        .bind(game_id)
        .bind(platform_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM game_genres WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO game_genres (game_id, genre_id) \
             SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING",
        )
        .bind(game_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

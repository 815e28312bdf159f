//! Repository for the `screenshots` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::screenshot::{CreateScreenshot, Screenshot};

/// Column list for screenshots queries.
const COLUMNS: &str = "id, game_id, image, description, published, created_at";

pub struct ScreenshotRepo;

impl ScreenshotRepo {
    /// Insert an unpublished screenshot.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScreenshot,
    ) -> Result<Screenshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO screenshots (game_id, image, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Screenshot>(&query)
            .bind(input.game_id)
            .bind(&input.image)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Screenshots of a game, oldest first.
    pub async fn list_for_game(
        pool: &PgPool,
        game_id: DbId,
    ) -> Result<Vec<Screenshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM screenshots WHERE game_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Screenshot>(&query)
            .bind(game_id)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the `game_edit_requests` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::game_edit_request::{CreateGameEditRequest, GameEditRequest};

/// Column list for game_edit_requests queries.
const COLUMNS: &str = "id, game_id, changes, changed_fields, reason, created_at";

pub struct GameEditRequestRepo;

impl GameEditRequestRepo {
    /// Store an edit suggestion for moderation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGameEditRequest,
    ) -> Result<GameEditRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO game_edit_requests (game_id, changes, changed_fields, reason) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, GameEditRequest>(&query)
            .bind(input.game_id)
            .bind(&input.changes)
            .bind(&input.changed_fields)
            .bind(&input.reason)
            .fetch_one(pool)
            .await?;

        tracing::info!(
            request_id = request.id,
            game_id = request.game_id,
            fields = ?request.changed_fields,
            "Game edit suggestion stored"
        );
        Ok(request)
    }

    /// Suggestions for a game, newest first.
    pub async fn list_for_game(
        pool: &PgPool,
        game_id: DbId,
    ) -> Result<Vec<GameEditRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM game_edit_requests \
             WHERE game_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, GameEditRequest>(&query)
            .bind(game_id)
            .fetch_all(pool)
            .await
    }
}

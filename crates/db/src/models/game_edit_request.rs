//! Game edit suggestion model.

use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `game_edit_requests` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GameEditRequest {
    pub id: DbId,
    pub game_id: DbId,
    /// The suggested field values.
    pub changes: serde_json::Value,
    pub changed_fields: Vec<String>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for storing an edit suggestion.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameEditRequest {
    pub game_id: DbId,
    pub changes: serde_json::Value,
    pub changed_fields: Vec<String>,
    pub reason: Option<String>,
}

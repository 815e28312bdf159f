//! Screenshot model.

use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `screenshots` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Screenshot {
    pub id: DbId,
    pub game_id: DbId,
    /// Media-relative image path.
    pub image: String,
    pub description: String,
    pub published: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a screenshot. Screenshots start unpublished.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScreenshot {
    pub game_id: DbId,
    pub image: String,
    pub description: String,
}

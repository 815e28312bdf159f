//! Game model.

use catalog_core::game::{flag_names, GameSlugMatch};
use catalog_core::forms::game::GameFields;
use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `games` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Game {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub year: Option<i32>,
    pub developer_id: Option<DbId>,
    pub publisher_id: Option<DbId>,
    pub website: Option<String>,
    pub description: Option<String>,
    /// Media-relative path of the title logo.
    pub title_logo: Option<String>,
    pub gogid: Option<i64>,
    pub flags: i64,
    pub is_public: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Game {
    /// Names of the catalog flags set on this game.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flag_names(self.flags)
    }

    /// The slug lookup view consulted by the name duplicate check.
    pub fn slug_match(&self) -> GameSlugMatch {
        GameSlugMatch {
            slug: self.slug.clone(),
            is_public: self.is_public,
        }
    }

    /// Stored values in the shape the game forms compare against.
    pub fn fields(&self, platforms: Vec<DbId>, genres: Vec<DbId>) -> GameFields {
        GameFields {
            name: self.name.clone(),
            year: self.year,
            developer_id: self.developer_id,
            publisher_id: self.publisher_id,
            website: self.website.clone(),
            platforms,
            genres,
            description: self.description.clone(),
            title_logo: None,
        }
    }
}

/// DTO for creating a new game. New games are stored unpublished.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGame {
    pub name: String,
    pub slug: String,
    pub year: Option<i32>,
    pub developer_id: Option<DbId>,
    pub publisher_id: Option<DbId>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub title_logo: Option<String>,
    pub gogid: Option<i64>,
    #[serde(default)]
    pub platform_ids: Vec<DbId>,
    #[serde(default)]
    pub genre_ids: Vec<DbId>,
}

/// DTO for replacing a game's editable fields.
///
/// `title_logo: None` keeps the stored logo.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGame {
    pub name: String,
    pub slug: String,
    pub year: Option<i32>,
    pub developer_id: Option<DbId>,
    pub publisher_id: Option<DbId>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub title_logo: Option<String>,
    pub gogid: Option<i64>,
    pub platform_ids: Vec<DbId>,
    pub genre_ids: Vec<DbId>,
}

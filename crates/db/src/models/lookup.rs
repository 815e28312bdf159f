//! Rows of the choice tables: `platforms`, `genres`, `runners`.

use catalog_core::forms::library::Choice;
use catalog_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from one of the choice tables.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LookupRow {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

impl From<LookupRow> for Choice<DbId> {
    fn from(row: LookupRow) -> Self {
        Choice::new(row.id, row.name)
    }
}

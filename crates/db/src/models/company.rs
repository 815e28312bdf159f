//! Company model (developers and publishers).

use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a company. The slug is assigned by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
}

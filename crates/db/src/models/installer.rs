//! Installer and installer revision models.

use catalog_core::forms::installer::InstallerEditable;
use catalog_core::installer::InstallerFields;
use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `installers` table, with the runner resolved to its slug.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Installer {
    pub id: DbId,
    pub game_id: DbId,
    pub runner: String,
    pub slug: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    /// Installer script, canonical YAML.
    pub content: String,
    pub draft: bool,
    pub published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Installer {
    pub fn fields(&self) -> InstallerFields {
        InstallerFields {
            game_id: self.game_id,
            runner: self.runner.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            notes: self.notes.clone(),
            content: self.content.clone(),
            draft: self.draft,
        }
    }

    pub fn editable(&self) -> InstallerEditable {
        InstallerEditable::from(&self.fields())
    }
}

/// DTO for creating a new installer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstaller {
    pub game_id: DbId,
    /// Runner slug.
    pub runner: String,
    pub slug: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    pub content: String,
    pub draft: bool,
}

impl CreateInstaller {
    pub fn new(fields: InstallerFields, slug: impl Into<String>) -> Self {
        Self {
            game_id: fields.game_id,
            runner: fields.runner,
            slug: slug.into(),
            version: fields.version,
            description: fields.description,
            notes: fields.notes,
            content: fields.content,
            draft: fields.draft,
        }
    }
}

/// A row from the `installer_revisions` table: an edit awaiting review.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InstallerRevision {
    pub id: DbId,
    pub installer_id: DbId,
    pub runner: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    pub content: String,
    pub draft: bool,
    pub reason: Option<String>,
    pub changed_fields: Vec<String>,
    pub created_at: Timestamp,
}

/// DTO for recording an installer revision.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstallerRevision {
    pub installer_id: DbId,
    pub runner: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    pub content: String,
    pub draft: bool,
    pub reason: Option<String>,
    pub changed_fields: Vec<String>,
}

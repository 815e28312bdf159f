//! Repository for the `installers` and `installer_revisions` tables.
//!
//! Installers reference their runner by id; queries join `runners` so rows
//! carry the runner slug, which is what the forms validate against.

use catalog_core::installer::InstallerVersion;
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::installer::{
    CreateInstaller, CreateInstallerRevision, Installer, InstallerRevision,
};

/// Column list for installers joined with runners (`i`, `r`).
const COLUMNS: &str = "i.id, i.game_id, r.slug AS runner, i.slug, i.version, i.description, \
    i.notes, i.content, i.draft, i.published, i.created_at, i.updated_at";

/// Column list for revisions joined with runners (`v`, `r`).
const REVISION_COLUMNS: &str = "v.id, v.installer_id, r.slug AS runner, v.version, \
    v.description, v.notes, v.content, v.draft, v.reason, v.changed_fields, v.created_at";

/// Provides CRUD operations for installers.
pub struct InstallerRepo;

impl InstallerRepo {
    /// Find a non-deleted installer by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Installer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM installers i JOIN runners r ON r.id = i.runner_id \
             WHERE i.id = $1 AND i.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Installer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Non-deleted installers of a game, oldest first.
    pub async fn list_for_game(
        pool: &PgPool,
        game_id: DbId,
    ) -> Result<Vec<Installer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM installers i JOIN runners r ON r.id = i.runner_id \
             WHERE i.game_id = $1 AND i.deleted_at IS NULL \
             ORDER BY i.created_at, i.id"
        );
        sqlx::query_as::<_, Installer>(&query)
            .bind(game_id)
            .fetch_all(pool)
            .await
    }

    /// Versions of a game's non-deleted installers, for the version
    /// uniqueness check.
    pub async fn versions_for_game(
        pool: &PgPool,
        game_id: DbId,
    ) -> Result<Vec<InstallerVersion>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT id, version FROM installers \
             WHERE game_id = $1 AND deleted_at IS NULL \
             ORDER BY id",
        )
        .bind(game_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, version)| InstallerVersion { id, version })
            .collect())
    }

    /// Insert a new installer, resolving the runner slug to its id.
    ///
    /// Fails with `RowNotFound` when the runner slug is unknown.
    pub async fn create(pool: &PgPool, input: &CreateInstaller) -> Result<Installer, sqlx::Error> {
        let query = format!(
            "WITH i AS ( \
                INSERT INTO installers \
                    (game_id, runner_id, slug, version, description, notes, content, draft) \
                SELECT $1, id, $3, $4, $5, $6, $7, $8 FROM runners WHERE slug = $2 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM i JOIN runners r ON r.id = i.runner_id"
        );
        let installer = sqlx::query_as::<_, Installer>(&query)
            .bind(input.game_id)
            .bind(&input.runner)
            .bind(&input.slug)
            .bind(&input.version)
            .bind(&input.description)
            .bind(&input.notes)
            .bind(&input.content)
            .bind(input.draft)
            .fetch_one(pool)
            .await?;

        tracing::info!(
            installer_id = installer.id,
            game_id = installer.game_id,
            draft = installer.draft,
            "Installer created"
        );
        Ok(installer)
    }

    /// Soft-delete an installer. Returns `true` if a row changed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE installers SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides operations for installer revisions awaiting review.
pub struct InstallerRevisionRepo;

impl InstallerRevisionRepo {
    /// Record a revision of an installer.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInstallerRevision,
    ) -> Result<InstallerRevision, sqlx::Error> {
        let query = format!(
            "WITH v AS ( \
                INSERT INTO installer_revisions \
                    (installer_id, runner_id, version, description, notes, content, draft, \
                     reason, changed_fields) \
                SELECT $1, id, $3, $4, $5, $6, $7, $8, $9 FROM runners WHERE slug = $2 \
                RETURNING * \
             ) \
             SELECT {REVISION_COLUMNS} FROM v JOIN runners r ON r.id = v.runner_id"
        );
        let revision = sqlx::query_as::<_, InstallerRevision>(&query)
            .bind(input.installer_id)
            .bind(&input.runner)
            .bind(&input.version)
            .bind(&input.description)
            .bind(&input.notes)
            .bind(&input.content)
            .bind(input.draft)
            .bind(&input.reason)
            .bind(&input.changed_fields)
            .fetch_one(pool)
            .await?;

        tracing::info!(
            revision_id = revision.id,
            installer_id = revision.installer_id,
            "Installer revision recorded"
        );
        Ok(revision)
    }

    /// Revisions of an installer, newest first.
    pub async fn list_for_installer(
        pool: &PgPool,
        installer_id: DbId,
    ) -> Result<Vec<InstallerRevision>, sqlx::Error> {
        let query = format!(
            "SELECT {REVISION_COLUMNS} FROM installer_revisions v \
             JOIN runners r ON r.id = v.runner_id \
             WHERE v.installer_id = $1 \
             ORDER BY v.created_at DESC, v.id DESC"
        );
        sqlx::query_as::<_, InstallerRevision>(&query)
            .bind(installer_id)
            .fetch_all(pool)
            .await
    }
}

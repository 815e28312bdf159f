//! Handlers for installers: submission, edits (stored as revisions) and
//! forks into another game.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::forms::fork::{clean_fork, ForkInput, ForkTarget};
use catalog_core::forms::installer::{
    clean_installer, clean_installer_edit, InstallerContext, InstallerEditInput, InstallerInput,
};
use catalog_core::installer::InstallerFields;
use catalog_core::slug::{assign_slug, base_slug, EntityKind};
use catalog_core::types::DbId;
use catalog_db::models::game::Game;
use catalog_db::models::installer::{CreateInstaller, CreateInstallerRevision, Installer};
use catalog_db::repositories::{
    GameRepo, InstallerRepo, InstallerRevisionRepo, RunnerRepo, SlugRepo,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_game(pool: &PgPool, id: DbId) -> AppResult<Game> {
    GameRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Game", id }))
}

async fn find_installer(pool: &PgPool, id: DbId) -> AppResult<Installer> {
    InstallerRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Installer",
            id,
        }))
}

async fn load_context(
    pool: &PgPool,
    game_id: DbId,
    self_id: Option<DbId>,
) -> Result<InstallerContext, sqlx::Error> {
    Ok(InstallerContext {
        game_id,
        runners: RunnerRepo::slugs(pool).await?.into_iter().collect(),
        versions: InstallerRepo::versions_for_game(pool, game_id).await?,
        self_id,
    })
}

/// Assign a slug to `fields` under `game` and insert the installer.
///
/// Installer slugs derive from the game slug and the version.
async fn insert(pool: &PgPool, game: &Game, fields: InstallerFields) -> AppResult<Installer> {
    let name = format!("{}-{}", game.slug, fields.version);
    let base = base_slug(EntityKind::Installer, &name);
    let siblings = SlugRepo::siblings(pool, EntityKind::Installer, &base, None).await?;
    let slug = assign_slug(EntityKind::Installer, &name, None, &siblings, None);

    let installer =
        InstallerRepo::create(pool, &CreateInstaller::new(fields, slug.into_inner())).await?;
    Ok(installer)
}

/// GET /api/v1/games/{id}/installers
pub async fn list_for_game(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_game(&state.pool, game_id).await?;
    let installers = InstallerRepo::list_for_game(&state.pool, game_id).await?;
    Ok(Json(DataResponse { data: installers }))
}

/// POST /api/v1/games/{id}/installers
///
/// Submit an installer for a game. `action: "save"` keeps it as a draft,
/// anything else submits it for review.
pub async fn create(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
    Json(input): Json<InstallerInput>,
) -> AppResult<impl IntoResponse> {
    let game = find_game(&state.pool, game_id).await?;
    let ctx = load_context(&state.pool, game.id, None).await?;
    let fields = clean_installer(&input, &ctx, state.validator.as_ref())?;

    let installer = insert(&state.pool, &game, fields).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: installer })))
}

/// GET /api/v1/installers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let installer = find_installer(&state.pool, id).await?;
    Ok(Json(DataResponse { data: installer }))
}

/// PUT /api/v1/installers/{id}
///
/// Edit an installer. The edit is stored as a revision for moderation and
/// the installer itself is left untouched, hence `202 Accepted`.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<InstallerEditInput>,
) -> AppResult<impl IntoResponse> {
    let installer = find_installer(&state.pool, id).await?;
    let ctx = load_context(&state.pool, installer.game_id, Some(installer.id)).await?;
    let clean = clean_installer_edit(
        &input,
        &installer.editable(),
        &ctx,
        state.validator.as_ref(),
    )?;

    let fields = clean.fields;
    let revision = InstallerRevisionRepo::create(
        &state.pool,
        &CreateInstallerRevision {
            installer_id: installer.id,
            runner: fields.runner,
            version: fields.version,
            description: fields.description,
            notes: fields.notes,
            content: fields.content,
            draft: fields.draft,
            reason: clean.reason,
            changed_fields: clean.changed.iter().map(ToString::to_string).collect(),
        },
    )
    .await?;

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: revision })))
}

/// GET /api/v1/installers/{id}/revisions
pub async fn list_revisions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_installer(&state.pool, id).await?;
    let revisions = InstallerRevisionRepo::list_for_installer(&state.pool, id).await?;
    Ok(Json(DataResponse { data: revisions }))
}

/// POST /api/v1/installers/{id}/fork
///
/// Copy an installer into a draft installer of another game.
pub async fn fork(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ForkInput>,
) -> AppResult<impl IntoResponse> {
    let source = find_installer(&state.pool, id).await?;

    let target_game = match input.game {
        Some(game_id) => GameRepo::find_by_id(&state.pool, game_id).await?,
        None => None,
    };
    let target = match &target_game {
        Some(game) => Some(ForkTarget {
            game_id: game.id,
            versions: InstallerRepo::versions_for_game(&state.pool, game.id).await?,
        }),
        None => None,
    };

    let fields = clean_fork(&input, &source.fields(), target.as_ref())?;
    let Some(game) = target_game else {
        return Err(AppError::InternalError(
            "Fork cleaned without a target game".to_string(),
        ));
    };

    let installer = insert(&state.pool, &game, fields).await?;
    tracing::info!(source_id = source.id, installer_id = installer.id, "Installer forked");
    Ok((StatusCode::CREATED, Json(DataResponse { data: installer })))
}

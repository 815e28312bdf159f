//! Handlers for the `/games` resource: public submission, admin update,
//! edit suggestions and screenshots.
//!
//! Each write handler fetches what its form consults (known choice ids, the
//! game under the name's candidate slug, slug siblings), cleans the input,
//! checks any staged upload, persists, and only then moves the upload into
//! place.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::forms::game::{
    clean_game_admin, clean_game_edit, clean_game_submission, AdminGameInput, CleanGame,
    GameChoices, GameContext, GameEditInput, GameInput,
};
use catalog_core::forms::screenshot::{clean_screenshot, ScreenshotInput};
use catalog_core::game::{name_slug, title_logo_crop_options, CropOptions};
use catalog_core::slug::{base_slug, EntityKind};
use catalog_core::types::DbId;
use catalog_db::models::game::{CreateGame, Game, UpdateGame};
use catalog_db::models::game_edit_request::CreateGameEditRequest;
use catalog_db::models::screenshot::CreateScreenshot;
use catalog_db::repositories::{
    CompanyRepo, GameEditRequestRepo, GameRepo, GenreRepo, PlatformRepo, ScreenshotRepo,
    SlugRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::media::PendingMove;
use crate::response::DataResponse;
use crate::state::AppState;

/// A game with its links, flag names and title logo cropper options.
#[derive(Debug, Serialize)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub platforms: Vec<DbId>,
    pub genres: Vec<DbId>,
    pub flag_names: Vec<&'static str>,
    pub title_logo_crop: CropOptions,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

async fn find_game(pool: &PgPool, id: DbId) -> AppResult<Game> {
    GameRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Game", id }))
}

/// Fetch which of the choice ids referenced by `input` exist.
async fn load_choices(pool: &PgPool, input: &GameInput) -> Result<GameChoices, sqlx::Error> {
    let company_ids: Vec<DbId> = [input.developer, input.publisher]
        .into_iter()
        .flatten()
        .collect();
    Ok(GameChoices {
        companies: CompanyRepo::existing_ids(pool, &company_ids)
            .await?
            .into_iter()
            .collect(),
        platforms: PlatformRepo::existing_ids(pool, &input.platforms)
            .await?
            .into_iter()
            .collect(),
        genres: GenreRepo::existing_ids(pool, &input.genres)
            .await?
            .into_iter()
            .collect(),
    })
}

/// Fetch everything the submission and admin forms consult.
async fn load_context(
    pool: &PgPool,
    input: &GameInput,
    explicit_slug: Option<&str>,
    editing: Option<DbId>,
) -> Result<GameContext, sqlx::Error> {
    let mut ctx = GameContext::new(today());
    ctx.choices = load_choices(pool, input).await?;
    ctx.editing = editing;

    let candidate = name_slug(&input.name);
    if !candidate.is_empty() {
        ctx.name_match = GameRepo::find_by_slug(pool, &candidate)
            .await?
            .map(|game| game.slug_match());
    }

    let base = base_slug(EntityKind::Game, &input.name);
    ctx.slug_siblings = SlugRepo::siblings(pool, EntityKind::Game, &base, explicit_slug).await?;
    Ok(ctx)
}

/// Check the staged title logo of `clean`, if any, and compute its banner
/// path. Nothing moves until [`commit_logo`].
async fn prepare_logo(state: &AppState, clean: &CleanGame) -> AppResult<Option<PendingMove>> {
    match clean.fields.title_logo.as_deref() {
        Some(staged) => state
            .media
            .prepare_banner(staged, clean.slug.as_str())
            .await
            .map(Some)
            .map_err(|e| e.into_app_error("title_logo")),
        None => Ok(None),
    }
}

/// Move a prepared title logo into place after its game row was written.
async fn commit_logo(logo: Option<PendingMove>) -> AppResult<()> {
    if let Some(logo) = logo {
        let path = logo
            .commit()
            .await
            .map_err(|e| e.into_app_error("title_logo"))?;
        tracing::info!(%path, "Title logo stored");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/games/{id}
///
/// Game detail with platform and genre ids, flag names and the cropper
/// options pre-loaded with the current title logo.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let game = find_game(&state.pool, id).await?;
    let platforms = GameRepo::platform_ids(&state.pool, id).await?;
    let genres = GameRepo::genre_ids(&state.pool, id).await?;

    let logo_url = game
        .title_logo
        .as_deref()
        .map(|path| state.config.media_url_for(path));
    let detail = GameDetail {
        flag_names: game.flag_names(),
        title_logo_crop: title_logo_crop_options(logo_url.as_deref()),
        platforms,
        genres,
        game,
    };
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/games
///
/// Submit a new game. Rejects names already in the catalog; the game is
/// stored unpublished under a freshly assigned slug.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<GameInput>,
) -> AppResult<impl IntoResponse> {
    let ctx = load_context(&state.pool, &input, None, None).await?;
    let clean = clean_game_submission(&input, &ctx)?;
    let logo = prepare_logo(&state, &clean).await?;
    let title_logo = logo.as_ref().map(|l| l.relative().to_string());

    let fields = clean.fields;
    let game = GameRepo::create(
        &state.pool,
        &CreateGame {
            name: fields.name,
            slug: clean.slug.into_inner(),
            year: fields.year,
            developer_id: fields.developer_id,
            publisher_id: fields.publisher_id,
            website: fields.website,
            description: fields.description,
            title_logo,
            gogid: clean.gogid,
            platform_ids: fields.platforms,
            genre_ids: fields.genres,
        },
    )
    .await?;
    commit_logo(logo).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: game })))
}

/// PUT /api/v1/games/{id}
///
/// Admin update. The slug is optional and regenerated from the name when
/// missing or taken by another game.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdminGameInput>,
) -> AppResult<impl IntoResponse> {
    find_game(&state.pool, id).await?;

    let ctx = load_context(&state.pool, &input.game, input.slug.as_deref(), Some(id)).await?;
    let clean = clean_game_admin(&input, &ctx)?;
    let logo = prepare_logo(&state, &clean).await?;
    let title_logo = logo.as_ref().map(|l| l.relative().to_string());

    let fields = clean.fields;
    let game = GameRepo::update(
        &state.pool,
        id,
        &UpdateGame {
            name: fields.name,
            slug: clean.slug.into_inner(),
            year: fields.year,
            developer_id: fields.developer_id,
            publisher_id: fields.publisher_id,
            website: fields.website,
            description: fields.description,
            title_logo,
            gogid: clean.gogid,
            platform_ids: fields.platforms,
            genre_ids: fields.genres,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Game", id }))?;
    commit_logo(logo).await?;

    Ok(Json(DataResponse { data: game }))
}

/// POST /api/v1/games/{id}/edits
///
/// Suggest an edit to a game. The suggestion must change at least one
/// field; it is stored for moderation and the game is left untouched.
pub async fn suggest_edit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<GameEditInput>,
) -> AppResult<impl IntoResponse> {
    let game = find_game(&state.pool, id).await?;
    let original = game.fields(
        GameRepo::platform_ids(&state.pool, id).await?,
        GameRepo::genre_ids(&state.pool, id).await?,
    );

    let mut ctx = GameContext::new(today());
    ctx.choices = load_choices(&state.pool, &input.game).await?;
    ctx.editing = Some(id);
    let clean = clean_game_edit(&input, &original, &ctx)?;
    if let Some(staged) = clean.fields.title_logo.as_deref() {
        state
            .media
            .ensure_staged(staged)
            .await
            .map_err(|e| e.into_app_error("title_logo"))?;
    }

    let changes = serde_json::to_value(&clean.fields)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let request = GameEditRequestRepo::create(
        &state.pool,
        &CreateGameEditRequest {
            game_id: id,
            changes,
            changed_fields: clean.changed.iter().map(ToString::to_string).collect(),
            reason: clean.reason,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// POST /api/v1/games/{id}/screenshots
///
/// Attach an unpublished screenshot to a game.
pub async fn add_screenshot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ScreenshotInput>,
) -> AppResult<impl IntoResponse> {
    let game = find_game(&state.pool, id).await?;
    let fields = clean_screenshot(&input, game.id)?;

    let image = state
        .media
        .prepare_screenshot(&fields.image, &game.slug)
        .await
        .map_err(|e| e.into_app_error("image"))?;

    let screenshot = ScreenshotRepo::create(
        &state.pool,
        &CreateScreenshot {
            game_id: game.id,
            image: image.relative().to_string(),
            description: fields.description,
        },
    )
    .await?;
    image
        .commit()
        .await
        .map_err(|e| e.into_app_error("image"))?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: screenshot })))
}

//! HTTP-level integration tests for game submission, admin updates, edit
//! suggestions and screenshots.
//!
//! Lookup rows (platforms, genres, runners) are seeded by migrations.
//! Staged uploads are written into a per-test media directory.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, put_json, stage_upload};
use serde_json::json;
use sqlx::PgPool;
use catalog_core::game::flag_bit;
use catalog_db::models::company::CreateCompany;
use catalog_db::models::game::CreateGame;
use catalog_db::repositories::{
    CompanyRepo, GameEditRequestRepo, GameRepo, PlatformRepo, ScreenshotRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn platform_id(pool: &PgPool, slug: &str) -> i64 {
    PlatformRepo::list(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| panic!("platform {slug} not seeded"))
        .id
}

async fn seed_game(pool: &PgPool, name: &str, slug: &str) -> i64 {
    GameRepo::create(
        pool,
        &CreateGame {
            name: name.to_string(),
            slug: slug.to_string(),
            year: Some(1993),
            developer_id: None,
            publisher_id: None,
            website: None,
            description: None,
            title_logo: Some(format!("games/banners/{slug}.png")),
            gogid: None,
            platform_ids: vec![],
            genre_ids: vec![],
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/games stores an unpublished game and moves the logo
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_game(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let linux = platform_id(&pool, "linux").await;
    let developer = CompanyRepo::create(
        &pool,
        &CreateCompany {
            name: "id Software".to_string(),
            slug: "id-software".to_string(),
            website: None,
        },
    )
    .await
    .unwrap();
    let logo = stage_upload(media.path(), "logo.PNG");

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        "/api/v1/games",
        json!({
            "name": "  Doom  ",
            "year": 1993,
            "developer": developer.id,
            "platforms": [linux],
            "description": "<p>Rip and <b>tear</b></p>",
            "title_logo": logo,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let game = &json["data"];
    assert_eq!(game["name"], "Doom");
    assert_eq!(game["slug"], "doom");
    assert_eq!(game["is_public"], false);
    assert_eq!(game["developer_id"], developer.id);
    assert_eq!(game["description"], "Rip and tear");
    assert_eq!(game["title_logo"], "games/banners/doom.png");

    assert!(media.path().join("games/banners/doom.png").exists());
    assert!(!media.path().join(&logo).exists());

    let id = game["id"].as_i64().unwrap();
    assert_eq!(GameRepo::platform_ids(&pool, id).await.unwrap(), vec![linux]);
}

// ---------------------------------------------------------------------------
// Test: a name whose slug is already taken is rejected as a duplicate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_duplicate_name_points_at_existing_game(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;
    GameRepo::publish(&pool, id).await.unwrap();
    let logo = stage_upload(media.path(), "logo.png");

    let app = build_test_app(pool, media.path());
    let response = post_json(
        app,
        "/api/v1/games",
        json!({ "name": "DOOM", "title_logo": logo }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let detail = &json["details"][0];
    assert_eq!(detail["field"], "name");
    assert_eq!(detail["code"], "duplicate_name");
    assert_eq!(detail["status"], "published");
    assert_eq!(detail["locator"], "/games/doom");

    // The staged upload is left for the next attempt.
    assert!(media.path().join(&logo).exists());
}

// ---------------------------------------------------------------------------
// Test: all field errors are reported together
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_reports_every_field_error(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();

    let app = build_test_app(pool, media.path());
    let response = post_json(
        app,
        "/api/v1/games",
        json!({
            "name": "Quake",
            "year": 1850,
            "website": "ftp://example.com",
            "platforms": [999_999],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    for field in ["year", "website", "platforms", "title_logo"] {
        assert!(fields.contains(&field), "missing error for {field}: {fields:?}");
    }
    assert!(!fields.contains(&"name"));
}

// ---------------------------------------------------------------------------
// Test: a staged upload that vanished is reported on the logo field
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_with_missing_upload(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        "/api/v1/games",
        json!({ "name": "Heretic", "title_logo": "uploads/never-written.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "title_logo");
    assert!(GameRepo::find_by_slug(&pool, "heretic").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: non-Latin names are transliterated into the slug
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_transliterates_name(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let logo = stage_upload(media.path(), "logo.png");

    let app = build_test_app(pool, media.path());
    let response = post_json(
        app,
        "/api/v1/games",
        json!({ "name": "仙剑奇侠传", "title_logo": logo }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let slug = json["data"]["slug"].as_str().unwrap();
    assert!(!slug.is_empty());
    assert!(slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
}

// ---------------------------------------------------------------------------
// Test: GET /api/v1/games/{id} returns links, flags and cropper options
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_game_detail(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;
    let bits = flag_bit("free").unwrap() | flag_bit("demo").unwrap();
    GameRepo::set_flags(&pool, id, bits).await.unwrap();

    let app = build_test_app(pool, media.path());
    let response = get(app, &format!("/api/v1/games/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["slug"], "doom");
    let flags: Vec<&str> = data["flag_names"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert!(flags.contains(&"free"));
    assert!(flags.contains(&"demo"));
    assert_eq!(data["title_logo_crop"]["url"], "/media/games/banners/doom.png");
    assert_eq!(data["title_logo_crop"]["viewport"]["width"], 875);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_unknown_game_returns_404(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();

    let app = build_test_app(pool, media.path());
    let response = get(app, "/api/v1/games/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: PUT /api/v1/games/{id} regenerates a colliding slug
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_update_regenerates_taken_slug(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    seed_game(&pool, "Doom", "doom").await;
    let id = seed_game(&pool, "Doom II", "doom-ii").await;

    let app = build_test_app(pool.clone(), media.path());
    let response = put_json(
        app,
        &format!("/api/v1/games/{id}"),
        json!({ "name": "Doom", "slug": "doom", "gogid": 1_207_658_753 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "doom-1");
    assert_eq!(json["data"]["gogid"], 1_207_658_753_i64);
    // Logo kept when none is uploaded.
    assert_eq!(json["data"]["title_logo"], "games/banners/doom-ii.png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_update_keeps_own_slug(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;

    let app = build_test_app(pool, media.path());
    let response = put_json(
        app,
        &format!("/api/v1/games/{id}"),
        json!({ "name": "Doom", "slug": "doom", "year": 1994 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "doom");
    assert_eq!(json["data"]["year"], 1994);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_update_rejects_bad_gogid(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;

    let app = build_test_app(pool, media.path());
    let response = put_json(
        app,
        &format!("/api/v1/games/{id}"),
        json!({ "name": "Doom", "gogid": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "gogid");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_update_explicit_slug_normalizing_to_taken_slug(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    seed_game(&pool, "Doom Classic", "doom-classic").await;
    let quake = seed_game(&pool, "Quake", "quake").await;
    std::fs::create_dir_all(media.path().join("games/banners")).unwrap();
    std::fs::write(media.path().join("games/banners/doom-classic.png"), b"doom-logo").unwrap();
    let logo = stage_upload(media.path(), "q.png");

    let app = build_test_app(pool.clone(), media.path());
    let response = put_json(
        app,
        &format!("/api/v1/games/{quake}"),
        json!({ "name": "Quake", "slug": "Doom Classic", "title_logo": logo }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "quake");
    assert_eq!(json["data"]["title_logo"], "games/banners/quake.png");
    assert_eq!(
        std::fs::read(media.path().join("games/banners/doom-classic.png")).unwrap(),
        b"doom-logo"
    );
    assert!(media.path().join("games/banners/quake.png").exists());
}

// ---------------------------------------------------------------------------
// Test: a write that loses a uniqueness race leaves media files alone
// ---------------------------------------------------------------------------

/// Make every update of `games` fail the way a concurrent writer taking the
/// slug would.
async fn fail_game_updates_on_slug_index(pool: &PgPool) {
    sqlx::query(
        "CREATE FUNCTION lose_slug_race() RETURNS trigger AS $$ \
         BEGIN \
             RAISE unique_violation USING CONSTRAINT = 'uq_games_slug', \
                 MESSAGE = 'duplicate key value violates unique constraint \"uq_games_slug\"'; \
         END; \
         $$ LANGUAGE plpgsql",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER lose_slug_race BEFORE UPDATE ON games \
         FOR EACH ROW EXECUTE FUNCTION lose_slug_race()",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_conflicting_update_keeps_existing_banner(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let quake = seed_game(&pool, "Quake", "quake").await;
    std::fs::create_dir_all(media.path().join("games/banners")).unwrap();
    std::fs::write(media.path().join("games/banners/doom-classic.png"), b"doom-logo").unwrap();
    let logo = stage_upload(media.path(), "q.png");
    fail_game_updates_on_slug_index(&pool).await;

    let app = build_test_app(pool.clone(), media.path());
    let response = put_json(
        app,
        &format!("/api/v1/games/{quake}"),
        json!({ "name": "Quake", "slug": "Doom Classic", "title_logo": logo }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(
        std::fs::read(media.path().join("games/banners/doom-classic.png")).unwrap(),
        b"doom-logo"
    );
    // The upload stays staged for a retry.
    assert!(media.path().join(&logo).exists());
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/games/{id}/edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_suggest_edit_without_changes_is_rejected(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        &format!("/api/v1/games/{id}/edits"),
        json!({ "name": "Doom", "year": 1993, "reason": "just checking" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "__all__");
    assert_eq!(json["details"][0]["code"], "no_change_submitted");
    assert!(GameEditRequestRepo::list_for_game(&pool, id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_suggest_edit_records_changed_fields(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        &format!("/api/v1/games/{id}/edits"),
        json!({ "name": "Doom", "year": 1994, "reason": "wrong year" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["changed_fields"], json!(["year"]));
    assert_eq!(json["data"]["reason"], "wrong year");
    assert_eq!(json["data"]["changes"]["year"], 1994);

    // The game itself is untouched until a moderator applies the edit.
    let game = GameRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(game.year, Some(1993));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_suggest_edit_with_missing_logo_upload(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        &format!("/api/v1/games/{id}/edits"),
        json!({ "name": "Doom", "year": 1993, "title_logo": "uploads/never-written.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "title_logo");
    assert_eq!(json["details"][0]["code"], "invalid_value");
    assert!(GameEditRequestRepo::list_for_game(&pool, id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/games/{id}/screenshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_screenshot(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;
    let shot = stage_upload(media.path(), "e1m1.jpg");

    let app = build_test_app(pool.clone(), media.path());
    let response = post_json(
        app,
        &format!("/api/v1/games/{id}/screenshots"),
        json!({ "image": shot, "description": " Hangar " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["image"], "games/screenshots/doom/e1m1.jpg");
    assert_eq!(json["data"]["description"], "Hangar");
    assert_eq!(json["data"]["published"], false);
    assert!(media.path().join("games/screenshots/doom/e1m1.jpg").exists());

    assert_eq!(ScreenshotRepo::list_for_game(&pool, id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_screenshot_rejects_non_image(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let id = seed_game(&pool, "Doom", "doom").await;
    let file = stage_upload(media.path(), "notes.txt");

    let app = build_test_app(pool, media.path());
    let response = post_json(
        app,
        &format!("/api/v1/games/{id}/screenshots"),
        json!({ "image": file }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "image");
}

//! Game forms: public submission, admin create/update with automatic slug,
//! and edit suggestions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    multiple_choice, optional_choice, optional_text, required_text, staged_image, FieldIssue,
    FormErrors, NON_FIELD_ERRORS,
};
use crate::edit::{guard_changed, Editable, FieldDiff};
use crate::game::{check_name, max_release_year, GameSlugMatch, MIN_RELEASE_YEAR};
use crate::slug::{assign_slug, EntityKind, Slug, SlugRecord};
use crate::text::strip_tags;
use crate::types::DbId;

pub const NAME_MAX_LEN: usize = 200;
pub const WEBSITE_MAX_LEN: usize = 200;
pub const REASON_MAX_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Input and cleaned values
// ---------------------------------------------------------------------------

/// Raw game fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInput {
    #[serde(default)]
    pub name: String,
    pub year: Option<i32>,
    pub developer: Option<DbId>,
    pub publisher: Option<DbId>,
    pub website: Option<String>,
    #[serde(default)]
    pub platforms: Vec<DbId>,
    #[serde(default)]
    pub genres: Vec<DbId>,
    pub description: Option<String>,
    /// Staged upload path of a new title logo.
    pub title_logo: Option<String>,
}

/// Cleaned game fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFields {
    pub name: String,
    pub year: Option<i32>,
    pub developer_id: Option<DbId>,
    pub publisher_id: Option<DbId>,
    pub website: Option<String>,
    pub platforms: Vec<DbId>,
    pub genres: Vec<DbId>,
    pub description: Option<String>,
    /// Staged upload to store as the new title logo, `None` keeps the
    /// current one.
    pub title_logo: Option<String>,
}

impl Editable for GameFields {
    fn changed_fields(&self, submitted: &Self) -> Vec<&'static str> {
        FieldDiff::new()
            .field("name", &self.name, &submitted.name)
            .field("year", &self.year, &submitted.year)
            .field("developer", &self.developer_id, &submitted.developer_id)
            .field("publisher", &self.publisher_id, &submitted.publisher_id)
            .field("website", &self.website, &submitted.website)
            .set("platforms", &self.platforms, &submitted.platforms)
            .set("genres", &self.genres, &submitted.genres)
            .field("description", &self.description, &submitted.description)
            .field("title_logo", &false, &submitted.title_logo.is_some())
            .finish()
    }
}

/// Choice ids known to exist, fetched by the caller for the ids the input
/// references.
#[derive(Debug, Clone, Default)]
pub struct GameChoices {
    pub companies: BTreeSet<DbId>,
    pub platforms: BTreeSet<DbId>,
    pub genres: BTreeSet<DbId>,
}

/// Records the game forms consult.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub choices: GameChoices,
    /// Game stored under the submitted name's candidate slug, if any.
    pub name_match: Option<GameSlugMatch>,
    /// Games whose slug may collide with the one being assigned.
    pub slug_siblings: Vec<SlugRecord>,
    /// Id of the game being edited.
    pub editing: Option<DbId>,
    pub today: chrono::NaiveDate,
}

impl GameContext {
    pub fn new(today: chrono::NaiveDate) -> Self {
        Self {
            choices: GameChoices::default(),
            name_match: None,
            slug_siblings: Vec::new(),
            editing: None,
            today,
        }
    }
}

// ---------------------------------------------------------------------------
// Field cleaning
// ---------------------------------------------------------------------------

fn clean_year(year: Option<i32>, today: chrono::NaiveDate) -> Result<Option<i32>, FieldIssue> {
    match year {
        Some(year) if !(MIN_RELEASE_YEAR..=max_release_year(today)).contains(&year) => Err(
            FieldIssue::Invalid(format!(
                "发行年份必须在 {MIN_RELEASE_YEAR} 到 {} 之间",
                max_release_year(today)
            )),
        ),
        other => Ok(other),
    }
}

fn clean_website(website: Option<&str>) -> Result<Option<String>, FieldIssue> {
    let website = optional_text(website, WEBSITE_MAX_LEN)?;
    match website {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(FieldIssue::Invalid("请输入有效的网址".to_string()))
        }
        other => Ok(other),
    }
}

/// Clean every game field except the name duplicate check.
fn clean_fields(
    input: &GameInput,
    ctx: &GameContext,
    logo_required: bool,
    errors: &mut FormErrors,
) -> Option<GameFields> {
    let name = errors.check("name", required_text(&input.name, NAME_MAX_LEN));
    let year = errors.check("year", clean_year(input.year, ctx.today));
    let developer = errors.check(
        "developer",
        optional_choice(input.developer, &ctx.choices.companies),
    );
    let publisher = errors.check(
        "publisher",
        optional_choice(input.publisher, &ctx.choices.companies),
    );
    let website = errors.check("website", clean_website(input.website.as_deref()));
    let platforms = errors.check(
        "platforms",
        multiple_choice(&input.platforms, &ctx.choices.platforms),
    );
    let genres = errors.check("genres", multiple_choice(&input.genres, &ctx.choices.genres));
    let description = input
        .description
        .as_deref()
        .map(strip_tags)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let title_logo = match input.title_logo.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => errors.check("title_logo", staged_image(path)).map(Some),
        None if logo_required => {
            errors.check("title_logo", Err::<Option<String>, _>(FieldIssue::Required))
        }
        None => Some(None),
    };

    Some(GameFields {
        name: name?,
        year: year?,
        developer_id: developer?,
        publisher_id: publisher?,
        website: website?,
        platforms: platforms?,
        genres: genres?,
        description,
        title_logo: title_logo?,
    })
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// A cleaned game together with the slug it will be stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanGame {
    pub fields: GameFields,
    pub slug: Slug,
    pub gogid: Option<i64>,
}

/// Public game submission.
///
/// Rejects names whose candidate slug already belongs to a game (published
/// or pending), requires a title logo, and assigns the slug.
pub fn clean_game_submission(input: &GameInput, ctx: &GameContext) -> Result<CleanGame, FormErrors> {
    let mut errors = FormErrors::new();
    let fields = clean_fields(input, ctx, true, &mut errors);

    if !errors.has("name") {
        errors.check("name", check_name(input.name.trim(), ctx.name_match.as_ref()));
    }

    match fields {
        Some(fields) if errors.is_empty() => {
            let slug = assign_slug(EntityKind::Game, &fields.name, None, &ctx.slug_siblings, None);
            Ok(CleanGame {
                fields,
                slug,
                gogid: None,
            })
        }
        _ => Err(errors),
    }
}

/// Admin game input: the submission fields plus an optional explicit slug
/// and GOG id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminGameInput {
    #[serde(flatten)]
    pub game: GameInput,
    pub slug: Option<String>,
    pub gogid: Option<i64>,
}

/// Admin create/update. The slug is optional and always passed through
/// slug assignment, so a colliding or missing slug is regenerated from the
/// name. The game being edited never collides with itself.
pub fn clean_game_admin(input: &AdminGameInput, ctx: &GameContext) -> Result<CleanGame, FormErrors> {
    let mut errors = FormErrors::new();
    let fields = clean_fields(&input.game, ctx, false, &mut errors);
    let gogid = match input.gogid {
        Some(id) if id <= 0 => errors.check(
            "gogid",
            Err::<Option<i64>, _>(FieldIssue::Invalid("GOG ID 必须是正整数".to_string())),
        ),
        other => Some(other),
    };

    match (fields, gogid) {
        (Some(fields), Some(gogid)) if errors.is_empty() => {
            let slug = assign_slug(
                EntityKind::Game,
                &fields.name,
                input.slug.as_deref(),
                &ctx.slug_siblings,
                ctx.editing,
            );
            Ok(CleanGame {
                fields,
                slug,
                gogid,
            })
        }
        _ => Err(errors),
    }
}

/// Edit suggestion input: the game fields plus the submitter's reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameEditInput {
    #[serde(flatten)]
    pub game: GameInput,
    pub reason: Option<String>,
}

/// A cleaned edit suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanGameEdit {
    pub fields: GameFields,
    pub reason: Option<String>,
    /// Names of the fields the suggestion changes.
    pub changed: Vec<&'static str>,
}

/// Edit suggestion for an existing game. Fails with a non-field error when
/// the suggestion leaves every editable field as stored.
pub fn clean_game_edit(
    input: &GameEditInput,
    original: &GameFields,
    ctx: &GameContext,
) -> Result<CleanGameEdit, FormErrors> {
    let mut errors = FormErrors::new();
    let fields = clean_fields(&input.game, ctx, false, &mut errors);
    let reason = errors.check(
        "reason",
        optional_text(input.reason.as_deref(), REASON_MAX_LEN),
    );

    let (Some(fields), Some(reason)) = (fields, reason) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let changed = original.changed_fields(&fields);
    match guard_changed(original, fields) {
        Ok(fields) => Ok(CleanGameEdit {
            fields,
            reason,
            changed,
        }),
        Err(unchanged) => {
            errors.record(NON_FIELD_ERRORS, &unchanged);
            Err(errors)
        }
    }
}

//! Slug normalization and collision-free assignment.
//!
//! Slugs are the URL identifiers of catalog records (`/games/{slug}`). They
//! are derived from the record's display name, transliterated to ASCII so
//! that names such as "魔兽世界" still produce a readable identifier, and
//! disambiguated with a numeric suffix when a sibling already holds them.
//!
//! Assignment is a pure function over the sibling slugs the caller fetched
//! beforehand. The database's partial unique indexes remain the
//! authoritative guarantee at write time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Maximum slug length, matching the `VARCHAR(50)` slug columns.
pub const SLUG_MAX_LEN: usize = 50;

/// Length of the prefix shared by a base slug and all of its numbered
/// variants. Suffixes up to `-99999999` fit in the remaining space.
const SEARCH_PREFIX_LEN: usize = 40;

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// The kind of catalog record a slug belongs to. Slugs are unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Game,
    Installer,
    Company,
}

impl EntityKind {
    /// Database table holding records of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Game => "games",
            Self::Installer => "installers",
            Self::Company => "companies",
        }
    }

    /// Stem used when a name normalizes to nothing (e.g. only punctuation).
    pub fn fallback_stem(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Installer => "installer",
            Self::Company => "company",
        }
    }
}

// ---------------------------------------------------------------------------
// Slug newtype
// ---------------------------------------------------------------------------

/// Reasons a string is not a valid slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,

    #[error("slug is {len} characters long, maximum is {SLUG_MAX_LEN}")]
    TooLong { len: usize },

    #[error("slug contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// A validated slug: non-empty, at most [`SLUG_MAX_LEN`] characters, only
/// `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate `value` as a slug without normalizing it.
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > SLUG_MAX_LEN {
            return Err(SlugError::TooLong { len: value.len() });
        }
        if let Some(ch) = value.chars().find(|ch| !is_slug_char(*ch)) {
            return Err(SlugError::InvalidCharacter(ch));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'
}

/// Whether `value` is already a valid slug.
pub fn is_url_safe(value: &str) -> bool {
    Slug::parse(value).is_ok()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a display name into slug form, truncated to [`SLUG_MAX_LEN`].
///
/// Transliterates to ASCII, lowercases, replaces runs of anything else with a
/// single `-`. May return an empty string for names without any
/// transliterable character.
pub fn normalize(name: &str) -> String {
    truncate(&::slug::slugify(name), SLUG_MAX_LEN).to_string()
}

/// Cut an ASCII slug to at most `max` bytes without leaving a trailing `-`.
fn truncate(slug: &str, max: usize) -> &str {
    let end = slug.len().min(max);
    slug[..end].trim_end_matches('-')
}

/// The slug a record named `name` gets when nothing collides.
pub fn base_slug(kind: EntityKind, name: &str) -> String {
    let normalized = normalize(name);
    if normalized.is_empty() {
        kind.fallback_stem().to_string()
    } else {
        normalized
    }
}

/// Prefix shared by `base` and every numbered variant [`assign_slug`] may
/// try for it. Repositories use it to fetch all potentially colliding
/// siblings in a single `LIKE 'prefix%'` scan.
pub fn search_prefix(base: &str) -> &str {
    &base[..base.len().min(SEARCH_PREFIX_LEN)]
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// An existing sibling record's slug, as fetched from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRecord {
    pub id: DbId,
    pub slug: String,
}

impl SlugRecord {
    pub fn new(id: DbId, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
        }
    }
}

/// The slug [`assign_slug`] tries first for an explicitly entered value:
/// the trimmed value when it is already URL-safe, its normalized form
/// otherwise. `None` when nothing usable remains.
///
/// Repositories look up the holder of this candidate, not of the raw input.
pub fn explicit_candidate(explicit: &str) -> Option<String> {
    let explicit = explicit.trim();
    let candidate = if is_url_safe(explicit) {
        explicit.to_string()
    } else {
        normalize(explicit)
    };
    Some(candidate).filter(|c| !c.is_empty())
}

fn is_taken(siblings: &[SlugRecord], slug: &str, editing: Option<DbId>) -> bool {
    siblings
        .iter()
        .any(|record| record.slug == slug && Some(record.id) != editing)
}

/// Assign a unique slug to a record of `kind` named `name`.
///
/// - A usable `explicit` slug that no sibling holds is returned unchanged
///   (an explicit value that is not URL-safe is normalized first).
/// - Otherwise the slug is derived from `name`; on collision `-1`, `-2`, ...
///   is appended, shortening the stem so the result stays within
///   [`SLUG_MAX_LEN`].
///
/// `siblings` must contain every non-deleted record of the same kind whose
/// slug starts with [`search_prefix`] of the base slug, plus the holder of
/// `explicit` if any. `editing` is the id of the record being edited, which
/// never collides with itself.
pub fn assign_slug(
    kind: EntityKind,
    name: &str,
    explicit: Option<&str>,
    siblings: &[SlugRecord],
    editing: Option<DbId>,
) -> Slug {
    if let Some(candidate) = explicit.and_then(explicit_candidate) {
        if !is_taken(siblings, &candidate, editing) {
            return Slug(candidate);
        }
    }

    let base = base_slug(kind, name);
    if !is_taken(siblings, &base, editing) {
        return Slug(base);
    }

    let mut index: u32 = 1;
    loop {
        let suffix = format!("-{index}");
        let stem = truncate(&base, SLUG_MAX_LEN - suffix.len());
        let candidate = format!("{stem}{suffix}");
        if !is_taken(siblings, &candidate, editing) {
            return Slug(candidate);
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn records(slugs: &[&str]) -> Vec<SlugRecord> {
        slugs
            .iter()
            .enumerate()
            .map(|(i, s)| SlugRecord::new(i as DbId + 1, *s))
            .collect()
    }

    fn assert_valid(slug: &Slug) {
        assert!(slug.as_str().len() <= SLUG_MAX_LEN, "too long: {slug}");
        assert!(is_url_safe(slug.as_str()), "not url-safe: {slug}");
    }

    #[test]
    fn derives_from_name() {
        let slug = assign_slug(EntityKind::Game, "World of Warcraft", None, &[], None);
        assert_eq!(slug.as_str(), "world-of-warcraft");
    }

    #[test]
    fn name_with_punctuation_and_pipe() {
        let slug = assign_slug(EntityKind::Game, "  Quake III: Arena! | Q3A ", None, &[], None);
        assert_eq!(slug.as_str(), "quake-iii-arena-q3a");
    }

    #[test]
    fn transliterates_chinese_name() {
        let slug = assign_slug(EntityKind::Game, "魔兽世界", None, &[], None);
        assert_valid(&slug);
        assert_ne!(slug.as_str(), EntityKind::Game.fallback_stem());
        assert!(slug.as_str().is_ascii());
    }

    #[test]
    fn empty_name_falls_back_to_kind_stem() {
        let slug = assign_slug(EntityKind::Game, "!!!", None, &[], None);
        assert_eq!(slug.as_str(), "game");

        let slug = assign_slug(EntityKind::Installer, "", None, &[], None);
        assert_eq!(slug.as_str(), "installer");
    }

    #[test]
    fn fallback_stem_is_disambiguated_too() {
        let siblings = records(&["company"]);
        let slug = assign_slug(EntityKind::Company, "???", None, &siblings, None);
        assert_eq!(slug.as_str(), "company-1");
    }

    #[test]
    fn unique_explicit_slug_returned_unchanged() {
        let siblings = records(&["doom"]);
        let slug = assign_slug(EntityKind::Game, "Doom", Some("doom-1993"), &siblings, None);
        assert_eq!(slug.as_str(), "doom-1993");
    }

    #[test]
    fn explicit_slug_is_normalized_when_not_url_safe() {
        let slug = assign_slug(EntityKind::Game, "Doom", Some("Doom Classic"), &[], None);
        assert_eq!(slug.as_str(), "doom-classic");
    }

    #[test]
    fn explicit_candidate_matches_what_assignment_tries() {
        assert_eq!(explicit_candidate(" doom-2 ").as_deref(), Some("doom-2"));
        assert_eq!(explicit_candidate("Doom Classic").as_deref(), Some("doom-classic"));
        assert_eq!(explicit_candidate(" ?! "), None);
    }

    #[test]
    fn normalized_explicit_slug_held_by_sibling_falls_back_to_name() {
        let siblings = records(&["doom-classic"]);
        let slug = assign_slug(EntityKind::Game, "Quake", Some("Doom Classic"), &siblings, Some(2));
        assert_eq!(slug.as_str(), "quake");
    }

    #[test]
    fn colliding_explicit_slug_falls_back_to_name() {
        let siblings = records(&["taken"]);
        let slug = assign_slug(EntityKind::Game, "Half-Life", Some("taken"), &siblings, None);
        assert_eq!(slug.as_str(), "half-life");
    }

    #[test]
    fn blank_explicit_slug_is_ignored() {
        let slug = assign_slug(EntityKind::Game, "Half-Life", Some("   "), &[], None);
        assert_eq!(slug.as_str(), "half-life");
    }

    #[test]
    fn collision_appends_increasing_suffix() {
        let siblings = records(&["doom"]);
        let slug = assign_slug(EntityKind::Game, "Doom", None, &siblings, None);
        assert_eq!(slug.as_str(), "doom-1");

        let siblings = records(&["doom", "doom-1", "doom-2"]);
        let slug = assign_slug(EntityKind::Game, "Doom", None, &siblings, None);
        assert_eq!(slug.as_str(), "doom-3");
    }

    #[test]
    fn existing_slug_is_never_returned_unmodified() {
        let names = ["Doom", "Quake", "魔兽世界", "The Witcher 3: Wild Hunt"];
        for name in names {
            let existing = base_slug(EntityKind::Game, name);
            let siblings = vec![SlugRecord::new(7, existing.clone())];
            let slug = assign_slug(EntityKind::Game, name, None, &siblings, None);
            assert_ne!(slug.as_str(), existing);
            assert!(slug.as_str().starts_with(&existing));
            assert_valid(&slug);
        }
    }

    #[test]
    fn editing_record_does_not_collide_with_itself() {
        let siblings = vec![SlugRecord::new(42, "doom")];
        let slug = assign_slug(EntityKind::Game, "Doom", None, &siblings, Some(42));
        assert_eq!(slug.as_str(), "doom");

        let slug = assign_slug(EntityKind::Game, "Doom", Some("doom"), &siblings, Some(42));
        assert_eq!(slug.as_str(), "doom");
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "a very long game title that keeps going and going well past the limit";
        let slug = assign_slug(EntityKind::Game, name, None, &[], None);
        assert_valid(&slug);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn long_name_suffix_stays_within_limit() {
        let name = "x".repeat(80);
        let base = base_slug(EntityKind::Game, &name);
        assert_eq!(base.len(), SLUG_MAX_LEN);

        let mut siblings = vec![SlugRecord::new(1, base.clone())];
        for i in 1..=12 {
            let suffix = format!("-{i}");
            let variant = format!("{}{suffix}", &base[..SLUG_MAX_LEN - suffix.len()]);
            siblings.push(SlugRecord::new(i + 1, variant));
        }

        let slug = assign_slug(EntityKind::Game, &name, None, &siblings, None);
        assert_valid(&slug);
        assert!(slug.as_str().ends_with("-13"));
        assert!(slug.as_str().starts_with(search_prefix(&base)));
    }

    #[test]
    fn assigned_slugs_are_always_valid_and_unique() {
        let siblings = records(&["portal", "portal-1", "game", "a-b"]);
        let names = ["Portal", "", "A&B", "Über Spiel", "ゼルダの伝説", "---", "1999"];
        for name in names {
            let slug = assign_slug(EntityKind::Game, name, None, &siblings, None);
            assert_valid(&slug);
            assert!(!siblings.iter().any(|r| r.slug == slug.as_str()));
        }
    }

    #[test]
    fn search_prefix_is_shared_by_variants() {
        let base = base_slug(EntityKind::Game, &"long title ".repeat(10));
        let siblings = vec![SlugRecord::new(1, base.clone())];
        let slug = assign_slug(EntityKind::Game, &"long title ".repeat(10), None, &siblings, None);
        assert!(slug.as_str().starts_with(search_prefix(&base)));
        assert_eq!(search_prefix("doom"), "doom");
    }

    #[test]
    fn parse_rejects_invalid_slugs() {
        assert_matches!(Slug::parse(""), Err(SlugError::Empty));
        assert_matches!(Slug::parse("Doom"), Err(SlugError::InvalidCharacter('D')));
        assert_matches!(Slug::parse("doom_2"), Err(SlugError::InvalidCharacter('_')));
        assert_matches!(
            Slug::parse(&"a".repeat(51)),
            Err(SlugError::TooLong { len: 51 })
        );
        assert!(Slug::parse("doom-2").is_ok());
    }

    #[test]
    fn slug_serde_validates() {
        let slug: Slug = serde_json::from_str("\"doom-2\"").unwrap();
        assert_eq!(slug.to_string(), "doom-2");
        assert!(serde_json::from_str::<Slug>("\"Not A Slug\"").is_err());
    }
}

//! Library filter: query-string parsing and the option lists the filter UI
//! renders.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{multiple_choice, FieldIssue, FormErrors};
use crate::game::{flag_bit, GAME_FLAGS};
use crate::types::DbId;

/// Oldest year offered by the library filter.
pub const OLDEST_FILTER_YEAR: i32 = 1971;

/// Raw query string. Multi-valued filters are comma separated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LibraryFilterInput {
    #[validate(length(max = 50))]
    pub q: Option<String>,
    pub platforms: Option<String>,
    pub genres: Option<String>,
    pub companies: Option<String>,
    pub years: Option<String>,
    pub flags: Option<String>,
}

/// Cleaned filter over public games. Empty lists do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryFilter {
    pub q: Option<String>,
    pub platforms: Vec<DbId>,
    pub genres: Vec<DbId>,
    pub companies: Vec<DbId>,
    pub years: Vec<i32>,
    /// Games must carry every flag bit set here.
    pub flags: i64,
}

/// Choice ids the filter may reference.
#[derive(Debug, Clone, Default)]
pub struct LibraryChoices {
    pub platforms: BTreeSet<DbId>,
    pub genres: BTreeSet<DbId>,
    pub companies: BTreeSet<DbId>,
}

/// Years the filter offers, newest first.
pub fn year_choices(today: chrono::NaiveDate) -> Vec<i32> {
    use chrono::Datelike;
    (OLDEST_FILTER_YEAR..=today.year()).rev().collect()
}

fn split(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Ids a raw list filter mentions, for fetching the known subset before
/// cleaning. Values that are not numbers are skipped here and reported by
/// [`clean_library_filter`].
pub fn requested_ids(value: Option<&str>) -> Vec<DbId> {
    split(value).filter_map(|part| part.parse().ok()).collect()
}

/// Parse comma-separated integers; any non-number is an invalid choice.
fn parse_list<T: std::str::FromStr>(value: Option<&str>) -> Result<Vec<T>, FieldIssue> {
    split(value)
        .map(|part| part.parse().map_err(|_| FieldIssue::InvalidChoice))
        .collect()
}

fn ids(value: Option<&str>, known: &BTreeSet<DbId>) -> Result<Vec<DbId>, FieldIssue> {
    multiple_choice(&parse_list::<DbId>(value)?, known)
}

fn flags(value: Option<&str>) -> Result<i64, FieldIssue> {
    split(value).try_fold(0_i64, |bits, name| {
        flag_bit(name)
            .map(|bit| bits | bit)
            .ok_or(FieldIssue::InvalidChoice)
    })
}

/// Clean a library filter query.
pub fn clean_library_filter(
    input: &LibraryFilterInput,
    choices: &LibraryChoices,
    today: chrono::NaiveDate,
) -> Result<LibraryFilter, FormErrors> {
    let mut errors = match input.validate() {
        Ok(()) => FormErrors::new(),
        Err(err) => FormErrors::from(err),
    };

    let years_known: BTreeSet<i32> = year_choices(today).into_iter().collect();

    let platforms = errors.check("platforms", ids(input.platforms.as_deref(), &choices.platforms));
    let genres = errors.check("genres", ids(input.genres.as_deref(), &choices.genres));
    let companies = errors.check("companies", ids(input.companies.as_deref(), &choices.companies));
    let years = errors.check(
        "years",
        parse_list::<i32>(input.years.as_deref()).and_then(|y| multiple_choice(&y, &years_known)),
    );
    let flags = errors.check("flags", flags(input.flags.as_deref()));

    if !errors.is_empty() {
        return Err(errors);
    }
    match (platforms, genres, companies, years, flags) {
        (Some(platforms), Some(genres), Some(companies), Some(years), Some(flags)) => {
            Ok(LibraryFilter {
                q: input
                    .q
                    .as_deref()
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .map(str::to_string),
                platforms,
                genres,
                companies,
                years,
                flags,
            })
        }
        _ => Err(errors),
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// One entry of a choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice<V> {
    pub value: V,
    pub label: String,
}

impl<V> Choice<V> {
    pub fn new(value: V, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Everything the filter UI offers.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryOptions {
    pub platforms: Vec<Choice<DbId>>,
    pub genres: Vec<Choice<DbId>>,
    pub years: Vec<i32>,
    pub flags: Vec<Choice<&'static str>>,
}

impl LibraryOptions {
    pub fn new(
        platforms: Vec<Choice<DbId>>,
        genres: Vec<Choice<DbId>>,
        today: chrono::NaiveDate,
    ) -> Self {
        Self {
            platforms,
            genres,
            years: year_choices(today),
            flags: flag_choices(),
        }
    }
}

/// Game flags as choices, in bit order.
pub fn flag_choices() -> Vec<Choice<&'static str>> {
    GAME_FLAGS
        .iter()
        .map(|(name, label)| Choice::new(*name, *label))
        .collect()
}

//! Installer create and edit forms.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{optional_text, FieldIssue, FormErrors, NON_FIELD_ERRORS};
use crate::edit::{guard_changed, Editable, FieldDiff};
use crate::installer::{
    validate_content, validate_installer_submission, validate_version, InstallerFields,
    InstallerValidator, InstallerVersion, SubmitAction,
};
use crate::text::strip_tags;
use crate::types::DbId;

pub const REASON_MAX_LEN: usize = 500;

/// Raw installer fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallerInput {
    #[serde(default)]
    pub runner: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub content: String,
    /// Ignored: the draft flag comes from `action`.
    #[serde(default)]
    pub draft: bool,
    pub action: Option<SubmitAction>,
}

impl InstallerInput {
    fn action(&self) -> SubmitAction {
        self.action.unwrap_or(SubmitAction::SubmitForReview)
    }
}

/// Records the installer forms consult.
#[derive(Debug, Clone, Default)]
pub struct InstallerContext {
    pub game_id: DbId,
    /// Slugs of the runners installers may target.
    pub runners: BTreeSet<String>,
    /// The game's non-deleted installers.
    pub versions: Vec<InstallerVersion>,
    /// Installer being edited.
    pub self_id: Option<DbId>,
}

fn clean_runner(runner: &str, known: &BTreeSet<String>) -> Result<String, FieldIssue> {
    let runner = runner.trim();
    if runner.is_empty() {
        Err(FieldIssue::Required)
    } else if !known.contains(runner) {
        Err(FieldIssue::InvalidChoice)
    } else {
        Ok(runner.to_string())
    }
}

fn clean_markup(text: &str) -> String {
    strip_tags(text).trim().to_string()
}

/// Clean an installer submission.
///
/// Runner, version and content are cleaned independently. The whole-object
/// pass runs only when all three are clean; its rejection is reported
/// against `content`. The returned `draft` reflects the submit action.
pub fn clean_installer<V>(
    input: &InstallerInput,
    ctx: &InstallerContext,
    validator: &V,
) -> Result<InstallerFields, FormErrors>
where
    V: InstallerValidator + ?Sized,
{
    let mut errors = FormErrors::new();

    let runner = errors.check("runner", clean_runner(&input.runner, &ctx.runners));
    let version = errors.check(
        "version",
        validate_version(&input.version, &ctx.versions, ctx.self_id),
    );
    let content = errors.check("content", validate_content(&input.content));

    let (Some(runner), Some(version), Some(content)) = (runner, version, content) else {
        return Err(errors);
    };

    let fields = InstallerFields {
        game_id: ctx.game_id,
        runner,
        version,
        description: clean_markup(&input.description),
        notes: clean_markup(&input.notes),
        content,
        draft: input.draft,
    };

    let fields = errors.check(
        "content",
        validate_installer_submission(fields, input.action(), validator),
    );
    match fields {
        Some(fields) => errors.finish(fields),
        None => Err(errors),
    }
}

/// The editable part of an installer, compared by the edit guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerEditable {
    pub runner: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    pub content: String,
}

impl From<&InstallerFields> for InstallerEditable {
    fn from(fields: &InstallerFields) -> Self {
        Self {
            runner: fields.runner.clone(),
            version: fields.version.clone(),
            description: fields.description.clone(),
            notes: fields.notes.clone(),
            content: fields.content.clone(),
        }
    }
}

impl Editable for InstallerEditable {
    fn changed_fields(&self, submitted: &Self) -> Vec<&'static str> {
        FieldDiff::new()
            .field("runner", &self.runner, &submitted.runner)
            .field("version", &self.version, &submitted.version)
            .field("description", &self.description, &submitted.description)
            .field("notes", &self.notes, &submitted.notes)
            .field("content", &self.content, &submitted.content)
            .finish()
    }
}

/// Installer edit input: the installer fields plus the editor's reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallerEditInput {
    #[serde(flatten)]
    pub installer: InstallerInput,
    pub reason: Option<String>,
}

/// A cleaned installer edit, to be stored as a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanInstallerEdit {
    pub fields: InstallerFields,
    pub reason: Option<String>,
    pub changed: Vec<&'static str>,
}

/// Clean an edit of a stored installer.
///
/// `original` holds the stored values with content in canonical form, so
/// re-submitting the stored script with different whitespace is no change.
pub fn clean_installer_edit<V>(
    input: &InstallerEditInput,
    original: &InstallerEditable,
    ctx: &InstallerContext,
    validator: &V,
) -> Result<CleanInstallerEdit, FormErrors>
where
    V: InstallerValidator + ?Sized,
{
    let reason = optional_text(input.reason.as_deref(), REASON_MAX_LEN);
    let cleaned = clean_installer(&input.installer, ctx, validator);

    let (fields, reason) = match (cleaned, reason) {
        (Ok(fields), Ok(reason)) => (fields, reason),
        (cleaned, reason) => {
            let mut errors = cleaned.err().unwrap_or_default();
            if let Err(issue) = reason {
                errors.record("reason", &issue);
            }
            return Err(errors);
        }
    };

    let submitted = InstallerEditable::from(&fields);
    let changed = original.changed_fields(&submitted);
    if let Err(unchanged) = guard_changed(original, submitted) {
        let mut errors = FormErrors::new();
        errors.record(NON_FIELD_ERRORS, &unchanged);
        return Err(errors);
    }

    Ok(CleanInstallerEdit {
        fields,
        reason,
        changed,
    })
}

//! Form cleaning pipeline.
//!
//! Each form cleans its fields independently, recording failures in a
//! [`FormErrors`] accumulator instead of stopping at the first one, then runs
//! its whole-object checks once the fields those checks depend on are
//! clean. The result is either the cleaned value or every `(field, kind,
//! message)` tuple the submitter needs to fix.
//!
//! Forms never touch storage: the caller fetches whatever records a form
//! consults (sibling slugs, installer versions, known choice ids) and passes
//! them in through the form's context type.

pub mod fork;
pub mod game;
pub mod installer;
pub mod library;
pub mod screenshot;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::edit::NoChangeError;
use crate::game::{DuplicateError, DuplicateKind};
use crate::installer::{ContentError, VersionError};

/// Key under which errors that belong to no single field are recorded.
pub const NON_FIELD_ERRORS: &str = "__all__";

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Machine-readable classification of a field error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateName {
        status: DuplicateKind,
        locator: String,
    },
    VersionRequired,
    VersionPlaceholder,
    VersionDuplicate,
    ContentSyntax {
        line: usize,
    },
    ContentStructural,
    NoChangeSubmitted,
    Required,
    InvalidChoice,
    TooLong {
        max: usize,
    },
    InvalidValue,
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub kind: ErrorKind,
    pub message: String,
}

/// A validator failure that can be reported against a form field.
///
/// Most failures produce one entry; a structural installer failure produces
/// one per message so each can be shown next to the content editor.
pub trait FieldFailure: fmt::Display {
    fn kind(&self) -> ErrorKind;

    fn entries(&self) -> Vec<(ErrorKind, String)> {
        vec![(self.kind(), self.to_string())]
    }
}

impl FieldFailure for DuplicateError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::DuplicateName {
            status: self.kind,
            locator: self.locator.clone(),
        }
    }
}

impl FieldFailure for VersionError {
    fn kind(&self) -> ErrorKind {
        match self {
            VersionError::Required => ErrorKind::VersionRequired,
            VersionError::Placeholder => ErrorKind::VersionPlaceholder,
            VersionError::Duplicate => ErrorKind::VersionDuplicate,
        }
    }
}

impl FieldFailure for ContentError {
    fn kind(&self) -> ErrorKind {
        match self {
            ContentError::Syntax { line, .. } => ErrorKind::ContentSyntax { line: *line },
            ContentError::Structural { .. } => ErrorKind::ContentStructural,
        }
    }

    fn entries(&self) -> Vec<(ErrorKind, String)> {
        match self {
            ContentError::Structural { messages } => messages
                .iter()
                .map(|message| (ErrorKind::ContentStructural, message.clone()))
                .collect(),
            ContentError::Syntax { .. } => vec![(self.kind(), self.to_string())],
        }
    }
}

impl FieldFailure for NoChangeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoChangeSubmitted
    }
}

/// Ordinary field failures shared by all forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldIssue {
    #[error("此字段是必填字段")]
    Required,

    #[error("请选择有效的选项")]
    InvalidChoice,

    #[error("确保该值不超过 {max} 个字符")]
    TooLong { max: usize },

    #[error("{0}")]
    Invalid(String),
}

impl FieldFailure for FieldIssue {
    fn kind(&self) -> ErrorKind {
        match self {
            FieldIssue::Required => ErrorKind::Required,
            FieldIssue::InvalidChoice => ErrorKind::InvalidChoice,
            FieldIssue::TooLong { max } => ErrorKind::TooLong { max: *max },
            FieldIssue::Invalid(_) => ErrorKind::InvalidValue,
        }
    }
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// All errors collected while cleaning one submission, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
    errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether any error was recorded against `field`.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Errors recorded against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn add(&mut self, field: &str, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            kind,
            message: message.into(),
        });
    }

    /// Record every entry of `failure` against `field`.
    pub fn record<F: FieldFailure + ?Sized>(&mut self, field: &str, failure: &F) {
        for (kind, message) in failure.entries() {
            self.add(field, kind, message);
        }
    }

    /// Unwrap a field validator's result, recording its failure against
    /// `field`. Returns `None` when the field failed.
    pub fn check<T, F: FieldFailure>(&mut self, field: &str, result: Result<T, F>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(failure) => {
                self.record(field, &failure);
                None
            }
        }
    }

    /// `Ok(value)` when nothing was recorded, otherwise all the errors.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Fold another accumulator's errors into this one.
    pub fn extend(&mut self, other: FormErrors) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs.clone()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut form_errors = FormErrors::new();
        for (field, errs) in fields {
            for err in errs {
                let issue = match err.code.as_ref() {
                    "length" => FieldIssue::TooLong {
                        max: err
                            .params
                            .get("max")
                            .and_then(|max| max.as_u64())
                            .unwrap_or_default() as usize,
                    },
                    "required" => FieldIssue::Required,
                    _ => FieldIssue::Invalid(
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "输入无效".to_string()),
                    ),
                };
                form_errors.record(&field, &issue);
            }
        }
        form_errors
    }
}

// ---------------------------------------------------------------------------
// Shared field cleaners
// ---------------------------------------------------------------------------

/// A required text field: trimmed, non-empty, at most `max` characters.
pub fn required_text(value: &str, max: usize) -> Result<String, FieldIssue> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldIssue::Required);
    }
    bounded(value, max).map(str::to_string)
}

/// An optional text field: blank becomes `None`, at most `max` characters.
pub fn optional_text(value: Option<&str>, max: usize) -> Result<Option<String>, FieldIssue> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => bounded(value, max).map(|v| Some(v.to_string())),
    }
}

fn bounded(value: &str, max: usize) -> Result<&str, FieldIssue> {
    if value.chars().count() > max {
        Err(FieldIssue::TooLong { max })
    } else {
        Ok(value)
    }
}

/// An optional single choice that must be one of `known`.
pub fn optional_choice<T: Ord + Copy>(
    value: Option<T>,
    known: &BTreeSet<T>,
) -> Result<Option<T>, FieldIssue> {
    match value {
        Some(value) if !known.contains(&value) => Err(FieldIssue::InvalidChoice),
        other => Ok(other),
    }
}

/// A multiple choice whose every value must be one of `known`. Returns the
/// values sorted and deduplicated.
pub fn multiple_choice<T: Ord + Clone>(values: &[T], known: &BTreeSet<T>) -> Result<Vec<T>, FieldIssue> {
    if values.iter().any(|value| !known.contains(value)) {
        return Err(FieldIssue::InvalidChoice);
    }
    let unique: BTreeSet<T> = values.iter().cloned().collect();
    Ok(unique.into_iter().collect())
}

/// Image extensions accepted for uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Directory, relative to the media root, uploads are staged in before a
/// form accepts them.
pub const UPLOAD_STAGING_DIR: &str = "uploads/";

/// A staged image upload: a path under [`UPLOAD_STAGING_DIR`] without
/// parent components, with an image extension.
pub fn staged_image(path: &str) -> Result<String, FieldIssue> {
    let path = path.trim();
    if path.is_empty() {
        return Err(FieldIssue::Required);
    }

    let staged = path.starts_with(UPLOAD_STAGING_DIR)
        && path
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if !staged {
        return Err(FieldIssue::Invalid("上传文件无效，请重新上传".to_string()));
    }

    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FieldIssue::Invalid(
            "请上传有效的图片。您所上传的文件不是图片或者是已损坏的图片。".to_string(),
        ));
    }

    Ok(path.to_string())
}

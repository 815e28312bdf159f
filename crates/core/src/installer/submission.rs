//! Whole-object installer validation and draft derivation.

use serde::{Deserialize, Serialize};

use super::content::ContentError;
use super::script::{InstallerCandidate, InstallerValidator};
use crate::types::DbId;
use crate::yaml;

/// Which submit button the submitter pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitAction {
    /// Keep the installer as a private draft.
    #[serde(rename = "save")]
    SaveDraft,
    /// Send the installer to moderators.
    #[serde(rename = "submit")]
    SubmitForReview,
}

impl SubmitAction {
    /// Derive the action from the names of the submitted form keys: the
    /// presence of a `save` key means "save as draft".
    pub fn from_form_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        if keys.into_iter().any(|key| key == "save") {
            Self::SaveDraft
        } else {
            Self::SubmitForReview
        }
    }

    pub fn is_draft(self) -> bool {
        matches!(self, Self::SaveDraft)
    }
}

/// Cleaned installer fields, ready to be validated as a whole and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerFields {
    pub game_id: DbId,
    pub runner: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    /// Canonical YAML, as returned by the content validator.
    pub content: String,
    pub draft: bool,
}

/// Validate the installer as a whole and set its draft flag.
///
/// Builds a transient candidate from the cleaned fields and runs
/// `validator` on it. A rejection becomes [`ContentError::Structural`],
/// which belongs to the `content` field. On success `draft` is set from
/// `action`, overriding whatever the fields carried.
pub fn validate_installer_submission<V>(
    mut fields: InstallerFields,
    action: SubmitAction,
    validator: &V,
) -> Result<InstallerFields, ContentError>
where
    V: InstallerValidator + ?Sized,
{
    let candidate = InstallerCandidate {
        game_id: fields.game_id,
        runner: fields.runner.clone(),
        version: fields.version.clone(),
        script: yaml::load_yaml(&fields.content)?,
    };

    let report = validator.validate(&candidate);
    if !report.is_valid {
        let messages = if report.errors.is_empty() {
            vec!["安装脚本错误".to_string()]
        } else {
            report.errors
        };
        return Err(ContentError::Structural { messages });
    }

    fields.draft = action.is_draft();
    Ok(fields)
}

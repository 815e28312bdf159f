//! Installer version field: required, not a placeholder, unique per game.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Sentinel values the default installer template ships with. Submitting
/// one unchanged means the version was never filled in.
pub const PLACEHOLDER_VERSIONS: &[&str] = &["change me", "请修改该字段"];

/// Version of a non-deleted installer of the same game, as fetched from
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerVersion {
    pub id: DbId,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("此字段是必填字段")]
    Required,

    #[error("请修改该字段")]
    Placeholder,

    #[error("相同版本的安装脚本已存在，如需继续提交，请修改版本字段")]
    Duplicate,
}

/// Clean an installer's version string.
///
/// `siblings` are the game's non-deleted installers; `self_id` is the
/// installer being edited, which never collides with itself. Returns the
/// trimmed version.
pub fn validate_version(
    version: &str,
    siblings: &[InstallerVersion],
    self_id: Option<DbId>,
) -> Result<String, VersionError> {
    let version = version.trim();
    if version.is_empty() {
        return Err(VersionError::Required);
    }

    let lowered = version.to_lowercase();
    if PLACEHOLDER_VERSIONS.contains(&lowered.as_str()) {
        return Err(VersionError::Placeholder);
    }

    let exists = siblings
        .iter()
        .any(|other| other.version == version && Some(other.id) != self_id);
    if exists {
        return Err(VersionError::Duplicate);
    }

    Ok(version.to_string())
}

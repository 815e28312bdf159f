//! Media file storage.
//!
//! Uploads arrive through a separate upload endpoint and are staged under
//! `uploads/` in the media root; forms carry the staged path. Storing is two
//! steps: [`MediaStore::prepare_banner`] and
//! [`MediaStore::prepare_screenshot`] check the upload and compute its final
//! path, and [`PendingMove::commit`] moves it there once the record pointing
//! at that path has been written. A failed write leaves every file as it was.

use std::io;
use std::path::{Path, PathBuf};

use catalog_core::forms::{FieldIssue, FormErrors};
use catalog_core::game::banner_path;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The staged upload no longer exists.
    #[error("Staged upload not found: {0}")]
    Missing(String),

    #[error("Media I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MediaError {
    /// Convert into an API error, reporting a missing upload against the
    /// form field that referenced it.
    pub fn into_app_error(self, field: &str) -> AppError {
        match self {
            MediaError::Missing(path) => {
                tracing::warn!(%path, field, "Staged upload missing");
                let mut errors = FormErrors::new();
                errors.record(
                    field,
                    &FieldIssue::Invalid("上传文件无效，请重新上传".to_string()),
                );
                AppError::from(errors)
            }
            MediaError::Io(err) => AppError::InternalError(err.to_string()),
        }
    }
}

/// A staged upload known to exist, not yet moved to its final path.
///
/// Dropping it leaves the upload staged.
#[derive(Debug)]
#[must_use = "a pending move does nothing until committed"]
pub struct PendingMove {
    source: PathBuf,
    target: PathBuf,
    relative: String,
}

impl PendingMove {
    /// Final path relative to the media root.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Move the upload into place, replacing any file already stored at the
    /// final path. Returns the relative path.
    pub async fn commit(self) -> Result<String, MediaError> {
        if let Some(parent) = self.target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match tokio::fs::rename(&self.source, &self.target).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(MediaError::Missing(self.source.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        }
        tracing::debug!(relative = %self.relative, "Media file stored");
        Ok(self.relative)
    }
}

/// Media files rooted at a single directory. All paths handed in and out are
/// relative to that root.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Prepare moving a staged title logo to `games/banners/{slug}{ext}`.
    pub async fn prepare_banner(&self, staged: &str, slug: &str) -> Result<PendingMove, MediaError> {
        self.prepare(staged, banner_path(slug, staged)).await
    }

    /// Prepare moving a staged screenshot to
    /// `games/screenshots/{slug}/{file name}`.
    pub async fn prepare_screenshot(
        &self,
        staged: &str,
        slug: &str,
    ) -> Result<PendingMove, MediaError> {
        let file_name = Path::new(staged)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| MediaError::Missing(staged.to_string()))?;
        self.prepare(staged, format!("games/screenshots/{slug}/{file_name}"))
            .await
    }

    /// Check that `staged` still exists.
    pub async fn ensure_staged(&self, staged: &str) -> Result<(), MediaError> {
        if tokio::fs::try_exists(self.root.join(staged)).await? {
            Ok(())
        } else {
            Err(MediaError::Missing(staged.to_string()))
        }
    }

    async fn prepare(&self, staged: &str, relative: String) -> Result<PendingMove, MediaError> {
        self.ensure_staged(staged).await?;
        Ok(PendingMove {
            source: self.root.join(staged),
            target: self.root.join(&relative),
            relative,
        })
    }
}

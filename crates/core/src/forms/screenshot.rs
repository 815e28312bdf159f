//! Screenshot upload form.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{staged_image, FormErrors};
use crate::types::DbId;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ScreenshotInput {
    /// Staged upload path.
    #[serde(default)]
    pub image: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenshotFields {
    pub game_id: DbId,
    pub image: String,
    pub description: String,
}

/// Clean a screenshot for `game_id`. Screenshots are stored unpublished.
pub fn clean_screenshot(input: &ScreenshotInput, game_id: DbId) -> Result<ScreenshotFields, FormErrors> {
    let mut errors = match input.validate() {
        Ok(()) => FormErrors::new(),
        Err(err) => FormErrors::from(err),
    };
    let image = errors.check("image", staged_image(&input.image));

    match image {
        Some(image) if errors.is_empty() => Ok(ScreenshotFields {
            game_id,
            image,
            description: input.description.trim().to_string(),
        }),
        _ => Err(errors),
    }
}

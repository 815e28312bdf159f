//! Game records: name duplicate pre-check, catalog flags, title logo
//! handling and year bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slug::{self, SLUG_MAX_LEN};

// ---------------------------------------------------------------------------
// Duplicate name detection
// ---------------------------------------------------------------------------

/// An existing game found under a candidate slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSlugMatch {
    pub slug: String,
    pub is_public: bool,
}

/// Whether the game a new submission duplicates is already visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    /// The existing game is published.
    Published,
    /// The existing game is still awaiting moderation.
    Pending,
}

/// A submitted name resolves to the slug of a game already in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateError {
    pub kind: DuplicateKind,
    /// Page path of the existing game, e.g. `/games/doom`.
    pub locator: String,
}

impl fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DuplicateKind::Published => write!(
                f,
                "该游戏已在我们的数据库中，点击查看：{}",
                self.locator
            ),
            DuplicateKind::Pending => write!(
                f,
                "该游戏已在我们的数据库中但尚未发布（点击查看：{}）。欢迎与我们联系，以便我们尽快发布。",
                self.locator
            ),
        }
    }
}

impl std::error::Error for DuplicateError {}

/// Page path of the game with `slug`.
pub fn game_locator(slug: &str) -> String {
    format!("/games/{slug}")
}

/// Slug a new game named `name` would be looked up under: the first
/// [`SLUG_MAX_LEN`] characters of its normalized form. Empty when the name
/// has nothing to normalize, in which case there is nothing to look up.
pub fn name_slug(name: &str) -> String {
    let normalized = slug::normalize(name);
    debug_assert!(normalized.len() <= SLUG_MAX_LEN);
    normalized
}

/// Pre-check a submitted game name against the game stored under its
/// candidate slug (see [`name_slug`]), if the caller found one.
///
/// Returns the name unchanged when no game holds the slug. This is not the
/// authoritative uniqueness guarantee; slug assignment at save time is.
pub fn check_name<'a>(
    name: &'a str,
    existing: Option<&GameSlugMatch>,
) -> Result<&'a str, DuplicateError> {
    match existing {
        None => Ok(name),
        Some(game) => Err(DuplicateError {
            kind: if game.is_public {
                DuplicateKind::Published
            } else {
                DuplicateKind::Pending
            },
            locator: game_locator(&game.slug),
        }),
    }
}

// ---------------------------------------------------------------------------
// Catalog flags
// ---------------------------------------------------------------------------

/// Flags a game can carry, stored as a bit field. The bit of each flag is
/// its position in [`GAME_FLAGS`], so new flags must only be appended.
pub const GAME_FLAGS: &[(&str, &str)] = &[
    ("fully_libre", "完全自由"),
    ("open_engine", "仅引擎开源"),
    ("free", "免费"),
    ("freetoplay", "免费游玩"),
    ("pwyw", "随意付费"),
    ("demo", "有试玩版"),
    ("protected", "安装脚本修改受限"),
];

/// Bit mask of a flag name, `None` for unknown names.
pub fn flag_bit(name: &str) -> Option<i64> {
    GAME_FLAGS
        .iter()
        .position(|(flag, _)| *flag == name)
        .map(|index| 1_i64 << index)
}

/// Flag names set in `bits`, in declaration order.
pub fn flag_names(bits: i64) -> Vec<&'static str> {
    GAME_FLAGS
        .iter()
        .enumerate()
        .filter(|(index, _)| bits & (1_i64 << index) != 0)
        .map(|(_, (flag, _))| *flag)
        .collect()
}

// ---------------------------------------------------------------------------
// Release year
// ---------------------------------------------------------------------------

/// Earliest release year accepted on a game.
pub const MIN_RELEASE_YEAR: i32 = 1970;

/// Latest release year accepted on a game: next year, for announced titles.
pub fn max_release_year(today: chrono::NaiveDate) -> i32 {
    use chrono::Datelike;
    today.year() + 1
}

// ---------------------------------------------------------------------------
// Title logo
// ---------------------------------------------------------------------------

/// Cropper dimensions for the title logo upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBox {
    pub width: u32,
    pub height: u32,
}

/// Options handed to the image cropping widget.
#[derive(Debug, Clone, Serialize)]
pub struct CropOptions {
    pub viewport: CropBox,
    pub boundary: CropBox,
    #[serde(rename = "showZoomer")]
    pub show_zoomer: bool,
    /// URL of the current logo when editing, empty otherwise.
    pub url: String,
}

pub const TITLE_LOGO_SIZE: CropBox = CropBox {
    width: 875,
    height: 345,
};

/// Cropper options for the title logo, pre-loaded with `current_url`.
pub fn title_logo_crop_options(current_url: Option<&str>) -> CropOptions {
    CropOptions {
        viewport: TITLE_LOGO_SIZE,
        boundary: TITLE_LOGO_SIZE,
        show_zoomer: true,
        url: current_url.unwrap_or_default().to_string(),
    }
}

/// Media-relative path an uploaded title logo is stored under:
/// `games/banners/{slug}{ext}`, keeping the upload's extension.
pub fn banner_path(slug: &str, uploaded_name: &str) -> String {
    let ext = std::path::Path::new(uploaded_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("games/banners/{slug}{ext}")
}

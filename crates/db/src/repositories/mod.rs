//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod company_repo;
pub mod game_edit_request_repo;
pub mod game_repo;
pub mod installer_repo;
pub mod lookup_repo;
pub mod screenshot_repo;
pub mod slug_repo;

pub use company_repo::CompanyRepo;
pub use game_edit_request_repo::GameEditRequestRepo;
pub use game_repo::GameRepo;
pub use installer_repo::{InstallerRepo, InstallerRevisionRepo};
pub use lookup_repo::{GenreRepo, PlatformRepo, RunnerRepo};
pub use screenshot_repo::ScreenshotRepo;
pub use slug_repo::SlugRepo;

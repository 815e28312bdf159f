//! Installer script validation.
//!
//! Field validators ([`version`], [`content`]) run independently during form
//! cleaning; [`submission`] runs the whole-object pass once they succeed,
//! delegating domain checks to an [`script::InstallerValidator`].

pub mod content;
pub mod script;
pub mod submission;
pub mod version;

pub use content::{validate_content, ContentError};
pub use script::{InstallerCandidate, InstallerValidator, ScriptReport, ScriptValidator};
pub use submission::{validate_installer_submission, InstallerFields, SubmitAction};
pub use version::{validate_version, InstallerVersion, VersionError};

//! Fork an installer into a draft installer of another game.

use serde::Deserialize;

use super::{FieldIssue, FormErrors};
use crate::installer::{validate_version, InstallerFields, InstallerVersion};
use crate::types::DbId;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForkInput {
    /// Id of the game receiving the copy.
    pub game: Option<DbId>,
}

/// Target game as found by the caller, with its non-deleted installers.
#[derive(Debug, Clone)]
pub struct ForkTarget {
    pub game_id: DbId,
    pub versions: Vec<InstallerVersion>,
}

/// Clean a fork request for `source`.
///
/// `target` is `None` when the requested game does not exist. The copy keeps
/// the source's runner, version, description, notes and content, belongs to
/// the target game and starts as a draft. A version already used in the
/// target game is reported against `game`.
pub fn clean_fork(
    input: &ForkInput,
    source: &InstallerFields,
    target: Option<&ForkTarget>,
) -> Result<InstallerFields, FormErrors> {
    let mut errors = FormErrors::new();

    let target = match (input.game, target) {
        (None, _) => errors.check("game", Err::<&ForkTarget, _>(FieldIssue::Required)),
        (Some(_), None) => errors.check("game", Err::<&ForkTarget, _>(FieldIssue::InvalidChoice)),
        (Some(_), Some(target)) => Some(target),
    };
    let Some(target) = target else {
        return Err(errors);
    };

    let version = errors.check(
        "game",
        validate_version(&source.version, &target.versions, None),
    );
    let Some(version) = version else {
        return Err(errors);
    };

    Ok(InstallerFields {
        game_id: target.game_id,
        version,
        draft: true,
        ..source.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ErrorKind;

    fn source() -> InstallerFields {
        InstallerFields {
            game_id: 1,
            runner: "wine".to_string(),
            version: "GOG".to_string(),
            description: "Windows build".to_string(),
            notes: String::new(),
            content: "game:\n  exe: game.exe\n".to_string(),
            draft: false,
        }
    }

    fn target(versions: &[&str]) -> ForkTarget {
        ForkTarget {
            game_id: 2,
            versions: versions
                .iter()
                .enumerate()
                .map(|(i, v)| InstallerVersion {
                    id: i as DbId + 100,
                    version: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn fork_copies_into_draft_of_target() {
        let input = ForkInput { game: Some(2) };
        let forked = clean_fork(&input, &source(), Some(&target(&["Steam"]))).unwrap();
        assert_eq!(forked.game_id, 2);
        assert_eq!(forked.runner, "wine");
        assert_eq!(forked.content, source().content);
        assert!(forked.draft);
    }

    #[test]
    fn duplicate_version_is_reported_on_game() {
        let input = ForkInput { game: Some(2) };
        let errors = clean_fork(&input, &source(), Some(&target(&["GOG"]))).unwrap_err();
        assert_eq!(
            errors.for_field("game").next().unwrap().kind,
            ErrorKind::VersionDuplicate
        );
    }

    #[test]
    fn missing_or_unknown_target() {
        let errors = clean_fork(&ForkInput::default(), &source(), None).unwrap_err();
        assert_eq!(errors.for_field("game").next().unwrap().kind, ErrorKind::Required);

        let errors = clean_fork(&ForkInput { game: Some(99) }, &source(), None).unwrap_err();
        assert_eq!(
            errors.for_field("game").next().unwrap().kind,
            ErrorKind::InvalidChoice
        );
    }
}

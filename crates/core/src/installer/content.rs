//! Installer content field: YAML syntax check and canonical re-dump.

use crate::yaml::{self, YamlSyntaxError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The content is not parseable YAML.
    #[error("YAML错误，位置: 第 {line} 行，错误: {message}")]
    Syntax { line: usize, message: String },

    /// The script parsed but the structural validator rejected it. Each
    /// message is reported separately against the content field.
    #[error("安装脚本错误: {}", messages.join("; "))]
    Structural { messages: Vec<String> },
}

impl From<YamlSyntaxError> for ContentError {
    fn from(err: YamlSyntaxError) -> Self {
        ContentError::Syntax {
            line: err.line,
            message: err.message,
        }
    }
}

/// Parse `raw` as YAML and return its canonical serialization.
///
/// Only syntax is checked here; script semantics are left to the
/// whole-object pass.
pub fn validate_content(raw: &str) -> Result<String, ContentError> {
    let value = yaml::load_yaml(raw)?;
    Ok(yaml::dump_yaml(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unterminated_flow_sequence_is_a_syntax_error() {
        assert_matches!(
            validate_content("key: [unterminated"),
            Err(ContentError::Syntax { line, .. }) if line >= 1
        );
    }

    #[test]
    fn syntax_error_message_mentions_line() {
        let err = validate_content("a: b\nc: [d\n").unwrap_err();
        assert!(err.to_string().starts_with("YAML错误"));
    }

    #[test]
    fn syntax_error_reports_offending_line() {
        let err = validate_content("game:\n  exe: run.sh\n- stray\n").unwrap_err();
        assert_matches!(&err, ContentError::Syntax { line: 3, .. });
        assert!(err.to_string().contains("第 3 行"));
    }

    #[test]
    fn canonical_output_reparses_to_same_value() {
        let raw = "game:   {exe: drive_c/game.exe,  prefix: $GAMEDIR}\n\
                   installer:\n  - task: {name: create_prefix, prefix: $GAMEDIR}\n";
        let canonical = validate_content(raw).unwrap();
        assert_eq!(
            yaml::load_yaml(&canonical).unwrap(),
            yaml::load_yaml(raw).unwrap()
        );
    }

    #[test]
    fn canonical_form_is_stable() {
        let once = validate_content("files: [{setup: 'http://example.com/setup.exe'}]").unwrap();
        let twice = validate_content(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn structural_error_joins_messages() {
        let err = ContentError::Structural {
            messages: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "安装脚本错误: a; b");
    }
}

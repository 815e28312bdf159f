//! YAML codec for installer scripts.
//!
//! Installer content is stored in canonical form: whatever the submitter
//! typed is parsed and dumped back in block style, so whitespace, quoting
//! and flow-style differences never survive into storage.

use serde_yaml::Value;

/// A YAML parse failure with the position reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct YamlSyntaxError {
    /// 1-based line of the parser's error mark.
    pub line: usize,
    /// 1-based column of the parser's error mark.
    pub column: usize,
    pub message: String,
}

impl From<serde_yaml::Error> for YamlSyntaxError {
    fn from(err: serde_yaml::Error) -> Self {
        let (line, column) = err
            .location()
            .map_or((1, 1), |location| (location.line(), location.column()));
        Self {
            line,
            column,
            message: err.to_string(),
        }
    }
}

/// Parse `text` into a YAML value. Empty input parses as `null`.
pub fn load_yaml(text: &str) -> Result<Value, YamlSyntaxError> {
    serde_yaml::from_str(text).map_err(YamlSyntaxError::from)
}

/// Serialize `value` in canonical block style.
///
/// Serializing an in-memory [`Value`] only fails for non-string mapping keys
/// that YAML cannot represent, which `load_yaml` never produces; such a
/// failure is reported as a syntax error at line 1.
pub fn dump_yaml(value: &Value) -> Result<String, YamlSyntaxError> {
    serde_yaml::to_string(value).map_err(YamlSyntaxError::from)
}

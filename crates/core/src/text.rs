//! Free-text cleaning for user-submitted descriptions and notes.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

/// Remove HTML tags from `input`, leaving the text between them.
///
/// Stripping repeats until the text is stable so that nested constructs such
/// as `<<b>script>` cannot reassemble into a tag. Entities are left as-is.
pub fn strip_tags(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let stripped = TAG_RE.replace_all(&current, "").into_owned();
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_simple_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn keeps_plain_text_and_entities() {
        assert_eq!(strip_tags("5 &gt; 3 and 2 < 4"), "5 &gt; 3 and 2 < 4");
    }

    #[test]
    fn nested_tags_do_not_reassemble() {
        assert_eq!(strip_tags("<<b>script>alert(1)<</b>/script>"), "alert(1)");
    }
}

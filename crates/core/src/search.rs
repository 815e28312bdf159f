//! Listing and autocomplete helpers shared by the repository and API layers.

/// Default number of library games per page.
pub const DEFAULT_LIBRARY_LIMIT: i64 = 25;

/// Maximum number of library games per page.
pub const MAX_LIBRARY_LIMIT: i64 = 100;

/// Default number of company autocomplete suggestions.
pub const DEFAULT_TYPEAHEAD_LIMIT: i64 = 10;

/// Maximum number of company autocomplete suggestions.
pub const MAX_TYPEAHEAD_LIMIT: i64 = 25;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Build an `ILIKE` pattern matching `term` anywhere, with the pattern
/// metacharacters in `term` escaped.
///
/// ```
/// use catalog_core::search::contains_pattern;
/// assert_eq!(contains_pattern("doom"), "%doom%");
/// assert_eq!(contains_pattern("100%_"), "%100\\%\\_%");
/// ```
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Build a `LIKE` pattern matching values that start with `prefix`.
pub fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = contains_pattern(prefix);
    pattern.remove(0);
    pattern
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_and_bounds() {
        assert_eq!(clamp_limit(None, 25, 100), 25);
        assert_eq!(clamp_limit(Some(500), 25, 100), 100);
        assert_eq!(clamp_limit(Some(0), 25, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }

    #[test]
    fn prefix_pattern_escapes_and_anchors() {
        assert_eq!(prefix_pattern("world-of"), "world-of%");
        assert_eq!(prefix_pattern("a_b"), "a\\_b%");
    }
}

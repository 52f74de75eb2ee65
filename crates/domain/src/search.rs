//! Case-insensitive "contains" search terms.
//!
//! Only ASCII letters are folded, the same way `SQLite`'s `LOWER` does, so
//! the in-memory and SQL matchers agree on non-ASCII input.

/// A normalized search term, ready to be used in a `LIKE` clause.
///
/// Blank input produces no term at all, so callers can tell "nothing was
/// searched" apart from "the search matched nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Build a term from raw user input. Returns `None` for blank input.
    #[must_use]
    pub fn parse(input: Option<&str>) -> Option<Self> {
        let trimmed = input?.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_ascii_lowercase()))
    }

    /// The ASCII-lower-cased term.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `%term%` with `\`, `%` and `_` escaped; pair with `ESCAPE '\'`.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.chars() {
            if matches!(ch, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// In-memory equivalent of the `LIKE` match, used by non-SQL stores.
    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_ascii_lowercase().contains(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_none_when_input_is_blank() {
        assert!(SearchTerm::parse(None).is_none());
        assert!(SearchTerm::parse(Some("")).is_none());
        assert!(SearchTerm::parse(Some("   ")).is_none());
    }

    #[test]
    fn should_lowercase_and_trim_input() {
        let term = SearchTerm::parse(Some("  ThinkPad ")).unwrap();
        assert_eq!(term.as_str(), "thinkpad");
    }

    #[test]
    fn should_escape_like_wildcards() {
        let term = SearchTerm::parse(Some("50%_off\\")).unwrap();
        assert_eq!(term.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn should_match_case_insensitively() {
        let term = SearchTerm::parse(Some("ali")).unwrap();
        assert!(term.matches("Alice Martin"));
        assert!(!term.matches("Bob"));
    }

    #[test]
    fn should_fold_only_ascii_letters() {
        let term = SearchTerm::parse(Some("ÉLODIE")).unwrap();
        assert_eq!(term.as_str(), "Élodie");
        assert!(term.matches("Élodie Durand"));
        assert!(!term.matches("élodie durand"));
    }
}

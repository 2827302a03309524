//! Glob matching over URL pathnames.
//!
//! Patterns are translated into anchored regular expressions once at
//! construction and cached for the crawl. Semantics: `**` matches any
//! sequence including `/`, `*` any sequence excluding `/`, `?` one
//! non-`/` character. A `**/` segment also matches zero path components,
//! so `**/guide` admits both `/guide` and `/docs/guide`.

use regex::Regex;

use crate::error::ConfigError;

/// A set of compiled glob patterns matched against pathnames.
#[derive(Debug, Clone, Default)]
pub struct GlobSet {
    patterns: Vec<Regex>,
}

impl GlobSet {
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(&glob_to_regex(pattern)).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches the pathname.
    #[must_use]
    pub fn matches(&self, pathname: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(pathname))
    }
}

/// Translate one glob into an anchored regex source string.
fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');

    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if pattern[i..].starts_with("**/") {
            // Optional group so the remainder may match zero components.
            regex.push_str("(?:.*/)?");
            i += 3;
        } else if pattern[i..].starts_with("**") {
            regex.push_str(".*");
            i += 2;
        } else if bytes[i] == b'*' {
            regex.push_str("[^/]*");
            i += 1;
        } else if bytes[i] == b'?' {
            regex.push_str("[^/]");
            i += 1;
        } else {
            // Take the whole char, escaping regex metacharacters.
            let ch = pattern[i..].chars().next().expect("in-bounds char");
            let mut buf = [0u8; 4];
            regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            i += ch.len_utf8();
        }
    }

    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> GlobSet {
        let owned: Vec<String> = patterns.iter().map(|p| (*p).to_string()).collect();
        GlobSet::compile(&owned).unwrap()
    }

    #[test]
    fn star_stops_at_slash() {
        let globs = set(&["/docs/*"]);
        assert!(globs.matches("/docs/intro"));
        assert!(!globs.matches("/docs/intro/deep"));
    }

    #[test]
    fn double_star_crosses_slashes() {
        let globs = set(&["/docs/**"]);
        assert!(globs.matches("/docs/intro"));
        assert!(globs.matches("/docs/intro/deep"));
    }

    #[test]
    fn double_star_segment_matches_zero_components() {
        let globs = set(&["/**/guide"]);
        assert!(globs.matches("/guide"));
        assert!(globs.matches("/docs/guide"));
        assert!(globs.matches("/docs/v2/guide"));
    }

    #[test]
    fn question_mark_is_one_char() {
        let globs = set(&["/page?"]);
        assert!(globs.matches("/page1"));
        assert!(!globs.matches("/page12"));
        assert!(!globs.matches("/page/"));
    }

    #[test]
    fn metacharacters_are_literal() {
        let globs = set(&["/a.b"]);
        assert!(globs.matches("/a.b"));
        assert!(!globs.matches("/axb"));
    }

    #[test]
    fn anchored_both_ends() {
        let globs = set(&["/docs"]);
        assert!(globs.matches("/docs"));
        assert!(!globs.matches("/docs/intro"));
        assert!(!globs.matches("/v2/docs"));
    }
}

//! Identifier and string literal quoting.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// When generated SQL quotes identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierQuoting {
    /// Quote only reserved keywords, names that are not plain identifiers
    /// and names the caller quoted explicitly.
    #[default]
    AsNeeded,
    /// Quote every identifier.
    Always,
}

static BARE_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Returns `true` if the segment can be written without quotes, keywords
/// aside.
#[must_use]
pub fn is_bare_identifier(segment: &str) -> bool {
    BARE_IDENTIFIER
        .as_ref()
        .is_some_and(|re| re.is_match(segment))
}

/// Wraps a single identifier in `open`/`close`, doubling every embedded
/// `close` character.
#[must_use]
pub fn quote_with(name: &str, (open, close): (char, char)) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(open);
    for c in name.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

/// Wraps a string in single quotes, doubling embedded single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Splits a qualified name on dots that are not inside quotes.
#[must_use]
pub fn split_qualified(name: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut closing: Option<char> = None;
    let mut start = 0;
    for (i, c) in name.char_indices() {
        match closing {
            Some(close) if c == close => closing = None,
            Some(_) => {}
            None => match c {
                '`' | '"' => closing = Some(c),
                '[' => closing = Some(']'),
                '.' => {
                    segments.push(&name[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    segments.push(&name[start..]);
    segments
}

/// Reverses [`quote_with`] for a possibly qualified name.
///
/// Unquoted segments are returned unchanged.
#[must_use]
pub fn unquote_with(quoted: &str, (open, close): (char, char)) -> String {
    let mut result = String::with_capacity(quoted.len());
    let mut chars = quoted.chars().peekable();
    let mut inside = false;
    while let Some(c) = chars.next() {
        if inside {
            if c == close {
                if chars.peek() == Some(&close) {
                    chars.next();
                    result.push(close);
                } else {
                    inside = false;
                }
            } else {
                result.push(c);
            }
        } else if c == open {
            inside = true;
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_with_doubles_closing_char() {
        assert_eq!(quote_with("name", ('`', '`')), "`name`");
        assert_eq!(quote_with("na`me", ('`', '`')), "`na``me`");
        assert_eq!(quote_with("a]b[c", ('[', ']')), "[a]]b[c]");
    }

    #[test]
    fn test_unquote_round_trip() {
        for name in ["plain", "with space", "odd\"quote", "br]acket", "back`tick"] {
            for pair in [('`', '`'), ('"', '"'), ('[', ']')] {
                assert_eq!(unquote_with(&quote_with(name, pair), pair), name);
            }
        }
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("schema.table"), ["schema", "table"]);
        assert_eq!(split_qualified("`a.b`.c"), ["`a.b`", "c"]);
        assert_eq!(split_qualified("[x.y]"), ["[x.y]"]);
        assert_eq!(split_qualified("users"), ["users"]);
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("'; DROP TABLE users; --"), "'''; DROP TABLE users; --'");
    }

    #[test]
    fn test_bare_identifier() {
        assert!(is_bare_identifier("users"));
        assert!(is_bare_identifier("_tmp1"));
        assert!(!is_bare_identifier("1abc"));
        assert!(!is_bare_identifier("has space"));
        assert!(!is_bare_identifier(""));
    }
}

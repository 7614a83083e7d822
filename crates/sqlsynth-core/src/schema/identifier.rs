//! Name handling shared by every schema object.
//!
//! A name may be written explicitly quoted (`` `order` ``, `"order"` or
//! `[order]`). Such a name is always quoted when rendered, whatever the
//! platform's quoting policy. Comparisons between names ignore the quotes
//! and ASCII case.

/// Returns `true` if the name is wrapped in backticks, double quotes or
/// square brackets.
#[must_use]
pub fn is_explicitly_quoted(name: &str) -> bool {
    let mut chars = name.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return false;
    };
    matches!((first, last), ('`', '`') | ('"', '"') | ('[', ']'))
}

/// Returns the name without its explicit quotes.
#[must_use]
pub fn unquoted(name: &str) -> &str {
    if is_explicitly_quoted(name) {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

/// Returns the last segment of a qualified name, without explicit quotes.
#[must_use]
pub fn base_name(name: &str) -> &str {
    unquoted(name.rsplit('.').next().unwrap_or(name))
}

/// Compares two names ignoring explicit quotes and ASCII case.
#[must_use]
pub fn same_name(a: &str, b: &str) -> bool {
    unquoted(a).eq_ignore_ascii_case(unquoted(b))
}

/// Returns the lookup key of a name: unquoted and lowercased.
#[must_use]
pub fn name_key(name: &str) -> String {
    unquoted(name).to_ascii_lowercase()
}

/// Compares two column lists element by element.
#[must_use]
pub fn same_columns(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_name(x, y))
}

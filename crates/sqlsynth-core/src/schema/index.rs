//! Index definitions, including the primary key.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identifier::{same_columns, same_name};

/// Conventional name of the primary index.
pub const PRIMARY_INDEX_NAME: &str = "primary";

/// An index over an ordered list of columns.
///
/// The primary key is an index with `primary` set; a table has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Unique index.
    #[serde(default)]
    pub unique: bool,
    /// Primary key.
    #[serde(default)]
    pub primary: bool,
    /// Free-form lowercase flags such as `fulltext`, `spatial`, `clustered`,
    /// `nonclustered` or an index method (`gin`, `gist`, `hash`, `brin`).
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Partial index predicate, passed through verbatim.
    #[serde(default)]
    pub predicate: Option<String>,
}

impl Index {
    /// Creates a plain index.
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            unique: false,
            primary: false,
            flags: BTreeSet::new(),
            predicate: None,
        }
    }

    /// Creates a unique index.
    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        let mut index = Self::new(name, columns);
        index.unique = true;
        index
    }

    /// Creates the primary index.
    #[must_use]
    pub fn primary(columns: &[&str]) -> Self {
        let mut index = Self::new(PRIMARY_INDEX_NAME, columns);
        index.unique = true;
        index.primary = true;
        index
    }

    /// Adds a flag.
    #[must_use]
    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.insert(flag.to_ascii_lowercase());
        self
    }

    /// Makes this a partial index.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Returns a copy under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut index = self.clone();
        index.name = name.into();
        index
    }

    /// Returns `true` if the flag is set.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Returns `true` for an index that is neither unique nor primary.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        !self.unique && !self.primary
    }

    /// Returns `true` if the index covers exactly these columns, in order.
    #[must_use]
    pub fn spans_columns(&self, columns: &[String]) -> bool {
        same_columns(&self.columns, columns)
    }

    /// Returns `true` if the column is part of the index.
    #[must_use]
    pub fn covers_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| same_name(c, column))
    }

    /// Compares everything but the name.
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        self.spans_columns(&other.columns)
            && self.unique == other.unique
            && self.primary == other.primary
            && self.flags == other.flags
            && self.predicate == other.predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary() {
        let index = Index::primary(&["id"]);
        assert_eq!(index.name, "primary");
        assert!(index.primary);
        assert!(index.unique);
        assert!(!index.is_simple());
    }

    #[test]
    fn test_same_definition_ignores_name() {
        let a = Index::new("idx_a", &["email"]);
        let b = Index::new("idx_b", &["EMAIL"]);
        assert!(a.same_definition(&b));
        assert!(!a.same_definition(&Index::unique("idx_c", &["email"])));
        assert!(!a.same_definition(&a.clone().flag("FULLTEXT")));
    }

    #[test]
    fn test_flags_are_lowercase() {
        let index = Index::new("ft", &["body"]).flag("FullText");
        assert!(index.has_flag("fulltext"));
        assert!(index.flags.contains("fulltext"));
    }
}

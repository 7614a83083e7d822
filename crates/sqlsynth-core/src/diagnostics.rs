//! Non-fatal diagnostics and the statement batch returned by generators.
//!
//! Generators never call back into the caller. Anything worth knowing that
//! does not stop generation (a silently widened column, a downgraded
//! referential action) is returned next to the statements as a
//! [`Diagnostic`] and mirrored as a `tracing` warning.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A non-fatal observation made while generating SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A requested length exceeded the platform maximum and the column was
    /// declared with the large-object type instead.
    ValueRange {
        /// Column name.
        column: String,
        /// The requested length.
        requested: u32,
        /// The platform maximum for the requested type.
        maximum: u32,
        /// The declaration actually used.
        declared_as: String,
    },
    /// A default was synthesized so that a NOT NULL column can be added to a
    /// table that may already contain rows.
    SynthesizedDefault {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The SQL default expression used.
        default: String,
    },
    /// A referential action was replaced by the nearest supported one.
    ReferentialActionDowngraded {
        /// Foreign key name.
        constraint: String,
        /// The action that was requested.
        requested: String,
        /// The action that was emitted.
        applied: String,
    },
    /// Foreign key changes were dropped because the storage engine does not
    /// enforce them.
    ForeignKeysSuppressed {
        /// Table name.
        table: String,
        /// The storage engine in use.
        engine: String,
    },
    /// A logical type without a native counterpart was approximated.
    TypeApproximated {
        /// Column name.
        column: String,
        /// The logical type that was requested.
        logical_type: String,
        /// The declaration actually used.
        declared_as: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueRange {
                column,
                requested,
                maximum,
                declared_as,
            } => write!(
                f,
                "column '{column}' requested length {requested} exceeds maximum {maximum}, \
                 declared as {declared_as}"
            ),
            Self::SynthesizedDefault {
                table,
                column,
                default,
            } => write!(
                f,
                "new NOT NULL column '{table}.{column}' received synthesized default {default}"
            ),
            Self::ReferentialActionDowngraded {
                constraint,
                requested,
                applied,
            } => write!(
                f,
                "foreign key '{constraint}' action {requested} emitted as {applied}"
            ),
            Self::ForeignKeysSuppressed { table, engine } => write!(
                f,
                "foreign key changes on '{table}' ignored for engine {engine}"
            ),
            Self::TypeApproximated {
                column,
                logical_type,
                declared_as,
            } => write!(
                f,
                "column '{column}' of type {logical_type} approximated as {declared_as}"
            ),
        }
    }
}

/// An ordered list of statements plus the diagnostics produced while
/// generating them.
///
/// Statements must be executed in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statements {
    /// SQL statements, in execution order.
    pub statements: Vec<String>,
    /// Non-fatal diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl Statements {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Appends a statement.
    pub fn push(&mut self, sql: impl Into<String>) {
        self.statements.push(sql.into());
    }

    /// Records a diagnostic and logs it.
    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Moves all statements and diagnostics of `other` to the end of `self`.
    pub fn append(&mut self, other: Self) {
        self.statements.extend(other.statements);
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns `true` if there are no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Iterates over the statements.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.statements.iter()
    }

    /// Discards diagnostics and returns the statements.
    #[must_use]
    pub fn into_sql(self) -> Vec<String> {
        self.statements
    }
}

impl Extend<String> for Statements {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.statements.extend(iter);
    }
}

impl IntoIterator for Statements {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Statements {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut first = Statements::new();
        first.push("CREATE TABLE a (id INT)");
        let mut second = Statements::new();
        second.push("CREATE TABLE b (id INT)");
        second.diagnose(Diagnostic::ForeignKeysSuppressed {
            table: String::from("b"),
            engine: String::from("MyISAM"),
        });

        first.append(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.statements[1], "CREATE TABLE b (id INT)");
        assert_eq!(first.diagnostics.len(), 1);
    }

    #[test]
    fn test_value_range_display() {
        let diagnostic = Diagnostic::ValueRange {
            column: String::from("bio"),
            requested: 100_000,
            maximum: 65535,
            declared_as: String::from("MEDIUMTEXT"),
        };
        assert_eq!(
            diagnostic.to_string(),
            "column 'bio' requested length 100000 exceeds maximum 65535, declared as MEDIUMTEXT"
        );
    }
}

//! Column definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::LogicalType;

/// Typed default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Boolean default, rendered with the platform's boolean literal.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Floating point default.
    Float(f64),
    /// String default, rendered as a quoted literal.
    String(String),
    /// The platform's current timestamp expression.
    CurrentTimestamp,
    /// The platform's current date expression.
    CurrentDate,
    /// The platform's current time expression.
    CurrentTime,
    /// Raw SQL expression, passed through verbatim.
    Expression(String),
}

/// A column of a table.
///
/// Columns are values: a modified column is a new `Column` plus a
/// [`ColumnDiff`](super::ColumnDiff) against the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Abstract type with its modifiers.
    pub logical_type: LogicalType,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether values are generated by the database.
    #[serde(default)]
    pub autoincrement: bool,
    /// Unsigned numeric, where the platform has such a notion.
    #[serde(default)]
    pub unsigned: bool,
    /// Column comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Character set hint.
    #[serde(default)]
    pub charset: Option<String>,
    /// Collation hint.
    #[serde(default)]
    pub collation: Option<String>,
    /// Dialect-specific switches, e.g. `version` or `jsonb`.
    #[serde(default)]
    pub platform_options: BTreeMap<String, String>,
    /// Raw declaration used instead of the generated one, verbatim.
    #[serde(default)]
    pub column_definition: Option<String>,
}

impl Column {
    /// Creates a NOT NULL column without default.
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: false,
            default: None,
            autoincrement: false,
            unsigned: false,
            comment: None,
            charset: None,
            collation: None,
            platform_options: BTreeMap::new(),
            column_definition: None,
        }
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the column as generated by the database.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Marks a numeric column as unsigned.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets a dialect-specific option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.platform_options.insert(key.into(), value.into());
        self
    }

    /// Replaces the generated declaration with raw SQL.
    #[must_use]
    pub fn definition(mut self, sql: impl Into<String>) -> Self {
        self.column_definition = Some(sql.into());
        self
    }

    /// Returns a copy of the column under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut column = self.clone();
        column.name = name.into();
        column
    }

    /// Returns `true` if the platform option is set to a truthy value.
    #[must_use]
    pub fn has_option(&self, key: &str) -> bool {
        self.platform_options
            .get(key)
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
    }

    /// Returns the comment, treating an empty comment as none.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }
}

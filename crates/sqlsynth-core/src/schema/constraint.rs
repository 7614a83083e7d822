//! Foreign key, unique and check constraints.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::{same_columns, same_name};
use super::index::Index;

/// Referential action for ON UPDATE / ON DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// Cascade the change to referencing rows.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Reject the change, checked immediately.
    Restrict,
    /// Reject the change, checked at the end of the statement.
    NoAction,
    /// Set referencing columns to their default.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL keyword sequence.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// The event a referential action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialEvent {
    /// ON UPDATE.
    Update,
    /// ON DELETE.
    Delete,
}

impl ReferentialEvent {
    /// Returns the clause keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Update => "ON UPDATE",
            Self::Delete => "ON DELETE",
        }
    }
}

/// A foreign key from local columns to columns of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name.
    pub name: String,
    /// Referencing columns.
    pub local_columns: Vec<String>,
    /// Referenced table.
    pub foreign_table: String,
    /// Referenced columns, same arity as `local_columns`.
    pub foreign_columns: Vec<String>,
    /// ON UPDATE action; no clause when absent.
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
    /// ON DELETE action; no clause when absent.
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
}

impl ForeignKeyConstraint {
    /// Creates a foreign key without referential actions.
    pub fn new(
        name: impl Into<String>,
        local_columns: &[&str],
        foreign_table: impl Into<String>,
        foreign_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            local_columns: local_columns.iter().map(|c| String::from(*c)).collect(),
            foreign_table: foreign_table.into(),
            foreign_columns: foreign_columns.iter().map(|c| String::from(*c)).collect(),
            on_update: None,
            on_delete: None,
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Returns `true` if any local column is part of the index.
    #[must_use]
    pub fn intersects_index_columns(&self, index: &Index) -> bool {
        self.local_columns.iter().any(|c| index.covers_column(c))
    }

    /// Returns `true` if the column is one of the local columns.
    #[must_use]
    pub fn covers_column(&self, column: &str) -> bool {
        self.local_columns.iter().any(|c| same_name(c, column))
    }

    /// Compares everything but the name.
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        same_columns(&self.local_columns, &other.local_columns)
            && same_name(&self.foreign_table, &other.foreign_table)
            && same_columns(&self.foreign_columns, &other.foreign_columns)
            && self.effective_on_update() == other.effective_on_update()
            && self.effective_on_delete() == other.effective_on_delete()
    }

    fn effective_on_update(&self) -> ReferentialAction {
        self.on_update.unwrap_or(ReferentialAction::NoAction)
    }

    fn effective_on_delete(&self) -> ReferentialAction {
        self.on_delete.unwrap_or(ReferentialAction::NoAction)
    }
}

/// A named unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name.
    pub name: String,
    /// Constrained columns, in order.
    pub columns: Vec<String>,
    /// Free-form lowercase flags such as `clustered`.
    #[serde(default)]
    pub flags: BTreeSet<String>,
}

impl UniqueConstraint {
    /// Creates a unique constraint.
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            flags: BTreeSet::new(),
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.insert(flag.to_ascii_lowercase());
        self
    }
}

/// A CHECK constraint. The expression is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Optional constraint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Boolean SQL expression.
    pub expression: String,
}

impl CheckConstraint {
    /// Creates an unnamed check constraint.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            name: None,
            expression: expression.into(),
        }
    }

    /// Names the constraint.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_sql() {
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::NoAction.to_string(), "NO ACTION");
        assert_eq!(ReferentialEvent::Delete.as_sql(), "ON DELETE");
    }

    #[test]
    fn test_absent_action_equals_no_action() {
        let a = ForeignKeyConstraint::new("fk_a", &["user_id"], "users", &["id"]);
        let b = ForeignKeyConstraint::new("fk_b", &["user_id"], "users", &["id"])
            .on_delete(ReferentialAction::NoAction);
        assert!(a.same_definition(&b));
        assert!(!a.same_definition(&b.on_delete(ReferentialAction::Cascade)));
    }

    #[test]
    fn test_intersects_index_columns() {
        let fk = ForeignKeyConstraint::new("fk", &["user_id"], "users", &["id"]);
        assert!(fk.intersects_index_columns(&Index::new("idx", &["user_id", "created_at"])));
        assert!(!fk.intersects_index_columns(&Index::new("idx", &["created_at"])));
    }
}

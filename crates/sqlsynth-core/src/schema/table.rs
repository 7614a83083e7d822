//! Table definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

use super::column::Column;
use super::constraint::{CheckConstraint, ForeignKeyConstraint, UniqueConstraint};
use super::identifier::{name_key, same_name};
use super::index::Index;

/// Table-level options. Platforms ignore the ones they have no use for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine (MySQL-family).
    #[serde(default)]
    pub engine: Option<String>,
    /// Default character set (MySQL-family).
    #[serde(default)]
    pub charset: Option<String>,
    /// Default collation (MySQL-family).
    #[serde(default)]
    pub collation: Option<String>,
    /// Table comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Temporary table.
    #[serde(default)]
    pub temporary: bool,
    /// Unlogged table (PostgreSQL).
    #[serde(default)]
    pub unlogged: bool,
    /// Row format (MySQL-family).
    #[serde(default)]
    pub row_format: Option<String>,
    /// Initial AUTO_INCREMENT value (MySQL-family).
    #[serde(default)]
    pub auto_increment: Option<u64>,
}

/// A table snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, optionally schema-qualified (`schema.table`).
    pub name: String,
    /// Columns, in declaration order.
    pub columns: Vec<Column>,
    /// Indexes, including the primary index.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Unique constraints.
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    /// Check constraints.
    #[serde(default)]
    pub checks: Vec<CheckConstraint>,
    /// Table options.
    #[serde(default)]
    pub options: TableOptions,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            options: TableOptions::default(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.indexes.retain(|i| !i.primary);
        self.indexes.push(Index::primary(columns));
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique_constraint(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKeyConstraint) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check(mut self, check: CheckConstraint) -> Self {
        self.checks.push(check);
        self
    }

    /// Replaces the options.
    #[must_use]
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| same_name(&c.name, name))
    }

    /// Returns `true` if the table has the column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| same_name(&i.name, name))
    }

    /// Looks up a foreign key by name.
    #[must_use]
    pub fn get_foreign_key(&self, name: &str) -> Option<&ForeignKeyConstraint> {
        self.foreign_keys.iter().find(|fk| same_name(&fk.name, name))
    }

    /// Returns the primary index.
    #[must_use]
    pub fn primary_index(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.primary)
    }

    /// Returns the primary key column names.
    #[must_use]
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_index().map_or(&[], |i| i.columns.as_slice())
    }

    /// Checks the structural invariants of the table.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidDefinition`] for empty column lists and
    /// malformed indexes or constraints, [`SynthError::StructuralInconsistency`]
    /// for colliding names or references to unknown columns.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SynthError::invalid("<unnamed>", "table has no name"));
        }
        if self.columns.is_empty() {
            return Err(SynthError::invalid(&self.name, "no columns specified"));
        }

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(name_key(&column.name)) {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }

        let mut index_names = BTreeSet::new();
        let mut primaries = 0;
        for index in &self.indexes {
            if !index_names.insert(name_key(&index.name)) {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("duplicate index '{}'", index.name),
                ));
            }
            if index.primary {
                primaries += 1;
            }
            self.check_columns(&index.name, &index.columns)?;
        }
        if primaries > 1 {
            return Err(SynthError::inconsistent(
                &self.name,
                "more than one primary index",
            ));
        }

        for unique in &self.unique_constraints {
            self.check_columns(&unique.name, &unique.columns)?;
        }

        let mut fk_names = BTreeSet::new();
        for fk in &self.foreign_keys {
            if !fk_names.insert(name_key(&fk.name)) {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("duplicate foreign key '{}'", fk.name),
                ));
            }
            self.check_columns(&fk.name, &fk.local_columns)?;
            if fk.foreign_columns.len() != fk.local_columns.len() {
                return Err(SynthError::invalid(
                    &fk.name,
                    format!(
                        "{} local columns but {} foreign columns",
                        fk.local_columns.len(),
                        fk.foreign_columns.len()
                    ),
                ));
            }
        }

        for check in &self.checks {
            if check.expression.trim().is_empty() {
                return Err(SynthError::invalid(
                    check.name.as_deref().unwrap_or(&self.name),
                    "empty check expression",
                ));
            }
        }

        Ok(())
    }

    fn check_columns(&self, object: &str, columns: &[String]) -> Result<()> {
        if columns.is_empty() {
            return Err(SynthError::invalid(object, "no columns specified"));
        }
        for column in columns {
            if !self.has_column(column) {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("'{object}' references unknown column '{column}'"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LogicalType;

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .column(Column::new("name", LogicalType::string(255)))
            .primary_key(&["id"])
    }

    #[test]
    fn test_lookup() {
        let table = users();
        assert!(table.has_column("ID"));
        assert_eq!(table.primary_key_columns(), ["id"]);
        assert!(table.get_index("PRIMARY").is_some());
    }

    #[test]
    fn test_validate_ok() {
        assert!(users().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_columns() {
        let err = Table::new("empty").validate().unwrap_err();
        assert!(matches!(err, SynthError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_validate_duplicate_column() {
        let table = users().column(Column::new("Name", LogicalType::Clob));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SynthError::StructuralInconsistency { .. }));
    }

    #[test]
    fn test_validate_index_unknown_column() {
        let table = users().index(Index::new("idx_email", &["email"]));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SynthError::StructuralInconsistency { .. }));
    }

    #[test]
    fn test_validate_empty_index() {
        let table = users().index(Index::new("idx_nothing", &[]));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SynthError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_validate_fk_arity() {
        let table = users().foreign_key(ForeignKeyConstraint::new(
            "fk_bad",
            &["id"],
            "accounts",
            &["id", "tenant_id"],
        ));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SynthError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_primary_key_replaces_previous() {
        let table = users().primary_key(&["id", "name"]);
        assert_eq!(table.indexes.iter().filter(|i| i.primary).count(), 1);
        assert_eq!(table.primary_key_columns(), ["id", "name"]);
    }
}

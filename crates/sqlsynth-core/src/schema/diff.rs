//! Structural deltas between two table snapshots.
//!
//! A [`TableDiff`] is produced by the [comparator](super::comparator) or built
//! by hand. Generators read it but never modify it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

use super::column::Column;
use super::comparator::compare_columns;
use super::constraint::ForeignKeyConstraint;
use super::identifier::{name_key, same_name};
use super::index::Index;
use super::table::Table;

/// A column property that can change between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnProperty {
    /// The logical type itself.
    Type,
    /// String or binary length.
    Length,
    /// Decimal precision.
    Precision,
    /// Decimal scale.
    Scale,
    /// Fixed versus variable length.
    Fixed,
    /// Nullability.
    NotNull,
    /// Default value.
    Default,
    /// Autoincrement flag.
    Autoincrement,
    /// Comment.
    Comment,
    /// Collation.
    Collation,
    /// Character set.
    Charset,
    /// Unsigned flag.
    Unsigned,
    /// Raw column definition.
    Definition,
}

/// A modified column: the old and new definition plus the set of changed
/// properties.
///
/// If the names differ the column is renamed as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiff {
    /// Definition before the change.
    pub old_column: Column,
    /// Definition after the change.
    pub new_column: Column,
    /// Properties that differ.
    pub changed: BTreeSet<ColumnProperty>,
}

impl ColumnDiff {
    /// Creates a column diff, computing the changed properties.
    #[must_use]
    pub fn new(old_column: Column, new_column: Column) -> Self {
        let changed = compare_columns(&old_column, &new_column);
        Self {
            old_column,
            new_column,
            changed,
        }
    }

    /// Returns `true` if the property changed.
    #[must_use]
    pub fn has(&self, property: ColumnProperty) -> bool {
        self.changed.contains(&property)
    }

    /// Returns `true` if any of the properties changed.
    #[must_use]
    pub fn has_any(&self, properties: &[ColumnProperty]) -> bool {
        properties.iter().any(|p| self.changed.contains(p))
    }

    /// Returns `true` if something changed and every change is one of the
    /// given properties.
    #[must_use]
    pub fn only(&self, properties: &[ColumnProperty]) -> bool {
        !self.changed.is_empty() && self.changed.iter().all(|p| properties.contains(p))
    }

    /// Returns `true` if the type declaration itself has to change.
    #[must_use]
    pub fn has_type_declaration_change(&self) -> bool {
        self.has_any(&[
            ColumnProperty::Type,
            ColumnProperty::Length,
            ColumnProperty::Precision,
            ColumnProperty::Scale,
            ColumnProperty::Fixed,
            ColumnProperty::Unsigned,
            ColumnProperty::Definition,
        ])
    }

    /// Returns `true` if the column is also renamed.
    #[must_use]
    pub fn is_rename(&self) -> bool {
        !same_name(&self.old_column.name, &self.new_column.name)
    }

    /// Name before the change.
    #[must_use]
    pub fn old_name(&self) -> &str {
        &self.old_column.name
    }

    /// Name after the change.
    #[must_use]
    pub fn new_name(&self) -> &str {
        &self.new_column.name
    }
}

/// Added, dropped, modified and renamed members between two snapshots of a
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    /// Current name of the table.
    pub name: String,
    /// Snapshot before the change. Required by platforms that rebuild tables.
    #[serde(default)]
    pub old_table: Option<Table>,
    /// New name when the table is renamed.
    #[serde(default)]
    pub new_name: Option<String>,
    /// Columns to add.
    #[serde(default)]
    pub added_columns: Vec<Column>,
    /// Columns to drop, as they were defined.
    #[serde(default)]
    pub dropped_columns: Vec<Column>,
    /// Columns whose definition changes.
    #[serde(default)]
    pub modified_columns: Vec<ColumnDiff>,
    /// Columns renamed without other changes: old name and new definition.
    #[serde(default)]
    pub renamed_columns: Vec<(String, Column)>,
    /// Indexes to create.
    #[serde(default)]
    pub added_indexes: Vec<Index>,
    /// Indexes to drop.
    #[serde(default)]
    pub dropped_indexes: Vec<Index>,
    /// Indexes whose definition changes (new definition, same name).
    #[serde(default)]
    pub modified_indexes: Vec<Index>,
    /// Indexes renamed without other changes: old name and new definition.
    #[serde(default)]
    pub renamed_indexes: Vec<(String, Index)>,
    /// Foreign keys to create.
    #[serde(default)]
    pub added_foreign_keys: Vec<ForeignKeyConstraint>,
    /// Foreign keys to drop.
    #[serde(default)]
    pub dropped_foreign_keys: Vec<ForeignKeyConstraint>,
    /// Foreign keys whose definition changes (new definition, same name).
    #[serde(default)]
    pub modified_foreign_keys: Vec<ForeignKeyConstraint>,
}

impl TableDiff {
    /// Creates an empty diff for the named table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            old_table: None,
            new_name: None,
            added_columns: Vec::new(),
            dropped_columns: Vec::new(),
            modified_columns: Vec::new(),
            renamed_columns: Vec::new(),
            added_indexes: Vec::new(),
            dropped_indexes: Vec::new(),
            modified_indexes: Vec::new(),
            renamed_indexes: Vec::new(),
            added_foreign_keys: Vec::new(),
            dropped_foreign_keys: Vec::new(),
            modified_foreign_keys: Vec::new(),
        }
    }

    /// Creates an empty diff against a known old snapshot.
    #[must_use]
    pub fn for_table(old_table: &Table) -> Self {
        let mut diff = Self::new(old_table.name.clone());
        diff.old_table = Some(old_table.clone());
        diff
    }

    /// Attaches the old snapshot.
    #[must_use]
    pub fn with_old_table(mut self, old_table: Table) -> Self {
        self.old_table = Some(old_table);
        self
    }

    /// Renames the table.
    #[must_use]
    pub fn rename_to(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn add_column(mut self, column: Column) -> Self {
        self.added_columns.push(column);
        self
    }

    /// Drops a column.
    #[must_use]
    pub fn drop_column(mut self, column: Column) -> Self {
        self.dropped_columns.push(column);
        self
    }

    /// Modifies a column.
    #[must_use]
    pub fn modify_column(mut self, old_column: Column, new_column: Column) -> Self {
        self.modified_columns.push(ColumnDiff::new(old_column, new_column));
        self
    }

    /// Renames a column.
    #[must_use]
    pub fn rename_column(mut self, old_name: impl Into<String>, column: Column) -> Self {
        self.renamed_columns.push((old_name.into(), column));
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn add_index(mut self, index: Index) -> Self {
        self.added_indexes.push(index);
        self
    }

    /// Drops an index.
    #[must_use]
    pub fn drop_index(mut self, index: Index) -> Self {
        self.dropped_indexes.push(index);
        self
    }

    /// Replaces an index definition.
    #[must_use]
    pub fn modify_index(mut self, index: Index) -> Self {
        self.modified_indexes.push(index);
        self
    }

    /// Renames an index.
    #[must_use]
    pub fn rename_index(mut self, old_name: impl Into<String>, index: Index) -> Self {
        self.renamed_indexes.push((old_name.into(), index));
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn add_foreign_key(mut self, fk: ForeignKeyConstraint) -> Self {
        self.added_foreign_keys.push(fk);
        self
    }

    /// Drops a foreign key.
    #[must_use]
    pub fn drop_foreign_key(mut self, fk: ForeignKeyConstraint) -> Self {
        self.dropped_foreign_keys.push(fk);
        self
    }

    /// Replaces a foreign key definition.
    #[must_use]
    pub fn modify_foreign_key(mut self, fk: ForeignKeyConstraint) -> Self {
        self.modified_foreign_keys.push(fk);
        self
    }

    /// Returns `true` if the diff contains no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.added_columns.is_empty()
            && self.dropped_columns.is_empty()
            && self.modified_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.dropped_indexes.is_empty()
            && self.modified_indexes.is_empty()
            && self.renamed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.dropped_foreign_keys.is_empty()
            && self.modified_foreign_keys.is_empty()
    }

    /// Returns `true` if any index or foreign key changes.
    #[must_use]
    pub fn has_index_or_foreign_key_changes(&self) -> bool {
        !(self.added_indexes.is_empty()
            && self.dropped_indexes.is_empty()
            && self.modified_indexes.is_empty()
            && self.renamed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.dropped_foreign_keys.is_empty()
            && self.modified_foreign_keys.is_empty())
    }

    /// Name of the table after the change.
    #[must_use]
    pub fn final_name(&self) -> &str {
        self.new_name.as_deref().unwrap_or(&self.name)
    }

    /// Checks that the diff is consistent with itself and, when present,
    /// with the old snapshot.
    ///
    /// # Errors
    ///
    /// [`SynthError::StructuralInconsistency`] when the diff names a column,
    /// index or foreign key that the old snapshot lacks, or collides with an
    /// existing one; [`SynthError::InvalidDefinition`] for indexes without
    /// columns and foreign keys with mismatched arity.
    pub fn validate(&self) -> Result<()> {
        for index in self
            .added_indexes
            .iter()
            .chain(&self.modified_indexes)
            .chain(self.renamed_indexes.iter().map(|(_, i)| i))
        {
            if index.columns.is_empty() {
                return Err(SynthError::invalid(&index.name, "no columns specified"));
            }
        }
        for fk in self
            .added_foreign_keys
            .iter()
            .chain(&self.modified_foreign_keys)
        {
            if fk.local_columns.is_empty() {
                return Err(SynthError::invalid(&fk.name, "no columns specified"));
            }
            if fk.local_columns.len() != fk.foreign_columns.len() {
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

        let mut touched = BTreeSet::new();
        for name in self.column_sources() {
            if !touched.insert(name_key(name)) {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("column '{name}' is changed more than once"),
                ));
            }
        }

        let Some(old) = &self.old_table else {
            return Ok(());
        };

        if !same_name(&old.name, &self.name) {
            return Err(SynthError::inconsistent(
                &self.name,
                format!("old snapshot describes table '{}'", old.name),
            ));
        }
        for name in self.column_sources() {
            if !old.has_column(name) {
                return Err(self.missing("column", name));
            }
        }
        for index in self.dropped_indexes.iter().chain(&self.modified_indexes) {
            if old.get_index(&index.name).is_none()
                && !(index.primary && old.primary_index().is_some())
            {
                return Err(self.missing("index", &index.name));
            }
        }
        for (old_name, _) in &self.renamed_indexes {
            if old.get_index(old_name).is_none() {
                return Err(self.missing("index", old_name));
            }
        }
        for fk in self
            .dropped_foreign_keys
            .iter()
            .chain(&self.modified_foreign_keys)
        {
            if old.get_foreign_key(&fk.name).is_none() {
                return Err(self.missing("foreign key", &fk.name));
            }
        }

        let new_table = self.apply()?;
        for column in &self.added_columns {
            let occurrences = new_table
                .columns
                .iter()
                .filter(|c| same_name(&c.name, &column.name))
                .count();
            if occurrences > 1 {
                return Err(SynthError::inconsistent(
                    &self.name,
                    format!("added column '{}' already exists", column.name),
                ));
            }
        }
        new_table.validate()
    }

    /// Builds the table this diff produces from the old snapshot.
    ///
    /// Column positions are preserved: renamed and modified columns stay in
    /// place and added columns are appended. Indexes, unique constraints and
    /// foreign keys spanning a dropped column are removed; the remaining
    /// ones follow column renames.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidDefinition`] if the diff carries no old snapshot.
    pub fn apply(&self) -> Result<Table> {
        let old = self.old_table.as_ref().ok_or_else(|| {
            SynthError::invalid(&self.name, "the old table snapshot is required")
        })?;

        let dropped: BTreeSet<String> = self
            .dropped_columns
            .iter()
            .map(|c| name_key(&c.name))
            .collect();
        let mut renames: BTreeMap<String, String> = BTreeMap::new();
        let mut table = Table::new(self.final_name());
        table.options = old.options.clone();

        for column in &old.columns {
            let key = name_key(&column.name);
            if dropped.contains(&key) {
                continue;
            }
            let replacement = self
                .modified_columns
                .iter()
                .find(|d| same_name(d.old_name(), &column.name))
                .map(|d| &d.new_column)
                .or_else(|| {
                    self.renamed_columns
                        .iter()
                        .find(|(old_name, _)| same_name(old_name, &column.name))
                        .map(|(_, c)| c)
                });
            let column = replacement.unwrap_or(column);
            renames.insert(key, column.name.clone());
            table.columns.push(column.clone());
        }
        table.columns.extend(self.added_columns.iter().cloned());

        let remap = |columns: &[String]| -> Option<Vec<String>> {
            columns
                .iter()
                .map(|c| renames.get(&name_key(c)).cloned())
                .collect()
        };

        for index in &old.indexes {
            let is_dropped = self
                .dropped_indexes
                .iter()
                .any(|i| same_name(&i.name, &index.name) || (i.primary && index.primary));
            let is_replaced = self
                .modified_indexes
                .iter()
                .any(|i| same_name(&i.name, &index.name) || (i.primary && index.primary))
                || self
                    .renamed_indexes
                    .iter()
                    .any(|(old_name, _)| same_name(old_name, &index.name));
            if is_dropped || is_replaced {
                continue;
            }
            if let Some(columns) = remap(&index.columns) {
                let mut index = index.clone();
                index.columns = columns;
                table.indexes.push(index);
            }
        }
        table.indexes.extend(self.modified_indexes.iter().cloned());
        table
            .indexes
            .extend(self.renamed_indexes.iter().map(|(_, i)| i.clone()));
        table.indexes.extend(self.added_indexes.iter().cloned());

        for unique in &old.unique_constraints {
            if let Some(columns) = remap(&unique.columns) {
                let mut unique = unique.clone();
                unique.columns = columns;
                table.unique_constraints.push(unique);
            }
        }

        for fk in &old.foreign_keys {
            let removed = self
                .dropped_foreign_keys
                .iter()
                .chain(&self.modified_foreign_keys)
                .any(|f| same_name(&f.name, &fk.name));
            if removed {
                continue;
            }
            if let Some(columns) = remap(&fk.local_columns) {
                let mut fk = fk.clone();
                fk.local_columns = columns;
                table.foreign_keys.push(fk);
            }
        }
        table
            .foreign_keys
            .extend(self.modified_foreign_keys.iter().cloned());
        table
            .foreign_keys
            .extend(self.added_foreign_keys.iter().cloned());

        table.checks = old.checks.clone();
        Ok(table)
    }

    /// Old names of every column the diff drops, modifies or renames.
    fn column_sources(&self) -> impl Iterator<Item = &str> {
        self.dropped_columns
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.modified_columns.iter().map(ColumnDiff::old_name))
            .chain(self.renamed_columns.iter().map(|(n, _)| n.as_str()))
    }

    fn missing(&self, kind: &str, name: &str) -> SynthError {
        SynthError::inconsistent(
            &self.name,
            format!("{kind} '{name}' does not exist in the old table"),
        )
    }
}

//! Table and schema comparison.
//!
//! Compares an old and a new [`Table`] and produces the [`TableDiff`] that
//! turns one into the other. Renames are only detected when they are
//! unambiguous: a dropped and an added member with identical definitions and
//! no other candidate.

use std::collections::BTreeSet;

use tracing::debug;

use super::column::Column;
use super::diff::{ColumnDiff, ColumnProperty, TableDiff};
use super::identifier::{name_key, same_name};
use super::table::Table;

// ================================================================
// Column comparison
// ================================================================

/// Returns the set of properties that differ between two columns.
///
/// The column name is not compared.
#[must_use]
pub fn compare_columns(old: &Column, new: &Column) -> BTreeSet<ColumnProperty> {
    let mut changed = BTreeSet::new();
    let (a, b) = (&old.logical_type, &new.logical_type);

    if !a.same_kind(b) {
        changed.insert(ColumnProperty::Type);
    }
    if a.length() != b.length() {
        changed.insert(ColumnProperty::Length);
    }
    if a.is_fixed() != b.is_fixed() {
        changed.insert(ColumnProperty::Fixed);
    }
    if a.precision() != b.precision() {
        changed.insert(ColumnProperty::Precision);
    }
    if a.scale() != b.scale() {
        changed.insert(ColumnProperty::Scale);
    }
    if old.nullable != new.nullable {
        changed.insert(ColumnProperty::NotNull);
    }
    if old.default != new.default {
        changed.insert(ColumnProperty::Default);
    }
    if old.autoincrement != new.autoincrement {
        changed.insert(ColumnProperty::Autoincrement);
    }
    if old.unsigned != new.unsigned {
        changed.insert(ColumnProperty::Unsigned);
    }
    if old.comment_text() != new.comment_text() {
        changed.insert(ColumnProperty::Comment);
    }
    if old.collation != new.collation {
        changed.insert(ColumnProperty::Collation);
    }
    if old.charset != new.charset {
        changed.insert(ColumnProperty::Charset);
    }
    if old.column_definition != new.column_definition {
        changed.insert(ColumnProperty::Definition);
    }

    changed
}

// ================================================================
// Table comparison
// ================================================================

/// Compares table snapshots.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    /// Turn an unambiguous drop/add pair of identical columns into a rename.
    pub detect_renamed_columns: bool,
    /// Turn an unambiguous drop/add pair of identical indexes into a rename.
    pub detect_renamed_indexes: bool,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            detect_renamed_columns: true,
            detect_renamed_indexes: true,
        }
    }
}

impl Comparator {
    /// Creates a comparator with rename detection enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares two snapshots of a table.
    ///
    /// Returns `None` if they are equivalent. The returned diff carries the
    /// old snapshot.
    #[must_use]
    pub fn compare_tables(&self, old: &Table, new: &Table) -> Option<TableDiff> {
        let mut diff = TableDiff::for_table(old);

        if !same_name(&old.name, &new.name) {
            diff.new_name = Some(new.name.clone());
        }

        // ---- Columns ----
        for column in &new.columns {
            match old.get_column(&column.name) {
                Some(previous) => {
                    let column_diff = ColumnDiff::new(previous.clone(), column.clone());
                    if !column_diff.changed.is_empty() {
                        diff.modified_columns.push(column_diff);
                    }
                }
                None => diff.added_columns.push(column.clone()),
            }
        }
        for column in &old.columns {
            if !new.has_column(&column.name) {
                diff.dropped_columns.push(column.clone());
            }
        }
        if self.detect_renamed_columns {
            detect_column_renames(&mut diff);
        }

        // ---- Indexes ----
        for index in &new.indexes {
            let previous = if index.primary {
                old.primary_index()
            } else {
                old.get_index(&index.name).filter(|i| !i.primary)
            };
            match previous {
                Some(previous) if previous.same_definition(index) => {}
                Some(_) => diff.modified_indexes.push(index.clone()),
                None => diff.added_indexes.push(index.clone()),
            }
        }
        for index in &old.indexes {
            let still_present = if index.primary {
                new.primary_index().is_some()
            } else {
                new.get_index(&index.name).is_some_and(|i| !i.primary)
            };
            if !still_present {
                diff.dropped_indexes.push(index.clone());
            }
        }
        if self.detect_renamed_indexes {
            detect_index_renames(&mut diff);
        }

        // ---- Foreign keys ----
        let mut remaining_new: Vec<_> = new.foreign_keys.iter().collect();
        for fk in &old.foreign_keys {
            if let Some(pos) = remaining_new.iter().position(|n| n.same_definition(fk)) {
                remaining_new.remove(pos);
            } else if let Some(pos) = remaining_new
                .iter()
                .position(|n| same_name(&n.name, &fk.name))
            {
                diff.modified_foreign_keys.push(remaining_new.remove(pos).clone());
            } else {
                diff.dropped_foreign_keys.push(fk.clone());
            }
        }
        diff.added_foreign_keys
            .extend(remaining_new.into_iter().cloned());

        if diff.is_empty() {
            None
        } else {
            debug!(
                "Table '{}' differs: {} added, {} dropped, {} modified, {} renamed columns",
                old.name,
                diff.added_columns.len(),
                diff.dropped_columns.len(),
                diff.modified_columns.len(),
                diff.renamed_columns.len()
            );
            Some(diff)
        }
    }
}

/// Compares two snapshots of a table with the default [`Comparator`].
#[must_use]
pub fn compare_tables(old: &Table, new: &Table) -> Option<TableDiff> {
    Comparator::default().compare_tables(old, new)
}

fn detect_column_renames(diff: &mut TableDiff) {
    let mut renames = Vec::new();
    for added in &diff.added_columns {
        let candidates: Vec<&Column> = diff
            .dropped_columns
            .iter()
            .filter(|dropped| compare_columns(dropped, added).is_empty())
            .collect();
        if let [dropped] = candidates.as_slice() {
            renames.push((dropped.name.clone(), added.clone()));
        }
    }

    let mut used = BTreeSet::new();
    for (old_name, column) in renames {
        if !used.insert(name_key(&old_name)) {
            continue;
        }
        diff.dropped_columns.retain(|c| !same_name(&c.name, &old_name));
        diff.added_columns.retain(|c| !same_name(&c.name, &column.name));
        diff.renamed_columns.push((old_name, column));
    }
}

fn detect_index_renames(diff: &mut TableDiff) {
    let mut renames = Vec::new();
    for added in diff.added_indexes.iter().filter(|i| !i.primary) {
        let candidates: Vec<_> = diff
            .dropped_indexes
            .iter()
            .filter(|dropped| !dropped.primary && dropped.same_definition(added))
            .collect();
        if let [dropped] = candidates.as_slice() {
            renames.push((dropped.name.clone(), added.clone()));
        }
    }

    let mut used = BTreeSet::new();
    for (old_name, index) in renames {
        if !used.insert(name_key(&old_name)) {
            continue;
        }
        diff.dropped_indexes.retain(|i| !same_name(&i.name, &old_name));
        diff.added_indexes.retain(|i| !same_name(&i.name, &index.name));
        diff.renamed_indexes.push((old_name, index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        DefaultValue, ForeignKeyConstraint, Index, LogicalType, ReferentialAction,
    };

    fn col(name: &str, ty: LogicalType) -> Column {
        Column::new(name, ty)
    }

    fn users() -> Table {
        Table::new("users")
            .column(col("id", LogicalType::Integer).autoincrement())
            .column(col("name", LogicalType::string(255)))
            .column(col("age", LogicalType::Integer).nullable())
            .primary_key(&["id"])
            .index(Index::new("idx_name", &["name"]))
    }

    #[test]
    fn test_identical_tables() {
        assert!(compare_tables(&users(), &users()).is_none());
    }

    #[test]
    fn test_added_and_dropped_columns() {
        let mut new = users();
        new.columns.retain(|c| c.name != "age");
        let new = new.column(col("email", LogicalType::string(100)).nullable());

        let diff = compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.added_columns.len(), 1);
        assert_eq!(diff.added_columns[0].name, "email");
        assert_eq!(diff.dropped_columns.len(), 1);
        assert_eq!(diff.dropped_columns[0].name, "age");
        assert!(diff.renamed_columns.is_empty());
    }

    #[test]
    fn test_modified_column_records_changes() {
        let mut new = users();
        new.columns[2] = col("age", LogicalType::BigInt)
            .nullable()
            .default(DefaultValue::Integer(0));

        let diff = compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.modified_columns.len(), 1);
        let changed: Vec<_> = diff.modified_columns[0].changed.iter().copied().collect();
        assert_eq!(changed, [ColumnProperty::Type, ColumnProperty::Default]);
    }

    #[test]
    fn test_comment_only_change() {
        let mut new = users();
        new.columns[1] = col("name", LogicalType::string(255)).comment("display name");
        let diff = compare_tables(&users(), &new).unwrap();
        assert!(diff.modified_columns[0].only(&[ColumnProperty::Comment]));
    }

    #[test]
    fn test_rename_detection() {
        let mut new = users();
        new.columns[2] = col("years", LogicalType::Integer).nullable();
        let diff = compare_tables(&users(), &new).unwrap();
        assert!(diff.added_columns.is_empty());
        assert!(diff.dropped_columns.is_empty());
        assert_eq!(diff.renamed_columns.len(), 1);
        assert_eq!(diff.renamed_columns[0].0, "age");
        assert_eq!(diff.renamed_columns[0].1.name, "years");
    }

    #[test]
    fn test_rename_detection_disabled() {
        let mut new = users();
        new.columns[2] = col("years", LogicalType::Integer).nullable();
        let comparator = Comparator {
            detect_renamed_columns: false,
            ..Comparator::default()
        };
        let diff = comparator.compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.added_columns.len(), 1);
        assert_eq!(diff.dropped_columns.len(), 1);
    }

    #[test]
    fn test_ambiguous_rename_is_not_detected() {
        let old = users().column(col("weight", LogicalType::Integer).nullable());
        let mut new = users();
        new.columns.retain(|c| c.name != "age");
        let new = new.column(col("score", LogicalType::Integer).nullable());

        let diff = compare_tables(&old, &new).unwrap();
        assert!(diff.renamed_columns.is_empty());
        assert_eq!(diff.added_columns.len(), 1);
        assert_eq!(diff.dropped_columns.len(), 2);
    }

    #[test]
    fn test_index_changes() {
        let mut new = users();
        new.indexes.retain(|i| i.name != "idx_name");
        let new = new
            .index(Index::new("idx_user_name", &["name"]))
            .index(Index::unique("uniq_age", &["age"]));

        let diff = compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.renamed_indexes.len(), 1);
        assert_eq!(diff.renamed_indexes[0].0, "idx_name");
        assert_eq!(diff.added_indexes.len(), 1);
        assert!(diff.dropped_indexes.is_empty());
    }

    #[test]
    fn test_primary_key_change() {
        let new = users().primary_key(&["id", "name"]);
        let diff = compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.modified_indexes.len(), 1);
        assert!(diff.modified_indexes[0].primary);
    }

    #[test]
    fn test_foreign_key_changes() {
        let fk = ForeignKeyConstraint::new("fk_team", &["age"], "teams", &["id"]);
        let old = users().foreign_key(fk.clone());
        let new = users().foreign_key(fk.on_delete(ReferentialAction::Cascade));

        let diff = compare_tables(&old, &new).unwrap();
        assert_eq!(diff.modified_foreign_keys.len(), 1);
        assert!(diff.added_foreign_keys.is_empty());
        assert!(diff.dropped_foreign_keys.is_empty());
    }

    #[test]
    fn test_table_rename() {
        let mut new = users();
        new.name = String::from("members");
        let diff = compare_tables(&users(), &new).unwrap();
        assert_eq!(diff.new_name.as_deref(), Some("members"));
        assert_eq!(diff.final_name(), "members");
    }

    #[test]
    fn test_diff_applies_to_new_table() {
        let mut new = users();
        new.columns[2] = col("years", LogicalType::BigInt);
        let new = new.column(col("email", LogicalType::string(100)).nullable());
        let diff = compare_tables(&users(), &new).unwrap();
        diff.validate().unwrap();

        let rebuilt = diff.apply().unwrap();
        assert!(compare_tables(&rebuilt, &new).is_none());
    }
}

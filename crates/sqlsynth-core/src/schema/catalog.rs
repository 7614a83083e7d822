//! Whole-schema snapshots and their differences.

use serde::{Deserialize, Serialize};

use super::comparator::Comparator;
use super::diff::TableDiff;
use super::identifier::same_name;
use super::sequence::Sequence;
use super::table::Table;

/// A set of tables and sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables, in creation order.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Sequences.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: Vec::new(),
            sequences: Vec::new(),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a sequence.
    #[must_use]
    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| same_name(&t.name, name))
    }

    /// Looks up a sequence by name.
    #[must_use]
    pub fn get_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| same_name(&s.name, name))
    }
}

/// Changes between two schemas. Tables are matched by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Tables that only exist in the new schema.
    pub created_tables: Vec<Table>,
    /// Tables present in both schemas whose definition changes.
    pub altered_tables: Vec<TableDiff>,
    /// Tables that only exist in the old schema.
    pub dropped_tables: Vec<Table>,
    /// Sequences that only exist in the new schema.
    pub created_sequences: Vec<Sequence>,
    /// Sequences whose definition changes, as defined in the new schema.
    pub altered_sequences: Vec<Sequence>,
    /// Sequences that only exist in the old schema.
    pub dropped_sequences: Vec<Sequence>,
}

impl SchemaDiff {
    /// Returns `true` if nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_tables.is_empty()
            && self.altered_tables.is_empty()
            && self.dropped_tables.is_empty()
            && self.created_sequences.is_empty()
            && self.altered_sequences.is_empty()
            && self.dropped_sequences.is_empty()
    }
}

impl Comparator {
    /// Compares two schemas.
    #[must_use]
    pub fn compare_schemas(&self, old: &Schema, new: &Schema) -> SchemaDiff {
        let mut diff = SchemaDiff::default();

        for table in &new.tables {
            match old.get_table(&table.name) {
                Some(previous) => {
                    if let Some(table_diff) = self.compare_tables(previous, table) {
                        diff.altered_tables.push(table_diff);
                    }
                }
                None => diff.created_tables.push(table.clone()),
            }
        }
        for table in &old.tables {
            if new.get_table(&table.name).is_none() {
                diff.dropped_tables.push(table.clone());
            }
        }

        for sequence in &new.sequences {
            match old.get_sequence(&sequence.name) {
                Some(previous) if previous == sequence => {}
                Some(_) => diff.altered_sequences.push(sequence.clone()),
                None => diff.created_sequences.push(sequence.clone()),
            }
        }
        for sequence in &old.sequences {
            if new.get_sequence(&sequence.name).is_none() {
                diff.dropped_sequences.push(sequence.clone());
            }
        }

        diff
    }
}

/// Compares two schemas with the default [`Comparator`].
#[must_use]
pub fn compare_schemas(old: &Schema, new: &Schema) -> SchemaDiff {
    Comparator::default().compare_schemas(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, LogicalType};

    fn table(name: &str) -> Table {
        Table::new(name)
            .column(Column::new("id", LogicalType::Integer))
            .primary_key(&["id"])
    }

    #[test]
    fn test_identical_schemas() {
        let schema = Schema::new().table(table("a")).sequence(Sequence::new("s"));
        assert!(compare_schemas(&schema, &schema).is_empty());
    }

    #[test]
    fn test_created_dropped_altered() {
        let old = Schema::new()
            .table(table("a"))
            .table(table("b"))
            .sequence(Sequence::new("s1"));
        let new = Schema::new()
            .table(table("a").column(Column::new("name", LogicalType::Clob).nullable()))
            .table(table("c"))
            .sequence(Sequence::new("s1").increment(10))
            .sequence(Sequence::new("s2"));

        let diff = compare_schemas(&old, &new);
        assert_eq!(diff.created_tables.len(), 1);
        assert_eq!(diff.created_tables[0].name, "c");
        assert_eq!(diff.dropped_tables.len(), 1);
        assert_eq!(diff.dropped_tables[0].name, "b");
        assert_eq!(diff.altered_tables.len(), 1);
        assert_eq!(diff.altered_tables[0].added_columns[0].name, "name");
        assert_eq!(diff.altered_sequences.len(), 1);
        assert_eq!(diff.created_sequences.len(), 1);
        assert!(diff.dropped_sequences.is_empty());
    }
}

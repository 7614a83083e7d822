//! `ALTER TABLE` synthesis.
//!
//! A [`TableDiff`] is turned into statements in four phases:
//!
//! 1. foreign keys and indexes that go away or change are dropped,
//! 2. column changes are applied with the platform's algorithm,
//! 3. new and changed indexes are created, renamed indexes are renamed and
//!    new and changed foreign keys are created,
//! 4. the table itself is renamed.
//!
//! The diff is never modified. Each algorithm works on a [`Plan`], a local
//! copy of the index and foreign key lists it is free to rewrite.

mod combined;
mod default_constraints;
mod grouped;
mod per_clause;
mod rebuild;
mod reorg;

use tracing::debug;

use crate::diagnostics::{Diagnostic, Statements};
use crate::error::Result;
use crate::platform::{literal_default, AlterStrategy, NewColumnDefault, Platform};
use crate::schema::identifier::same_name;
use crate::schema::{Column, ForeignKeyConstraint, Index, TableDiff};

/// Turns a table diff into statements.
///
/// Everything is generated into a local batch, so an error leaves nothing
/// behind.
pub(crate) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    diff.validate()?;
    if diff.is_empty() {
        return Ok(Statements::new());
    }

    let out = match platform.capabilities().alter {
        AlterStrategy::Combined => combined::alter_table(platform, diff)?,
        AlterStrategy::PerClause => per_clause::alter_table(platform, diff)?,
        AlterStrategy::Grouped => grouped::alter_table(platform, diff)?,
        AlterStrategy::DefaultConstraints => default_constraints::alter_table(platform, diff)?,
        AlterStrategy::Reorg => reorg::alter_table(platform, diff)?,
        AlterStrategy::Rebuild => rebuild::alter_table(platform, diff)?,
    };
    debug!(
        "{}: ALTER TABLE {} produced {} statements, {} diagnostics",
        platform.name(),
        diff.name,
        out.len(),
        out.diagnostics.len()
    );
    Ok(out)
}

/// Working copy of the index and foreign key changes of a diff.
#[derive(Debug, Clone)]
pub(super) struct Plan<'d> {
    pub diff: &'d TableDiff,
    /// Indexes dropped before the column changes. Modified indexes appear
    /// here and in `created_indexes`.
    pub dropped_indexes: Vec<Index>,
    pub created_indexes: Vec<Index>,
    pub renamed_indexes: Vec<(String, Index)>,
    pub dropped_foreign_keys: Vec<ForeignKeyConstraint>,
    pub created_foreign_keys: Vec<ForeignKeyConstraint>,
}

impl<'d> Plan<'d> {
    /// Copies the index and foreign key changes of `diff`.
    ///
    /// Foreign key changes on a table whose engine ignores them are left
    /// out and reported.
    pub fn new<P: Platform + ?Sized>(
        platform: &P,
        diff: &'d TableDiff,
        out: &mut Statements,
    ) -> Self {
        let dropped_indexes = diff
            .dropped_indexes
            .iter()
            .chain(&diff.modified_indexes)
            .map(|index| previous_index(diff, index))
            .collect();
        let created_indexes = diff
            .added_indexes
            .iter()
            .chain(&diff.modified_indexes)
            .cloned()
            .collect();

        let mut plan = Self {
            diff,
            dropped_indexes,
            created_indexes,
            renamed_indexes: diff.renamed_indexes.clone(),
            dropped_foreign_keys: Vec::new(),
            created_foreign_keys: Vec::new(),
        };

        let has_foreign_key_changes = !(diff.added_foreign_keys.is_empty()
            && diff.dropped_foreign_keys.is_empty()
            && diff.modified_foreign_keys.is_empty());
        if !has_foreign_key_changes {
            return plan;
        }
        if let Some(engine) = platform.non_enforcing_engine(diff.old_table.as_ref()) {
            out.diagnose(Diagnostic::ForeignKeysSuppressed {
                table: diff.name.clone(),
                engine,
            });
            return plan;
        }
        plan.dropped_foreign_keys = diff
            .dropped_foreign_keys
            .iter()
            .chain(&diff.modified_foreign_keys)
            .cloned()
            .collect();
        plan.created_foreign_keys = diff
            .added_foreign_keys
            .iter()
            .chain(&diff.modified_foreign_keys)
            .cloned()
            .collect();
        plan
    }

    /// Table name used by every statement before the final rename.
    pub fn table(&self) -> &'d str {
        &self.diff.name
    }

    /// Drops foreign keys, then indexes.
    pub fn drop_statements<P: Platform + ?Sized>(&self, platform: &P, out: &mut Statements) {
        for fk in &self.dropped_foreign_keys {
            out.push(platform.drop_foreign_key_sql(&fk.name, self.table()));
        }
        for index in &self.dropped_indexes {
            out.push(platform.drop_index_sql(index, self.table()));
        }
    }

    /// Creates indexes, renames indexes, then creates foreign keys. An index
    /// that cannot be renamed in place is dropped and created again.
    pub fn create_statements<P: Platform + ?Sized>(
        &self,
        platform: &P,
        out: &mut Statements,
    ) -> Result<()> {
        let table = self.table();
        for index in &self.created_indexes {
            out.push(crate::ddl::create_index(platform, index, table)?);
        }
        for (old_name, index) in &self.renamed_indexes {
            match platform.rename_index_sql(old_name, index, table) {
                Some(sql) => out.push(sql),
                None => {
                    out.push(platform.drop_index_sql(&index.renamed(old_name.as_str()), table));
                    out.push(crate::ddl::create_index(platform, index, table)?);
                }
            }
        }
        for fk in &self.created_foreign_keys {
            let sql = crate::ddl::create_foreign_key(platform, fk, table, out)?;
            out.push(sql);
        }
        Ok(())
    }

    /// Renames the table, if requested.
    pub fn rename_statements<P: Platform + ?Sized>(&self, platform: &P, out: &mut Statements) {
        if let Some(new_name) = &self.diff.new_name {
            out.extend(platform.rename_table_sql(&self.diff.name, new_name));
        }
    }
}

/// The index as it exists before the change, so that the right object is
/// dropped.
fn previous_index(diff: &TableDiff, index: &Index) -> Index {
    let Some(old) = &diff.old_table else {
        return index.clone();
    };
    let previous = if index.primary {
        old.primary_index()
    } else {
        old.get_index(&index.name)
    };
    previous.unwrap_or(index).clone()
}

/// The new definition of an existing column, looked up by its old name.
pub(super) fn current_definition<'d>(diff: &'d TableDiff, old_name: &str) -> Option<&'d Column> {
    diff.modified_columns
        .iter()
        .find(|d| same_name(d.old_name(), old_name))
        .map(|d| &d.new_column)
        .or_else(|| {
            diff.renamed_columns
                .iter()
                .find(|(name, _)| same_name(name, old_name))
                .map(|(_, c)| c)
        })
}

/// A column about to be added, with a literal default when a NOT NULL column
/// without one would fail on a populated table.
pub(super) fn with_new_column_default<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    column: &Column,
    out: &mut Statements,
) -> Column {
    let needs_default = !column.nullable
        && column.default.is_none()
        && !column.autoincrement
        && column.column_definition.is_none();
    if !needs_default
        || platform.capabilities().new_column_default != NewColumnDefault::SynthesizeLiteral
    {
        return column.clone();
    }
    let value = platform.synthesized_default(column);
    out.diagnose(Diagnostic::SynthesizedDefault {
        table: table.to_string(),
        column: column.name.clone(),
        default: literal_default(platform, &value),
    });
    let mut column = column.clone();
    column.default = Some(value);
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthError;
    use crate::platform::{
        Db2Platform, MySqlPlatform, OraclePlatform, PostgreSqlPlatform, SqlServerPlatform,
        SqlitePlatform,
    };
    use crate::schema::{LogicalType, ReferentialAction, Table};

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .column(Column::new("email", LogicalType::string(100)))
            .primary_key(&["id"])
            .index(Index::new("idx_email", &["email"]))
    }

    fn all_platforms() -> Vec<Box<dyn Platform>> {
        vec![
            Box::new(MySqlPlatform::new()),
            Box::new(PostgreSqlPlatform::new()),
            Box::new(SqlitePlatform::new()),
            Box::new(OraclePlatform::new()),
            Box::new(SqlServerPlatform::new()),
            Box::new(Db2Platform::new()),
        ]
    }

    #[test]
    fn test_empty_diff_produces_nothing() {
        let diff = TableDiff::for_table(&users());
        for platform in all_platforms() {
            assert!(platform.alter_table(&diff).unwrap().is_empty());
        }
    }

    #[test]
    fn test_inconsistent_diff_fails_everywhere() {
        let diff = TableDiff::for_table(&users())
            .drop_column(Column::new("missing", LogicalType::Integer));
        for platform in all_platforms() {
            assert!(matches!(
                platform.alter_table(&diff),
                Err(SynthError::StructuralInconsistency { .. })
            ));
        }
    }

    #[test]
    fn test_rename_table_comes_last() {
        let diff = TableDiff::for_table(&users())
            .rename_to("people")
            .add_index(Index::new("idx_people_id", &["id", "email"]));
        let statements = PostgreSqlPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "CREATE INDEX idx_people_id ON users (id, email)",
                "ALTER TABLE users RENAME TO people",
            ]
        );
    }

    #[test]
    fn test_modified_index_is_dropped_then_created() {
        let diff =
            TableDiff::for_table(&users()).modify_index(Index::unique("idx_email", &["email"]));
        let statements = PostgreSqlPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "DROP INDEX idx_email",
                "CREATE UNIQUE INDEX idx_email ON users (email)",
            ]
        );
    }

    #[test]
    fn test_foreign_keys_are_dropped_before_indexes() {
        let fk = ForeignKeyConstraint::new("fk_users_team", &["email"], "teams", &["owner"]);
        let old = users().foreign_key(fk.clone());
        let diff = TableDiff::for_table(&old)
            .drop_foreign_key(fk)
            .drop_index(Index::new("idx_email", &["email"]));
        let statements = PostgreSqlPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "ALTER TABLE users DROP CONSTRAINT fk_users_team",
                "DROP INDEX idx_email",
            ]
        );
    }

    #[test]
    fn test_new_foreign_key_after_new_index() {
        let diff = TableDiff::for_table(&users())
            .add_foreign_key(
                ForeignKeyConstraint::new("fk_users_team", &["email"], "teams", &["owner"])
                    .on_delete(ReferentialAction::SetNull),
            )
            .add_index(Index::new("idx_team", &["email", "id"]));
        let statements = OraclePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "CREATE INDEX idx_team ON users (email, id)",
                "ALTER TABLE users ADD CONSTRAINT fk_users_team FOREIGN KEY (email) \
                 REFERENCES teams (owner) ON DELETE SET NULL",
            ]
        );
    }

    #[test]
    fn test_synthesized_default_is_reported() {
        let mut out = Statements::new();
        let column = Column::new("age", LogicalType::Integer);
        let declared = with_new_column_default(&OraclePlatform::new(), "users", &column, &mut out);
        assert_eq!(declared.default, Some(crate::schema::DefaultValue::Integer(0)));
        assert_eq!(out.diagnostics.len(), 1);

        let mut out = Statements::new();
        let declared =
            with_new_column_default(&PostgreSqlPlatform::new(), "users", &column, &mut out);
        assert_eq!(declared.default, None);
        assert!(out.diagnostics.is_empty());
    }
}

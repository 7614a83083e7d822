//! Table rebuild for platforms whose `ALTER TABLE` can only add columns and
//! rename (SQLite).
//!
//! Anything else copies the rows into a temporary table, drops the table,
//! creates it with the new structure and copies the rows back.

use crate::ddl::{column_declaration, create_index, table_statements, Declare};
use crate::diagnostics::{Diagnostic, Statements};
use crate::error::{Result, SynthError};
use crate::platform::{literal_default, AutoincrementStrategy, Platform};
use crate::schema::identifier::{base_name, same_name};
use crate::schema::{Column, ColumnDiff, ColumnProperty, DefaultValue, Table, TableDiff};

use super::Plan;

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let modified: Vec<&ColumnDiff> = diff
        .modified_columns
        .iter()
        .filter(|d| !is_cosmetic(platform, d))
        .collect();

    if let Some(out) = simple_alter(platform, diff, &modified) {
        return Ok(out);
    }

    let old_table = diff.old_table.as_ref().ok_or_else(|| {
        SynthError::invalid(&diff.name, "rebuilding the table needs the old table snapshot")
    })?;
    let new_table = diff.apply()?;
    let mut out = Statements::new();
    rebuild(platform, diff, old_table, &new_table, &mut out)?;
    Ok(out)
}

/// `ALTER TABLE ... ADD COLUMN` and `RENAME TO`, if that is all the diff
/// needs. `None` if the table has to be rebuilt.
fn simple_alter<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
    modified: &[&ColumnDiff],
) -> Option<Statements> {
    let simple = modified.is_empty()
        && diff.dropped_columns.is_empty()
        && diff.renamed_columns.is_empty()
        && !diff.has_index_or_foreign_key_changes()
        && diff.added_columns.iter().all(can_be_added);
    if !simple {
        return None;
    }

    let mut out = Statements::new();
    let plan = Plan::new(platform, diff, &mut out);
    let table = platform.quote_name(&diff.name);
    for column in &diff.added_columns {
        let (sql, _) = column_declaration(platform, column, Declare::FULL, &mut out);
        out.push(format!("ALTER TABLE {table} ADD COLUMN {sql}"));
    }
    plan.rename_statements(platform, &mut out);
    Some(out)
}

/// SQLite adds a column only if existing rows can hold it: no key, and no
/// NOT NULL without a constant default.
fn can_be_added(column: &Column) -> bool {
    if column.autoincrement || column.column_definition.is_some() {
        return false;
    }
    match &column.default {
        Some(
            DefaultValue::CurrentTimestamp
            | DefaultValue::CurrentDate
            | DefaultValue::CurrentTime
            | DefaultValue::Expression(_),
        ) => false,
        Some(_) => true,
        None => column.nullable,
    }
}

/// A change with no effect on the declaration, such as a comment or the
/// width of an `INTEGER PRIMARY KEY` alias.
fn is_cosmetic<P: Platform + ?Sized>(platform: &P, column_diff: &ColumnDiff) -> bool {
    if column_diff.is_rename() {
        return false;
    }
    if column_diff.only(&[ColumnProperty::Comment]) {
        return true;
    }
    let old = platform.declare_type(&column_diff.old_column);
    let new = platform.declare_type(&column_diff.new_column);
    old.autoincrement == AutoincrementStrategy::PrimaryKeyType
        && new.autoincrement == AutoincrementStrategy::PrimaryKeyType
        && column_diff.only(&[
            ColumnProperty::Type,
            ColumnProperty::Unsigned,
            ColumnProperty::Comment,
        ])
}

fn rebuild<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
    old_table: &Table,
    new_table: &Table,
    out: &mut Statements,
) -> Result<()> {
    let temp = platform.quote_name(&format!("__temp__{}", base_name(&diff.name)));

    // Old names of the columns whose data survives, in old order, and what
    // the copy back inserts into which new column.
    let mut kept = Vec::new();
    let mut copied_to = Vec::new();
    let mut copied_from = Vec::new();
    for column in &old_table.columns {
        if diff.dropped_columns.iter().any(|d| same_name(&d.name, &column.name)) {
            continue;
        }
        let new_column = super::current_definition(diff, &column.name).unwrap_or(column);
        let old_name = platform.quote_name(&column.name);
        kept.push(old_name.clone());
        copied_to.push(platform.quote_name(&new_column.name));
        // Rows holding NULL in a column that became NOT NULL get the default.
        if column.nullable && !new_column.nullable && !new_column.autoincrement {
            let value = fill_value(platform, &diff.name, new_column, out);
            copied_from.push(format!("COALESCE({old_name}, {value})"));
        } else {
            copied_from.push(old_name);
        }
    }
    // Existing rows need a value for new NOT NULL columns without a default.
    for column in &diff.added_columns {
        let needs_value = !column.nullable
            && column.default.is_none()
            && !column.autoincrement
            && column.column_definition.is_none();
        if needs_value {
            copied_to.push(platform.quote_name(&column.name));
            copied_from.push(fill_value(platform, &diff.name, column, out));
        }
    }

    out.push(format!(
        "CREATE TEMPORARY TABLE {temp} AS SELECT {} FROM {}",
        kept.join(", "),
        platform.quote_name(&diff.name)
    ));
    out.push(platform.drop_table(&diff.name));

    // Indexes are created once the rows are back.
    let mut structure = new_table.clone();
    structure.indexes.retain(|i| i.primary);
    table_statements(platform, &structure, out)?;

    out.push(format!(
        "INSERT INTO {} ({}) SELECT {} FROM {temp}",
        platform.quote_name(&new_table.name),
        copied_to.join(", "),
        copied_from.join(", ")
    ));
    out.push(platform.drop_table(&format!("__temp__{}", base_name(&diff.name))));

    for index in new_table.indexes.iter().filter(|i| !i.primary) {
        out.push(create_index(platform, index, &new_table.name)?);
    }
    Ok(())
}

/// Value copied into a NOT NULL column for rows that have none: the declared
/// default, or a literal derived from the type.
fn fill_value<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    column: &Column,
    out: &mut Statements,
) -> String {
    if let Some(value) = &column.default {
        return literal_default(platform, value);
    }
    let value = literal_default(platform, &platform.synthesized_default(column));
    out.diagnose(Diagnostic::SynthesizedDefault {
        table: table.to_string(),
        column: column.name.clone(),
        default: value.clone(),
    });
    value
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostic;
    use crate::error::SynthError;
    use crate::platform::{Platform, SqlitePlatform};
    use crate::schema::{
        Column, DefaultValue, ForeignKeyConstraint, Index, LogicalType, Table, TableDiff,
    };

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .column(Column::new("email", LogicalType::string(100)))
            .column(Column::new("age", LogicalType::Integer).nullable())
            .primary_key(&["id"])
            .index(Index::new("idx_email", &["email"]))
    }

    #[test]
    fn test_nullable_column_is_added_in_place() {
        let diff = TableDiff::for_table(&users())
            .add_column(Column::new("nick", LogicalType::string(30)).nullable());
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            ["ALTER TABLE users ADD COLUMN nick VARCHAR(30) DEFAULT NULL"]
        );
    }

    #[test]
    fn test_rename_only_is_in_place() {
        let diff = TableDiff::for_table(&users()).rename_to("people");
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(statements.statements, ["ALTER TABLE users RENAME TO people"]);
    }

    #[test]
    fn test_dropped_column_rebuilds_the_table() {
        let old = users();
        let diff = TableDiff::for_table(&old).drop_column(old.get_column("age").unwrap().clone());
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "CREATE TEMPORARY TABLE __temp__users AS SELECT id, email FROM users",
                "DROP TABLE users",
                "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
                 email VARCHAR(100) NOT NULL)",
                "INSERT INTO users (id, email) SELECT id, email FROM __temp__users",
                "DROP TABLE __temp__users",
                "CREATE INDEX idx_email ON users (email)",
            ]
        );
    }

    #[test]
    fn test_renamed_column_maps_the_copy() {
        let old = users();
        let email = old.get_column("email").unwrap().clone();
        let diff = TableDiff::for_table(&old)
            .modify_column(email.clone(), email.renamed("mail").nullable())
            .rename_to("people");
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements[0],
            "CREATE TEMPORARY TABLE __temp__users AS SELECT id, email, age FROM users"
        );
        assert!(statements.statements[2].starts_with("CREATE TABLE people ("));
        assert_eq!(
            statements.statements[3],
            "INSERT INTO people (id, mail, age) SELECT id, email, age FROM __temp__users"
        );
        assert_eq!(statements.statements[5], "CREATE INDEX idx_email ON people (mail)");
    }

    #[test]
    fn test_not_null_column_without_default_rebuilds() {
        let diff = TableDiff::for_table(&users())
            .add_column(
                Column::new("score", LogicalType::Integer).default(DefaultValue::Integer(0)),
            )
            .add_column(Column::new("rank", LogicalType::Integer));
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert!(statements.statements[0].starts_with("CREATE TEMPORARY TABLE __temp__users"));
        assert_eq!(
            statements.statements[3],
            "INSERT INTO users (id, email, age, rank) SELECT id, email, age, 0 FROM __temp__users"
        );
        assert!(matches!(
            &statements.diagnostics[..],
            [Diagnostic::SynthesizedDefault { column, default, .. }]
                if column == "rank" && default == "0"
        ));
    }

    #[test]
    fn test_column_made_not_null_fills_nulls() {
        let old = users();
        let age = old.get_column("age").unwrap().clone();
        let mut required = age.clone();
        required.nullable = false;
        let diff = TableDiff::for_table(&old).modify_column(age, required);
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements[3],
            "INSERT INTO users (id, email, age) \
             SELECT id, email, COALESCE(age, 0) FROM __temp__users"
        );
        assert_eq!(statements.diagnostics.len(), 1);
    }

    #[test]
    fn test_foreign_key_rebuilds_with_inline_constraint() {
        let diff = TableDiff::for_table(&users()).add_foreign_key(ForeignKeyConstraint::new(
            "fk_users_team",
            &["age"],
            "teams",
            &["id"],
        ));
        let statements = SqlitePlatform::new().alter_table(&diff).unwrap();
        assert!(statements.statements[2]
            .contains("CONSTRAINT fk_users_team FOREIGN KEY (age) REFERENCES teams (id)"));
    }

    #[test]
    fn test_comment_change_is_ignored() {
        let old = users();
        let email = old.get_column("email").unwrap().clone();
        let diff = TableDiff::for_table(&old)
            .modify_column(email.clone(), email.comment("Contact address"));
        assert!(SqlitePlatform::new().alter_table(&diff).unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_needs_the_old_table() {
        let diff = TableDiff::new("users").drop_column(Column::new("age", LogicalType::Integer));
        assert!(matches!(
            SqlitePlatform::new().alter_table(&diff),
            Err(SynthError::InvalidDefinition { .. })
        ));
    }
}

//! Column changes on platforms that keep defaults as named constraints
//! (SQL Server).
//!
//! A default constraint is named after its table and column, so it has to be
//! dropped before the column type changes and recreated whenever the column
//! or the table is renamed.

use crate::ddl::{column_declaration, Declare};
use crate::diagnostics::Statements;
use crate::error::Result;
use crate::platform::{
    add_default_constraint, drop_default_constraint, sp_rename, Platform, SqlServerPlatform,
};
use crate::schema::{Column, ColumnDiff, ColumnProperty, TableDiff};

use super::{with_new_column_default, Plan};

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let mut out = Statements::new();
    let plan = Plan::new(platform, diff, &mut out);
    plan.drop_statements(platform, &mut out);

    let table = platform.quote_name(&diff.name);
    for column in &diff.added_columns {
        let column = with_new_column_default(platform, &diff.name, column, &mut out);
        let (mut sql, _) = column_declaration(platform, &column, Declare::FULL, &mut out);
        if let Some(value) = column
            .default
            .as_ref()
            .filter(|_| column.column_definition.is_none())
            .and_then(|v| platform.default_value_sql(&column, v))
        {
            sql.push_str(&format!(
                " CONSTRAINT {} DEFAULT {value}",
                platform.quote_name(&SqlServerPlatform::default_constraint_name(
                    &diff.name,
                    &column.name
                ))
            ));
        }
        out.push(format!("ALTER TABLE {table} ADD {sql}"));
        out.extend(platform.column_comment_sql(
            &diff.name,
            &column.name,
            None,
            column.comment_text(),
        ));
    }

    for column in &diff.dropped_columns {
        if column.default.is_some() {
            out.push(drop_default_constraint(platform, &diff.name, &column.name));
        }
        out.push(format!(
            "ALTER TABLE {table} DROP COLUMN {}",
            platform.quote_name(&column.name)
        ));
    }

    for column_diff in &diff.modified_columns {
        modify_column(platform, &diff.name, column_diff, &mut out);
        if column_diff.is_rename() {
            rename_column(
                platform,
                &diff.name,
                column_diff.old_name(),
                &column_diff.new_column,
                &mut out,
            );
        }
    }
    for (old_name, column) in &diff.renamed_columns {
        rename_column(platform, &diff.name, old_name, column, &mut out);
    }

    plan.create_statements(platform, &mut out)?;
    plan.rename_statements(platform, &mut out);
    if let Some(new_name) = &diff.new_name {
        for column in columns_with_defaults(diff)? {
            out.push(sp_rename(
                platform,
                &SqlServerPlatform::default_constraint_name(&diff.name, &column.name),
                &SqlServerPlatform::default_constraint_name(new_name, &column.name),
                Some("OBJECT"),
            ));
        }
    }
    Ok(out)
}

/// Emits the changes of one column, still under its old name.
fn modify_column<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    column_diff: &ColumnDiff,
    out: &mut Statements,
) {
    let old = &column_diff.old_column;
    let new = column_diff.new_column.renamed(column_diff.old_name());

    let drops_default = old.default.is_some()
        && (column_diff.has(ColumnProperty::Default) || column_diff.has_type_declaration_change());
    if drops_default {
        out.push(drop_default_constraint(platform, table, column_diff.old_name()));
    }

    if !column_diff.only(&[ColumnProperty::Default, ColumnProperty::Comment]) {
        let declare = Declare {
            autoincrement: false,
            comment: false,
            ..Declare::FULL
        };
        let (sql, _) = column_declaration(platform, &new, declare, out);
        out.push(format!(
            "ALTER TABLE {} ALTER COLUMN {sql}",
            platform.quote_name(table)
        ));
    }

    if drops_default || column_diff.has(ColumnProperty::Default) {
        if let Some(value) = &new.default {
            out.extend(add_default_constraint(platform, table, &new, value));
        }
    }

    if column_diff.has(ColumnProperty::Comment) {
        out.extend(platform.column_comment_sql(
            table,
            column_diff.old_name(),
            old.comment_text(),
            new.comment_text(),
        ));
    }
}

/// Renames a column and moves its default constraint to the new name.
fn rename_column<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    old_name: &str,
    column: &Column,
    out: &mut Statements,
) {
    out.push(platform.rename_column_sql(table, old_name, &column.name));
    if let Some(value) = &column.default {
        out.push(drop_default_constraint(platform, table, old_name));
        out.extend(add_default_constraint(platform, table, column, value));
    }
}

/// Columns of the altered table that carry a default constraint.
fn columns_with_defaults(diff: &TableDiff) -> Result<Vec<Column>> {
    let columns = if diff.old_table.is_some() {
        diff.apply()?.columns
    } else {
        diff.added_columns
            .iter()
            .chain(diff.modified_columns.iter().map(|d| &d.new_column))
            .chain(diff.renamed_columns.iter().map(|(_, c)| c))
            .cloned()
            .collect()
    };
    Ok(columns
        .into_iter()
        .filter(|c| c.default.is_some() && c.column_definition.is_none())
        .collect())
}

#[cfg(test)]
mod tests {
    use crate::platform::{Platform, SqlServerPlatform};
    use crate::schema::{Column, DefaultValue, LogicalType, Table, TableDiff};

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer))
            .column(
                Column::new("active", LogicalType::Boolean).default(DefaultValue::Boolean(true)),
            )
            .column(Column::new("score", LogicalType::Integer).nullable())
            .primary_key(&["id"])
    }

    #[test]
    fn test_added_column_declares_its_constraint() {
        let diff = TableDiff::for_table(&users())
            .add_column(Column::new("age", LogicalType::Integer));
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            ["ALTER TABLE users ADD age INT NOT NULL CONSTRAINT DF_users_age DEFAULT 0"]
        );
        assert_eq!(statements.diagnostics.len(), 1);
    }

    #[test]
    fn test_dropped_column_loses_its_constraint_first() {
        let old = users();
        let diff =
            TableDiff::for_table(&old).drop_column(old.get_column("active").unwrap().clone());
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "ALTER TABLE users DROP CONSTRAINT DF_users_active",
                "ALTER TABLE users DROP COLUMN active",
            ]
        );
    }

    #[test]
    fn test_default_change_replaces_the_constraint() {
        let old = users();
        let active = old.get_column("active").unwrap().clone();
        let diff = TableDiff::for_table(&old)
            .modify_column(active.clone(), active.default(DefaultValue::Boolean(false)));
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "ALTER TABLE users DROP CONSTRAINT DF_users_active",
                "ALTER TABLE users ADD CONSTRAINT DF_users_active DEFAULT 0 FOR active",
            ]
        );
    }

    #[test]
    fn test_type_change_is_an_alter_column() {
        let old = users();
        let score = old.get_column("score").unwrap().clone();
        let diff = TableDiff::for_table(&old)
            .modify_column(score, Column::new("score", LogicalType::BigInt).nullable());
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            ["ALTER TABLE users ALTER COLUMN score BIGINT"]
        );
    }

    #[test]
    fn test_rename_moves_the_constraint() {
        let old = users();
        let active = old.get_column("active").unwrap().clone();
        let diff = TableDiff::for_table(&old).rename_column("active", active.renamed("enabled"));
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "EXEC sp_rename N'users.active', N'enabled', N'COLUMN'",
                "ALTER TABLE users DROP CONSTRAINT DF_users_active",
                "ALTER TABLE users ADD CONSTRAINT DF_users_enabled DEFAULT 1 FOR enabled",
            ]
        );
    }

    #[test]
    fn test_table_rename_renames_constraints() {
        let diff = TableDiff::for_table(&users()).rename_to("people");
        let statements = SqlServerPlatform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "EXEC sp_rename N'users', N'people'",
                "EXEC sp_rename N'DF_users_active', N'DF_people_active', N'OBJECT'",
            ]
        );
    }
}

//! One `ALTER TABLE` per atomic column change (PostgreSQL).

use crate::ddl::{column_declaration, Declare, Nullability};
use crate::diagnostics::Statements;
use crate::error::Result;
use crate::platform::{literal_default, Platform, PostgreSqlPlatform};
use crate::schema::{ColumnDiff, ColumnProperty, TableDiff};

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let mut out = Statements::new();
    let plan = super::Plan::new(platform, diff, &mut out);
    plan.drop_statements(platform, &mut out);

    let table = platform.quote_name(&diff.name);
    for column in &diff.added_columns {
        let (sql, _) = column_declaration(platform, column, Declare::FULL, &mut out);
        out.push(format!("ALTER TABLE {table} ADD COLUMN {sql}"));
        out.extend(platform.column_comment_sql(
            &diff.name,
            &column.name,
            None,
            column.comment_text(),
        ));
    }
    for column in &diff.dropped_columns {
        out.push(format!(
            "ALTER TABLE {table} DROP COLUMN {}",
            platform.quote_name(&column.name)
        ));
    }
    for column_diff in &diff.modified_columns {
        modify_column(platform, diff, column_diff, &mut out);
        if column_diff.is_rename() {
            out.push(platform.rename_column_sql(
                &diff.name,
                column_diff.old_name(),
                column_diff.new_name(),
            ));
        }
    }
    for (old_name, column) in &diff.renamed_columns {
        out.push(platform.rename_column_sql(&diff.name, old_name, &column.name));
    }

    plan.create_statements(platform, &mut out)?;
    plan.rename_statements(platform, &mut out);
    Ok(out)
}

/// Emits the clauses of one modified column, addressed by its old name.
fn modify_column<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
    column_diff: &ColumnDiff,
    out: &mut Statements,
) {
    let table = platform.quote_name(&diff.name);
    let name = platform.quote_name(column_diff.old_name());
    let old = &column_diff.old_column;
    let new = &column_diff.new_column;
    let alter = |clause: String| format!("ALTER TABLE {table} ALTER COLUMN {name} {clause}");

    let type_only = Declare {
        default: false,
        nullability: Nullability::Omitted,
        autoincrement: false,
        comment: false,
    };
    let declared_type = |column: &crate::schema::Column, out: &mut Statements| {
        // SERIAL and BIGSERIAL are not types ALTER COLUMN accepts.
        let mut column = column.renamed(column_diff.old_name());
        column.autoincrement = false;
        let (sql, _) = column_declaration(platform, &column, type_only, out);
        sql
    };
    let type_changed = column_diff.has_any(&[
        ColumnProperty::Collation,
        ColumnProperty::Charset,
    ]) || column_diff.has_type_declaration_change();
    if type_changed {
        let before = declared_type(old, &mut Statements::new());
        let after = declared_type(new, out);
        // The same SQL type, as for binary columns whose length is not part
        // of the declaration.
        if before != after {
            let declaration = after
                .strip_prefix(&format!("{name} "))
                .unwrap_or(&after)
                .to_string();
            out.push(alter(format!("TYPE {declaration}")));
        }
    }

    if column_diff.has(ColumnProperty::Default) || (type_changed && new.default.is_some()) {
        match new.default.as_ref().filter(|_| !new.autoincrement) {
            Some(value) => {
                let value = platform
                    .default_value_sql(new, value)
                    .unwrap_or_else(|| literal_default(platform, value));
                out.push(alter(format!("SET DEFAULT {value}")));
            }
            None if !new.autoincrement => out.push(alter(String::from("DROP DEFAULT"))),
            None => {}
        }
    }

    if column_diff.has(ColumnProperty::NotNull) {
        let clause = if new.nullable {
            "DROP NOT NULL"
        } else {
            "SET NOT NULL"
        };
        out.push(alter(clause.to_string()));
    }

    if column_diff.has(ColumnProperty::Autoincrement) {
        if new.autoincrement {
            let sequence = PostgreSqlPlatform::serial_sequence_name(&diff.name, new.name.as_str());
            let sequence_name = platform.quote_name(&sequence);
            out.push(format!("CREATE SEQUENCE {sequence_name}"));
            out.push(format!(
                "SELECT setval({}, (SELECT MAX({name}) FROM {table}))",
                platform.quote_string_literal(&sequence)
            ));
            out.push(alter(format!(
                "SET DEFAULT nextval({})",
                platform.quote_string_literal(&sequence)
            )));
        } else {
            out.push(alter(String::from("DROP DEFAULT")));
        }
    }

    if column_diff.has(ColumnProperty::Comment) {
        out.extend(platform.column_comment_sql(
            &diff.name,
            column_diff.old_name(),
            old.comment_text(),
            new.comment_text(),
        ));
    }
}

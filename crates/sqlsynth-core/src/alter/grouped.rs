//! Grouped `ADD (...)`, `MODIFY (...)` and `DROP (...)` statements (Oracle).

use crate::ddl::{column_declaration, default_clause, Declare};
use crate::diagnostics::Statements;
use crate::error::Result;
use crate::platform::{AutoincrementStrategy, Platform};
use crate::schema::{ColumnDiff, ColumnProperty, TableDiff};

use super::{with_new_column_default, Plan};

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let mut out = Statements::new();
    let plan = Plan::new(platform, diff, &mut out);
    plan.drop_statements(platform, &mut out);

    let table = platform.quote_name(&diff.name);
    let mut comments = Vec::new();
    let mut autoincrement = Vec::new();

    let mut added = Vec::new();
    for column in &diff.added_columns {
        let column = with_new_column_default(platform, &diff.name, column, &mut out);
        let (sql, strategy) = column_declaration(platform, &column, Declare::FULL, &mut out);
        added.push(sql);
        if strategy == AutoincrementStrategy::Emulated {
            autoincrement.push(column.clone());
        }
        comments.extend(platform.column_comment_sql(
            &diff.name,
            &column.name,
            None,
            column.comment_text(),
        ));
    }
    if !added.is_empty() {
        out.push(format!("ALTER TABLE {table} ADD ({})", added.join(", ")));
    }

    for column_diff in diff.modified_columns.iter().filter(|d| d.is_rename()) {
        out.push(platform.rename_column_sql(
            &diff.name,
            column_diff.old_name(),
            column_diff.new_name(),
        ));
    }
    for (old_name, column) in &diff.renamed_columns {
        out.push(platform.rename_column_sql(&diff.name, old_name, &column.name));
    }

    let mut modified = Vec::new();
    for column_diff in &diff.modified_columns {
        if let Some(sql) = modify_clause(platform, column_diff, &mut out) {
            modified.push(sql);
        }
        let new = &column_diff.new_column;
        if column_diff.has(ColumnProperty::Autoincrement) {
            if new.autoincrement {
                autoincrement.push(new.clone());
            } else {
                out.extend(platform.drop_autoincrement_sql(&diff.name));
            }
        }
        if column_diff.has(ColumnProperty::Comment) {
            comments.extend(platform.column_comment_sql(
                &diff.name,
                &new.name,
                column_diff.old_column.comment_text(),
                new.comment_text(),
            ));
        }
    }
    if !modified.is_empty() {
        out.push(format!("ALTER TABLE {table} MODIFY ({})", modified.join(", ")));
    }

    if !diff.dropped_columns.is_empty() {
        let names: Vec<_> = diff
            .dropped_columns
            .iter()
            .map(|c| platform.quote_name(&c.name))
            .collect();
        out.push(format!("ALTER TABLE {table} DROP ({})", names.join(", ")));
    }

    for column in &autoincrement {
        out.extend(platform.autoincrement_sql(&diff.name, column));
    }
    out.extend(comments);

    plan.create_statements(platform, &mut out)?;
    plan.rename_statements(platform, &mut out);
    Ok(out)
}

/// The `MODIFY` entry of a column: only the parts that changed, so that an
/// unchanged NOT NULL is not declared twice. `None` if nothing is left.
fn modify_clause<P: Platform + ?Sized>(
    platform: &P,
    column_diff: &ColumnDiff,
    out: &mut Statements,
) -> Option<String> {
    let new = &column_diff.new_column;
    let mut parts = Vec::new();

    if column_diff.has_type_declaration_change() {
        let declare = Declare {
            default: false,
            nullability: crate::ddl::Nullability::Omitted,
            autoincrement: false,
            comment: false,
        };
        let (sql, _) = column_declaration(platform, new, declare, out);
        let name = platform.quote_name(&new.name);
        parts.push(sql.strip_prefix(&format!("{name} ")).unwrap_or(&sql).to_string());
    }
    if column_diff.has(ColumnProperty::Default) {
        let clause = default_clause(platform, new).unwrap_or_else(|| String::from(" DEFAULT NULL"));
        parts.push(clause.trim_start().to_string());
    }
    if column_diff.has(ColumnProperty::NotNull) {
        parts.push(String::from(if new.nullable { "NULL" } else { "NOT NULL" }));
    }

    if parts.is_empty() {
        return None;
    }
    Some(format!("{} {}", platform.quote_name(&new.name), parts.join(" ")))
}

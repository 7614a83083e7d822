//! One space-separated `ALTER TABLE` followed by a reorganization (DB2).
//!
//! Dropping a column or changing its type leaves the table in "reorg
//! pending" state, where it cannot be used until `REORG TABLE` runs.

use crate::ddl::{column_declaration, default_clause, Declare, Nullability};
use crate::diagnostics::{Diagnostic, Statements};
use crate::error::Result;
use crate::platform::{reorg_table, NewColumnDefault, Platform};
use crate::schema::{ColumnDiff, ColumnProperty, TableDiff};

use super::Plan;

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let mut out = Statements::new();
    let plan = Plan::new(platform, diff, &mut out);
    plan.drop_statements(platform, &mut out);

    let mut clauses = Vec::new();
    let mut comments = Vec::new();
    let mut needs_reorg = false;

    for column in &diff.added_columns {
        let (mut sql, _) = column_declaration(platform, column, Declare::FULL, &mut out);
        let needs_default = !column.nullable
            && column.default.is_none()
            && !column.autoincrement
            && column.column_definition.is_none();
        if needs_default
            && platform.capabilities().new_column_default == NewColumnDefault::WithDefaultClause
        {
            sql.push_str(" WITH DEFAULT");
            out.diagnose(Diagnostic::SynthesizedDefault {
                table: diff.name.clone(),
                column: column.name.clone(),
                default: String::from("WITH DEFAULT"),
            });
        }
        clauses.push(format!("ADD COLUMN {sql}"));
        comments.extend(platform.column_comment_sql(
            &diff.name,
            &column.name,
            None,
            column.comment_text(),
        ));
    }

    for column in &diff.dropped_columns {
        clauses.push(format!("DROP COLUMN {}", platform.quote_name(&column.name)));
        needs_reorg = true;
    }

    for column_diff in &diff.modified_columns {
        let column_clauses = alter_column_clauses(platform, column_diff, &mut out);
        needs_reorg |= !column_clauses.is_empty();
        clauses.extend(column_clauses);
        if column_diff.has(ColumnProperty::Comment) {
            comments.extend(platform.column_comment_sql(
                &diff.name,
                column_diff.new_name(),
                column_diff.old_column.comment_text(),
                column_diff.new_column.comment_text(),
            ));
        }
    }

    for column_diff in diff.modified_columns.iter().filter(|d| d.is_rename()) {
        clauses.push(format!(
            "RENAME COLUMN {} TO {}",
            platform.quote_name(column_diff.old_name()),
            platform.quote_name(column_diff.new_name())
        ));
    }
    for (old_name, column) in &diff.renamed_columns {
        clauses.push(format!(
            "RENAME COLUMN {} TO {}",
            platform.quote_name(old_name),
            platform.quote_name(&column.name)
        ));
    }

    if !clauses.is_empty() {
        out.push(format!(
            "ALTER TABLE {} {}",
            platform.quote_name(&diff.name),
            clauses.join(" ")
        ));
    }
    if needs_reorg {
        out.push(reorg_table(platform, &diff.name));
    }
    out.extend(comments);

    plan.create_statements(platform, &mut out)?;
    plan.rename_statements(platform, &mut out);
    Ok(out)
}

/// `ALTER COLUMN` clauses of one modified column, addressed by its old name.
fn alter_column_clauses<P: Platform + ?Sized>(
    platform: &P,
    column_diff: &ColumnDiff,
    out: &mut Statements,
) -> Vec<String> {
    let name = platform.quote_name(column_diff.old_name());
    let new = column_diff.new_column.renamed(column_diff.old_name());
    let mut clauses = Vec::new();

    if column_diff.has_type_declaration_change() {
        let declare = Declare {
            default: false,
            nullability: Nullability::Omitted,
            autoincrement: false,
            comment: false,
        };
        let (sql, _) = column_declaration(platform, &new, declare, out);
        let declaration = sql.strip_prefix(&format!("{name} ")).unwrap_or(&sql);
        clauses.push(format!("ALTER COLUMN {name} SET DATA TYPE {declaration}"));
    }
    if column_diff.has(ColumnProperty::NotNull) {
        let action = if new.nullable { "DROP" } else { "SET" };
        clauses.push(format!("ALTER COLUMN {name} {action} NOT NULL"));
    }
    if column_diff.has(ColumnProperty::Default) {
        match new.default.as_ref().and_then(|_| default_clause(platform, &new)) {
            Some(clause) => clauses.push(format!("ALTER COLUMN {name} SET{clause}")),
            None => clauses.push(format!("ALTER COLUMN {name} DROP DEFAULT")),
        }
    }
    clauses
}

#[cfg(test)]
mod tests {
    use crate::platform::{Db2Platform, Platform};
    use crate::schema::{Column, DefaultValue, Index, LogicalType, Table, TableDiff};

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer))
            .column(Column::new("email", LogicalType::string(100)))
            .column(Column::new("legacy", LogicalType::Integer).nullable())
            .primary_key(&["id"])
    }

    #[test]
    fn test_added_column_needs_no_reorg() {
        let diff = TableDiff::for_table(&users())
            .add_column(Column::new("age", LogicalType::Integer));
        let statements = Db2Platform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            ["ALTER TABLE users ADD COLUMN age INTEGER NOT NULL WITH DEFAULT"]
        );
        assert_eq!(statements.diagnostics.len(), 1);
    }

    #[test]
    fn test_clauses_share_one_statement_and_reorg_follows() {
        let old = users();
        let email = old.get_column("email").unwrap().clone();
        let diff = TableDiff::for_table(&old)
            .drop_column(old.get_column("legacy").unwrap().clone())
            .modify_column(
                email.clone(),
                Column::new("mail", LogicalType::string(200))
                    .default(DefaultValue::String(String::from("n/a"))),
            );
        let statements = Db2Platform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            [
                "ALTER TABLE users DROP COLUMN legacy \
                 ALTER COLUMN email SET DATA TYPE VARCHAR(200) \
                 ALTER COLUMN email SET DEFAULT 'n/a' \
                 RENAME COLUMN email TO mail",
                "CALL SYSPROC.ADMIN_CMD ('REORG TABLE users')",
            ]
        );
    }

    #[test]
    fn test_index_rename_in_place() {
        let old = users().index(Index::new("idx_email", &["email"]));
        let diff = TableDiff::for_table(&old)
            .rename_index("idx_email", Index::new("idx_mail", &["email"]));
        let statements = Db2Platform::new().alter_table(&diff).unwrap();
        assert_eq!(
            statements.statements,
            ["RENAME INDEX idx_email TO idx_mail"]
        );
    }
}

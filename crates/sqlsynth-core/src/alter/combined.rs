//! One `ALTER TABLE` carrying every column change (MySQL).

use crate::ddl::{self, column_declaration, Declare};
use crate::diagnostics::Statements;
use crate::error::Result;
use crate::platform::Platform;
use crate::schema::identifier::{same_columns, same_name};
use crate::schema::{Column, TableDiff};

use super::{current_definition, Plan};

pub(super) fn alter_table<P: Platform + ?Sized>(
    platform: &P,
    diff: &TableDiff,
) -> Result<Statements> {
    let mut out = Statements::new();
    let mut plan = Plan::new(platform, diff, &mut out);
    let table = platform.quote_name(&diff.name);
    let mut clauses = Vec::new();

    // A new autoincrement column has to become the key in the statement
    // that adds it.
    let mut primary_clauses = Vec::new();
    if let Some(position) = plan.created_indexes.iter().position(|i| i.primary) {
        let dropped = plan.dropped_indexes.iter().position(|i| i.primary);
        let keys_added_autoincrement = plan.created_indexes[position].columns.iter().any(|c| {
            diff.added_columns
                .iter()
                .any(|a| a.autoincrement && same_name(&a.name, c))
        });
        if dropped.is_none() || keys_added_autoincrement {
            let index = plan.created_indexes.remove(position);
            if let Some(dropped) = dropped {
                plan.dropped_indexes.remove(dropped);
                primary_clauses.push(String::from("DROP PRIMARY KEY"));
            }
            primary_clauses.push(format!(
                "ADD {}",
                ddl::index_declaration(platform, &diff.name, &index)
            ));
        }
    }

    // MySQL refuses to drop the primary key under an AUTO_INCREMENT column,
    // so the flag is removed first and put back once the new key exists.
    let stripped = stripped_autoincrement_columns(&plan);

    let mut pre = Statements::new();
    for fk in &plan.dropped_foreign_keys {
        pre.push(platform.drop_foreign_key_sql(&fk.name, &diff.name));
    }
    merge_index_replacements(platform, &mut plan, &mut pre);
    for column in &stripped {
        let mut column = column.clone();
        column.autoincrement = false;
        let (sql, _) = column_declaration(platform, &column, Declare::FULL, &mut out);
        pre.push(format!("ALTER TABLE {table} MODIFY {sql}"));
    }
    for index in &plan.dropped_indexes {
        pre.push(platform.drop_index_sql(index, &diff.name));
    }
    recreate_foreign_keys_around_renamed_indexes(platform, &mut plan, &mut pre);

    for column in &diff.added_columns {
        let (sql, _) = column_declaration(platform, column, Declare::FULL, &mut out);
        clauses.push(format!("ADD COLUMN {sql}"));
    }
    for column in &diff.dropped_columns {
        clauses.push(format!("DROP COLUMN {}", platform.quote_name(&column.name)));
    }
    let restored = |old_name: &str| stripped.iter().any(|c| same_name(&c.name, old_name));
    for column_diff in &diff.modified_columns {
        let mut column = column_diff.new_column.clone();
        if restored(column_diff.old_name()) {
            column.autoincrement = false;
        }
        let (sql, _) = column_declaration(platform, &column, Declare::FULL, &mut out);
        clauses.push(format!(
            "CHANGE {} {sql}",
            platform.quote_name(column_diff.old_name())
        ));
    }
    for (old_name, column) in &diff.renamed_columns {
        let mut column = column.clone();
        if restored(old_name) {
            column.autoincrement = false;
        }
        let (sql, _) = column_declaration(platform, &column, Declare::FULL, &mut out);
        clauses.push(format!("CHANGE {} {sql}", platform.quote_name(old_name)));
    }
    clauses.extend(primary_clauses);

    out.append(pre);
    if !clauses.is_empty() {
        out.push(format!("ALTER TABLE {table} {}", clauses.join(", ")));
    }
    plan.create_statements(platform, &mut out)?;

    for column in &stripped {
        let definition = current_definition(diff, &column.name).unwrap_or(column);
        if definition.autoincrement {
            let (sql, _) = column_declaration(platform, definition, Declare::FULL, &mut out);
            out.push(format!("ALTER TABLE {table} MODIFY {sql}"));
        }
    }
    plan.rename_statements(platform, &mut out);
    Ok(out)
}

/// Autoincrement columns of a primary key that is about to be dropped.
fn stripped_autoincrement_columns(plan: &Plan<'_>) -> Vec<Column> {
    let Some(old) = &plan.diff.old_table else {
        return Vec::new();
    };
    let Some(primary) = plan.dropped_indexes.iter().find(|i| i.primary) else {
        return Vec::new();
    };
    old.columns
        .iter()
        .filter(|c| c.autoincrement && primary.covers_column(&c.name))
        .filter(|c| {
            !plan
                .diff
                .dropped_columns
                .iter()
                .any(|d| same_name(&d.name, &c.name))
        })
        .cloned()
        .collect()
}

/// Replaces a dropped index and a created index over the same columns by a
/// single statement, so that a foreign key relying on the columns is never
/// left without an index.
fn merge_index_replacements<P: Platform + ?Sized>(
    platform: &P,
    plan: &mut Plan<'_>,
    out: &mut Statements,
) {
    let table = plan.table();
    let mut i = 0;
    while i < plan.dropped_indexes.len() {
        let dropped = &plan.dropped_indexes[i];
        let replacement = (!dropped.primary)
            .then(|| {
                plan.created_indexes
                    .iter()
                    .position(|c| !c.primary && same_columns(&c.columns, &dropped.columns))
            })
            .flatten();
        let Some(position) = replacement else {
            i += 1;
            continue;
        };
        let created = plan.created_indexes.remove(position);
        let dropped = plan.dropped_indexes.remove(i);
        out.push(format!(
            "ALTER TABLE {} DROP INDEX {}, ADD {}",
            platform.quote_name(table),
            platform.quote_name(&dropped.name),
            ddl::index_declaration(platform, table, &created)
        ));
    }
}

/// Without in-place index renames the renamed index is dropped and created
/// again, which MySQL refuses while a foreign key uses it. Such foreign keys
/// are dropped first and created again afterwards.
fn recreate_foreign_keys_around_renamed_indexes<P: Platform + ?Sized>(
    platform: &P,
    plan: &mut Plan<'_>,
    out: &mut Statements,
) {
    if platform.capabilities().rename_index || plan.renamed_indexes.is_empty() {
        return;
    }
    let Some(old) = &plan.diff.old_table else {
        return;
    };
    if platform.non_enforcing_engine(Some(old)).is_some() {
        return;
    }
    for (old_name, _) in &plan.renamed_indexes {
        let Some(index) = old.get_index(old_name) else {
            continue;
        };
        for fk in &old.foreign_keys {
            let handled = plan
                .dropped_foreign_keys
                .iter()
                .any(|f| same_name(&f.name, &fk.name));
            if handled || !fk.intersects_index_columns(index) {
                continue;
            }
            out.push(platform.drop_foreign_key_sql(&fk.name, &plan.diff.name));
            plan.dropped_foreign_keys.push(fk.clone());
            plan.created_foreign_keys.push(fk.clone());
        }
    }
}

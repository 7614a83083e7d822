//! DDL generation: `CREATE`/`DROP` statements for tables, indexes,
//! foreign keys and sequences.
//!
//! Every function validates its input before emitting anything, so a
//! failure never leaves a partial batch behind.

use tracing::debug;

use crate::alter;
use crate::diagnostics::{Diagnostic, Statements};
use crate::error::{Result, SynthError};
use crate::platform::{AutoincrementStrategy, Platform, ResolvedAction};
use crate::schema::identifier::same_name;
use crate::schema::{
    Column, ForeignKeyConstraint, Index, ReferentialEvent, Schema, SchemaDiff, Table,
    UniqueConstraint,
};

/// How NULL-ability is written in a column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nullability {
    /// `NOT NULL` for required columns, nothing otherwise.
    Implicit,
    /// `NULL` or `NOT NULL`.
    Explicit,
    /// Nothing.
    Omitted,
}

/// Which parts of a column declaration to write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Declare {
    pub default: bool,
    pub nullability: Nullability,
    pub autoincrement: bool,
    pub comment: bool,
}

impl Declare {
    /// Everything, as inside `CREATE TABLE`.
    pub const FULL: Self = Self {
        default: true,
        nullability: Nullability::Implicit,
        autoincrement: true,
        comment: true,
    };
}

/// Quotes and joins a column list.
pub(crate) fn column_list<P: Platform + ?Sized>(platform: &P, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| platform.quote_name(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Declares a column. Diagnostics of the type resolution go to `out`.
///
/// The second element tells how autoincrement was honoured, so the caller
/// can emit the statements an emulated autoincrement needs.
pub(crate) fn column_declaration<P: Platform + ?Sized>(
    platform: &P,
    column: &Column,
    declare: Declare,
    out: &mut Statements,
) -> (String, AutoincrementStrategy) {
    let name = platform.quote_name(&column.name);
    if let Some(definition) = &column.column_definition {
        return (
            format!("{name} {definition}"),
            AutoincrementStrategy::NotRequested,
        );
    }

    let declaration = platform.declare_type(column);
    for diagnostic in declaration.diagnostics {
        out.diagnose(diagnostic);
    }
    let autoincrement = if declare.autoincrement {
        declaration.autoincrement
    } else {
        AutoincrementStrategy::NotRequested
    };

    let mut sql = format!("{name} {}", declaration.sql);
    if let AutoincrementStrategy::TrailingClause(clause) = autoincrement {
        sql.push_str(clause);
    }
    if let Some(clause) = column
        .charset
        .as_deref()
        .and_then(|c| platform.charset_clause(c))
    {
        sql.push_str(&clause);
    }
    if let Some(clause) = column
        .collation
        .as_deref()
        .and_then(|c| platform.collation_clause(c))
    {
        sql.push_str(&clause);
    }
    if declare.default {
        if let Some(clause) = default_clause(platform, column) {
            sql.push_str(&clause);
        }
    }
    match declare.nullability {
        Nullability::Implicit if !column.nullable => sql.push_str(" NOT NULL"),
        Nullability::Explicit if column.nullable => sql.push_str(" NULL"),
        Nullability::Explicit => sql.push_str(" NOT NULL"),
        Nullability::Implicit | Nullability::Omitted => {}
    }
    if declare.comment && platform.capabilities().inline_comments {
        if let Some(comment) = column.comment_text() {
            sql.push_str(&format!(" COMMENT {}", platform.quote_string_literal(comment)));
        }
    }
    (sql, autoincrement)
}

/// ` DEFAULT ...` of a column, if it is declared inline.
///
/// Nullable columns without default get `DEFAULT NULL`. Generated columns
/// and platforms with named default constraints get nothing.
pub(crate) fn default_clause<P: Platform + ?Sized>(
    platform: &P,
    column: &Column,
) -> Option<String> {
    if column.autoincrement || platform.capabilities().default_constraints {
        return None;
    }
    match &column.default {
        Some(value) => platform
            .default_value_sql(column, value)
            .map(|v| format!(" DEFAULT {v}")),
        None if column.nullable => Some(String::from(" DEFAULT NULL")),
        None => None,
    }
}

/// Index declaration as written inside `CREATE TABLE` or after `ADD`.
pub(crate) fn index_declaration<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    index: &Index,
) -> String {
    let columns = column_list(platform, &index.columns);
    if index.primary {
        return format!("{} ({columns})", platform.primary_key_clause(table, index));
    }
    format!(
        "{}INDEX {} ({columns})",
        platform.index_kind_prefix(index),
        platform.quote_name(&index.name)
    )
}

/// `CONSTRAINT fk FOREIGN KEY (...) REFERENCES t (...) [ON DELETE ..] [ON UPDATE ..]`.
///
/// # Errors
///
/// Malformed keys and referential actions the platform rejects.
pub(crate) fn foreign_key_declaration<P: Platform + ?Sized>(
    platform: &P,
    fk: &ForeignKeyConstraint,
    out: &mut Statements,
) -> Result<String> {
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

    let mut sql = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        platform.quote_name(&fk.name),
        column_list(platform, &fk.local_columns),
        platform.quote_name(&fk.foreign_table),
        column_list(platform, &fk.foreign_columns)
    );
    for (event, action) in [
        (ReferentialEvent::Delete, fk.on_delete),
        (ReferentialEvent::Update, fk.on_update),
    ] {
        let Some(action) = action else {
            continue;
        };
        match platform.resolve_referential_action(action, event)? {
            ResolvedAction::Clause(action) => {
                sql.push_str(&format!(" {} {action}", event.as_sql()));
            }
            ResolvedAction::Downgraded { requested, applied } => {
                out.diagnose(Diagnostic::ReferentialActionDowngraded {
                    constraint: fk.name.clone(),
                    requested: requested.to_string(),
                    applied: applied.to_string(),
                });
                sql.push_str(&format!(" {} {applied}", event.as_sql()));
            }
            ResolvedAction::Omitted => {}
        }
    }
    Ok(sql)
}

/// `ALTER TABLE t ADD CONSTRAINT fk ...`.
///
/// # Errors
///
/// Platforms that only declare foreign keys inside `CREATE TABLE`, and
/// whatever [`foreign_key_declaration`] rejects.
pub(crate) fn create_foreign_key<P: Platform + ?Sized>(
    platform: &P,
    fk: &ForeignKeyConstraint,
    table: &str,
    out: &mut Statements,
) -> Result<String> {
    if platform.capabilities().inline_foreign_keys {
        return Err(SynthError::unsupported(
            platform.name(),
            "adding foreign keys to an existing table",
        ));
    }
    let declaration = foreign_key_declaration(platform, fk, out)?;
    Ok(format!(
        "ALTER TABLE {} ADD {declaration}",
        platform.quote_name(table)
    ))
}

/// `CREATE INDEX`, or `ALTER TABLE ... ADD PRIMARY KEY` for the primary
/// index.
///
/// # Errors
///
/// Indexes without columns, and partial indexes on platforms without them.
pub(crate) fn create_index<P: Platform + ?Sized>(
    platform: &P,
    index: &Index,
    table: &str,
) -> Result<String> {
    if index.columns.is_empty() {
        return Err(SynthError::invalid(&index.name, "no columns specified"));
    }
    if index.primary {
        return Ok(format!(
            "ALTER TABLE {} ADD {}",
            platform.quote_name(table),
            index_declaration(platform, table, index)
        ));
    }
    if index.predicate.is_some() && !platform.capabilities().partial_indexes {
        return Err(SynthError::unsupported(platform.name(), "partial indexes"));
    }

    let mut sql = format!(
        "CREATE {}INDEX {} ON {}",
        platform.index_kind_prefix(index),
        platform.quote_name(&index.name),
        platform.quote_name(table)
    );
    if let Some(method) = platform.index_method_clause(index) {
        sql.push_str(&method);
    }
    sql.push_str(&format!(" ({})", column_list(platform, &index.columns)));
    if let Some(predicate) = platform.index_predicate(index) {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate);
    }
    Ok(sql)
}

/// Adds a unique constraint to an existing table.
///
/// # Errors
///
/// Constraints without columns.
pub(crate) fn create_unique_constraint<P: Platform + ?Sized>(
    platform: &P,
    constraint: &UniqueConstraint,
    table: &str,
) -> Result<String> {
    if constraint.columns.is_empty() {
        return Err(SynthError::invalid(&constraint.name, "no columns specified"));
    }
    Ok(platform.unique_constraint_sql(constraint, table))
}

/// Emits `CREATE TABLE` and everything belonging to the table except the
/// foreign keys that have to be added afterwards, which are returned.
///
/// The table must already be validated.
pub(crate) fn table_statements<'t, P: Platform + ?Sized>(
    platform: &P,
    table: &'t Table,
    out: &mut Statements,
) -> Result<Vec<&'t ForeignKeyConstraint>> {
    let caps = platform.capabilities();
    let primary = table.primary_index();
    let mut definitions = Vec::new();
    let mut primary_in_type = false;
    let mut emulated = Vec::new();

    for column in &table.columns {
        let (sql, autoincrement) = column_declaration(platform, column, Declare::FULL, out);
        match autoincrement {
            AutoincrementStrategy::PrimaryKeyType => {
                let sole_key = primary.is_some_and(|p| {
                    p.columns.len() == 1 && same_name(&p.columns[0], &column.name)
                });
                if !sole_key {
                    return Err(SynthError::unsupported(
                        platform.name(),
                        format!(
                            "autoincrement column '{}' that is not the whole primary key",
                            column.name
                        ),
                    ));
                }
                primary_in_type = true;
            }
            AutoincrementStrategy::Emulated => emulated.push(column),
            AutoincrementStrategy::NotRequested
            | AutoincrementStrategy::FoldedIntoType
            | AutoincrementStrategy::TrailingClause(_) => {}
        }
        definitions.push(sql);
    }

    if let Some(primary) = primary.filter(|_| !primary_in_type) {
        definitions.push(index_declaration(platform, &table.name, primary));
    }
    if caps.inline_indexes {
        for index in table.indexes.iter().filter(|i| !i.primary) {
            definitions.push(index_declaration(platform, &table.name, index));
        }
    }
    for unique in &table.unique_constraints {
        definitions.push(format!(
            "CONSTRAINT {} UNIQUE ({})",
            platform.quote_name(&unique.name),
            column_list(platform, &unique.columns)
        ));
    }
    for check in &table.checks {
        match &check.name {
            Some(name) => definitions.push(format!(
                "CONSTRAINT {} CHECK ({})",
                platform.quote_name(name),
                check.expression
            )),
            None => definitions.push(format!("CHECK ({})", check.expression)),
        }
    }
    if caps.inline_foreign_keys {
        for fk in &table.foreign_keys {
            definitions.push(foreign_key_declaration(platform, fk, out)?);
        }
    }

    let mut sql = format!(
        "{} {} ({})",
        platform.create_table_keyword(&table.options),
        platform.create_table_name(table),
        definitions.join(", ")
    );
    if let Some(options) = platform.table_options_sql(table) {
        sql.push(' ');
        sql.push_str(&options);
    }
    out.push(sql);

    if !caps.inline_indexes {
        for index in table.indexes.iter().filter(|i| !i.primary) {
            out.push(create_index(platform, index, &table.name)?);
        }
    }
    if !caps.inline_comments {
        if let Some(comment) = table.options.comment.as_deref().filter(|c| !c.is_empty()) {
            out.extend(platform.table_comment_sql(&table.name, Some(comment)));
        }
        for column in &table.columns {
            out.extend(platform.column_comment_sql(
                &table.name,
                &column.name,
                None,
                column.comment_text(),
            ));
        }
    }
    for column in emulated {
        out.extend(platform.autoincrement_sql(&table.name, column));
    }
    out.extend(platform.post_create_table_sql(table));

    if caps.inline_foreign_keys || table.foreign_keys.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(engine) = platform.non_enforcing_engine(Some(table)) {
        out.diagnose(Diagnostic::ForeignKeysSuppressed {
            table: table.name.clone(),
            engine,
        });
        return Ok(Vec::new());
    }
    Ok(table.foreign_keys.iter().collect())
}

/// Creates one table with its indexes and foreign keys.
pub(crate) fn create_table<P: Platform + ?Sized>(
    platform: &P,
    table: &Table,
) -> Result<Statements> {
    table.validate()?;
    let mut out = Statements::new();
    let foreign_keys = table_statements(platform, table, &mut out)?;
    for fk in foreign_keys {
        let sql = create_foreign_key(platform, fk, &table.name, &mut out)?;
        out.push(sql);
    }
    debug!(
        "{}: CREATE TABLE {} produced {} statements",
        platform.name(),
        table.name,
        out.len()
    );
    Ok(out)
}

/// Creates several tables. Every table and index comes before the first
/// foreign key.
pub(crate) fn create_tables<P: Platform + ?Sized>(
    platform: &P,
    tables: &[Table],
) -> Result<Statements> {
    for table in tables {
        table.validate()?;
    }
    let mut out = Statements::new();
    let mut pending = Vec::new();
    for table in tables {
        let foreign_keys = table_statements(platform, table, &mut out)?;
        pending.push((table, foreign_keys));
    }
    for (table, foreign_keys) in pending {
        for fk in foreign_keys {
            let sql = create_foreign_key(platform, fk, &table.name, &mut out)?;
            out.push(sql);
        }
    }
    debug!(
        "{}: {} tables produced {} statements",
        platform.name(),
        tables.len(),
        out.len()
    );
    Ok(out)
}

/// Drops several tables. Foreign keys go first so that the order of
/// `tables` does not matter.
pub(crate) fn drop_tables<P: Platform + ?Sized>(platform: &P, tables: &[Table]) -> Statements {
    let mut out = Statements::new();
    if !platform.capabilities().inline_foreign_keys {
        for table in tables {
            if platform.non_enforcing_engine(Some(table)).is_some() {
                continue;
            }
            for fk in &table.foreign_keys {
                out.push(platform.drop_foreign_key_sql(&fk.name, &table.name));
            }
        }
    }
    for table in tables {
        out.push(platform.drop_table(&table.name));
    }
    for table in tables {
        if table.columns.iter().any(|c| c.autoincrement) {
            out.extend(platform.drop_autoincrement_sql(&table.name));
        }
    }
    out
}

/// Creates every sequence and table of a schema.
pub(crate) fn create_schema<P: Platform + ?Sized>(
    platform: &P,
    schema: &Schema,
) -> Result<Statements> {
    let mut out = Statements::new();
    for sequence in &schema.sequences {
        out.push(platform.create_sequence_sql(sequence)?);
    }
    out.append(create_tables(platform, &schema.tables)?);
    Ok(out)
}

/// Turns a schema diff into statements.
///
/// Order: new sequences, new tables, table alterations, foreign keys of
/// the new tables, dropped tables (foreign keys first), dropped sequences,
/// altered sequences.
pub(crate) fn migrate_schema<P: Platform + ?Sized>(
    platform: &P,
    diff: &SchemaDiff,
) -> Result<Statements> {
    for table in &diff.created_tables {
        table.validate()?;
    }
    let mut out = Statements::new();
    for sequence in &diff.created_sequences {
        out.push(platform.create_sequence_sql(sequence)?);
    }
    let mut pending = Vec::new();
    for table in &diff.created_tables {
        let foreign_keys = table_statements(platform, table, &mut out)?;
        pending.push((table, foreign_keys));
    }
    for table_diff in &diff.altered_tables {
        out.append(alter::alter_table(platform, table_diff)?);
    }
    for (table, foreign_keys) in pending {
        for fk in foreign_keys {
            let sql = create_foreign_key(platform, fk, &table.name, &mut out)?;
            out.push(sql);
        }
    }
    out.append(drop_tables(platform, &diff.dropped_tables));
    for sequence in &diff.dropped_sequences {
        out.push(platform.drop_sequence_sql(&sequence.name)?);
    }
    for sequence in &diff.altered_sequences {
        out.push(platform.alter_sequence_sql(sequence)?);
    }
    debug!(
        "{}: schema migration produced {} statements",
        platform.name(),
        out.len()
    );
    Ok(out)
}

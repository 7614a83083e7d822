//! Database platforms.
//!
//! A [`Platform`] answers two kinds of questions: small dialect facts
//! (quote characters, type names, literal syntax, capability flags) and
//! whole generation requests (`create_table`, `alter_table`,
//! `render_query`). The generation requests have default implementations
//! shared by every dialect, built on top of the facts. Each dialect family
//! overrides only the facts and statement fragments that differ.

mod db2;
mod fragments;
pub mod keywords;
mod mysql;
mod oracle;
mod postgres;
pub mod quoting;
mod sqlite;
mod sqlserver;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Statements};
use crate::error::{Result, SynthError};
use crate::query::{self, QueryParts, RenderedQuery};
use crate::registry::PlatformKind;
use crate::schema::identifier::{is_explicitly_quoted, unquoted};
use crate::schema::{
    Column, DefaultValue, ForeignKeyConstraint, Index, LogicalType, ReferentialAction,
    ReferentialEvent, Schema, SchemaDiff, Sequence, Table, TableDiff, TableOptions,
    UniqueConstraint,
};
use crate::{alter, ddl};

pub use db2::Db2Platform;
pub use fragments::{DateOperator, IntervalUnit, TransactionIsolation};
pub use keywords::KeywordList;
pub use mysql::{MySqlFlavor, MySqlPlatform};
pub use oracle::OraclePlatform;
pub use postgres::PostgreSqlPlatform;
pub use quoting::IdentifierQuoting;
pub use sqlite::SqlitePlatform;
pub use sqlserver::SqlServerPlatform;

pub(crate) use db2::reorg_table;
pub(crate) use sqlserver::{add_default_constraint, drop_default_constraint, sp_rename};

/// Per-instance settings shared by every platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Identifier quoting policy.
    #[serde(default)]
    pub identifier_quoting: IdentifierQuoting,
}

impl PlatformConfig {
    /// Configuration that quotes every identifier.
    #[must_use]
    pub const fn quote_all() -> Self {
        Self {
            identifier_quoting: IdentifierQuoting::Always,
        }
    }
}

/// How a row window (`limit`/`offset`) is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStrategy {
    /// `LIMIT n OFFSET m`. An offset without limit uses the given
    /// "unbounded" limit, or a bare `OFFSET` when there is none.
    LimitOffset {
        /// Limit literal meaning "all rows".
        unbounded: Option<&'static str>,
    },
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`, which requires an `ORDER BY`.
    OffsetFetch,
    /// Nested derived tables filtered on `ROWNUM`.
    RowNum,
    /// `FETCH FIRST`, or a derived table filtered on `ROW_NUMBER()`.
    RowNumber,
}

/// How an `ALTER TABLE` diff is turned into statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterStrategy {
    /// Every column change in one combined `ALTER TABLE`.
    Combined,
    /// One `ALTER TABLE` per atomic column change.
    PerClause,
    /// Grouped `ADD (...)`, `MODIFY (...)` and `DROP (...)` statements.
    Grouped,
    /// Defaults managed as named constraints.
    DefaultConstraints,
    /// One combined `ALTER TABLE` followed by a table reorganization.
    Reorg,
    /// Copy into a temporary table and rebuild.
    Rebuild,
}

/// How a newly added NOT NULL column without default is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewColumnDefault {
    /// As requested.
    AsDeclared,
    /// With a literal default derived from the type.
    SynthesizeLiteral,
    /// With the bare `WITH DEFAULT` clause.
    WithDefaultClause,
}

/// Static facts about a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Opening and closing identifier quote characters.
    pub identifier_quote: (char, char),
    /// Longest variable-length string before escalation to a large object.
    pub varchar_max_length: u32,
    /// Longest fixed-length string before escalation to a large object.
    pub char_max_length: u32,
    /// Longest binary string before escalation to a large object.
    pub binary_max_length: u32,
    /// Row window syntax.
    pub limit: LimitStrategy,
    /// Alter-table algorithm.
    pub alter: AlterStrategy,
    /// `CREATE SEQUENCE` is available.
    pub sequences: bool,
    /// Indexes may carry a `WHERE` predicate.
    pub partial_indexes: bool,
    /// Indexes can be renamed in place.
    pub rename_index: bool,
    /// Column and table comments are part of the declaration.
    pub inline_comments: bool,
    /// Indexes are declared inside `CREATE TABLE`.
    pub inline_indexes: bool,
    /// Foreign keys are declared inside `CREATE TABLE` and cannot be
    /// altered afterwards.
    pub inline_foreign_keys: bool,
    /// Column defaults are separate named constraints.
    pub default_constraints: bool,
    /// Treatment of new NOT NULL columns without default.
    pub new_column_default: NewColumnDefault,
    /// Table used by a `SELECT` without `FROM`.
    pub dummy_table: Option<&'static str>,
}

/// How the autoincrement request of a column is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoincrementStrategy {
    /// No autoincrement was requested, or the type cannot carry one.
    NotRequested,
    /// The type token itself generates values (`SERIAL`).
    FoldedIntoType,
    /// The type token generates values and declares the primary key
    /// (`INTEGER PRIMARY KEY AUTOINCREMENT`). The column must be the whole
    /// primary key.
    PrimaryKeyType,
    /// A clause appended right after the type.
    TrailingClause(&'static str),
    /// Separate statements emitted after `CREATE TABLE`.
    Emulated,
}

/// A resolved column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// The type as written in DDL.
    pub sql: String,
    /// How autoincrement is honoured.
    pub autoincrement: AutoincrementStrategy,
    /// Observations made while resolving.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeDeclaration {
    /// A plain declaration.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            autoincrement: AutoincrementStrategy::NotRequested,
            diagnostics: Vec::new(),
        }
    }

    /// Sets the autoincrement strategy.
    #[must_use]
    pub fn with_autoincrement(mut self, strategy: AutoincrementStrategy) -> Self {
        self.autoincrement = strategy;
        self
    }

    /// A declaration widened to a large object because the requested length
    /// exceeded `maximum`.
    pub(crate) fn escalated(column: &Column, requested: u32, maximum: u32, sql: String) -> Self {
        let diagnostic = Diagnostic::ValueRange {
            column: column.name.clone(),
            requested,
            maximum,
            declared_as: sql.clone(),
        };
        let mut declaration = Self::new(sql);
        declaration.diagnostics.push(diagnostic);
        declaration
    }

    /// A declaration that only approximates the logical type.
    pub(crate) fn approximated(column: &Column, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let diagnostic = Diagnostic::TypeApproximated {
            column: column.name.clone(),
            logical_type: column.logical_type.to_string(),
            declared_as: sql.clone(),
        };
        let mut declaration = Self::new(sql);
        declaration.diagnostics.push(diagnostic);
        declaration
    }
}

/// The outcome of mapping a referential action onto a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAction {
    /// Emit the action as requested.
    Clause(ReferentialAction),
    /// Emit a weaker action instead.
    Downgraded {
        /// What was asked for.
        requested: ReferentialAction,
        /// What is emitted.
        applied: ReferentialAction,
    },
    /// Omit the clause: the platform default is equivalent.
    Omitted,
}

/// Row locking requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Shared lock.
    PessimisticRead,
    /// Exclusive lock.
    PessimisticWrite,
}

/// A database dialect family.
///
/// Implementations are immutable after construction and safe to share
/// between threads.
pub trait Platform: fmt::Debug + Send + Sync {
    // ========================================================================
    // Identity and facts
    // ========================================================================

    /// Registry key of the family.
    fn kind(&self) -> PlatformKind;

    /// Human readable name, used in errors.
    fn name(&self) -> &'static str;

    /// Static capability record.
    fn capabilities(&self) -> Capabilities;

    /// Reserved words.
    fn keywords(&self) -> &'static KeywordList;

    /// Instance configuration.
    fn config(&self) -> &PlatformConfig;

    // ========================================================================
    // Quoting
    // ========================================================================

    /// Quotes a single identifier segment unconditionally.
    fn quote_single_identifier(&self, name: &str) -> String {
        quoting::quote_with(name, self.capabilities().identifier_quote)
    }

    /// Quotes every dot-separated segment of an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.quote_single_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Reverses [`Platform::quote_identifier`].
    fn unquote_identifier(&self, quoted: &str) -> String {
        quoting::unquote_with(quoted, self.capabilities().identifier_quote)
    }

    /// Renders an identifier according to the quoting policy.
    ///
    /// Explicitly quoted segments are always quoted with the platform's
    /// characters. Under [`IdentifierQuoting::AsNeeded`] other segments are
    /// quoted only if they are reserved or not plain identifiers.
    fn quote_name(&self, name: &str) -> String {
        let always = self.config().identifier_quoting == IdentifierQuoting::Always;
        quoting::split_qualified(name)
            .into_iter()
            .map(|segment| {
                if is_explicitly_quoted(segment) {
                    self.quote_single_identifier(unquoted(segment))
                } else if always
                    || !quoting::is_bare_identifier(segment)
                    || self.keywords().contains(segment)
                {
                    self.quote_single_identifier(segment)
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a string literal.
    fn quote_string_literal(&self, value: &str) -> String {
        quoting::quote_literal(value)
    }

    // ========================================================================
    // Types and literals
    // ========================================================================

    /// Resolves the logical type of a column to a declaration.
    fn declare_type(&self, column: &Column) -> TypeDeclaration;

    /// Boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Expression for the current timestamp.
    fn current_timestamp_sql(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    /// Expression for the current date.
    fn current_date_sql(&self) -> &'static str {
        "CURRENT_DATE"
    }

    /// Expression for the current time.
    fn current_time_sql(&self) -> &'static str {
        "CURRENT_TIME"
    }

    /// Renders a default value for the column, or `None` if the platform
    /// cannot attach it.
    fn default_value_sql(&self, _column: &Column, value: &DefaultValue) -> Option<String> {
        Some(literal_default(self, value))
    }

    /// A default that lets a NOT NULL column be added to a populated table.
    fn synthesized_default(&self, column: &Column) -> DefaultValue {
        synthesized_literal(column)
    }

    /// Clause declaring the character set of a column.
    fn charset_clause(&self, _charset: &str) -> Option<String> {
        None
    }

    /// Clause declaring the collation of a column.
    fn collation_clause(&self, collation: &str) -> Option<String> {
        Some(format!(" COLLATE {}", self.quote_single_identifier(collation)))
    }

    // ========================================================================
    // Statement fragments
    // ========================================================================

    /// `CREATE TABLE` keyword for the table options.
    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    /// Name used in `CREATE TABLE`.
    fn create_table_name(&self, table: &Table) -> String {
        self.quote_name(&table.name)
    }

    /// Options appended after the column list.
    fn table_options_sql(&self, _table: &Table) -> Option<String> {
        None
    }

    /// Primary key clause, without the column list.
    fn primary_key_clause(&self, _table: &str, _index: &Index) -> String {
        String::from("PRIMARY KEY")
    }

    /// Keyword placed between `CREATE` and `INDEX`, with a trailing space.
    fn index_kind_prefix(&self, index: &Index) -> &'static str {
        if index.unique {
            "UNIQUE "
        } else {
            ""
        }
    }

    /// Access method clause placed after the table name of `CREATE INDEX`.
    fn index_method_clause(&self, _index: &Index) -> Option<String> {
        None
    }

    /// Predicate of a partial index.
    fn index_predicate(&self, index: &Index) -> Option<String> {
        index.predicate.clone()
    }

    /// Maps a referential action onto the platform.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] if the action cannot be expressed.
    fn resolve_referential_action(
        &self,
        action: ReferentialAction,
        _event: ReferentialEvent,
    ) -> Result<ResolvedAction> {
        Ok(ResolvedAction::Clause(action))
    }

    /// Drops an index. A primary index drops the primary key.
    fn drop_index_sql(&self, index: &Index, table: &str) -> String {
        if index.primary {
            format!("ALTER TABLE {} DROP PRIMARY KEY", self.quote_name(table))
        } else {
            format!("DROP INDEX {}", self.quote_name(&index.name))
        }
    }

    /// Renames an index in place, or `None` if it has to be recreated.
    fn rename_index_sql(&self, old_name: &str, index: &Index, _table: &str) -> Option<String> {
        Some(format!(
            "ALTER INDEX {} RENAME TO {}",
            self.quote_name(old_name),
            self.quote_name(&index.name)
        ))
    }

    /// Adds a unique constraint to an existing table.
    fn unique_constraint_sql(&self, constraint: &UniqueConstraint, table: &str) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            self.quote_name(table),
            self.quote_name(&constraint.name),
            ddl::column_list(self, &constraint.columns)
        )
    }

    /// Storage engine of the table if it silently ignores foreign keys.
    fn non_enforcing_engine(&self, _table: Option<&Table>) -> Option<String> {
        None
    }

    /// Drops a foreign key.
    fn drop_foreign_key_sql(&self, name: &str, table: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_name(table),
            self.quote_name(name)
        )
    }

    /// Renames a table.
    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_name(old_name),
            self.quote_name(new_name)
        )]
    }

    /// Renames a column.
    fn rename_column_sql(&self, table: &str, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_name(table),
            self.quote_name(old_name),
            self.quote_name(new_name)
        )
    }

    /// Sets or clears a table comment with a separate statement.
    fn table_comment_sql(&self, table: &str, comment: Option<&str>) -> Option<String> {
        Some(format!(
            "COMMENT ON TABLE {} IS {}",
            self.quote_name(table),
            comment.map_or_else(|| String::from("NULL"), |c| self.quote_string_literal(c))
        ))
    }

    /// Moves a column comment from `old` to `new` with a separate statement.
    fn column_comment_sql(
        &self,
        table: &str,
        column: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> Option<String> {
        if old == new {
            return None;
        }
        Some(format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.quote_name(table),
            self.quote_name(column),
            new.map_or_else(|| String::from("NULL"), |c| self.quote_string_literal(c))
        ))
    }

    /// Statements emulating autoincrement after `CREATE TABLE`.
    fn autoincrement_sql(&self, _table: &str, _column: &Column) -> Vec<String> {
        Vec::new()
    }

    /// Statements removing autoincrement emulation after `DROP TABLE`.
    fn drop_autoincrement_sql(&self, _table: &str) -> Vec<String> {
        Vec::new()
    }

    /// Statements run after `CREATE TABLE` and its indexes.
    fn post_create_table_sql(&self, _table: &Table) -> Vec<String> {
        Vec::new()
    }

    /// `CREATE SEQUENCE`.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms without sequences.
    fn create_sequence_sql(&self, _sequence: &Sequence) -> Result<String> {
        Err(SynthError::unsupported(self.name(), "sequences"))
    }

    /// `ALTER SEQUENCE`.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms without sequences.
    fn alter_sequence_sql(&self, _sequence: &Sequence) -> Result<String> {
        Err(SynthError::unsupported(self.name(), "sequences"))
    }

    /// `DROP SEQUENCE`.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms without sequences.
    fn drop_sequence_sql(&self, name: &str) -> Result<String> {
        if self.capabilities().sequences {
            Ok(format!("DROP SEQUENCE {}", self.quote_name(name)))
        } else {
            Err(SynthError::unsupported(self.name(), "sequences"))
        }
    }

    /// Empties a table.
    fn truncate_table_sql(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_name(table))
    }

    // ========================================================================
    // Query fragments
    // ========================================================================

    /// Clause appended to a `SELECT` to lock rows.
    fn lock_clause(&self, _mode: LockMode) -> Option<&'static str> {
        Some("FOR UPDATE")
    }

    /// Hint attached to each table of the `FROM` clause to lock rows.
    fn lock_table_hint(&self, _mode: LockMode) -> Option<&'static str> {
        None
    }

    // ========================================================================
    // Transactions and expressions
    // ========================================================================

    /// Opens a savepoint.
    fn create_savepoint_sql(&self, name: &str) -> String {
        format!("SAVEPOINT {}", self.quote_name(name))
    }

    /// Releases a savepoint, or `None` where savepoints end with their
    /// transaction.
    fn release_savepoint_sql(&self, name: &str) -> Option<String> {
        Some(format!("RELEASE SAVEPOINT {}", self.quote_name(name)))
    }

    /// Rolls back to a savepoint.
    fn rollback_savepoint_sql(&self, name: &str) -> String {
        format!("ROLLBACK TO SAVEPOINT {}", self.quote_name(name))
    }

    /// Sets the isolation level of subsequent transactions.
    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!("SET TRANSACTION ISOLATION LEVEL {level}")
    }

    /// Concatenates string expressions.
    fn concat_expression(&self, parts: &[&str]) -> String {
        parts.join(" || ")
    }

    /// Substring of `string` from the 1-based `start`, to the end when no
    /// length is given.
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string} FROM {start} FOR {length})"),
            None => format!("SUBSTRING({string} FROM {start})"),
        }
    }

    /// Shifts a date expression by `interval` units.
    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String;

    /// `date + interval unit`.
    fn date_add_expression(&self, date: &str, interval: &str, unit: IntervalUnit) -> String {
        self.date_arithmetic_expression(date, DateOperator::Add, interval, unit)
    }

    /// `date - interval unit`.
    fn date_sub_expression(&self, date: &str, interval: &str, unit: IntervalUnit) -> String {
        self.date_arithmetic_expression(date, DateOperator::Sub, interval, unit)
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Declares one column as in `CREATE TABLE`.
    fn column_declaration(&self, column: &Column) -> Statements {
        let mut out = Statements::new();
        let (sql, _) = ddl::column_declaration(self, column, ddl::Declare::FULL, &mut out);
        out.push(sql);
        out
    }

    /// Creates a table with its indexes. Foreign keys are included.
    ///
    /// # Errors
    ///
    /// Fails if the table is invalid or uses an unsupported construct.
    fn create_table(&self, table: &Table) -> Result<Statements> {
        ddl::create_table(self, table)
    }

    /// Creates several tables, emitting every foreign key after every table.
    ///
    /// # Errors
    ///
    /// Fails if any table is invalid or uses an unsupported construct.
    fn create_tables(&self, tables: &[Table]) -> Result<Statements> {
        ddl::create_tables(self, tables)
    }

    /// Drops a table.
    fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.quote_name(name))
    }

    /// Drops several tables, removing every foreign key first.
    fn drop_tables(&self, tables: &[Table]) -> Statements {
        ddl::drop_tables(self, tables)
    }

    /// Creates an index on an existing table.
    ///
    /// # Errors
    ///
    /// Fails for indexes without columns or unsupported index features.
    fn create_index(&self, index: &Index, table: &str) -> Result<String> {
        ddl::create_index(self, index, table)
    }

    /// Drops an index.
    fn drop_index(&self, index: &Index, table: &str) -> String {
        self.drop_index_sql(index, table)
    }

    /// Adds a foreign key to an existing table.
    ///
    /// # Errors
    ///
    /// Fails for malformed foreign keys, unsupported actions, or platforms
    /// that cannot alter foreign keys.
    fn create_foreign_key(&self, fk: &ForeignKeyConstraint, table: &str) -> Result<Statements> {
        let mut out = Statements::new();
        let sql = ddl::create_foreign_key(self, fk, table, &mut out)?;
        out.push(sql);
        Ok(out)
    }

    /// Adds a unique constraint to an existing table.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidDefinition`] for constraints without columns.
    fn create_unique_constraint(
        &self,
        constraint: &UniqueConstraint,
        table: &str,
    ) -> Result<String> {
        ddl::create_unique_constraint(self, constraint, table)
    }

    /// Drops a foreign key.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms that cannot alter
    /// foreign keys.
    fn drop_foreign_key(&self, name: &str, table: &str) -> Result<String> {
        if self.capabilities().inline_foreign_keys {
            return Err(SynthError::unsupported(
                self.name(),
                "dropping foreign keys of an existing table",
            ));
        }
        Ok(self.drop_foreign_key_sql(name, table))
    }

    /// Creates a sequence.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms without sequences.
    fn create_sequence(&self, sequence: &Sequence) -> Result<String> {
        self.create_sequence_sql(sequence)
    }

    /// Drops a sequence.
    ///
    /// # Errors
    ///
    /// [`SynthError::UnsupportedFeature`] on platforms without sequences.
    fn drop_sequence(&self, name: &str) -> Result<String> {
        self.drop_sequence_sql(name)
    }

    /// Renames a table.
    fn rename_table(&self, old_name: &str, new_name: &str) -> Vec<String> {
        self.rename_table_sql(old_name, new_name)
    }

    /// Empties a table.
    fn truncate_table(&self, table: &str) -> String {
        self.truncate_table_sql(table)
    }

    /// Turns a table diff into statements.
    ///
    /// # Errors
    ///
    /// Fails if the diff is inconsistent or needs an unsupported construct.
    /// Nothing is returned in that case.
    fn alter_table(&self, diff: &TableDiff) -> Result<Statements> {
        alter::alter_table(self, diff)
    }

    /// Turns a schema diff into statements.
    ///
    /// # Errors
    ///
    /// Fails if any part of the diff fails.
    fn migrate_schema(&self, diff: &SchemaDiff) -> Result<Statements> {
        ddl::migrate_schema(self, diff)
    }

    /// Creates every table and sequence of a schema.
    ///
    /// # Errors
    ///
    /// Fails if any table is invalid or a sequence is unsupported.
    fn create_schema(&self, schema: &Schema) -> Result<Statements> {
        ddl::create_schema(self, schema)
    }

    /// Renders a structured query.
    ///
    /// # Errors
    ///
    /// Fails if the query is incomplete or inconsistent.
    fn render_query(&self, parts: &QueryParts) -> Result<RenderedQuery> {
        query::render(self, parts)
    }

    /// Applies a row window to an arbitrary `SELECT`.
    fn modify_limit_query(&self, sql: &str, limit: Option<u64>, offset: u64) -> String {
        query::limit_query(self, sql, limit, offset)
    }
}

/// Renders a default value with the platform's literal syntax.
pub(crate) fn literal_default<P: Platform + ?Sized>(platform: &P, value: &DefaultValue) -> String {
    match value {
        DefaultValue::Boolean(b) => platform.boolean_literal(*b).to_string(),
        DefaultValue::Integer(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::String(s) => platform.quote_string_literal(s),
        DefaultValue::CurrentTimestamp => platform.current_timestamp_sql().to_string(),
        DefaultValue::CurrentDate => platform.current_date_sql().to_string(),
        DefaultValue::CurrentTime => platform.current_time_sql().to_string(),
        DefaultValue::Expression(e) => e.clone(),
    }
}

/// Literal default derived from the logical type alone.
pub(crate) fn synthesized_literal(column: &Column) -> DefaultValue {
    match column.logical_type {
        LogicalType::Boolean => DefaultValue::Boolean(false),
        LogicalType::SmallInt
        | LogicalType::Integer
        | LogicalType::BigInt
        | LogicalType::Decimal { .. }
        | LogicalType::Float => DefaultValue::Integer(0),
        LogicalType::Date => DefaultValue::CurrentDate,
        LogicalType::Time => DefaultValue::CurrentTime,
        LogicalType::DateTime | LogicalType::DateTimeTz => DefaultValue::CurrentTimestamp,
        LogicalType::String { .. }
        | LogicalType::Clob
        | LogicalType::Json
        | LogicalType::Binary { .. }
        | LogicalType::Blob
        | LogicalType::Guid => DefaultValue::String(String::new()),
    }
}

/// Length requested for a string or binary, with the documented default.
pub(crate) fn requested_length(logical_type: &LogicalType) -> u32 {
    logical_type
        .length()
        .unwrap_or(crate::schema::DEFAULT_STRING_LENGTH)
}

/// `NUMERIC(p, s)`-style declaration with defaults applied.
pub(crate) fn numeric_declaration(keyword: &str, logical_type: &LogicalType) -> String {
    let (precision, scale) = logical_type.precision_and_scale();
    format!("{keyword}({precision}, {scale})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_name_as_needed() {
        let p = MySqlPlatform::new();
        assert_eq!(p.quote_name("users"), "users");
        assert_eq!(p.quote_name("order"), "`order`");
        assert_eq!(p.quote_name("my table"), "`my table`");
        assert_eq!(p.quote_name("1st"), "`1st`");
        assert_eq!(p.quote_name("\"users\""), "`users`");
        assert_eq!(p.quote_name("app.order"), "app.`order`");
    }

    #[test]
    fn test_quote_name_always() {
        let p = PostgreSqlPlatform::new().with_config(PlatformConfig::quote_all());
        assert_eq!(p.quote_name("users"), "\"users\"");
        assert_eq!(p.quote_name("public.users"), "\"public\".\"users\"");
    }

    #[test]
    fn test_quote_identifier_round_trip() {
        let platforms: [&dyn Platform; 3] = [
            &MySqlPlatform::new(),
            &SqlServerPlatform::new(),
            &OraclePlatform::new(),
        ];
        for p in platforms {
            for name in ["a", "odd`name", "odd\"name", "odd]name", "schema.table"] {
                assert_eq!(p.unquote_identifier(&p.quote_identifier(name)), name);
            }
        }
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            PostgreSqlPlatform::new().quote_string_literal("O'Brien"),
            "'O''Brien'"
        );
        assert_eq!(
            MySqlPlatform::new().quote_string_literal(r"C:\dir 'x'"),
            r"'C:\\dir ''x'''"
        );
    }

    #[test]
    fn test_numeric_declaration_defaults() {
        assert_eq!(
            numeric_declaration("NUMERIC", &LogicalType::Decimal {
                precision: None,
                scale: None
            }),
            "NUMERIC(10, 0)"
        );
        assert_eq!(
            numeric_declaration("DECIMAL", &LogicalType::decimal(12, 2)),
            "DECIMAL(12, 2)"
        );
    }
}

//! SQLite.
//!
//! Foreign keys can only be declared inside `CREATE TABLE`, and most
//! column changes rebuild the table through a temporary copy.

use crate::registry::PlatformKind;
use crate::schema::{Column, LogicalType, UniqueConstraint};

use super::keywords::{KeywordList, SQLITE_KEYWORDS};
use super::{
    numeric_declaration, requested_length, AlterStrategy, AutoincrementStrategy, Capabilities,
    DateOperator, IdentifierQuoting, IntervalUnit, LimitStrategy, LockMode, NewColumnDefault,
    Platform, PlatformConfig, TransactionIsolation, TypeDeclaration,
};

/// SQLite platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePlatform {
    config: PlatformConfig,
}

impl SqlitePlatform {
    /// Creates the platform with the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: PlatformConfig {
                identifier_quoting: IdentifierQuoting::AsNeeded,
            },
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }
}

impl Platform for SqlitePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Sqlite
    }

    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('"', '"'),
            varchar_max_length: u32::MAX,
            char_max_length: u32::MAX,
            binary_max_length: u32::MAX,
            limit: LimitStrategy::LimitOffset {
                unbounded: Some("-1"),
            },
            alter: AlterStrategy::Rebuild,
            sequences: false,
            partial_indexes: true,
            rename_index: false,
            inline_comments: false,
            inline_indexes: false,
            inline_foreign_keys: true,
            default_constraints: false,
            new_column_default: NewColumnDefault::AsDeclared,
            dummy_table: None,
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &SQLITE_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let ty = &column.logical_type;
        let unsigned = |sql: &str| {
            if column.unsigned {
                format!("{sql} UNSIGNED")
            } else {
                sql.to_string()
            }
        };

        match ty {
            LogicalType::SmallInt | LogicalType::Integer | LogicalType::BigInt
                if column.autoincrement =>
            {
                // Only an INTEGER PRIMARY KEY aliases the rowid.
                TypeDeclaration::new("INTEGER PRIMARY KEY AUTOINCREMENT")
                    .with_autoincrement(AutoincrementStrategy::PrimaryKeyType)
            }
            LogicalType::Boolean => TypeDeclaration::new("BOOLEAN"),
            LogicalType::SmallInt => TypeDeclaration::new(unsigned("SMALLINT")),
            LogicalType::Integer => TypeDeclaration::new(unsigned("INTEGER")),
            LogicalType::BigInt => TypeDeclaration::new(unsigned("BIGINT")),
            LogicalType::Decimal { .. } => {
                TypeDeclaration::new(unsigned(&numeric_declaration("NUMERIC", ty)))
            }
            LogicalType::Float => TypeDeclaration::new(unsigned("DOUBLE PRECISION")),
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                if *fixed {
                    TypeDeclaration::new(format!("CHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR({length})"))
                }
            }
            LogicalType::Binary { .. } | LogicalType::Blob => TypeDeclaration::new("BLOB"),
            LogicalType::Clob | LogicalType::Json => TypeDeclaration::new("CLOB"),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::new("TIME"),
            LogicalType::DateTime | LogicalType::DateTimeTz => TypeDeclaration::new("DATETIME"),
            LogicalType::Guid => TypeDeclaration::new("CHAR(36)"),
        }
    }

    fn table_comment_sql(&self, _table: &str, _comment: Option<&str>) -> Option<String> {
        None
    }

    fn column_comment_sql(
        &self,
        _table: &str,
        _column: &str,
        _old: Option<&str>,
        _new: Option<&str>,
    ) -> Option<String> {
        None
    }

    fn unique_constraint_sql(&self, constraint: &UniqueConstraint, table: &str) -> String {
        // Constraints cannot be added to an existing table.
        format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            self.quote_name(&constraint.name),
            self.quote_name(table),
            crate::ddl::column_list(self, &constraint.columns)
        )
    }

    fn truncate_table_sql(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.quote_name(table))
    }

    fn lock_clause(&self, _mode: LockMode) -> Option<&'static str> {
        None
    }

    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        // Only dirty reads can be toggled, per connection.
        let uncommitted = u8::from(level == TransactionIsolation::ReadUncommitted);
        format!("PRAGMA read_uncommitted = {uncommitted}")
    }

    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        let length = length.map_or_else(|| format!("LENGTH({string})"), str::to_string);
        format!("SUBSTR({string}, {start}, {length})")
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String {
        let function = match unit {
            IntervalUnit::Second | IntervalUnit::Minute | IntervalUnit::Hour => "DATETIME",
            _ => "DATE",
        };
        let (interval, unit) = unit.without_weeks_and_quarters(interval);
        // The modifier is a string literal; splice non-literal intervals in.
        let interval = if interval.trim().parse::<i64>().is_ok() {
            interval
        } else {
            format!("' || {interval} || '")
        };
        format!(
            "{function}({date}, '{}{interval} {}')",
            operator.sign(),
            unit.as_sql().to_lowercase()
        )
    }
}

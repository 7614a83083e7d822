//! PostgreSQL.

use crate::error::Result;
use crate::registry::PlatformKind;
use crate::schema::identifier::{base_name, unquoted};
use crate::schema::{Column, Index, LogicalType, Sequence, TableOptions};

use super::keywords::{KeywordList, POSTGRESQL_KEYWORDS};
use super::{
    numeric_declaration, requested_length, AlterStrategy, AutoincrementStrategy, Capabilities,
    DateOperator, IdentifierQuoting, IntervalUnit, LimitStrategy, LockMode, NewColumnDefault,
    Platform, PlatformConfig, TransactionIsolation, TypeDeclaration,
};

/// Longest `VARCHAR` PostgreSQL accepts.
const VARCHAR_MAX_LENGTH: u32 = 10_485_760;

/// Index access methods selectable through index flags.
const INDEX_METHODS: [&str; 4] = ["gin", "gist", "hash", "brin"];

/// PostgreSQL platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSqlPlatform {
    config: PlatformConfig,
}

impl PostgreSqlPlatform {
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

    /// Name of the sequence backing an autoincrement column.
    pub(crate) fn serial_sequence_name(table: &str, column: &str) -> String {
        format!("{}_{}_seq", base_name(table), unquoted(column))
    }
}

impl Platform for PostgreSqlPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::PostgreSql
    }

    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('"', '"'),
            varchar_max_length: VARCHAR_MAX_LENGTH,
            char_max_length: VARCHAR_MAX_LENGTH,
            binary_max_length: u32::MAX,
            limit: LimitStrategy::LimitOffset { unbounded: None },
            alter: AlterStrategy::PerClause,
            sequences: true,
            partial_indexes: true,
            rename_index: true,
            inline_comments: false,
            inline_indexes: false,
            inline_foreign_keys: false,
            default_constraints: false,
            new_column_default: NewColumnDefault::AsDeclared,
            dummy_table: None,
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &POSTGRESQL_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let ty = &column.logical_type;
        let integer = |plain: &str, serial: &str| {
            if column.autoincrement {
                TypeDeclaration::new(serial)
                    .with_autoincrement(AutoincrementStrategy::FoldedIntoType)
            } else {
                TypeDeclaration::new(plain)
            }
        };

        match ty {
            LogicalType::Boolean => TypeDeclaration::new("BOOLEAN"),
            LogicalType::SmallInt => integer("SMALLINT", "SMALLSERIAL"),
            LogicalType::Integer => integer("INT", "SERIAL"),
            LogicalType::BigInt => integer("BIGINT", "BIGSERIAL"),
            LogicalType::Decimal { .. } => TypeDeclaration::new(numeric_declaration("NUMERIC", ty)),
            LogicalType::Float => TypeDeclaration::new("DOUBLE PRECISION"),
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                if length > VARCHAR_MAX_LENGTH {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        VARCHAR_MAX_LENGTH,
                        String::from("TEXT"),
                    )
                } else if *fixed {
                    TypeDeclaration::new(format!("CHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR({length})"))
                }
            }
            LogicalType::Binary { .. } | LogicalType::Blob => TypeDeclaration::new("BYTEA"),
            LogicalType::Clob => TypeDeclaration::new("TEXT"),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::new("TIME(0) WITHOUT TIME ZONE"),
            LogicalType::DateTime => TypeDeclaration::new("TIMESTAMP(0) WITHOUT TIME ZONE"),
            LogicalType::DateTimeTz => TypeDeclaration::new("TIMESTAMP(0) WITH TIME ZONE"),
            LogicalType::Guid => TypeDeclaration::new("UUID"),
            LogicalType::Json => {
                if column.has_option("jsonb") {
                    TypeDeclaration::new("JSONB")
                } else {
                    TypeDeclaration::new("JSON")
                }
            }
        }
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE TEMPORARY TABLE"
        } else if options.unlogged {
            "CREATE UNLOGGED TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    fn index_method_clause(&self, index: &Index) -> Option<String> {
        INDEX_METHODS
            .iter()
            .find(|m| index.has_flag(m))
            .map(|m| format!(" USING {m}"))
    }

    fn drop_index_sql(&self, index: &Index, table: &str) -> String {
        if index.primary {
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote_name(table),
                self.quote_name(&format!("{}_pkey", base_name(table)))
            )
        } else {
            format!("DROP INDEX {}", self.quote_name(&index.name))
        }
    }

    fn create_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        let mut sql = format!(
            "CREATE SEQUENCE {} INCREMENT BY {} MINVALUE {} START {}",
            self.quote_name(&sequence.name),
            sequence.allocation_size,
            sequence.initial_value,
            sequence.initial_value
        );
        if let Some(cache) = sequence.cache_size {
            sql.push_str(&format!(" CACHE {cache}"));
        }
        Ok(sql)
    }

    fn alter_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        let mut sql = format!(
            "ALTER SEQUENCE {} INCREMENT BY {}",
            self.quote_name(&sequence.name),
            sequence.allocation_size
        );
        if let Some(cache) = sequence.cache_size {
            sql.push_str(&format!(" CACHE {cache}"));
        }
        Ok(sql)
    }

    fn lock_clause(&self, mode: LockMode) -> Option<&'static str> {
        Some(match mode {
            LockMode::PessimisticRead => "FOR SHARE",
            LockMode::PessimisticWrite => "FOR UPDATE",
        })
    }

    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!("SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL {level}")
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String {
        let (interval, unit) = unit.without_weeks_and_quarters(interval);
        format!(
            "({date} {} ({interval} || ' {unit}')::interval)",
            operator.sign()
        )
    }
}

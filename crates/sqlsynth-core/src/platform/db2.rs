//! IBM DB2 for Linux, Unix and Windows.

use crate::error::{Result, SynthError};
use crate::registry::PlatformKind;
use crate::schema::{
    Column, Index, LogicalType, ReferentialAction, ReferentialEvent, Sequence, TableOptions,
};

use super::keywords::{KeywordList, DB2_KEYWORDS};
use super::{
    numeric_declaration, requested_length, AlterStrategy, AutoincrementStrategy, Capabilities,
    DateOperator, IdentifierQuoting, IntervalUnit, LimitStrategy, LockMode, NewColumnDefault,
    Platform, PlatformConfig, ResolvedAction, TransactionIsolation, TypeDeclaration,
};

const VARCHAR_MAX_LENGTH: u32 = 32_704;
const CHAR_MAX_LENGTH: u32 = 254;

/// DB2 platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Platform {
    config: PlatformConfig,
}

impl Db2Platform {
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

/// `CALL SYSPROC.ADMIN_CMD` reorganizing a table after column changes.
pub(crate) fn reorg_table<P: Platform + ?Sized>(platform: &P, table: &str) -> String {
    let command = format!("REORG TABLE {}", platform.quote_name(table));
    format!(
        "CALL SYSPROC.ADMIN_CMD ({})",
        platform.quote_string_literal(&command)
    )
}

impl Platform for Db2Platform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Db2
    }

    fn name(&self) -> &'static str {
        "DB2"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('"', '"'),
            varchar_max_length: VARCHAR_MAX_LENGTH,
            char_max_length: CHAR_MAX_LENGTH,
            binary_max_length: VARCHAR_MAX_LENGTH,
            limit: LimitStrategy::RowNumber,
            alter: AlterStrategy::Reorg,
            sequences: true,
            partial_indexes: false,
            rename_index: true,
            inline_comments: false,
            inline_indexes: false,
            inline_foreign_keys: false,
            default_constraints: false,
            new_column_default: NewColumnDefault::WithDefaultClause,
            dummy_table: Some("SYSIBM.SYSDUMMY1"),
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &DB2_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let ty = &column.logical_type;
        let integer = |sql: &str| {
            let declaration = TypeDeclaration::new(sql);
            if column.autoincrement {
                declaration.with_autoincrement(AutoincrementStrategy::TrailingClause(
                    " GENERATED BY DEFAULT AS IDENTITY",
                ))
            } else {
                declaration
            }
        };

        match ty {
            LogicalType::Boolean => TypeDeclaration::new("SMALLINT"),
            LogicalType::SmallInt => integer("SMALLINT"),
            LogicalType::Integer => integer("INTEGER"),
            LogicalType::BigInt => integer("BIGINT"),
            LogicalType::Decimal { .. } => TypeDeclaration::new(numeric_declaration("DECIMAL", ty)),
            LogicalType::Float => TypeDeclaration::new("DOUBLE"),
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                let maximum = if *fixed {
                    CHAR_MAX_LENGTH
                } else {
                    VARCHAR_MAX_LENGTH
                };
                if length > maximum {
                    TypeDeclaration::escalated(column, length, maximum, String::from("CLOB(1M)"))
                } else if *fixed {
                    TypeDeclaration::new(format!("CHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR({length})"))
                }
            }
            LogicalType::Binary { fixed, .. } => {
                let length = requested_length(ty);
                let maximum = if *fixed {
                    CHAR_MAX_LENGTH
                } else {
                    VARCHAR_MAX_LENGTH
                };
                if length > maximum {
                    TypeDeclaration::escalated(column, length, maximum, String::from("BLOB(1M)"))
                } else if *fixed {
                    TypeDeclaration::new(format!("CHAR({length}) FOR BIT DATA"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR({length}) FOR BIT DATA"))
                }
            }
            LogicalType::Blob => TypeDeclaration::new("BLOB(1M)"),
            LogicalType::Clob | LogicalType::Json => TypeDeclaration::new("CLOB(1M)"),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::new("TIME"),
            LogicalType::DateTime => TypeDeclaration::new("TIMESTAMP(0)"),
            LogicalType::DateTimeTz => TypeDeclaration::approximated(column, "TIMESTAMP(0)"),
            LogicalType::Guid => TypeDeclaration::new("CHAR(36)"),
        }
    }

    fn current_timestamp_sql(&self) -> &'static str {
        "CURRENT TIMESTAMP"
    }

    fn current_date_sql(&self) -> &'static str {
        "CURRENT DATE"
    }

    fn current_time_sql(&self) -> &'static str {
        "CURRENT TIME"
    }

    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE GLOBAL TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    fn resolve_referential_action(
        &self,
        action: ReferentialAction,
        event: ReferentialEvent,
    ) -> Result<ResolvedAction> {
        match (event, action) {
            (_, ReferentialAction::SetDefault) => Err(SynthError::unsupported(
                self.name(),
                format!("{} SET DEFAULT", event.as_sql()),
            )),
            (
                ReferentialEvent::Update,
                ReferentialAction::Cascade | ReferentialAction::SetNull,
            ) => Err(SynthError::unsupported(
                self.name(),
                format!("ON UPDATE {action}"),
            )),
            _ => Ok(ResolvedAction::Clause(action)),
        }
    }

    fn rename_index_sql(&self, old_name: &str, index: &Index, _table: &str) -> Option<String> {
        Some(format!(
            "RENAME INDEX {} TO {}",
            self.quote_name(old_name),
            self.quote_name(&index.name)
        ))
    }

    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> Vec<String> {
        vec![format!(
            "RENAME TABLE {} TO {}",
            self.quote_name(old_name),
            self.quote_name(new_name)
        )]
    }

    fn create_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        let cache = match sequence.cache_size {
            None => String::new(),
            Some(0 | 1) => String::from(" NO CACHE"),
            Some(n) => format!(" CACHE {n}"),
        };
        Ok(format!(
            "CREATE SEQUENCE {} INCREMENT BY {} MINVALUE {} START WITH {}{cache}",
            self.quote_name(&sequence.name),
            sequence.allocation_size,
            sequence.initial_value,
            sequence.initial_value
        ))
    }

    fn alter_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        Ok(format!(
            "ALTER SEQUENCE {} INCREMENT BY {}",
            self.quote_name(&sequence.name),
            sequence.allocation_size
        ))
    }

    fn truncate_table_sql(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {} IMMEDIATE", self.quote_name(table))
    }

    fn lock_clause(&self, mode: LockMode) -> Option<&'static str> {
        Some(match mode {
            LockMode::PessimisticRead => "WITH RR USE AND KEEP SHARE LOCKS",
            LockMode::PessimisticWrite => "WITH RR USE AND KEEP UPDATE LOCKS",
        })
    }

    fn create_savepoint_sql(&self, name: &str) -> String {
        format!("SAVEPOINT {} ON ROLLBACK RETAIN CURSORS", self.quote_name(name))
    }

    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let code = match level {
            TransactionIsolation::ReadUncommitted => "UR",
            TransactionIsolation::ReadCommitted => "CS",
            TransactionIsolation::RepeatableRead => "RS",
            TransactionIsolation::Serializable => "RR",
        };
        format!("SET CURRENT ISOLATION = {code}")
    }

    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTR({string}, {start}, {length})"),
            None => format!("SUBSTR({string}, {start})"),
        }
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String {
        let (interval, unit) = unit.without_weeks_and_quarters(interval);
        format!("({date} {} {interval} {unit})", operator.sign())
    }
}

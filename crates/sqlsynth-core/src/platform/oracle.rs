//! Oracle.
//!
//! Autoincrement is emulated with a sequence and a trigger, row windows use
//! `ROWNUM`, and column changes are grouped into `ADD (...)`,
//! `MODIFY (...)` and `DROP (...)`.

use crate::error::{Result, SynthError};
use crate::registry::PlatformKind;
use crate::schema::identifier::base_name;
use crate::schema::{
    Column, LogicalType, ReferentialAction, ReferentialEvent, Sequence, TableOptions,
};

use super::keywords::{KeywordList, ORACLE_KEYWORDS};
use super::{
    fragments::multiply_interval, numeric_declaration, requested_length, AlterStrategy,
    AutoincrementStrategy, Capabilities, DateOperator, IdentifierQuoting, IntervalUnit,
    LimitStrategy, NewColumnDefault, Platform, PlatformConfig, ResolvedAction, TransactionIsolation,
    TypeDeclaration,
};

const VARCHAR_MAX_LENGTH: u32 = 4000;
const CHAR_MAX_LENGTH: u32 = 2000;
const BINARY_MAX_LENGTH: u32 = 2000;

/// Oracle platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct OraclePlatform {
    config: PlatformConfig,
}

impl OraclePlatform {
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

    /// Sequence feeding the autoincrement column of a table.
    #[must_use]
    pub fn identity_sequence_name(table: &str) -> String {
        format!("{}_SEQ", base_name(table).to_ascii_uppercase())
    }

    /// Trigger assigning the autoincrement column of a table.
    #[must_use]
    pub fn identity_trigger_name(table: &str) -> String {
        format!("{}_AI_PK", base_name(table).to_ascii_uppercase())
    }

    fn sequence_cache(sequence: &Sequence) -> String {
        match sequence.cache_size {
            None => String::new(),
            Some(0 | 1) => String::from(" NOCACHE"),
            Some(n) => format!(" CACHE {n}"),
        }
    }
}

impl Platform for OraclePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Oracle
    }

    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('"', '"'),
            varchar_max_length: VARCHAR_MAX_LENGTH,
            char_max_length: CHAR_MAX_LENGTH,
            binary_max_length: BINARY_MAX_LENGTH,
            limit: LimitStrategy::RowNum,
            alter: AlterStrategy::Grouped,
            sequences: true,
            partial_indexes: false,
            rename_index: true,
            inline_comments: false,
            inline_indexes: false,
            inline_foreign_keys: false,
            default_constraints: false,
            new_column_default: NewColumnDefault::SynthesizeLiteral,
            dummy_table: Some("DUAL"),
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &ORACLE_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let ty = &column.logical_type;
        let integer = |sql: &str| {
            let declaration = TypeDeclaration::new(sql);
            if column.autoincrement {
                declaration.with_autoincrement(AutoincrementStrategy::Emulated)
            } else {
                declaration
            }
        };

        match ty {
            LogicalType::Boolean => TypeDeclaration::new("NUMBER(1)"),
            LogicalType::SmallInt => integer("NUMBER(5)"),
            LogicalType::Integer => integer("NUMBER(10)"),
            LogicalType::BigInt => integer("NUMBER(20)"),
            LogicalType::Decimal { .. } => TypeDeclaration::new(numeric_declaration("NUMBER", ty)),
            LogicalType::Float => TypeDeclaration::new("DOUBLE PRECISION"),
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                let maximum = if *fixed {
                    CHAR_MAX_LENGTH
                } else {
                    VARCHAR_MAX_LENGTH
                };
                if length > maximum {
                    TypeDeclaration::escalated(column, length, maximum, String::from("CLOB"))
                } else if *fixed {
                    TypeDeclaration::new(format!("CHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR2({length})"))
                }
            }
            LogicalType::Binary { .. } => {
                let length = requested_length(ty);
                if length > BINARY_MAX_LENGTH {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        BINARY_MAX_LENGTH,
                        String::from("BLOB"),
                    )
                } else {
                    TypeDeclaration::new(format!("RAW({length})"))
                }
            }
            LogicalType::Blob => TypeDeclaration::new("BLOB"),
            LogicalType::Clob | LogicalType::Json => TypeDeclaration::new("CLOB"),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::approximated(column, "DATE"),
            LogicalType::DateTime => TypeDeclaration::new("TIMESTAMP(0)"),
            LogicalType::DateTimeTz => TypeDeclaration::new("TIMESTAMP(0) WITH TIME ZONE"),
            LogicalType::Guid => TypeDeclaration::new("CHAR(36)"),
        }
    }

    fn current_time_sql(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
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
            // NO ACTION is the implicit behaviour and RESTRICT does not parse.
            (_, ReferentialAction::NoAction | ReferentialAction::Restrict) => {
                Ok(ResolvedAction::Omitted)
            }
            (ReferentialEvent::Update, _) => Err(SynthError::unsupported(
                self.name(),
                format!("ON UPDATE {action}"),
            )),
            (ReferentialEvent::Delete, ReferentialAction::SetDefault) => Err(
                SynthError::unsupported(self.name(), "ON DELETE SET DEFAULT"),
            ),
            (ReferentialEvent::Delete, _) => Ok(ResolvedAction::Clause(action)),
        }
    }

    fn autoincrement_sql(&self, table: &str, column: &Column) -> Vec<String> {
        let sequence = self.quote_name(&Self::identity_sequence_name(table));
        let trigger = self.quote_name(&Self::identity_trigger_name(table));
        let column = self.quote_name(&column.name);
        vec![
            format!("CREATE SEQUENCE {sequence} START WITH 1 MINVALUE 1 INCREMENT BY 1"),
            format!(
                "CREATE TRIGGER {trigger} BEFORE INSERT ON {} FOR EACH ROW BEGIN \
                 IF (:NEW.{column} IS NULL) THEN \
                 SELECT {sequence}.NEXTVAL INTO :NEW.{column} FROM DUAL; \
                 END IF; END;",
                self.quote_name(table)
            ),
        ]
    }

    fn drop_autoincrement_sql(&self, table: &str) -> Vec<String> {
        vec![format!(
            "DROP SEQUENCE {}",
            self.quote_name(&Self::identity_sequence_name(table))
        )]
    }

    fn create_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        Ok(format!(
            "CREATE SEQUENCE {} START WITH {} MINVALUE {} INCREMENT BY {}{}",
            self.quote_name(&sequence.name),
            sequence.initial_value,
            sequence.initial_value,
            sequence.allocation_size,
            Self::sequence_cache(sequence)
        ))
    }

    fn alter_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        Ok(format!(
            "ALTER SEQUENCE {} INCREMENT BY {}{}",
            self.quote_name(&sequence.name),
            sequence.allocation_size,
            Self::sequence_cache(sequence)
        ))
    }

    fn release_savepoint_sql(&self, _name: &str) -> Option<String> {
        None
    }

    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        // Oracle offers READ COMMITTED and SERIALIZABLE only.
        let level = match level {
            TransactionIsolation::ReadUncommitted | TransactionIsolation::ReadCommitted => {
                TransactionIsolation::ReadCommitted
            }
            TransactionIsolation::RepeatableRead | TransactionIsolation::Serializable => {
                TransactionIsolation::Serializable
            }
        };
        format!("SET TRANSACTION ISOLATION LEVEL {level}")
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
        let sign = operator.sign();
        let months = match unit {
            IntervalUnit::Month => Some(interval.to_string()),
            IntervalUnit::Quarter => Some(multiply_interval(interval, 3)),
            IntervalUnit::Year => Some(multiply_interval(interval, 12)),
            _ => None,
        };
        if let Some(months) = months {
            return format!("ADD_MONTHS({date}, {sign}{months})");
        }
        // Date arithmetic counts in days.
        let scale = match unit {
            IntervalUnit::Second => "/24/60/60",
            IntervalUnit::Minute => "/24/60",
            IntervalUnit::Hour => "/24",
            IntervalUnit::Week => "*7",
            _ => "",
        };
        format!("({date} {sign} {interval}{scale})")
    }
}

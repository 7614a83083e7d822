//! MySQL and MariaDB.
//!
//! Indexes and comments live inside `CREATE TABLE`, column changes are
//! batched in one `ALTER TABLE`, and large strings escalate through the
//! `TINYTEXT`/`TEXT`/`MEDIUMTEXT`/`LONGTEXT` tiers.

use serde::{Deserialize, Serialize};

use crate::registry::PlatformKind;
use crate::schema::{Column, DefaultValue, Index, LogicalType, Table};

use super::keywords::{KeywordList, MYSQL_KEYWORDS};
use super::{
    numeric_declaration, requested_length, AlterStrategy, AutoincrementStrategy, Capabilities,
    DateOperator, IntervalUnit, LimitStrategy, LockMode, NewColumnDefault, Platform, PlatformConfig,
    TransactionIsolation, TypeDeclaration,
};

const LENGTH_LIMIT_TINY: u32 = 255;
const LENGTH_LIMIT_REGULAR: u32 = 65_535;
const LENGTH_LIMIT_MEDIUM: u32 = 16_777_215;

/// Largest row count, used as the limit of an offset-only window.
const LIMIT_ALL: &str = "18446744073709551615";

/// The storage engine that enforces foreign keys.
const TRANSACTIONAL_ENGINE: &str = "InnoDB";

/// Server generation, which decides a few capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MySqlFlavor {
    /// MySQL 5.6: no JSON type, no `RENAME INDEX`.
    MySql56,
    /// MySQL 5.7.
    MySql57,
    /// MySQL 8.0 and later.
    #[default]
    MySql80,
    /// MariaDB 10.5 and later.
    MariaDb,
}

/// MySQL-family platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform {
    flavor: MySqlFlavor,
    config: PlatformConfig,
}

impl MySqlPlatform {
    /// Creates a MySQL 8.0 platform.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flavor: MySqlFlavor::MySql80,
            config: PlatformConfig {
                identifier_quoting: super::IdentifierQuoting::AsNeeded,
            },
        }
    }

    /// Targets another server generation.
    #[must_use]
    pub const fn with_flavor(mut self, flavor: MySqlFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Server generation.
    #[must_use]
    pub const fn flavor(&self) -> MySqlFlavor {
        self.flavor
    }

    fn text_tier(length: Option<u32>) -> &'static str {
        match length {
            Some(l) if l <= LENGTH_LIMIT_TINY => "TINYTEXT",
            Some(l) if l <= LENGTH_LIMIT_REGULAR => "TEXT",
            Some(l) if l <= LENGTH_LIMIT_MEDIUM => "MEDIUMTEXT",
            _ => "LONGTEXT",
        }
    }

    fn blob_tier(length: Option<u32>) -> &'static str {
        match length {
            Some(l) if l <= LENGTH_LIMIT_TINY => "TINYBLOB",
            Some(l) if l <= LENGTH_LIMIT_REGULAR => "BLOB",
            Some(l) if l <= LENGTH_LIMIT_MEDIUM => "MEDIUMBLOB",
            _ => "LONGBLOB",
        }
    }

    fn unsigned(column: &Column, sql: &str) -> String {
        if column.unsigned {
            format!("{sql} UNSIGNED")
        } else {
            sql.to_string()
        }
    }
}

impl Platform for MySqlPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::MySql
    }

    fn name(&self) -> &'static str {
        match self.flavor {
            MySqlFlavor::MariaDb => "MariaDB",
            _ => "MySQL",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('`', '`'),
            varchar_max_length: LENGTH_LIMIT_REGULAR,
            char_max_length: LENGTH_LIMIT_TINY,
            binary_max_length: LENGTH_LIMIT_REGULAR,
            limit: LimitStrategy::LimitOffset {
                unbounded: Some(LIMIT_ALL),
            },
            alter: AlterStrategy::Combined,
            sequences: false,
            partial_indexes: false,
            rename_index: self.flavor != MySqlFlavor::MySql56,
            inline_comments: true,
            inline_indexes: true,
            inline_foreign_keys: false,
            default_constraints: false,
            new_column_default: NewColumnDefault::AsDeclared,
            dummy_table: None,
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &MYSQL_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn quote_string_literal(&self, value: &str) -> String {
        super::quoting::quote_literal(&value.replace('\\', "\\\\"))
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let caps = self.capabilities();
        let ty = &column.logical_type;
        let integer = |sql: &str| {
            let declaration = TypeDeclaration::new(Self::unsigned(column, sql));
            if column.autoincrement {
                declaration.with_autoincrement(AutoincrementStrategy::TrailingClause(
                    " AUTO_INCREMENT",
                ))
            } else {
                declaration
            }
        };

        match ty {
            LogicalType::Boolean => TypeDeclaration::new("TINYINT(1)"),
            LogicalType::SmallInt => integer("SMALLINT"),
            LogicalType::Integer => integer("INT"),
            LogicalType::BigInt => integer("BIGINT"),
            LogicalType::Decimal { .. } => {
                TypeDeclaration::new(Self::unsigned(column, &numeric_declaration("NUMERIC", ty)))
            }
            LogicalType::Float => {
                TypeDeclaration::new(Self::unsigned(column, "DOUBLE PRECISION"))
            }
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                let maximum = if *fixed {
                    caps.char_max_length
                } else {
                    caps.varchar_max_length
                };
                if length > maximum {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        maximum,
                        Self::text_tier(Some(length)).to_string(),
                    )
                } else if *fixed {
                    TypeDeclaration::new(format!("CHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("VARCHAR({length})"))
                }
            }
            LogicalType::Binary { fixed, .. } => {
                let length = requested_length(ty);
                let maximum = if *fixed {
                    LENGTH_LIMIT_TINY
                } else {
                    caps.binary_max_length
                };
                if length > maximum {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        maximum,
                        Self::blob_tier(Some(length)).to_string(),
                    )
                } else if *fixed {
                    TypeDeclaration::new(format!("BINARY({length})"))
                } else {
                    TypeDeclaration::new(format!("VARBINARY({length})"))
                }
            }
            LogicalType::Blob => TypeDeclaration::new(Self::blob_tier(None)),
            LogicalType::Clob => TypeDeclaration::new(Self::text_tier(None)),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::new("TIME"),
            LogicalType::DateTime => {
                if column.has_option("version") {
                    TypeDeclaration::new("TIMESTAMP")
                } else {
                    TypeDeclaration::new("DATETIME")
                }
            }
            LogicalType::DateTimeTz => TypeDeclaration::approximated(column, "DATETIME"),
            LogicalType::Guid => TypeDeclaration::new("CHAR(36)"),
            LogicalType::Json => match self.flavor {
                MySqlFlavor::MySql56 => TypeDeclaration::approximated(column, "LONGTEXT"),
                _ => TypeDeclaration::new("JSON"),
            },
        }
    }

    fn default_value_sql(&self, column: &Column, value: &DefaultValue) -> Option<String> {
        // TEXT, BLOB and JSON columns cannot carry a literal default. Strings
        // and binaries escalate into those tiers once they outgrow VARCHAR.
        let declared = self.declare_type(column).sql;
        if declared.ends_with("TEXT") || declared.ends_with("BLOB") || declared == "JSON" {
            return None;
        }
        Some(super::literal_default(self, value))
    }

    fn charset_clause(&self, charset: &str) -> Option<String> {
        Some(format!(" CHARACTER SET {charset}"))
    }

    fn collation_clause(&self, collation: &str) -> Option<String> {
        Some(format!(" COLLATE {}", self.quote_single_identifier(collation)))
    }

    fn table_options_sql(&self, table: &Table) -> Option<String> {
        let options = &table.options;
        let charset = options.charset.as_deref().unwrap_or("utf8mb4");
        let collation = options.collation.as_deref().unwrap_or("utf8mb4_unicode_ci");
        let engine = options.engine.as_deref().unwrap_or(TRANSACTIONAL_ENGINE);

        let mut sql = format!(
            "DEFAULT CHARACTER SET {charset} COLLATE {} ENGINE = {engine}",
            self.quote_single_identifier(collation)
        );
        if let Some(start) = options.auto_increment {
            sql.push_str(&format!(" AUTO_INCREMENT = {start}"));
        }
        if let Some(comment) = options.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&format!(" COMMENT = {}", self.quote_string_literal(comment)));
        }
        if let Some(row_format) = &options.row_format {
            sql.push_str(&format!(" ROW_FORMAT = {row_format}"));
        }
        Some(sql)
    }

    fn index_kind_prefix(&self, index: &Index) -> &'static str {
        if index.has_flag("fulltext") {
            "FULLTEXT "
        } else if index.has_flag("spatial") {
            "SPATIAL "
        } else if index.unique {
            "UNIQUE "
        } else {
            ""
        }
    }

    fn drop_index_sql(&self, index: &Index, table: &str) -> String {
        if index.primary {
            format!("ALTER TABLE {} DROP PRIMARY KEY", self.quote_name(table))
        } else {
            format!(
                "DROP INDEX {} ON {}",
                self.quote_name(&index.name),
                self.quote_name(table)
            )
        }
    }

    fn rename_index_sql(&self, old_name: &str, index: &Index, table: &str) -> Option<String> {
        if !self.capabilities().rename_index {
            return None;
        }
        Some(format!(
            "ALTER TABLE {} RENAME INDEX {} TO {}",
            self.quote_name(table),
            self.quote_name(old_name),
            self.quote_name(&index.name)
        ))
    }

    fn non_enforcing_engine(&self, table: Option<&Table>) -> Option<String> {
        let engine = Self::engine_of(table);
        (!Self::enforces_foreign_keys(&engine)).then_some(engine)
    }

    fn drop_foreign_key_sql(&self, name: &str, table: &str) -> String {
        format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_name(table),
            self.quote_name(name)
        )
    }

    fn table_comment_sql(&self, table: &str, comment: Option<&str>) -> Option<String> {
        Some(format!(
            "ALTER TABLE {} COMMENT = {}",
            self.quote_name(table),
            self.quote_string_literal(comment.unwrap_or_default())
        ))
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

    fn lock_clause(&self, mode: LockMode) -> Option<&'static str> {
        Some(match mode {
            LockMode::PessimisticRead => "LOCK IN SHARE MODE",
            LockMode::PessimisticWrite => "FOR UPDATE",
        })
    }

    fn set_transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!("SET SESSION TRANSACTION ISOLATION LEVEL {level}")
    }

    fn concat_expression(&self, parts: &[&str]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String {
        let function = match operator {
            DateOperator::Add => "DATE_ADD",
            DateOperator::Sub => "DATE_SUB",
        };
        format!("{function}({date}, INTERVAL {interval} {unit})")
    }
}

impl MySqlPlatform {
    /// Storage engine of a table, defaulting to the transactional engine.
    fn engine_of(table: Option<&Table>) -> String {
        table
            .and_then(|t| t.options.engine.clone())
            .unwrap_or_else(|| TRANSACTIONAL_ENGINE.to_string())
    }

    /// Returns `true` if foreign keys are enforced by the engine.
    fn enforces_foreign_keys(engine: &str) -> bool {
        engine.eq_ignore_ascii_case(TRANSACTIONAL_ENGINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare(column: Column) -> TypeDeclaration {
        MySqlPlatform::new().declare_type(&column)
    }

    #[test]
    fn test_string_types() {
        assert_eq!(declare(Column::new("a", LogicalType::string(100))).sql, "VARCHAR(100)");
        assert_eq!(
            declare(Column::new("a", LogicalType::String {
                length: None,
                fixed: false
            }))
            .sql,
            "VARCHAR(255)"
        );
        assert_eq!(declare(Column::new("a", LogicalType::fixed_string(2))).sql, "CHAR(2)");
    }

    #[test]
    fn test_long_string_escalates_to_text_tier() {
        let declaration = declare(Column::new("bio", LogicalType::string(100_000)));
        assert_eq!(declaration.sql, "MEDIUMTEXT");
        assert_eq!(declaration.diagnostics.len(), 1);
        assert!(matches!(
            declaration.diagnostics[0],
            crate::diagnostics::Diagnostic::ValueRange {
                requested: 100_000,
                maximum: 65_535,
                ..
            }
        ));
    }

    #[test]
    fn test_integer_types() {
        let id = declare(Column::new("id", LogicalType::Integer).autoincrement());
        assert_eq!(id.sql, "INT");
        assert_eq!(
            id.autoincrement,
            AutoincrementStrategy::TrailingClause(" AUTO_INCREMENT")
        );
        assert_eq!(
            declare(Column::new("n", LogicalType::BigInt).unsigned()).sql,
            "BIGINT UNSIGNED"
        );
        assert_eq!(declare(Column::new("b", LogicalType::Boolean)).sql, "TINYINT(1)");
    }

    #[test]
    fn test_json_depends_on_flavor() {
        let column = Column::new("doc", LogicalType::Json);
        assert_eq!(MySqlPlatform::new().declare_type(&column).sql, "JSON");
        let old = MySqlPlatform::new()
            .with_flavor(MySqlFlavor::MySql56)
            .declare_type(&column);
        assert_eq!(old.sql, "LONGTEXT");
        assert_eq!(old.diagnostics.len(), 1);
    }

    #[test]
    fn test_rename_index_depends_on_flavor() {
        let index = Index::new("idx_new", &["a"]);
        assert_eq!(
            MySqlPlatform::new().rename_index_sql("idx_old", &index, "t"),
            Some(String::from("ALTER TABLE t RENAME INDEX idx_old TO idx_new"))
        );
        assert_eq!(
            MySqlPlatform::new()
                .with_flavor(MySqlFlavor::MySql56)
                .rename_index_sql("idx_old", &index, "t"),
            None
        );
    }

    #[test]
    fn test_no_default_on_text() {
        let p = MySqlPlatform::new();
        let text = Column::new("t", LogicalType::Clob);
        assert_eq!(
            p.default_value_sql(&text, &DefaultValue::String(String::from("x"))),
            None
        );
        let name = Column::new("n", LogicalType::string(10));
        assert_eq!(
            p.default_value_sql(&name, &DefaultValue::String(String::from("x"))),
            Some(String::from("'x'"))
        );
    }

    #[test]
    fn test_no_default_on_escalated_string() {
        let p = MySqlPlatform::new();
        let bio = Column::new("bio", LogicalType::string(100_000))
            .default(DefaultValue::String(String::from("x")));
        assert_eq!(
            p.default_value_sql(&bio, &DefaultValue::String(String::from("x"))),
            None
        );
        let out = p.create_table(&Table::new("posts").column(bio)).unwrap();
        assert!(out.statements[0].contains("bio MEDIUMTEXT NOT NULL"));
        assert!(!out.statements[0].contains("DEFAULT"));

        let blob = Column::new("raw", LogicalType::binary(70_000));
        assert_eq!(
            p.default_value_sql(&blob, &DefaultValue::String(String::from("x"))),
            None
        );
    }

    #[test]
    fn test_myisam_ignores_foreign_keys() {
        let p = MySqlPlatform::new();
        let innodb = Table::new("a");
        let mut myisam = Table::new("b");
        myisam.options.engine = Some(String::from("MyISAM"));
        assert_eq!(p.non_enforcing_engine(Some(&innodb)), None);
        assert_eq!(p.non_enforcing_engine(None), None);
        assert_eq!(
            p.non_enforcing_engine(Some(&myisam)),
            Some(String::from("MyISAM"))
        );
    }

    #[test]
    fn test_transaction_and_expression_fragments() {
        let p = MySqlPlatform::new();
        assert_eq!(p.create_savepoint_sql("sp1"), "SAVEPOINT sp1");
        assert_eq!(
            p.release_savepoint_sql("sp1"),
            Some(String::from("RELEASE SAVEPOINT sp1"))
        );
        assert_eq!(p.rollback_savepoint_sql("sp1"), "ROLLBACK TO SAVEPOINT sp1");
        assert_eq!(
            p.set_transaction_isolation_sql(TransactionIsolation::ReadCommitted),
            "SET SESSION TRANSACTION ISOLATION LEVEL READ COMMITTED"
        );
        assert_eq!(p.concat_expression(&["a", "' '", "b"]), "CONCAT(a, ' ', b)");
        assert_eq!(
            p.substring_expression("name", "2", Some("3")),
            "SUBSTRING(name FROM 2 FOR 3)"
        );
        assert_eq!(
            p.date_add_expression("created_at", "3", IntervalUnit::Day),
            "DATE_ADD(created_at, INTERVAL 3 DAY)"
        );
        assert_eq!(
            p.date_sub_expression("created_at", "1", IntervalUnit::Quarter),
            "DATE_SUB(created_at, INTERVAL 1 QUARTER)"
        );
    }
}

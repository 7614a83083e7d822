//! Microsoft SQL Server.
//!
//! Column defaults are named constraints (`DF_<table>_<column>`) that must
//! be dropped before the column type changes and recreated afterwards.
//! Renames go through `sp_rename` and comments through extended
//! properties.

use crate::error::Result;
use crate::registry::PlatformKind;
use crate::schema::identifier::{base_name, same_name, unquoted};
use crate::schema::{
    Column, DefaultValue, Index, LogicalType, ReferentialAction, ReferentialEvent, Sequence,
    Table, TableOptions, PRIMARY_INDEX_NAME,
};

use super::keywords::{KeywordList, SQLSERVER_KEYWORDS};
use super::{
    numeric_declaration, requested_length, AlterStrategy, AutoincrementStrategy, Capabilities,
    DateOperator, IdentifierQuoting, IntervalUnit, LimitStrategy, LockMode, NewColumnDefault,
    Platform, PlatformConfig, ResolvedAction, TypeDeclaration,
};

const NVARCHAR_MAX_LENGTH: u32 = 4000;
const BINARY_MAX_LENGTH: u32 = 8000;
const DEFAULT_SCHEMA: &str = "dbo";

/// SQL Server platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerPlatform {
    config: PlatformConfig,
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn unicode_literal<P: Platform + ?Sized>(platform: &P, value: &str) -> String {
    format!("N{}", platform.quote_string_literal(value))
}

/// `ALTER TABLE t ADD CONSTRAINT DF_t_c DEFAULT v FOR c`.
pub(crate) fn add_default_constraint<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    column: &Column,
    value: &DefaultValue,
) -> Option<String> {
    let value = platform.default_value_sql(column, value)?;
    Some(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
        platform.quote_name(table),
        platform.quote_name(&SqlServerPlatform::default_constraint_name(table, &column.name)),
        value,
        platform.quote_name(&column.name)
    ))
}

/// `ALTER TABLE t DROP CONSTRAINT DF_t_c`.
pub(crate) fn drop_default_constraint<P: Platform + ?Sized>(
    platform: &P,
    table: &str,
    column: &str,
) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        platform.quote_name(table),
        platform.quote_name(&SqlServerPlatform::default_constraint_name(table, column))
    )
}

/// Renames an object with `sp_rename`.
pub(crate) fn sp_rename<P: Platform + ?Sized>(
    platform: &P,
    object: &str,
    new_name: &str,
    kind: Option<&str>,
) -> String {
    let mut sql = format!(
        "EXEC sp_rename {}, {}",
        unicode_literal(platform, object),
        unicode_literal(platform, new_name)
    );
    if let Some(kind) = kind {
        sql.push_str(", ");
        sql.push_str(&unicode_literal(platform, kind));
    }
    sql
}

impl SqlServerPlatform {
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

    /// Name of the default constraint of a column.
    #[must_use]
    pub fn default_constraint_name(table: &str, column: &str) -> String {
        format!(
            "DF_{}_{}",
            sanitize(base_name(table)),
            sanitize(unquoted(column))
        )
    }

    /// Name of the primary key constraint of a table.
    fn primary_key_name(table: &str, index: &Index) -> String {
        if same_name(&index.name, PRIMARY_INDEX_NAME) {
            format!("PK_{}", sanitize(base_name(table)))
        } else {
            index.name.clone()
        }
    }

    fn schema_and_table(table: &str) -> (&str, &str) {
        match table.rsplit_once('.') {
            Some((schema, name)) => (unquoted(schema), unquoted(name)),
            None => (DEFAULT_SCHEMA, unquoted(table)),
        }
    }

    fn extended_property_sql(
        &self,
        procedure: &str,
        comment: Option<&str>,
        table: &str,
        column: Option<&str>,
    ) -> String {
        let (schema, table) = Self::schema_and_table(table);
        let mut sql = format!("EXEC {procedure} N'MS_Description'");
        if let Some(comment) = comment {
            sql.push_str(&format!(", {}", unicode_literal(self, comment)));
        }
        sql.push_str(&format!(
            ", N'SCHEMA', {}, N'TABLE', {}",
            unicode_literal(self, schema),
            unicode_literal(self, table)
        ));
        if let Some(column) = column {
            sql.push_str(&format!(", N'COLUMN', {}", unicode_literal(self, unquoted(column))));
        }
        sql
    }
}

impl Platform for SqlServerPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::SqlServer
    }

    fn name(&self) -> &'static str {
        "SQL Server"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identifier_quote: ('[', ']'),
            varchar_max_length: NVARCHAR_MAX_LENGTH,
            char_max_length: NVARCHAR_MAX_LENGTH,
            binary_max_length: BINARY_MAX_LENGTH,
            limit: LimitStrategy::OffsetFetch,
            alter: AlterStrategy::DefaultConstraints,
            sequences: true,
            partial_indexes: true,
            rename_index: true,
            inline_comments: false,
            inline_indexes: false,
            inline_foreign_keys: false,
            default_constraints: true,
            new_column_default: NewColumnDefault::SynthesizeLiteral,
            dummy_table: None,
        }
    }

    fn keywords(&self) -> &'static KeywordList {
        &SQLSERVER_KEYWORDS
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn declare_type(&self, column: &Column) -> TypeDeclaration {
        let ty = &column.logical_type;
        let integer = |sql: &str| {
            let declaration = TypeDeclaration::new(sql);
            if column.autoincrement {
                declaration.with_autoincrement(AutoincrementStrategy::TrailingClause(" IDENTITY"))
            } else {
                declaration
            }
        };

        match ty {
            LogicalType::Boolean => TypeDeclaration::new("BIT"),
            LogicalType::SmallInt => integer("SMALLINT"),
            LogicalType::Integer => integer("INT"),
            LogicalType::BigInt => integer("BIGINT"),
            LogicalType::Decimal { .. } => TypeDeclaration::new(numeric_declaration("NUMERIC", ty)),
            LogicalType::Float => TypeDeclaration::new("FLOAT"),
            LogicalType::String { fixed, .. } => {
                let length = requested_length(ty);
                if length > NVARCHAR_MAX_LENGTH {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        NVARCHAR_MAX_LENGTH,
                        String::from("VARCHAR(MAX)"),
                    )
                } else if *fixed {
                    TypeDeclaration::new(format!("NCHAR({length})"))
                } else {
                    TypeDeclaration::new(format!("NVARCHAR({length})"))
                }
            }
            LogicalType::Binary { fixed, .. } => {
                let length = requested_length(ty);
                if length > BINARY_MAX_LENGTH {
                    TypeDeclaration::escalated(
                        column,
                        length,
                        BINARY_MAX_LENGTH,
                        String::from("VARBINARY(MAX)"),
                    )
                } else if *fixed {
                    TypeDeclaration::new(format!("BINARY({length})"))
                } else {
                    TypeDeclaration::new(format!("VARBINARY({length})"))
                }
            }
            LogicalType::Blob => TypeDeclaration::new("VARBINARY(MAX)"),
            LogicalType::Clob | LogicalType::Json => TypeDeclaration::new("VARCHAR(MAX)"),
            LogicalType::Date => TypeDeclaration::new("DATE"),
            LogicalType::Time => TypeDeclaration::new("TIME(0)"),
            LogicalType::DateTime => TypeDeclaration::new("DATETIME2(6)"),
            LogicalType::DateTimeTz => TypeDeclaration::new("DATETIMEOFFSET(6)"),
            LogicalType::Guid => TypeDeclaration::new("UNIQUEIDENTIFIER"),
        }
    }

    fn current_timestamp_sql(&self) -> &'static str {
        "GETDATE()"
    }

    fn current_date_sql(&self) -> &'static str {
        "CONVERT(date, GETDATE())"
    }

    fn current_time_sql(&self) -> &'static str {
        "CONVERT(time, GETDATE())"
    }

    fn synthesized_default(&self, column: &Column) -> DefaultValue {
        match column.logical_type {
            LogicalType::Guid => DefaultValue::Expression(String::from("NEWID()")),
            LogicalType::Binary { .. } | LogicalType::Blob => {
                DefaultValue::Expression(String::from("0x"))
            }
            _ => super::synthesized_literal(column),
        }
    }

    fn create_table_name(&self, table: &Table) -> String {
        if table.options.temporary {
            self.quote_name(&format!("#{}", base_name(&table.name)))
        } else {
            self.quote_name(&table.name)
        }
    }

    fn create_table_keyword(&self, _options: &TableOptions) -> &'static str {
        "CREATE TABLE"
    }

    fn primary_key_clause(&self, table: &str, index: &Index) -> String {
        let mut clause = format!(
            "CONSTRAINT {} PRIMARY KEY",
            self.quote_name(&Self::primary_key_name(table, index))
        );
        if index.has_flag("nonclustered") {
            clause.push_str(" NONCLUSTERED");
        }
        clause
    }

    fn index_kind_prefix(&self, index: &Index) -> &'static str {
        match (index.unique, index.has_flag("clustered")) {
            (true, true) => "UNIQUE CLUSTERED ",
            (true, false) => "UNIQUE ",
            (false, true) => "CLUSTERED ",
            (false, false) => "",
        }
    }

    fn index_predicate(&self, index: &Index) -> Option<String> {
        if index.predicate.is_some() || !index.unique || index.primary {
            return index.predicate.clone();
        }
        // A plain UNIQUE index would reject a second NULL.
        Some(
            index
                .columns
                .iter()
                .map(|c| format!("{} IS NOT NULL", self.quote_name(c)))
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }

    fn resolve_referential_action(
        &self,
        action: ReferentialAction,
        _event: ReferentialEvent,
    ) -> Result<ResolvedAction> {
        Ok(match action {
            ReferentialAction::Restrict => ResolvedAction::Downgraded {
                requested: ReferentialAction::Restrict,
                applied: ReferentialAction::NoAction,
            },
            _ => ResolvedAction::Clause(action),
        })
    }

    fn drop_index_sql(&self, index: &Index, table: &str) -> String {
        if index.primary {
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote_name(table),
                self.quote_name(&Self::primary_key_name(table, index))
            )
        } else {
            format!(
                "DROP INDEX {} ON {}",
                self.quote_name(&index.name),
                self.quote_name(table)
            )
        }
    }

    fn rename_index_sql(&self, old_name: &str, index: &Index, table: &str) -> Option<String> {
        Some(sp_rename(
            self,
            &format!("{}.{}", unquoted(table), unquoted(old_name)),
            unquoted(&index.name),
            Some("INDEX"),
        ))
    }

    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> Vec<String> {
        vec![sp_rename(self, unquoted(old_name), unquoted(new_name), None)]
    }

    fn rename_column_sql(&self, table: &str, old_name: &str, new_name: &str) -> String {
        sp_rename(
            self,
            &format!("{}.{}", unquoted(table), unquoted(old_name)),
            unquoted(new_name),
            Some("COLUMN"),
        )
    }

    fn table_comment_sql(&self, table: &str, comment: Option<&str>) -> Option<String> {
        Some(match comment {
            Some(comment) => {
                self.extended_property_sql("sp_addextendedproperty", Some(comment), table, None)
            }
            None => self.extended_property_sql("sp_dropextendedproperty", None, table, None),
        })
    }

    fn column_comment_sql(
        &self,
        table: &str,
        column: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> Option<String> {
        let procedure = match (old, new) {
            (None, None) => return None,
            (Some(o), Some(n)) if o == n => return None,
            (None, Some(_)) => "sp_addextendedproperty",
            (Some(_), Some(_)) => "sp_updateextendedproperty",
            (Some(_), None) => "sp_dropextendedproperty",
        };
        Some(self.extended_property_sql(procedure, new, table, Some(column)))
    }

    fn post_create_table_sql(&self, table: &Table) -> Vec<String> {
        table
            .columns
            .iter()
            .filter(|c| c.column_definition.is_none())
            .filter_map(|c| {
                let value = c.default.as_ref()?;
                add_default_constraint(self, &table.name, c, value)
            })
            .collect()
    }

    fn create_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        let mut sql = format!(
            "CREATE SEQUENCE {} START WITH {} INCREMENT BY {} MINVALUE {}",
            self.quote_name(&sequence.name),
            sequence.initial_value,
            sequence.allocation_size,
            sequence.initial_value
        );
        if let Some(cache) = sequence.cache_size {
            sql.push_str(&format!(" CACHE {cache}"));
        }
        Ok(sql)
    }

    fn alter_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        Ok(format!(
            "ALTER SEQUENCE {} INCREMENT BY {}",
            self.quote_name(&sequence.name),
            sequence.allocation_size
        ))
    }

    fn lock_clause(&self, _mode: LockMode) -> Option<&'static str> {
        None
    }

    fn lock_table_hint(&self, mode: LockMode) -> Option<&'static str> {
        Some(match mode {
            LockMode::PessimisticRead => "WITH (HOLDLOCK, ROWLOCK)",
            LockMode::PessimisticWrite => "WITH (UPDLOCK, ROWLOCK)",
        })
    }

    fn create_savepoint_sql(&self, name: &str) -> String {
        format!("SAVE TRANSACTION {}", self.quote_name(name))
    }

    fn release_savepoint_sql(&self, _name: &str) -> Option<String> {
        None
    }

    fn rollback_savepoint_sql(&self, name: &str) -> String {
        format!("ROLLBACK TRANSACTION {}", self.quote_name(name))
    }

    fn concat_expression(&self, parts: &[&str]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string}, {start}, {length})"),
            None => format!("SUBSTRING({string}, {start}, LEN({string}) - {start} + 1)"),
        }
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: IntervalUnit,
    ) -> String {
        let factor = match operator {
            DateOperator::Add => "",
            DateOperator::Sub => "-1 * ",
        };
        format!("DATEADD({unit}, {factor}{interval}, {date})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::TransactionIsolation;

    fn declare(column: Column) -> TypeDeclaration {
        SqlServerPlatform::new().declare_type(&column)
    }

    #[test]
    fn test_unicode_strings_escalate_to_max() {
        assert_eq!(declare(Column::new("a", LogicalType::string(50))).sql, "NVARCHAR(50)");
        assert_eq!(declare(Column::new("a", LogicalType::fixed_string(2))).sql, "NCHAR(2)");
        let long = declare(Column::new("a", LogicalType::string(5000)));
        assert_eq!(long.sql, "VARCHAR(MAX)");
        assert_eq!(long.diagnostics.len(), 1);
    }

    #[test]
    fn test_identity() {
        let id = declare(Column::new("id", LogicalType::Integer).autoincrement());
        assert_eq!(id.sql, "INT");
        assert_eq!(id.autoincrement, AutoincrementStrategy::TrailingClause(" IDENTITY"));
    }

    #[test]
    fn test_default_constraint_name() {
        assert_eq!(
            SqlServerPlatform::default_constraint_name("users", "created_at"),
            "DF_users_created_at"
        );
        assert_eq!(
            SqlServerPlatform::default_constraint_name("dbo.[my table]", "a-b"),
            "DF_my_table_a_b"
        );
    }

    #[test]
    fn test_restrict_downgraded() {
        let p = SqlServerPlatform::new();
        assert_eq!(
            p.resolve_referential_action(ReferentialAction::Restrict, ReferentialEvent::Delete)
                .unwrap(),
            ResolvedAction::Downgraded {
                requested: ReferentialAction::Restrict,
                applied: ReferentialAction::NoAction
            }
        );
    }

    #[test]
    fn test_unique_index_filters_nulls() {
        let p = SqlServerPlatform::new();
        let index = Index::unique("uniq_email", &["email"]);
        assert_eq!(
            p.index_predicate(&index),
            Some(String::from("email IS NOT NULL"))
        );
        let partial = Index::unique("uniq_email", &["email"]).where_clause("deleted = 0");
        assert_eq!(p.index_predicate(&partial), Some(String::from("deleted = 0")));
    }

    #[test]
    fn test_sp_rename() {
        let p = SqlServerPlatform::new();
        assert_eq!(
            p.rename_column_sql("users", "name", "full_name"),
            "EXEC sp_rename N'users.name', N'full_name', N'COLUMN'"
        );
        assert_eq!(
            p.rename_table_sql("users", "people"),
            ["EXEC sp_rename N'users', N'people'"]
        );
    }

    #[test]
    fn test_column_comment_procedures() {
        let p = SqlServerPlatform::new();
        assert_eq!(
            p.column_comment_sql("users", "name", None, Some("Full name")),
            Some(String::from(
                "EXEC sp_addextendedproperty N'MS_Description', N'Full name', N'SCHEMA', N'dbo', \
                 N'TABLE', N'users', N'COLUMN', N'name'"
            ))
        );
        assert_eq!(
            p.column_comment_sql("users", "name", Some("x"), None),
            Some(String::from(
                "EXEC sp_dropextendedproperty N'MS_Description', N'SCHEMA', N'dbo', \
                 N'TABLE', N'users', N'COLUMN', N'name'"
            ))
        );
        assert_eq!(p.column_comment_sql("users", "name", Some("x"), Some("x")), None);
    }

    #[test]
    fn test_lock_hints() {
        let p = SqlServerPlatform::new();
        assert_eq!(p.lock_clause(LockMode::PessimisticWrite), None);
        assert_eq!(
            p.lock_table_hint(LockMode::PessimisticWrite),
            Some("WITH (UPDLOCK, ROWLOCK)")
        );
    }

    #[test]
    fn test_default_constraint_statements() {
        let p = SqlServerPlatform::new();
        let column = Column::new("active", LogicalType::Boolean);
        assert_eq!(
            add_default_constraint(&p, "users", &column, &DefaultValue::Boolean(true)),
            Some(String::from(
                "ALTER TABLE users ADD CONSTRAINT DF_users_active DEFAULT 1 FOR active"
            ))
        );
        assert_eq!(
            drop_default_constraint(&p, "users", "active"),
            "ALTER TABLE users DROP CONSTRAINT DF_users_active"
        );
    }

    #[test]
    fn test_transaction_and_expression_fragments() {
        let p = SqlServerPlatform::new();
        assert_eq!(p.create_savepoint_sql("sp1"), "SAVE TRANSACTION sp1");
        assert_eq!(p.release_savepoint_sql("sp1"), None);
        assert_eq!(p.rollback_savepoint_sql("sp1"), "ROLLBACK TRANSACTION sp1");
        assert_eq!(
            p.set_transaction_isolation_sql(TransactionIsolation::Serializable),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
        assert_eq!(p.concat_expression(&["a", "b"]), "CONCAT(a, b)");
        assert_eq!(
            p.substring_expression("name", "2", None),
            "SUBSTRING(name, 2, LEN(name) - 2 + 1)"
        );
        assert_eq!(
            p.date_add_expression("d", "3", IntervalUnit::Month),
            "DATEADD(MONTH, 3, d)"
        );
        assert_eq!(
            p.date_sub_expression("d", "3", IntervalUnit::Day),
            "DATEADD(DAY, -1 * 3, d)"
        );
    }
}

//! The structured description of a query.
//!
//! [`QueryParts`] only records what was asked for. Table names are quoted,
//! clauses ordered and paging rewritten when a [`Platform`] renders it.
//!
//! [`Platform`]: crate::platform::Platform

use serde::{Deserialize, Serialize};

use crate::platform::LockMode;
use crate::schema::LogicalType;

use super::predicate::Predicate;
use super::value::{Parameter, ToSqlValue};

/// The statement a [`QueryParts`] renders to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// `SELECT`
    #[default]
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinKind {
    /// The join keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// `ASC`
    #[default]
    Asc,
    /// `DESC`
    Desc,
}

/// A table of the `FROM` clause, or the target of a data change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Table name, quoted on rendering.
    pub table: String,
    /// Alias, written verbatim.
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableRef {
    /// The name other clauses use to refer to this table.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// A join attached to a `FROM` table or to an earlier join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// Alias (or table name) the join hangs off.
    pub from_alias: String,
    /// Join type.
    pub kind: JoinKind,
    /// Joined table.
    pub table: String,
    /// Alias of the joined table.
    pub alias: String,
    /// `ON` condition.
    #[serde(default)]
    pub condition: Option<Predicate>,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Sort expression.
    pub expression: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

/// Everything a query is made of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParts {
    /// Statement type.
    pub kind: QueryKind,
    /// `SELECT DISTINCT`.
    pub distinct: bool,
    /// Select list, written verbatim.
    pub select: Vec<String>,
    /// `FROM` tables. Data changes use the first one as their target.
    pub from: Vec<TableRef>,
    /// Joins, in the order they were added.
    pub joins: Vec<Join>,
    /// `WHERE` condition.
    pub where_clause: Option<Predicate>,
    /// `GROUP BY` expressions.
    pub group_by: Vec<String>,
    /// `HAVING` condition.
    pub having: Option<Predicate>,
    /// `ORDER BY` items.
    pub order_by: Vec<OrderBy>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: u64,
    /// Row locking.
    pub lock: Option<LockMode>,
    /// `INSERT` column and value expression pairs.
    pub values: Vec<(String, String)>,
    /// `UPDATE` column and value expression pairs.
    pub set: Vec<(String, String)>,
    /// Bound parameters: all positional or all named.
    pub parameters: Vec<Parameter>,
}

impl QueryParts {
    /// A `SELECT` of the given expressions.
    #[must_use]
    pub fn select(columns: &[&str]) -> Self {
        Self {
            kind: QueryKind::Select,
            select: columns.iter().map(|c| String::from(*c)).collect(),
            ..Self::default()
        }
    }

    /// An `INSERT` into `table`.
    #[must_use]
    pub fn insert(table: &str) -> Self {
        Self::targeting(QueryKind::Insert, table)
    }

    /// An `UPDATE` of `table`.
    #[must_use]
    pub fn update(table: &str) -> Self {
        Self::targeting(QueryKind::Update, table)
    }

    /// A `DELETE` from `table`.
    #[must_use]
    pub fn delete(table: &str) -> Self {
        Self::targeting(QueryKind::Delete, table)
    }

    fn targeting(kind: QueryKind, table: &str) -> Self {
        Self {
            kind,
            from: vec![TableRef {
                table: String::from(table),
                alias: None,
            }],
            ..Self::default()
        }
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Appends expressions to the select list.
    #[must_use]
    pub fn add_select(mut self, columns: &[&str]) -> Self {
        self.select.extend(columns.iter().map(|c| String::from(*c)));
        self
    }

    /// Adds a `FROM` table, or sets the alias of a data change target.
    #[must_use]
    pub fn from(mut self, table: &str, alias: Option<&str>) -> Self {
        let table_ref = TableRef {
            table: String::from(table),
            alias: alias.map(String::from),
        };
        match self.kind {
            QueryKind::Select => self.from.push(table_ref),
            _ => self.from = vec![table_ref],
        }
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(
        mut self,
        kind: JoinKind,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: impl Into<Predicate>,
    ) -> Self {
        self.joins.push(Join {
            from_alias: String::from(from_alias),
            kind,
            table: String::from(table),
            alias: String::from(alias),
            condition: Some(condition.into()),
        });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn inner_join(
        self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: impl Into<Predicate>,
    ) -> Self {
        self.join(JoinKind::Inner, from_alias, table, alias, condition)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(
        self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: impl Into<Predicate>,
    ) -> Self {
        self.join(JoinKind::Left, from_alias, table, alias, condition)
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(
        self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: impl Into<Predicate>,
    ) -> Self {
        self.join(JoinKind::Right, from_alias, table, alias, condition)
    }

    /// Replaces the `WHERE` condition.
    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<Predicate>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Adds a condition to `WHERE` with `AND`.
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<Predicate>) -> Self {
        let condition = condition.into();
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds a condition to `WHERE` with `OR`.
    #[must_use]
    pub fn or_where(mut self, condition: impl Into<Predicate>) -> Self {
        let condition = condition.into();
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.or(condition),
            None => condition,
        });
        self
    }

    /// Sets the `GROUP BY` expressions.
    #[must_use]
    pub fn group_by(mut self, expressions: &[&str]) -> Self {
        self.group_by = expressions.iter().map(|e| String::from(*e)).collect();
        self
    }

    /// Sets the `HAVING` condition.
    #[must_use]
    pub fn having(mut self, condition: impl Into<Predicate>) -> Self {
        self.having = Some(condition.into());
        self
    }

    /// Appends an `ORDER BY` item.
    #[must_use]
    pub fn order_by(mut self, expression: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            expression: String::from(expression),
            direction,
        });
        self
    }

    /// Sets the maximum number of rows.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of rows to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Locks the selected rows.
    #[must_use]
    pub const fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }

    /// Sets an `INSERT` value expression.
    #[must_use]
    pub fn value(mut self, column: &str, expression: &str) -> Self {
        self.values
            .push((String::from(column), String::from(expression)));
        self
    }

    /// Sets an `UPDATE` assignment.
    #[must_use]
    pub fn set(mut self, column: &str, expression: &str) -> Self {
        self.set.push((String::from(column), String::from(expression)));
        self
    }

    /// Binds the next positional parameter.
    #[must_use]
    pub fn bind(mut self, value: impl ToSqlValue) -> Self {
        self.parameters.push(Parameter::positional(value));
        self
    }

    /// Binds the next positional parameter with an explicit type.
    #[must_use]
    pub fn bind_typed(mut self, value: impl ToSqlValue, logical_type: LogicalType) -> Self {
        self.parameters
            .push(Parameter::positional(value).typed(logical_type));
        self
    }

    /// Binds a named parameter, replacing an earlier binding of that name.
    #[must_use]
    pub fn bind_named(mut self, name: &str, value: impl ToSqlValue) -> Self {
        self.parameters
            .retain(|p| p.name.as_deref() != Some(name));
        self.parameters.push(Parameter::named(name, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlValue;

    #[test]
    fn test_where_conditions_accumulate() {
        let parts = QueryParts::select(&["*"])
            .from("users", None)
            .and_where("a = 1")
            .and_where("b = 2")
            .or_where("c = 3");
        assert_eq!(
            parts.where_clause.map(|w| w.to_sql()).as_deref(),
            Some("a = 1 AND b = 2 OR c = 3")
        );
    }

    #[test]
    fn test_data_change_has_one_target() {
        let parts = QueryParts::update("users").from("people", Some("p"));
        assert_eq!(parts.from.len(), 1);
        assert_eq!(parts.from[0].reference(), "p");
    }

    #[test]
    fn test_named_binding_replaces() {
        let parts = QueryParts::select(&["*"])
            .bind_named("id", 1_i64)
            .bind_named("id", 2_i64);
        assert_eq!(parts.parameters.len(), 1);
        assert_eq!(parts.parameters[0].value, SqlValue::Int(2));
    }
}

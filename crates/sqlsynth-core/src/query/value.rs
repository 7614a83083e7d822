//! Parameter values bound to query placeholders.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::schema::LogicalType;

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the value as an inline literal of `platform`.
    ///
    /// **Warning**: Prefer binding parameters instead.
    #[must_use]
    pub fn to_sql_inline<P: Platform + ?Sized>(&self, platform: &P) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => platform.boolean_literal(*b).to_string(),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => platform.quote_string_literal(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// The logical type a value of this kind is bound as, if obvious.
    #[must_use]
    pub const fn natural_type(&self) -> Option<LogicalType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(LogicalType::Boolean),
            Self::Int(_) => Some(LogicalType::BigInt),
            Self::Float(_) => Some(LogicalType::Float),
            Self::Text(_) => Some(LogicalType::Clob),
            Self::Blob(_) => Some(LogicalType::Blob),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// A bound parameter: a value, the placeholder name it answers to (none for
/// positional `?`), and the logical type the executor should bind it as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Placeholder name without the leading colon.
    #[serde(default)]
    pub name: Option<String>,
    /// The value.
    pub value: SqlValue,
    /// Binding type. Defaults to the natural type of the value.
    #[serde(default)]
    pub logical_type: Option<LogicalType>,
}

impl Parameter {
    /// A positional parameter.
    pub fn positional(value: impl ToSqlValue) -> Self {
        let value = value.to_sql_value();
        Self {
            name: None,
            logical_type: value.natural_type(),
            value,
        }
    }

    /// A named parameter.
    pub fn named(name: impl Into<String>, value: impl ToSqlValue) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::positional(value)
        }
    }

    /// Overrides the binding type.
    #[must_use]
    pub fn typed(mut self, logical_type: LogicalType) -> Self {
        self.logical_type = Some(logical_type);
        self
    }
}

//! Database-agnostic column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision used for decimals declared without one.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;

/// Scale used for decimals declared without one.
pub const DEFAULT_DECIMAL_SCALE: u32 = 0;

/// Length used for strings and binaries declared without one.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Abstract column type. Every variant resolves to some declaration on
/// every platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// Boolean.
    Boolean,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Exact numeric.
    Decimal {
        /// Total number of digits.
        #[serde(default)]
        precision: Option<u32>,
        /// Digits after the decimal point.
        #[serde(default)]
        scale: Option<u32>,
    },
    /// Double precision floating point.
    Float,
    /// Character string.
    String {
        /// Maximum length in characters.
        #[serde(default)]
        length: Option<u32>,
        /// Fixed-length (`CHAR`) instead of variable-length.
        #[serde(default)]
        fixed: bool,
    },
    /// Binary string.
    Binary {
        /// Maximum length in bytes.
        #[serde(default)]
        length: Option<u32>,
        /// Fixed-length instead of variable-length.
        #[serde(default)]
        fixed: bool,
    },
    /// Binary large object.
    Blob,
    /// Character large object.
    Clob,
    /// Date without time.
    Date,
    /// Time of day.
    Time,
    /// Date and time without time zone.
    DateTime,
    /// Date and time with time zone.
    DateTimeTz,
    /// UUID.
    Guid,
    /// JSON document.
    Json,
}

impl LogicalType {
    /// Variable-length string with the given length.
    #[must_use]
    pub const fn string(length: u32) -> Self {
        Self::String {
            length: Some(length),
            fixed: false,
        }
    }

    /// Fixed-length string with the given length.
    #[must_use]
    pub const fn fixed_string(length: u32) -> Self {
        Self::String {
            length: Some(length),
            fixed: true,
        }
    }

    /// Variable-length binary with the given length.
    #[must_use]
    pub const fn binary(length: u32) -> Self {
        Self::Binary {
            length: Some(length),
            fixed: false,
        }
    }

    /// Decimal with the given precision and scale.
    #[must_use]
    pub const fn decimal(precision: u32, scale: u32) -> Self {
        Self::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// Stable lowercase name of the type, without modifiers.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Decimal { .. } => "decimal",
            Self::Float => "float",
            Self::String { .. } => "string",
            Self::Binary { .. } => "binary",
            Self::Blob => "blob",
            Self::Clob => "clob",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::DateTimeTz => "datetimetz",
            Self::Guid => "guid",
            Self::Json => "json",
        }
    }

    /// Requested length of a string or binary.
    #[must_use]
    pub const fn length(&self) -> Option<u32> {
        match self {
            Self::String { length, .. } | Self::Binary { length, .. } => *length,
            _ => None,
        }
    }

    /// Whether a string or binary is fixed-length.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        matches!(
            self,
            Self::String { fixed: true, .. } | Self::Binary { fixed: true, .. }
        )
    }

    /// Requested precision of a decimal.
    #[must_use]
    pub const fn precision(&self) -> Option<u32> {
        match self {
            Self::Decimal { precision, .. } => *precision,
            _ => None,
        }
    }

    /// Requested scale of a decimal.
    #[must_use]
    pub const fn scale(&self) -> Option<u32> {
        match self {
            Self::Decimal { scale, .. } => *scale,
            _ => None,
        }
    }

    /// Precision and scale with the documented defaults applied.
    #[must_use]
    pub fn precision_and_scale(&self) -> (u32, u32) {
        (
            self.precision().unwrap_or(DEFAULT_DECIMAL_PRECISION),
            self.scale().unwrap_or(DEFAULT_DECIMAL_SCALE),
        )
    }

    /// Returns `true` for the integer family.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }

    /// Returns `true` for types with a numeric representation.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::SmallInt | Self::Integer | Self::BigInt | Self::Decimal { .. } | Self::Float
        )
    }

    /// Returns `true` for binary strings and blobs.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary { .. } | Self::Blob)
    }

    /// Returns `true` for types stored as large objects on most platforms.
    #[must_use]
    pub const fn is_large_object(&self) -> bool {
        matches!(self, Self::Blob | Self::Clob | Self::Json)
    }

    /// Returns `true` if both values are the same variant, ignoring
    /// modifiers.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal { .. } => {
                let (precision, scale) = self.precision_and_scale();
                write!(f, "decimal({precision}, {scale})")
            }
            Self::String {
                length: Some(length),
                ..
            }
            | Self::Binary {
                length: Some(length),
                ..
            } => write!(f, "{}({length})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers() {
        let ty = LogicalType::fixed_string(36);
        assert_eq!(ty.length(), Some(36));
        assert!(ty.is_fixed());
        assert_eq!(ty.precision(), None);

        let ty = LogicalType::Decimal {
            precision: None,
            scale: None,
        };
        assert_eq!(ty.precision_and_scale(), (10, 0));
        assert_eq!(ty.to_string(), "decimal(10, 0)");
    }

    #[test]
    fn test_same_kind_ignores_modifiers() {
        assert!(LogicalType::string(10).same_kind(&LogicalType::string(20)));
        assert!(!LogicalType::Integer.same_kind(&LogicalType::BigInt));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let ty: LogicalType = serde_json::from_str(r#"{"String": {"length": 100}}"#).unwrap();
        assert_eq!(ty, LogicalType::string(100));
        let ty: LogicalType = serde_json::from_str(r#""BigInt""#).unwrap();
        assert_eq!(ty, LogicalType::BigInt);
    }
}

//! Transaction control and scalar expression vocabulary shared by the
//! dialects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionIsolation {
    /// Dirty reads allowed.
    ReadUncommitted,
    /// Only committed rows are read.
    ReadCommitted,
    /// Rows read stay stable.
    RepeatableRead,
    /// Full isolation.
    Serializable,
}

impl TransactionIsolation {
    /// Standard SQL name of the level.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for TransactionIsolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Unit of a date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl IntervalUnit {
    /// Upper-case keyword of the unit.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
        }
    }

    /// Rewrites weeks as days and quarters as months, for dialects that
    /// know neither.
    pub(crate) fn without_weeks_and_quarters(self, interval: &str) -> (String, Self) {
        match self {
            Self::Week => (multiply_interval(interval, 7), Self::Day),
            Self::Quarter => (multiply_interval(interval, 3), Self::Month),
            _ => (interval.to_string(), self),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Direction of date arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOperator {
    /// Later.
    Add,
    /// Earlier.
    Sub,
}

impl DateOperator {
    /// `+` or `-`.
    #[must_use]
    pub const fn sign(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
        }
    }
}

/// `interval * factor`, folded when the interval is an integer literal.
pub(crate) fn multiply_interval(interval: &str, factor: i64) -> String {
    interval.trim().parse::<i64>().map_or_else(
        |_| format!("({interval} * {factor})"),
        |n| (n * factor).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_interval() {
        assert_eq!(multiply_interval("2", 7), "14");
        assert_eq!(multiply_interval("n", 3), "(n * 3)");
    }

    #[test]
    fn test_weeks_and_quarters_are_rewritten() {
        assert_eq!(
            IntervalUnit::Week.without_weeks_and_quarters("2"),
            (String::from("14"), IntervalUnit::Day)
        );
        assert_eq!(
            IntervalUnit::Quarter.without_weeks_and_quarters("q"),
            (String::from("(q * 3)"), IntervalUnit::Month)
        );
        assert_eq!(
            IntervalUnit::Hour.without_weeks_and_quarters("1"),
            (String::from("1"), IntervalUnit::Hour)
        );
    }

    #[test]
    fn test_isolation_names() {
        assert_eq!(TransactionIsolation::RepeatableRead.to_string(), "REPEATABLE READ");
        assert_eq!(IntervalUnit::Quarter.to_string(), "QUARTER");
    }
}

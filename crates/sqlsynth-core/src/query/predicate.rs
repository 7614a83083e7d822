//! Boolean predicate trees for `WHERE`, `HAVING` and join conditions.
//!
//! Parentheses are only added where precedence needs them: `AND` binds
//! tighter than `OR`, so an `OR` group nested in an `AND` is wrapped and an
//! `AND` group nested in an `OR` is not.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl ComparisonOp {
    /// The operator as written in SQL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

/// A node of a predicate tree.
///
/// Leaves are SQL fragments passed through verbatim. Operands are usually
/// column references and placeholders (`?`, `:name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// A verbatim condition.
    Raw(String),
    /// All children hold.
    And(Vec<Predicate>),
    /// At least one child holds.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// A verbatim condition.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// `left op right`.
    #[must_use]
    pub fn compare(left: &str, op: ComparisonOp, right: &str) -> Self {
        Self::Raw(format!("{left} {} {right}", op.as_str()))
    }

    /// `left = right`.
    #[must_use]
    pub fn eq(left: &str, right: &str) -> Self {
        Self::compare(left, ComparisonOp::Eq, right)
    }

    /// `operand IS NULL`.
    #[must_use]
    pub fn is_null(operand: &str) -> Self {
        Self::Raw(format!("{operand} IS NULL"))
    }

    /// `operand IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(operand: &str) -> Self {
        Self::Raw(format!("{operand} IS NOT NULL"))
    }

    /// `operand IN (a, b, ...)`.
    #[must_use]
    pub fn in_list(operand: &str, items: &[&str]) -> Self {
        Self::Raw(format!("{operand} IN ({})", items.join(", ")))
    }

    /// Conjunction of `self` and `other`, flattening nested `AND`s.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Disjunction of `self` and `other`, flattening nested `OR`s.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut parts = match self {
            Self::Or(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::Or(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::Or(parts)
    }

    /// No condition at all: an empty group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Raw(sql) => sql.trim().is_empty(),
            Self::And(parts) | Self::Or(parts) => parts.iter().all(Self::is_empty),
        }
    }

    /// Renders the tree as SQL.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Raw(sql) => sql.trim().to_string(),
            Self::And(parts) => join(parts, " AND ", Self::renders_as_disjunction),
            Self::Or(parts) => join(parts, " OR ", |_| false),
        }
    }

    /// Whether the rendered SQL has an `OR` at its top level, and so needs
    /// parentheses inside an `AND`.
    fn renders_as_disjunction(&self) -> bool {
        match self {
            Self::Raw(sql) => has_top_level_or(sql),
            Self::And(_) => false,
            Self::Or(parts) => {
                let mut present = parts.iter().filter(|p| !p.is_empty());
                match (present.next(), present.next()) {
                    (Some(only), None) => only.renders_as_disjunction(),
                    (Some(_), Some(_)) => true,
                    _ => false,
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<&str> for Predicate {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Predicate {
    fn from(sql: String) -> Self {
        Self::Raw(sql)
    }
}

fn join(parts: &[Predicate], separator: &str, wrap: impl Fn(&Predicate) -> bool) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| {
            if wrap(p) {
                format!("({})", p.to_sql())
            } else {
                p.to_sql()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Whether a verbatim fragment contains an `OR` outside parentheses and
/// string literals.
fn has_top_level_or(sql: &str) -> bool {
    let upper = sql.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    let mut depth = 0_usize;
    let mut in_string = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b'(' if !in_string => depth += 1,
            b')' if !in_string => depth = depth.saturating_sub(1),
            b'O' if !in_string && depth == 0 => {
                let before = i == 0 || !continues_word(bytes[i - 1]);
                let word = bytes.get(i + 1) == Some(&b'R');
                let after = bytes.get(i + 2).is_none_or(|&b| !continues_word(b));
                if before && word && after {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Bytes that make an adjacent `OR` part of a longer name.
const fn continues_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'"' || b == b'`'
}

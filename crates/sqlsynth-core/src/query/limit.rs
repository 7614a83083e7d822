//! Row windows (`limit`/`offset`) for every [`LimitStrategy`].
//!
//! The statement is treated as opaque text. Platforms without a native
//! offset nest it verbatim in a derived table numbered by row.

use std::sync::LazyLock;

use regex::Regex;

use crate::platform::{LimitStrategy, Platform};

/// Alias of the synthetic row number column.
const ROW_NUMBER_ALIAS: &str = "synth_rownum";

static ORDER_BY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\s+order\s+by\s").ok());
static SELECT_DISTINCT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*select\s+distinct\s").ok());
static LEADING_SELECT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*select\s").ok());
static HAS_FROM: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)\sfrom\s").ok());

/// Applies a row window to `sql`. Without limit and offset the statement is
/// returned unchanged.
pub(crate) fn limit_query<P: Platform + ?Sized>(
    platform: &P,
    sql: &str,
    limit: Option<u64>,
    offset: u64,
) -> String {
    if limit.is_none() && offset == 0 {
        return sql.to_string();
    }
    match platform.capabilities().limit {
        LimitStrategy::LimitOffset { unbounded } => limit_offset(sql, limit, offset, unbounded),
        LimitStrategy::OffsetFetch => offset_fetch(sql, limit, offset),
        LimitStrategy::RowNum => row_num(platform, sql, limit, offset),
        LimitStrategy::RowNumber => row_number(sql, limit, offset),
    }
}

fn limit_offset(sql: &str, limit: Option<u64>, offset: u64, unbounded: Option<&str>) -> String {
    let mut sql = sql.to_string();
    match (limit, unbounded) {
        (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(all)) => sql.push_str(&format!(" LIMIT {all}")),
        (None, None) => {}
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    sql
}

/// `OFFSET ... FETCH` is only valid after an `ORDER BY`, so a constant
/// ordering is added when the statement has none.
fn offset_fetch(sql: &str, limit: Option<u64>, offset: u64) -> String {
    let mut sql = sql.to_string();
    if needs_order_by(&sql) {
        // A DISTINCT query may only order by selected columns.
        let is_distinct = SELECT_DISTINCT.as_ref().is_some_and(|re| re.is_match(&sql));
        sql.push_str(if is_distinct {
            " ORDER BY 1"
        } else {
            " ORDER BY (SELECT 0)"
        });
    }
    sql.push_str(&format!(" OFFSET {offset} ROWS"));
    if let Some(limit) = limit {
        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
    }
    sql
}

/// Whether the outermost statement lacks an `ORDER BY`. One inside a
/// subquery does not count.
fn needs_order_by(sql: &str) -> bool {
    let Some(re) = ORDER_BY.as_ref() else {
        return true;
    };
    !re.find_iter(sql).any(|m| {
        let rest = &sql[m.start()..];
        rest.matches('(').count() == rest.matches(')').count()
    })
}

fn row_num<P: Platform + ?Sized>(
    platform: &P,
    sql: &str,
    limit: Option<u64>,
    offset: u64,
) -> String {
    if !LEADING_SELECT.as_ref().is_some_and(|re| re.is_match(sql)) {
        return sql.to_string();
    }
    let mut inner = sql.to_string();
    if let Some(dummy) = platform.capabilities().dummy_table {
        if !HAS_FROM.as_ref().is_some_and(|re| re.is_match(&inner)) {
            inner.push_str(&format!(" FROM {dummy}"));
        }
    }

    let columns = if offset > 0 {
        format!("a.*, ROWNUM AS {ROW_NUMBER_ALIAS}")
    } else {
        String::from("a.*")
    };
    let mut query = format!("SELECT {columns} FROM ({inner}) a");
    if let Some(limit) = limit {
        query.push_str(&format!(" WHERE ROWNUM <= {}", offset.saturating_add(limit)));
    }
    if offset > 0 {
        query = format!(
            "SELECT * FROM ({query}) WHERE {ROW_NUMBER_ALIAS} >= {}",
            offset.saturating_add(1)
        );
    }
    query
}

fn row_number(sql: &str, limit: Option<u64>, offset: u64) -> String {
    if offset == 0 {
        if let Some(limit) = limit {
            return format!("{sql} FETCH FIRST {limit} ROWS ONLY");
        }
    }
    let numbered = format!(
        "SELECT q2.* FROM (SELECT q1.*, ROW_NUMBER() OVER() AS {ROW_NUMBER_ALIAS} \
         FROM ({sql}) q1) q2"
    );
    let first = offset.saturating_add(1);
    match limit {
        Some(limit) => format!(
            "{numbered} WHERE q2.{ROW_NUMBER_ALIAS} BETWEEN {first} AND {}",
            offset.saturating_add(limit)
        ),
        None => format!("{numbered} WHERE q2.{ROW_NUMBER_ALIAS} >= {first}"),
    }
}

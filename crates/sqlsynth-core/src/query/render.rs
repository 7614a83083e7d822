//! Turns [`QueryParts`] into SQL text and an ordered parameter list.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SynthError};
use crate::platform::{LockMode, Platform};

use super::limit::limit_query;
use super::parts::{Join, QueryKind, QueryParts, SortDirection, TableRef};
use super::predicate::Predicate;
use super::value::Parameter;

/// A rendered statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedQuery {
    /// SQL text.
    pub sql: String,
    /// Parameters in binding order. Named parameters keep their names.
    pub parameters: Vec<Parameter>,
}

impl RenderedQuery {
    /// The SQL with every placeholder replaced by its parameter as an
    /// inline literal of `platform`.
    ///
    /// **Warning**: For display only. Execute the SQL with bound parameters.
    #[must_use]
    pub fn inline_sql<P: Platform + ?Sized>(&self, platform: &P) -> String {
        let chars: Vec<char> = self.sql.chars().collect();
        let mut positional = self.parameters.iter().filter(|p| p.name.is_none());
        let mut sql = String::with_capacity(self.sql.len());
        let mut copied = 0;
        for placeholder in find_placeholders(&chars) {
            let (range, parameter) = match placeholder {
                Placeholder::Positional(range) => (range, positional.next()),
                Placeholder::Named(range, name) => {
                    let parameter = self
                        .parameters
                        .iter()
                        .find(|p| p.name.as_deref() == Some(name.as_str()));
                    (range, parameter)
                }
            };
            if let Some(parameter) = parameter {
                sql.extend(&chars[copied..range.start]);
                sql.push_str(&parameter.value.to_sql_inline(platform));
                copied = range.end;
            }
        }
        sql.extend(&chars[copied..]);
        sql
    }
}

/// Object name used in errors about a query.
const QUERY: &str = "query";

pub(crate) fn render<P: Platform + ?Sized>(
    platform: &P,
    parts: &QueryParts,
) -> Result<RenderedQuery> {
    let sql = match parts.kind {
        QueryKind::Select => select(platform, parts)?,
        QueryKind::Insert => insert(platform, parts)?,
        QueryKind::Update => update(platform, parts)?,
        QueryKind::Delete => delete(platform, parts)?,
    };
    check_placeholders(&sql, &parts.parameters)?;
    debug!(
        "{}: rendered {:?} with {} parameters",
        platform.name(),
        parts.kind,
        parts.parameters.len()
    );
    Ok(RenderedQuery {
        sql,
        parameters: parts.parameters.clone(),
    })
}

fn select<P: Platform + ?Sized>(platform: &P, parts: &QueryParts) -> Result<String> {
    if parts.select.is_empty() {
        return Err(SynthError::invalid(QUERY, "SELECT needs at least one expression"));
    }
    let mut sql = String::from("SELECT ");
    if parts.distinct {
        sql.push_str("DISTINCT ");
    }
    sql.push_str(&parts.select.join(", "));

    let from = from_clauses(platform, parts)?;
    if !from.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&from.join(", "));
    } else if let Some(dummy) = platform.capabilities().dummy_table {
        sql.push_str(&format!(" FROM {dummy}"));
    }

    push_condition(&mut sql, " WHERE ", parts.where_clause.as_ref());
    if !parts.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&parts.group_by.join(", "));
    }
    push_condition(&mut sql, " HAVING ", parts.having.as_ref());
    if !parts.order_by.is_empty() {
        let items: Vec<String> = parts
            .order_by
            .iter()
            .map(|o| match o.direction {
                SortDirection::Asc => format!("{} ASC", o.expression),
                SortDirection::Desc => format!("{} DESC", o.expression),
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&items.join(", "));
    }

    let mut sql = limit_query(platform, &sql, parts.limit, parts.offset);
    if let Some(clause) = parts.lock.and_then(|mode| platform.lock_clause(mode)) {
        sql.push(' ');
        sql.push_str(clause);
    }
    Ok(sql)
}

/// One entry per `FROM` table, each followed by its join chain.
fn from_clauses<P: Platform + ?Sized>(platform: &P, parts: &QueryParts) -> Result<Vec<String>> {
    let mut known = BTreeSet::new();
    let mut clauses = Vec::new();
    for table in &parts.from {
        let reference = table.reference();
        if !known.insert(reference.to_string()) {
            return Err(SynthError::inconsistent(
                QUERY,
                format!("alias '{reference}' is used twice"),
            ));
        }
        let mut clause = table_sql(platform, table, parts.lock);
        joins_sql(platform, parts, reference, &mut known, &mut clause)?;
        clauses.push(clause);
    }
    if let Some(join) = parts.joins.iter().find(|j| !known.contains(&j.from_alias)) {
        return Err(SynthError::inconsistent(
            QUERY,
            format!("join on '{}' refers to unknown alias '{}'", join.alias, join.from_alias),
        ));
    }
    Ok(clauses)
}

/// Appends the joins hanging off `reference`, then the joins hanging off
/// each of those.
fn joins_sql<P: Platform + ?Sized>(
    platform: &P,
    parts: &QueryParts,
    reference: &str,
    known: &mut BTreeSet<String>,
    sql: &mut String,
) -> Result<()> {
    let joins: Vec<&Join> = parts.joins.iter().filter(|j| j.from_alias == reference).collect();
    for join in &joins {
        if !known.insert(join.alias.clone()) {
            return Err(SynthError::inconsistent(
                QUERY,
                format!("alias '{}' is used twice", join.alias),
            ));
        }
        let table = TableRef {
            table: join.table.clone(),
            alias: Some(join.alias.clone()),
        };
        sql.push_str(&format!(
            " {} {}",
            join.kind.as_str(),
            table_sql(platform, &table, parts.lock)
        ));
        if let Some(condition) = join.condition.as_ref().filter(|c| !c.is_empty()) {
            sql.push_str(&format!(" ON {condition}"));
        }
    }
    for join in joins {
        joins_sql(platform, parts, &join.alias, known, sql)?;
    }
    Ok(())
}

fn table_sql<P: Platform + ?Sized>(
    platform: &P,
    table: &TableRef,
    lock: Option<LockMode>,
) -> String {
    let mut sql = platform.quote_name(&table.table);
    if let Some(alias) = &table.alias {
        sql.push(' ');
        sql.push_str(alias);
    }
    if let Some(hint) = lock.and_then(|mode| platform.lock_table_hint(mode)) {
        sql.push(' ');
        sql.push_str(hint);
    }
    sql
}

fn push_condition(sql: &mut String, keyword: &str, condition: Option<&Predicate>) {
    if let Some(condition) = condition.filter(|c| !c.is_empty()) {
        sql.push_str(keyword);
        sql.push_str(&condition.to_sql());
    }
}

fn target(parts: &QueryParts) -> Result<&TableRef> {
    match parts.from.as_slice() {
        [table] => Ok(table),
        [] => Err(SynthError::invalid(QUERY, "no target table")),
        _ => Err(SynthError::invalid(QUERY, "a data change has exactly one target table")),
    }
}

fn insert<P: Platform + ?Sized>(platform: &P, parts: &QueryParts) -> Result<String> {
    let table = target(parts)?;
    if parts.values.is_empty() {
        return Err(SynthError::invalid(&table.table, "INSERT needs at least one value"));
    }
    let (columns, values): (Vec<String>, Vec<&str>) = parts
        .values
        .iter()
        .map(|(column, value)| (platform.quote_name(column), value.as_str()))
        .unzip();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        platform.quote_name(&table.table),
        columns.join(", "),
        values.join(", ")
    ))
}

fn update<P: Platform + ?Sized>(platform: &P, parts: &QueryParts) -> Result<String> {
    let table = target(parts)?;
    if parts.set.is_empty() {
        return Err(SynthError::invalid(&table.table, "UPDATE needs at least one assignment"));
    }
    let assignments: Vec<String> = parts
        .set
        .iter()
        .map(|(column, value)| format!("{} = {value}", platform.quote_name(column)))
        .collect();
    let mut sql = format!(
        "UPDATE {} SET {}",
        table_sql(platform, table, None),
        assignments.join(", ")
    );
    push_condition(&mut sql, " WHERE ", parts.where_clause.as_ref());
    Ok(sql)
}

fn delete<P: Platform + ?Sized>(platform: &P, parts: &QueryParts) -> Result<String> {
    let table = target(parts)?;
    let mut sql = format!("DELETE FROM {}", table_sql(platform, table, None));
    push_condition(&mut sql, " WHERE ", parts.where_clause.as_ref());
    Ok(sql)
}

/// Placeholders found in a statement.
#[derive(Debug, Default)]
struct Placeholders {
    positional: usize,
    named: BTreeSet<String>,
}

/// A placeholder and the chars it spans.
#[derive(Debug, PartialEq, Eq)]
enum Placeholder {
    Positional(Range<usize>),
    Named(Range<usize>, String),
}

/// Finds `?` and `:name` outside string literals and quoted identifiers.
/// `::` casts are not placeholders.
fn find_placeholders(chars: &[char]) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            quote @ ('\'' | '"' | '`') => {
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
            }
            '?' => found.push(Placeholder::Positional(i..i + 1)),
            ':' if chars.get(i + 1) == Some(&':') => i += 1,
            ':' if chars
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '_') =>
            {
                let start = i + 1;
                let mut end = start;
                while end < chars.len()
                    && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                found.push(Placeholder::Named(i..end, chars[start..end].iter().collect()));
                i = end - 1;
            }
            _ => {}
        }
        i += 1;
    }
    found
}

fn scan_placeholders(sql: &str) -> Placeholders {
    let chars: Vec<char> = sql.chars().collect();
    let mut found = Placeholders::default();
    for placeholder in find_placeholders(&chars) {
        match placeholder {
            Placeholder::Positional(_) => found.positional += 1,
            Placeholder::Named(_, name) => {
                found.named.insert(name);
            }
        }
    }
    found
}

/// Every placeholder has exactly one parameter and the other way around.
fn check_placeholders(sql: &str, parameters: &[Parameter]) -> Result<()> {
    let found = scan_placeholders(sql);
    let named: Vec<&str> = parameters.iter().filter_map(|p| p.name.as_deref()).collect();
    let positional = parameters.len() - named.len();

    if found.positional > 0 && !found.named.is_empty() {
        return Err(SynthError::inconsistent(
            QUERY,
            "positional and named placeholders are mixed",
        ));
    }
    if positional > 0 && !named.is_empty() {
        return Err(SynthError::inconsistent(
            QUERY,
            "positional and named parameters are mixed",
        ));
    }
    if found.positional != positional {
        return Err(SynthError::inconsistent(
            QUERY,
            format!(
                "{} positional placeholders but {positional} parameters",
                found.positional
            ),
        ));
    }
    if let Some(missing) = found.named.iter().find(|n| !named.contains(&n.as_str())) {
        return Err(SynthError::inconsistent(
            QUERY,
            format!("placeholder ':{missing}' has no parameter"),
        ));
    }
    if let Some(unused) = named.iter().find(|n| !found.named.contains(**n)) {
        return Err(SynthError::inconsistent(
            QUERY,
            format!("parameter '{unused}' has no placeholder"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::SynthError;
    use crate::platform::{
        Db2Platform, LockMode, MySqlPlatform, OraclePlatform, Platform, PostgreSqlPlatform,
        SqlServerPlatform, SqlitePlatform,
    };
    use crate::query::{Predicate, QueryParts, SortDirection};

    use super::scan_placeholders;

    fn users_query() -> QueryParts {
        QueryParts::select(&["u.id", "u.email"])
            .from("users", Some("u"))
            .where_clause("u.active = ?")
            .bind(true)
    }

    #[test]
    fn test_clause_order() {
        let parts = QueryParts::select(&["u.team_id", "COUNT(*)"])
            .distinct()
            .from("users", Some("u"))
            .left_join("u", "teams", "t", "t.id = u.team_id")
            .where_clause(Predicate::eq("u.active", "?").and(Predicate::raw("t.id IS NOT NULL")))
            .group_by(&["u.team_id"])
            .having("COUNT(*) > ?")
            .order_by("u.team_id", SortDirection::Desc)
            .bind(true)
            .bind(3_i64);
        let rendered = PostgreSqlPlatform::new().render_query(&parts).unwrap();
        assert_eq!(
            rendered.sql,
            "SELECT DISTINCT u.team_id, COUNT(*) FROM users u \
             LEFT JOIN teams t ON t.id = u.team_id \
             WHERE u.active = ? AND t.id IS NOT NULL \
             GROUP BY u.team_id HAVING COUNT(*) > ? ORDER BY u.team_id DESC"
        );
        assert_eq!(rendered.parameters.len(), 2);
    }

    #[test]
    fn test_table_names_are_quoted() {
        let parts = QueryParts::select(&["*"]).from("order", None);
        assert_eq!(
            MySqlPlatform::new().render_query(&parts).unwrap().sql,
            "SELECT * FROM `order`"
        );
    }

    #[test]
    fn test_nested_joins() {
        let parts = QueryParts::select(&["*"])
            .from("users", Some("u"))
            .inner_join("u", "memberships", "m", "m.user_id = u.id")
            .inner_join("m", "teams", "t", "t.id = m.team_id")
            .right_join("u", "profiles", "p", "p.user_id = u.id");
        assert_eq!(
            SqlitePlatform::new().render_query(&parts).unwrap().sql,
            "SELECT * FROM users u \
             INNER JOIN memberships m ON m.user_id = u.id \
             RIGHT JOIN profiles p ON p.user_id = u.id \
             INNER JOIN teams t ON t.id = m.team_id"
        );
    }

    #[test]
    fn test_unknown_alias_is_inconsistent() {
        let parts = QueryParts::select(&["*"])
            .from("users", Some("u"))
            .inner_join("x", "teams", "t", "t.id = x.team_id");
        assert!(matches!(
            PostgreSqlPlatform::new().render_query(&parts),
            Err(SynthError::StructuralInconsistency { .. })
        ));
    }

    #[test]
    fn test_duplicate_alias_is_inconsistent() {
        let parts = QueryParts::select(&["*"])
            .from("users", Some("u"))
            .inner_join("u", "teams", "u", "u.id = 1");
        assert!(matches!(
            PostgreSqlPlatform::new().render_query(&parts),
            Err(SynthError::StructuralInconsistency { .. })
        ));
    }

    #[test]
    fn test_paging_per_platform() {
        let parts = QueryParts::select(&["id"]).from("users", None).limit(10).offset(20);
        assert_eq!(
            PostgreSqlPlatform::new().render_query(&parts).unwrap().sql,
            "SELECT id FROM users LIMIT 10 OFFSET 20"
        );
        let sql = SqlServerPlatform::new().render_query(&parts).unwrap().sql;
        assert!(sql.contains("ORDER BY (SELECT 0)"));
        assert!(sql.ends_with("OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"));

        let ordered = parts.order_by("id", SortDirection::Asc);
        assert_eq!(
            SqlServerPlatform::new().render_query(&ordered).unwrap().sql,
            "SELECT id FROM users ORDER BY id ASC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_lock_clauses() {
        let parts = users_query().lock(LockMode::PessimisticWrite);
        assert!(MySqlPlatform::new()
            .render_query(&parts)
            .unwrap()
            .sql
            .ends_with("WHERE u.active = ? FOR UPDATE"));
        assert!(Db2Platform::new()
            .render_query(&parts.clone().lock(LockMode::PessimisticRead))
            .unwrap()
            .sql
            .ends_with("WITH RR USE AND KEEP SHARE LOCKS"));
        assert_eq!(
            SqlitePlatform::new().render_query(&parts).unwrap().sql,
            "SELECT u.id, u.email FROM users u WHERE u.active = ?"
        );
    }

    #[test]
    fn test_lock_hints_on_sql_server() {
        let parts = users_query().lock(LockMode::PessimisticRead);
        assert_eq!(
            SqlServerPlatform::new().render_query(&parts).unwrap().sql,
            "SELECT u.id, u.email FROM users u WITH (HOLDLOCK, ROWLOCK) WHERE u.active = ?"
        );
    }

    #[test]
    fn test_dummy_table() {
        let parts = QueryParts::select(&["CURRENT_TIMESTAMP"]);
        assert_eq!(
            OraclePlatform::new().render_query(&parts).unwrap().sql,
            "SELECT CURRENT_TIMESTAMP FROM DUAL"
        );
        assert_eq!(
            Db2Platform::new().render_query(&parts).unwrap().sql,
            "SELECT CURRENT_TIMESTAMP FROM SYSIBM.SYSDUMMY1"
        );
        assert_eq!(
            PostgreSqlPlatform::new().render_query(&parts).unwrap().sql,
            "SELECT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_empty_select_is_invalid() {
        assert!(matches!(
            PostgreSqlPlatform::new().render_query(&QueryParts::default()),
            Err(SynthError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_insert_update_delete() {
        let p = PostgreSqlPlatform::new();
        let insert = QueryParts::insert("users")
            .value("email", ":email")
            .value("user", ":user")
            .bind_named("email", "a@b.c")
            .bind_named("user", "alice");
        assert_eq!(
            p.render_query(&insert).unwrap().sql,
            "INSERT INTO users (email, \"user\") VALUES (:email, :user)"
        );

        let update = QueryParts::update("users")
            .from("users", Some("u"))
            .set("email", "?")
            .where_clause("u.id = ?")
            .bind("a@b.c")
            .bind(1_i64);
        assert_eq!(
            p.render_query(&update).unwrap().sql,
            "UPDATE users u SET email = ? WHERE u.id = ?"
        );

        let delete = QueryParts::delete("users").where_clause("id = ?").bind(1_i64);
        assert_eq!(p.render_query(&delete).unwrap().sql, "DELETE FROM users WHERE id = ?");
    }

    #[test]
    fn test_missing_values_are_invalid() {
        let p = PostgreSqlPlatform::new();
        assert!(matches!(
            p.render_query(&QueryParts::insert("users")),
            Err(SynthError::InvalidDefinition { .. })
        ));
        assert!(matches!(
            p.render_query(&QueryParts::update("users")),
            Err(SynthError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_placeholder_mismatch_is_inconsistent() {
        let p = PostgreSqlPlatform::new();
        let missing = QueryParts::select(&["*"]).from("users", None).where_clause("id = ?");
        assert!(matches!(
            p.render_query(&missing),
            Err(SynthError::StructuralInconsistency { .. })
        ));
        let mixed = QueryParts::select(&["*"])
            .from("users", None)
            .where_clause("id = ? AND email = :email")
            .bind(1_i64)
            .bind_named("email", "a@b.c");
        assert!(matches!(
            p.render_query(&mixed),
            Err(SynthError::StructuralInconsistency { .. })
        ));
        let unused = QueryParts::select(&["*"])
            .from("users", None)
            .bind_named("email", "a@b.c");
        assert!(matches!(
            p.render_query(&unused),
            Err(SynthError::StructuralInconsistency { .. })
        ));
    }

    #[test]
    fn test_inline_sql_substitutes_parameters() {
        let p = PostgreSqlPlatform::new();
        let rendered = p
            .render_query(
                &QueryParts::select(&["id"])
                    .from("users", None)
                    .where_clause("name = ? AND note = '?' AND age > ?")
                    .bind("O'Brien")
                    .bind(30_i64),
            )
            .unwrap();
        assert_eq!(
            rendered.inline_sql(&p),
            "SELECT id FROM users WHERE name = 'O''Brien' AND note = '?' AND age > 30"
        );

        let named = p
            .render_query(
                &QueryParts::select(&["id"])
                    .from("users", None)
                    .where_clause("a = :flag OR b = :flag")
                    .bind_named("flag", true),
            )
            .unwrap();
        assert_eq!(
            named.inline_sql(&p),
            "SELECT id FROM users WHERE a = true OR b = true"
        );
    }

    #[test]
    fn test_placeholder_scanner_skips_literals_and_casts() {
        let found = scan_placeholders("SELECT '?', \"a?\", x::text FROM t WHERE a = :a AND b = ?");
        assert_eq!(found.positional, 1);
        assert_eq!(found.named.into_iter().collect::<Vec<_>>(), ["a"]);
    }
}

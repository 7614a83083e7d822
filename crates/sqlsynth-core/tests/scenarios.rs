//! End-to-end generation scenarios across dialects: table creation, the
//! in-place and rebuild alter paths, paging and length escalation.

use sqlsynth_core::platform::{
    Db2Platform, MySqlPlatform, OraclePlatform, Platform, PostgreSqlPlatform, SqlServerPlatform,
    SqlitePlatform,
};
use sqlsynth_core::query::QueryParts;
use sqlsynth_core::schema::{Column, LogicalType, Table, TableDiff};
use sqlsynth_core::Diagnostic;

fn users() -> Table {
    Table::new("users")
        .column(Column::new("id", LogicalType::Integer).autoincrement())
        .column(Column::new("name", LogicalType::string(255)))
        .primary_key(&["id"])
}

#[test]
fn mysql_create_table_is_one_statement() {
    let out = MySqlPlatform::new().create_table(&users()).unwrap();
    assert_eq!(out.len(), 1);
    let sql = &out.statements[0];
    assert!(sql.starts_with("CREATE TABLE users ("));
    assert!(sql.contains("id INT AUTO_INCREMENT NOT NULL"));
    assert!(sql.contains("`name` VARCHAR(255) NOT NULL"));
    assert!(sql.contains("PRIMARY KEY (id)"));
}

#[test]
fn nullable_column_is_added_in_place() {
    let diff = TableDiff::for_table(&users())
        .add_column(Column::new("email", LogicalType::string(100)).nullable());

    let platforms: [&dyn Platform; 3] = [
        &MySqlPlatform::new(),
        &SqlServerPlatform::new(),
        &SqlitePlatform::new(),
    ];
    for p in platforms {
        let out = p.alter_table(&diff).unwrap();
        assert_eq!(out.len(), 1, "{}: {:?}", p.name(), out.statements);
        assert!(
            out.statements[0].starts_with("ALTER TABLE users ADD "),
            "{}: {}",
            p.name(),
            out.statements[0]
        );
        assert!(out.diagnostics.is_empty());
    }
    assert_eq!(
        SqlitePlatform::new().alter_table(&diff).unwrap().statements,
        ["ALTER TABLE users ADD COLUMN email VARCHAR(100) DEFAULT NULL"]
    );
}

#[test]
fn sqlite_type_change_rebuilds_the_table() {
    let old = users().column(Column::new("age", LogicalType::Integer).nullable());
    let age = old.get_column("age").unwrap().clone();
    let diff = TableDiff::for_table(&old)
        .modify_column(age, Column::new("age", LogicalType::BigInt).nullable());

    let out = SqlitePlatform::new().alter_table(&diff).unwrap();
    assert_eq!(out.len(), 5);
    assert_eq!(
        out.statements[0],
        "CREATE TEMPORARY TABLE __temp__users AS SELECT id, name, age FROM users"
    );
    assert_eq!(out.statements[1], "DROP TABLE users");
    assert!(out.statements[2].starts_with("CREATE TABLE users ("));
    assert!(out.statements[2].contains("age BIGINT DEFAULT NULL"));
    assert_eq!(
        out.statements[3],
        "INSERT INTO users (id, name, age) SELECT id, name, age FROM __temp__users"
    );
    assert_eq!(out.statements[4], "DROP TABLE __temp__users");
}

#[test]
fn paging_without_order_by() {
    let parts = QueryParts::select(&["id"]).from("users", None).limit(10).offset(20);

    let sql = SqlServerPlatform::new().render_query(&parts).unwrap().sql;
    assert!(sql.contains("ORDER BY (SELECT 0)"), "{sql}");

    let native: [&dyn Platform; 3] = [
        &MySqlPlatform::new(),
        &PostgreSqlPlatform::new(),
        &SqlitePlatform::new(),
    ];
    for p in native {
        let sql = p.render_query(&parts).unwrap().sql;
        assert_eq!(sql, "SELECT id FROM users LIMIT 10 OFFSET 20");
        assert!(!sql.contains("ORDER BY"));
    }
}

#[test]
fn oversized_string_escalates_to_large_object() {
    let column = Column::new("body", LogicalType::string(100_000));
    let cases: [(&dyn Platform, &str); 5] = [
        (&MySqlPlatform::new(), "MEDIUMTEXT"),
        (&OraclePlatform::new(), "CLOB"),
        (&SqlServerPlatform::new(), "VARCHAR(MAX)"),
        (&Db2Platform::new(), "CLOB(1M)"),
        (&PostgreSqlPlatform::new(), "VARCHAR(100000)"),
    ];
    for (p, expected) in cases {
        let declaration = p.declare_type(&column);
        assert_eq!(declaration.sql, expected, "{}", p.name());
    }

    let out = MySqlPlatform::new()
        .create_table(&Table::new("posts").column(column))
        .unwrap();
    assert!(matches!(
        &out.diagnostics[..],
        [Diagnostic::ValueRange { requested: 100_000, maximum: 65_535, .. }]
    ));
}

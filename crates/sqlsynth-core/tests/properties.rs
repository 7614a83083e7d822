//! Properties that hold on every platform: identifier quoting round-trips,
//! every logical type resolves, a table diffed against itself is empty, and
//! batches respect foreign key dependencies.

use sqlsynth_core::registry::{platform, PlatformKind};
use sqlsynth_core::schema::{
    compare_schemas, compare_tables, Column, ForeignKeyConstraint, Index, LogicalType, Schema,
    Table, TableDiff,
};

fn type_matrix() -> Vec<LogicalType> {
    vec![
        LogicalType::Boolean,
        LogicalType::SmallInt,
        LogicalType::Integer,
        LogicalType::BigInt,
        LogicalType::Decimal {
            precision: None,
            scale: None,
        },
        LogicalType::decimal(18, 4),
        LogicalType::Float,
        LogicalType::String {
            length: None,
            fixed: false,
        },
        LogicalType::string(1),
        LogicalType::string(255),
        LogicalType::string(100_000),
        LogicalType::fixed_string(2),
        LogicalType::fixed_string(10_000),
        LogicalType::binary(16),
        LogicalType::Binary {
            length: Some(100_000),
            fixed: true,
        },
        LogicalType::Blob,
        LogicalType::Clob,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::DateTime,
        LogicalType::DateTimeTz,
        LogicalType::Guid,
        LogicalType::Json,
    ]
}

fn teams() -> Table {
    Table::new("teams")
        .column(Column::new("id", LogicalType::Integer).autoincrement())
        .column(Column::new("label", LogicalType::string(50)))
        .primary_key(&["id"])
}

fn members() -> Table {
    Table::new("members")
        .column(Column::new("id", LogicalType::Integer).autoincrement())
        .column(Column::new("team_id", LogicalType::Integer))
        .column(Column::new("email", LogicalType::string(100)).nullable())
        .primary_key(&["id"])
        .index(Index::new("idx_members_team", &["team_id"]))
        .foreign_key(ForeignKeyConstraint::new(
            "fk_members_team",
            &["team_id"],
            "teams",
            &["id"],
        ))
}

#[test]
fn quoting_round_trips() {
    let names = [
        "users",
        "order",
        "my table",
        "1st",
        "odd\"name",
        "odd`name",
        "odd]name",
        "odd'name",
    ];
    for kind in PlatformKind::ALL {
        let p = platform(kind);
        for name in names {
            let quoted = p.quote_identifier(name);
            assert_eq!(p.unquote_identifier(&quoted), name, "{kind}: {quoted}");
        }
    }
}

#[test]
fn reserved_words_are_quoted() {
    for kind in PlatformKind::ALL {
        let p = platform(kind);
        assert_ne!(p.quote_name("select"), "select", "{kind}");
        assert_eq!(p.quote_name("teams"), "teams", "{kind}");
    }
}

#[test]
fn every_type_resolves_on_every_platform() {
    for kind in PlatformKind::ALL {
        let p = platform(kind);
        for logical_type in type_matrix() {
            for column in [
                Column::new("c", logical_type.clone()),
                Column::new("c", logical_type.clone()).nullable().unsigned(),
            ] {
                let declaration = p.declare_type(&column);
                assert!(
                    !declaration.sql.trim().is_empty(),
                    "{kind}: {logical_type:?} resolved to nothing"
                );
            }
        }
    }
}

#[test]
fn table_diffed_against_itself_is_empty() {
    for table in [teams(), members()] {
        assert!(compare_tables(&table, &table).is_none());
    }
    let schema = Schema::new().table(teams()).table(members());
    assert!(compare_schemas(&schema, &schema).is_empty());
}

#[test]
fn empty_diff_alters_nothing() {
    let diff = TableDiff::for_table(&members());
    for kind in PlatformKind::ALL {
        let out = platform(kind).alter_table(&diff).unwrap();
        assert!(out.is_empty(), "{kind}: {:?}", out.statements);
    }
}

#[test]
fn referenced_table_is_created_before_the_foreign_key() {
    let tables = [teams(), members()];
    for kind in PlatformKind::ALL {
        let out = platform(kind).create_tables(&tables).unwrap();
        let create_teams = out
            .iter()
            .position(|s| s.starts_with("CREATE TABLE teams"))
            .unwrap_or_else(|| panic!("{kind}: no CREATE TABLE teams"));
        let foreign_key = out
            .iter()
            .position(|s| s.contains("fk_members_team"))
            .unwrap_or_else(|| panic!("{kind}: no foreign key"));
        assert!(create_teams < foreign_key, "{kind}: {:?}", out.statements);
    }
}

#[test]
fn foreign_keys_are_dropped_before_tables() {
    let tables = [teams(), members()];
    for kind in PlatformKind::ALL {
        let out = platform(kind).drop_tables(&tables);
        let first_drop = out
            .iter()
            .position(|s| s.starts_with("DROP TABLE"))
            .unwrap_or_else(|| panic!("{kind}: no DROP TABLE"));
        let last_fk = out.iter().rposition(|s| s.contains("fk_members_team"));
        if let Some(last_fk) = last_fk {
            assert!(last_fk < first_drop, "{kind}: {:?}", out.statements);
        }
    }
}

//! The closed set of supported platforms.
//!
//! Callers pick a [`PlatformKind`] once per connection. [`platform`] hands
//! out a shared, default-configured instance. [`create`] builds one with a
//! custom [`PlatformConfig`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::platform::{
    Db2Platform, MySqlPlatform, OraclePlatform, Platform, PlatformConfig, PostgreSqlPlatform,
    SqlServerPlatform, SqlitePlatform,
};

/// A supported dialect family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
    /// SQLite.
    Sqlite,
    /// Oracle Database.
    Oracle,
    /// Microsoft SQL Server.
    SqlServer,
    /// IBM DB2.
    Db2,
}

impl PlatformKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 6] = [
        Self::MySql,
        Self::PostgreSql,
        Self::Sqlite,
        Self::Oracle,
        Self::SqlServer,
        Self::Db2,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
            Self::Db2 => "db2",
        }
    }

    /// Other accepted spellings.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::MySql => &["mariadb"],
            Self::PostgreSql => &["postgres", "pgsql", "pg"],
            Self::Sqlite => &["sqlite3"],
            Self::Oracle => &["oci"],
            Self::SqlServer => &["mssql", "sqlsrv"],
            Self::Db2 => &["ibm_db2"],
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A platform name that matches no [`PlatformKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformKind {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || kind.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

static MYSQL: MySqlPlatform = MySqlPlatform::new();
static POSTGRESQL: PostgreSqlPlatform = PostgreSqlPlatform::new();
static SQLITE: SqlitePlatform = SqlitePlatform::new();
static ORACLE: OraclePlatform = OraclePlatform::new();
static SQLSERVER: SqlServerPlatform = SqlServerPlatform::new();
static DB2: Db2Platform = Db2Platform::new();

/// The shared default instance of `kind`.
#[must_use]
pub fn platform(kind: PlatformKind) -> &'static dyn Platform {
    match kind {
        PlatformKind::MySql => &MYSQL,
        PlatformKind::PostgreSql => &POSTGRESQL,
        PlatformKind::Sqlite => &SQLITE,
        PlatformKind::Oracle => &ORACLE,
        PlatformKind::SqlServer => &SQLSERVER,
        PlatformKind::Db2 => &DB2,
    }
}

/// A new instance of `kind` with `config`.
#[must_use]
pub fn create(kind: PlatformKind, config: PlatformConfig) -> Box<dyn Platform> {
    match kind {
        PlatformKind::MySql => Box::new(MySqlPlatform::new().with_config(config)),
        PlatformKind::PostgreSql => Box::new(PostgreSqlPlatform::new().with_config(config)),
        PlatformKind::Sqlite => Box::new(SqlitePlatform::new().with_config(config)),
        PlatformKind::Oracle => Box::new(OraclePlatform::new().with_config(config)),
        PlatformKind::SqlServer => Box::new(SqlServerPlatform::new().with_config(config)),
        PlatformKind::Db2 => Box::new(Db2Platform::new().with_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("mysql".parse::<PlatformKind>(), Ok(PlatformKind::MySql));
        assert_eq!("Postgres".parse::<PlatformKind>(), Ok(PlatformKind::PostgreSql));
        assert_eq!(" mssql ".parse::<PlatformKind>(), Ok(PlatformKind::SqlServer));
        assert_eq!(
            "informix".parse::<PlatformKind>(),
            Err(UnknownPlatform(String::from("informix")))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for kind in PlatformKind::ALL {
            assert_eq!(kind.to_string().parse::<PlatformKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_registry_instances_match_their_kind() {
        for kind in PlatformKind::ALL {
            assert_eq!(platform(kind).kind(), kind);
            assert_eq!(create(kind, PlatformConfig::quote_all()).kind(), kind);
        }
    }

    #[test]
    fn test_created_instances_use_the_config() {
        let p = create(PlatformKind::PostgreSql, PlatformConfig::quote_all());
        assert_eq!(p.quote_name("users"), "\"users\"");
        assert_eq!(platform(PlatformKind::PostgreSql).quote_name("users"), "users");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&PlatformKind::SqlServer).unwrap(),
            "\"sqlserver\""
        );
        assert_eq!(
            serde_json::from_str::<PlatformKind>("\"db2\"").unwrap(),
            PlatformKind::Db2
        );
    }
}

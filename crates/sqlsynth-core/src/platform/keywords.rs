//! Reserved keyword lists, one per platform family.
//!
//! A name found in the list of the target platform is quoted even when the
//! quoting policy is [`IdentifierQuoting::AsNeeded`](super::IdentifierQuoting).

use std::collections::HashSet;
use std::sync::LazyLock;

/// An immutable, case-insensitive set of reserved words.
#[derive(Debug)]
pub struct KeywordList {
    name: &'static str,
    words: HashSet<&'static str>,
}

impl KeywordList {
    fn new(name: &'static str, groups: &[&[&'static str]]) -> Self {
        Self {
            name,
            words: groups.iter().flat_map(|g| g.iter().copied()).collect(),
        }
    }

    /// Name of the keyword list.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the word is reserved, ignoring ASCII case.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word.to_ascii_uppercase().as_str())
    }

    /// Number of reserved words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

const COMMON: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK",
    "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT",
    "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT",
    "LIKE", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT",
    "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING",
    "VALUES", "WHEN", "WHERE", "WITH",
];

const MYSQL: &[&str] = &[
    "ACCESSIBLE", "ANALYZE", "ASENSITIVE", "BEFORE", "BIGINT", "BINARY", "BLOB", "BOTH", "CALL",
    "CASCADE", "CHANGE", "CHAR", "CHARACTER", "COLLATE", "CONDITION", "CONTINUE", "CONVERT",
    "CURSOR", "DATABASE", "DATABASES", "DAY_HOUR", "DAY_MICROSECOND", "DAY_MINUTE",
    "DAY_SECOND", "DEC", "DECIMAL", "DECLARE", "DELAYED", "DESCRIBE", "DETERMINISTIC",
    "DISTINCTROW", "DIV", "DOUBLE", "DUAL", "EACH", "ELSEIF", "ENCLOSED", "ESCAPED", "EXIT",
    "EXPLAIN", "FLOAT", "FORCE", "FULLTEXT", "GENERATED", "GROUPS", "HIGH_PRIORITY", "IF",
    "IGNORE", "INDEX", "INFILE", "INOUT", "INT", "INTEGER", "INTERVAL", "ITERATE", "KEYS", "KILL",
    "LEADING", "LEAVE", "LIMIT", "LINEAR", "LINES", "LOAD", "LOCALTIME", "LOCALTIMESTAMP",
    "LOCK", "LONG", "LONGBLOB", "LONGTEXT", "LOOP", "LOW_PRIORITY", "MATCH", "MEDIUMBLOB",
    "MEDIUMINT", "MEDIUMTEXT", "MOD", "MODIFIES", "NAME", "NATURAL", "NUMERIC", "OPTIMIZE",
    "OPTION", "OPTIONALLY", "OUT", "OUTFILE", "PARTITION", "PRECISION", "PROCEDURE", "PURGE",
    "RANGE", "RANK", "READ", "READS", "REAL", "REGEXP", "RELEASE", "RENAME", "REPEAT",
    "REPLACE", "REQUIRE", "RESTRICT", "RETURN", "REVOKE", "RLIKE", "ROW", "ROWS", "SCHEMA",
    "SCHEMAS", "SENSITIVE", "SEPARATOR", "SHOW", "SIGNAL", "SMALLINT", "SPATIAL", "SPECIFIC",
    "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING", "SSL", "STARTING", "STORED",
    "STRAIGHT_JOIN", "TERMINATED", "TINYBLOB", "TINYINT", "TINYTEXT", "TRAILING", "TRIGGER",
    "UNDO", "UNLOCK", "UNSIGNED", "USAGE", "USE", "UTC_DATE", "UTC_TIME", "UTC_TIMESTAMP",
    "VARBINARY", "VARCHAR", "VARCHARACTER", "VARYING", "VIRTUAL", "WHILE", "WINDOW", "WRITE",
    "XOR", "YEAR_MONTH", "ZEROFILL",
];

const POSTGRESQL: &[&str] = &[
    "ANALYSE", "ANALYZE", "ARRAY", "ASYMMETRIC", "AUTHORIZATION", "BINARY", "BOTH", "COLLATE",
    "COLLATION", "CONCURRENTLY", "CURRENT_CATALOG", "CURRENT_ROLE", "CURRENT_SCHEMA", "DEFERRABLE",
    "DO", "FREEZE", "ILIKE", "INITIALLY", "ISNULL", "LATERAL", "LEADING", "LIMIT", "LOCALTIME",
    "LOCALTIMESTAMP", "NATURAL", "NOTNULL", "OFFSET", "ONLY", "OVERLAPS", "PLACING", "RETURNING",
    "SESSION_USER", "SIMILAR", "SOME", "SYMMETRIC", "TABLESAMPLE", "TRAILING", "VARIADIC",
    "VERBOSE", "WINDOW",
];

const SQLITE: &[&str] = &[
    "ABORT", "ACTION", "AFTER", "ANALYZE", "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN",
    "CASCADE", "COLLATE", "COMMIT", "CONFLICT", "DATABASE", "DEFERRABLE", "DEFERRED", "DETACH",
    "EACH", "ESCAPE", "EXCLUSIVE", "EXPLAIN", "FAIL", "GLOB", "IF", "IGNORE", "IMMEDIATE",
    "INDEX", "INDEXED", "INITIALLY", "INSTEAD", "ISNULL", "LIMIT", "MATCH", "NATURAL", "NO",
    "NOTNULL", "OF", "OFFSET", "PLAN", "PRAGMA", "QUERY", "RAISE", "RECURSIVE", "REGEXP",
    "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "ROLLBACK", "ROW", "SAVEPOINT",
    "TEMP", "TEMPORARY", "TRANSACTION", "TRIGGER", "VACUUM", "VIEW", "VIRTUAL", "WITHOUT",
];

const ORACLE: &[&str] = &[
    "ACCESS", "AUDIT", "CHAR", "CLUSTER", "COMMENT", "COMPRESS", "CONNECT", "CURRENT", "DATE",
    "DECIMAL", "EXCLUSIVE", "FILE", "FLOAT", "IDENTIFIED", "IMMEDIATE", "INCREMENT", "INDEX",
    "INITIAL", "INTEGER", "LEVEL", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE",
    "MODIFY", "NOAUDIT", "NOCOMPRESS", "NOWAIT", "NUMBER", "OF", "OFFLINE", "ONLINE", "OPTION",
    "PCTFREE", "PRIOR", "PRIVILEGES", "PUBLIC", "RAW", "RENAME", "RESOURCE", "REVOKE", "ROW",
    "ROWID", "ROWNUM", "ROWS", "SESSION", "SHARE", "SIZE", "SMALLINT", "START", "SUCCESSFUL",
    "SYNONYM", "SYSDATE", "TRIGGER", "UID", "VALIDATE", "VARCHAR", "VARCHAR2", "VIEW",
    "WHENEVER",
];

const SQLSERVER: &[&str] = &[
    "BACKUP", "BEGIN", "BREAK", "BROWSE", "BULK", "CASCADE", "CHECKPOINT", "CLOSE", "CLUSTERED",
    "COALESCE", "COLLATE", "COMMIT", "COMPUTE", "CONTAINS", "CONTAINSTABLE", "CONTINUE",
    "CONVERT", "CURRENT", "CURSOR", "DATABASE", "DBCC", "DEALLOCATE", "DECLARE", "DENY", "DISK",
    "DISTRIBUTED", "DOUBLE", "DUMP", "ERRLVL", "ESCAPE", "EXEC", "EXECUTE", "EXIT", "FILE",
    "FILLFACTOR", "FREETEXT", "FREETEXTTABLE", "FUNCTION", "GOTO", "HOLDLOCK", "IDENTITY",
    "IDENTITYCOL", "IDENTITY_INSERT", "IF", "INDEX", "KILL", "LINENO", "LOAD", "MERGE",
    "NATIONAL", "NOCHECK", "NONCLUSTERED", "NULLIF", "OF", "OFF", "OFFSETS", "OPEN",
    "OPENDATASOURCE", "OPENQUERY", "OPENROWSET", "OPENXML", "OPTION", "OVER", "PERCENT", "PIVOT",
    "PLAN", "PRINT", "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ", "READTEXT",
    "RECONFIGURE", "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT", "REVOKE",
    "ROLLBACK", "ROWCOUNT", "ROWGUIDCOL", "RULE", "SAVE", "SCHEMA", "SESSION_USER", "SETUSER",
    "SHUTDOWN", "SOME", "STATISTICS", "SYSTEM_USER", "TABLESAMPLE", "TEXTSIZE", "TOP", "TRAN",
    "TRANSACTION", "TRIGGER", "TRUNCATE", "TSEQUAL", "UNPIVOT", "UPDATETEXT", "USE", "VARYING",
    "VIEW", "WAITFOR", "WHILE", "WITHIN", "WRITETEXT",
];

const DB2: &[&str] = &[
    "ACTIVATE", "AFTER", "ALIAS", "ALLOCATE", "ALLOW", "ASSOCIATE", "ASUTIME", "AUDIT", "AUX",
    "AUXILIARY", "BEFORE", "BEGIN", "BUFFERPOOL", "CALL", "CALLED", "CAPTURE", "CARDINALITY",
    "CCSID", "CLONE", "CLOSE", "CLUSTER", "COLLECTION", "COLLID", "COMMENT", "COMMIT",
    "CONCAT", "CONDITION", "CONNECT", "CONNECTION", "CONTAINS", "CONTINUE", "COUNT",
    "COUNT_BIG", "CURRENT", "CURSOR", "CYCLE", "DATA", "DATABASE", "DATAPARTITIONNAME", "DAY",
    "DAYS", "DB2GENERAL", "DB2GENRL", "DB2SQL", "DBINFO", "DECLARE", "DEFINITION", "DESCRIPTOR",
    "DETERMINISTIC", "DISALLOW", "DISCONNECT", "DO", "DOUBLE", "DSSIZE", "DYNAMIC", "EACH",
    "EDITPROC", "ENCODING", "ENCRYPTION", "ENDING", "ERASE", "ESCAPE", "EXCLUDING", "EXCLUSIVE",
    "EXECUTE", "EXIT", "EXTERNAL", "FENCED", "FIELDPROC", "FILE", "FINAL", "FREE", "FUNCTION",
    "GENERAL", "GENERATED", "GET", "GLOBAL", "GO", "GOTO", "GRAPHIC", "HANDLER", "HASH",
    "HOLD", "HOUR", "HOURS", "IDENTITY", "IF", "IMMEDIATE", "INCLUDING", "INCREMENT", "INDEX",
    "INDICATOR", "INF", "INHERIT", "INOUT", "INSENSITIVE", "INTEGRITY", "ISOBID", "ISOLATION",
    "ITERATE", "JAR", "JAVA", "LABEL", "LANGUAGE", "LATERAL", "LEAVE", "LEVEL2", "LINKTYPE",
    "LOCAL", "LOCALE", "LOCATOR", "LOCATORS", "LOCK", "LOCKMAX", "LOCKSIZE", "LONG", "LOOP",
    "MAXVALUE", "MICROSECOND", "MICROSECONDS", "MINUTE", "MINUTES", "MINVALUE", "MODE",
    "MODIFIES", "MONTH", "MONTHS", "NAN", "NEW", "NEW_TABLE", "NEXTVAL", "NOCACHE", "NOCYCLE",
    "NODENAME", "NODENUMBER", "NOMAXVALUE", "NOMINVALUE", "NOORDER", "NORMALIZED", "NULLS",
    "NUMPARTS", "OBID", "OF", "OLD", "OLD_TABLE", "OPEN", "OPTIMIZATION", "OPTIMIZE", "OPTION",
    "OUT", "OVERRIDING", "PACKAGE", "PADDED", "PAGESIZE", "PARAMETER", "PART", "PARTITION",
    "PARTITIONED", "PARTITIONING", "PARTITIONS", "PASSWORD", "PATH", "PIECESIZE", "PLAN",
    "POSITION", "PRECISION", "PREPARE", "PREVVAL", "PRIQTY", "PRIVILEGES", "PROCEDURE",
    "PROGRAM", "PSID", "QUERY", "QUERYNO", "RANK", "READ", "READS", "RECOVERY", "REFERENCING",
    "REFRESH", "RELEASE", "RENAME", "REPEAT", "RESET", "RESIGNAL", "RESTART", "RESTRICT",
    "RESULT", "RESULT_SET_LOCATOR", "RETURN", "RETURNS", "REVOKE", "ROLE", "ROLLBACK",
    "ROUND_CEILING", "ROUND_DOWN", "ROUND_FLOOR", "ROUND_HALF_DOWN", "ROUND_HALF_EVEN",
    "ROUND_HALF_UP", "ROUND_UP", "ROUTINE", "ROW", "ROWNUMBER", "ROWS", "ROWSET", "ROW_NUMBER",
    "RRN", "RUN", "SAVEPOINT", "SCHEMA", "SCRATCHPAD", "SCROLL", "SEARCH", "SECOND", "SECONDS",
    "SECQTY", "SECURITY", "SENSITIVE", "SEQUENCE", "SESSION", "SESSION_USER", "SIGNAL",
    "SIMPLE", "SNAN", "SOME", "SOURCE", "SPECIFIC", "SQL", "SQLID", "STACKED", "STANDARD",
    "START", "STARTING", "STATEMENT", "STATIC", "STAY", "STOGROUP", "STORES", "STYLE",
    "SUBSTRING", "SUMMARY", "SYNONYM", "SYSFUN", "SYSIBM", "SYSPROC", "SYSTEM", "SYSTEM_USER",
    "TABLESPACE", "TRIGGER", "TRUNCATE", "TYPE", "UNDO", "UNTIL", "USAGE", "VALIDPROC", "VALUE",
    "VARIABLE", "VARIANT", "VCAT", "VERSION", "VIEW", "VOLATILE", "VOLUMES", "WHILE", "WLM",
    "WITHOUT", "WRITE", "XMLELEMENT", "XMLEXISTS", "XMLNAMESPACES", "YEAR", "YEARS",
];

/// MySQL and MariaDB.
pub static MYSQL_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("MySQL", &[COMMON, MYSQL]));

/// PostgreSQL.
pub static POSTGRESQL_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("PostgreSQL", &[COMMON, POSTGRESQL]));

/// SQLite.
pub static SQLITE_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("SQLite", &[COMMON, SQLITE]));

/// Oracle.
pub static ORACLE_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("Oracle", &[COMMON, ORACLE]));

/// SQL Server.
pub static SQLSERVER_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("SQL Server", &[COMMON, SQLSERVER]));

/// DB2.
pub static DB2_KEYWORDS: LazyLock<KeywordList> =
    LazyLock::new(|| KeywordList::new("DB2", &[COMMON, DB2]));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert!(MYSQL_KEYWORDS.contains("select"));
        assert!(MYSQL_KEYWORDS.contains("Name"));
        assert!(!MYSQL_KEYWORDS.contains("users"));
    }

    #[test]
    fn test_dialect_specific_words() {
        assert!(ORACLE_KEYWORDS.contains("rownum"));
        assert!(!SQLITE_KEYWORDS.contains("rownum"));
        assert!(SQLSERVER_KEYWORDS.contains("identity"));
        assert!(POSTGRESQL_KEYWORDS.contains("ilike"));
    }

    #[test]
    fn test_every_list_contains_common_words() {
        for list in [
            &*MYSQL_KEYWORDS,
            &*POSTGRESQL_KEYWORDS,
            &*SQLITE_KEYWORDS,
            &*ORACLE_KEYWORDS,
            &*SQLSERVER_KEYWORDS,
            &*DB2_KEYWORDS,
        ] {
            assert!(list.contains("ORDER"), "{} lacks ORDER", list.name());
            assert!(!list.is_empty());
        }
    }
}

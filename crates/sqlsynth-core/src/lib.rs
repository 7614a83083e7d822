//! # sqlsynth-core
//!
//! Cross-dialect SQL synthesis. Schema descriptions and structured queries
//! go in, SQL text comes out, for MySQL/MariaDB, PostgreSQL, SQLite,
//! Oracle, SQL Server and DB2.
//!
//! This crate provides:
//! - A database-agnostic schema model with a comparator that computes
//!   table and schema diffs
//! - DDL generation (`CREATE`/`DROP` for tables, indexes, foreign keys and
//!   sequences) in dependency order
//! - `ALTER TABLE` planning, including full table rebuilds where the
//!   dialect cannot alter columns in place
//! - Query rendering with dialect-specific paging and row locking
//!
//! Nothing here touches a database. Every generator is a pure function of
//! its input and returns either the complete statement list or an error.
//!
//! ## Creating a table
//!
//! ```rust
//! use sqlsynth_core::platform::{MySqlPlatform, Platform};
//! use sqlsynth_core::schema::{Column, LogicalType, Table};
//!
//! let users = Table::new("users")
//!     .column(Column::new("id", LogicalType::Integer).autoincrement())
//!     .column(Column::new("name", LogicalType::string(255)))
//!     .primary_key(&["id"]);
//!
//! let out = MySqlPlatform::new().create_table(&users).unwrap();
//! assert_eq!(out.len(), 1);
//! assert!(out.statements[0].contains("id INT AUTO_INCREMENT NOT NULL"));
//! assert!(out.statements[0].contains("`name` VARCHAR(255) NOT NULL"));
//! assert!(out.statements[0].contains("PRIMARY KEY (id)"));
//! ```
//!
//! ## Altering a table
//!
//! ```rust
//! use sqlsynth_core::registry::{platform, PlatformKind};
//! use sqlsynth_core::schema::{compare_tables, Column, LogicalType, Table};
//!
//! let old = Table::new("users").column(Column::new("id", LogicalType::Integer));
//! let new = old
//!     .clone()
//!     .column(Column::new("email", LogicalType::string(100)).nullable());
//! let diff = compare_tables(&old, &new).unwrap();
//!
//! let out = platform(PlatformKind::Sqlite).alter_table(&diff).unwrap();
//! assert_eq!(
//!     out.statements,
//!     ["ALTER TABLE users ADD COLUMN email VARCHAR(100) DEFAULT NULL"]
//! );
//! ```

mod alter;
mod ddl;
pub mod diagnostics;
pub mod error;
pub mod platform;
pub mod query;
pub mod registry;
pub mod schema;

pub use diagnostics::{Diagnostic, Statements};
pub use error::{Result, SynthError};
pub use platform::{Platform, PlatformConfig};
pub use registry::PlatformKind;

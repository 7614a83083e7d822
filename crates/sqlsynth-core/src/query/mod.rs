//! Query rendering.
//!
//! A [`QueryParts`] describes a `SELECT`, `INSERT`, `UPDATE` or `DELETE`
//! without committing to a dialect. Rendering it through a platform
//! quotes table names, assembles the clauses in SQL order, rewrites paging
//! for platforms without a native offset and appends locking clauses.
//!
//! ```
//! use sqlsynth_core::platform::{Platform, SqlServerPlatform};
//! use sqlsynth_core::query::QueryParts;
//!
//! let parts = QueryParts::select(&["id"]).from("users", None).limit(10).offset(20);
//! let rendered = SqlServerPlatform::new().render_query(&parts).unwrap();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT id FROM users ORDER BY (SELECT 0) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
//! );
//! ```

mod limit;
mod parts;
mod predicate;
mod render;
mod value;

pub(crate) use limit::limit_query;
pub(crate) use render::render;

pub use parts::{Join, JoinKind, OrderBy, QueryKind, QueryParts, SortDirection, TableRef};
pub use predicate::{ComparisonOp, Predicate};
pub use render::RenderedQuery;
pub use value::{Parameter, SqlValue, ToSqlValue};

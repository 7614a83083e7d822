//! Database-agnostic schema model.
//!
//! Tables, columns, indexes, constraints and sequences are plain values owned
//! by the caller. Platforms borrow them for the duration of one generation
//! call. Changes between two snapshots are expressed as a [`TableDiff`],
//! either built by hand or computed with the [`Comparator`].

mod catalog;
mod column;
mod comparator;
mod constraint;
mod diff;
pub mod identifier;
mod index;
mod sequence;
mod table;
mod types;

pub use catalog::{compare_schemas, Schema, SchemaDiff};
pub use column::{Column, DefaultValue};
pub use comparator::{compare_columns, compare_tables, Comparator};
pub use constraint::{
    CheckConstraint, ForeignKeyConstraint, ReferentialAction, ReferentialEvent, UniqueConstraint,
};
pub use diff::{ColumnDiff, ColumnProperty, TableDiff};
pub use index::{Index, PRIMARY_INDEX_NAME};
pub use sequence::Sequence;
pub use table::{Table, TableOptions};
pub use types::{
    LogicalType, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE, DEFAULT_STRING_LENGTH,
};

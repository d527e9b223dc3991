//! Headless table model bound to server-side state
//!
//! The table runs in manual mode: rows are displayed exactly as fetched,
//! never filtered, sorted or paginated locally.

pub mod binding;
pub mod column;

pub use binding::{RowIdFn, Table, TableBinding, facet_key};
pub use column::{Accessor, ColumnDef};

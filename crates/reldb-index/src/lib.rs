//! Ordered multi-column index over a table's rows (spec.md §4.4).

mod error;
mod key;
mod tree;

pub use error::IndexError;
pub use key::{compare_rows, is_all_null, project};
pub use tree::{IndexIter, IndexRangeIter, IndexTree};

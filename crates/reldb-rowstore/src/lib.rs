//! Row representation and the memory/cached/text row store variants
//! (spec.md §4.3).

mod error;
mod row;
mod store;

pub use error::RowStoreError;
pub use row::{Row, RowActionId};
pub use store::{RowStore, RowStoreKind};

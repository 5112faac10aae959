//! Shared ids, error types, and timestamp counters used by every crate in
//! the storage/execution engine workspace.

mod error;
mod ids;
mod position;
mod timestamp;
mod value;

pub use error::CoreError;
pub use ids::{ColId, ConstraintId, IndexId, SchemaId, SequenceId, TableId};
pub use position::{round_up_to_unit, smallest_power_of_two_block, FilePosition};
pub use timestamp::ChangeCounter;
pub use value::CellValue;

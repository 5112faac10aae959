use reldb_common::TableId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableSpaceError {
    /// The global space manager refused to allocate.
    #[error("no space available for table {space_id} (requested {requested_size} bytes)")]
    NoSpace { space_id: TableId, requested_size: u64 },
}

use reldb_common::FilePosition;
use reldb_tablespace::TableSpaceError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowStoreError {
    #[error("no row at position {0:?}")]
    RowNotFound(FilePosition),
    #[error(transparent)]
    Space(#[from] TableSpaceError),
    #[error("malformed index-roots string: {0:?}")]
    InvalidIndexRoots(String),
}

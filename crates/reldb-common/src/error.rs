use thiserror::Error;

/// Errors shared across subsystems that don't belong to exactly one of them.
///
/// Subsystem-specific errors (`TableSpaceError`, `RowStoreError`, `IndexError`,
/// `TableError`, `StatementCacheError`) live in their own crates and fold a
/// `CoreError` in via `#[from]` where they need one of these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("column `{0}` not found")]
    ColumnNotFound(String),
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("object `{0}` already exists")]
    DuplicateObject(String),
    #[error("table `{0}` is read-only")]
    DataReadOnly(String),
    #[error("schema object `{0}` is still in use")]
    SchemaObjectInUse(String),
    #[error("internal invariant failed at {0}")]
    InternalInvariant(&'static str),
}

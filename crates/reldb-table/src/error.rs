use reldb_common::{ColId, CoreError, TableId};
use reldb_index::IndexError;
use reldb_rowstore::RowStoreError;
use reldb_tablespace::TableSpaceError;

/// Everything that can go wrong enforcing a single row's constraints
/// (spec.md §7).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column {col:?} of table {table} may not be null")]
    NotNullViolation { table: TableId, col: ColId, constraint: String },
    #[error("unique index violation: {0}")]
    UniqueViolation(#[from] IndexError),
    #[error("foreign key constraint {constraint} violated on table {table}")]
    ForeignKeyViolation { table: TableId, constraint: String },
    #[error("check constraint {constraint} violated on table {table}")]
    CheckConstraintViolation { table: TableId, constraint: String },
    #[error("table {0} is read-only")]
    DataReadOnly(TableId),
    #[error("row not found")]
    RowNotFound,
    #[error("trigger {name} failed: {reason}")]
    TriggerFailed { name: String, reason: String },
    #[error(transparent)]
    RowStore(#[from] RowStoreError),
}

/// Aggregate error for the whole engine, mirroring the teacher's `DBError`
/// hierarchy: every subsystem's error converts into this one via `#[from]`
/// rather than each subsystem depending on the others' error types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Space(#[from] TableSpaceError),
    #[error(transparent)]
    RowStore(#[from] RowStoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Table(#[from] TableError),
}

use reldb_common::{CellValue, IndexId, TableId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("unique constraint {constraint_name} on table {table_id} violated by value {value:?}")]
    UniqueViolation {
        index_id: IndexId,
        constraint_name: String,
        table_id: TableId,
        value: Vec<CellValue>,
    },
}

use nonempty::NonEmpty;
use reldb_common::{CellValue, ColId, TableId};

use crate::error::TableError;

/// Probes a foreign key's referenced unique index. A standalone `Table`
/// outside any catalog has nothing to probe against, so it is supplied a
/// checker rather than reaching across tables itself (spec.md §4.5:
/// "foreign keys probe the referenced unique index").
pub trait ForeignKeyChecker {
    fn check_foreign_key(
        &self,
        ref_table: TableId,
        ref_cols: &NonEmpty<ColId>,
        key: &[CellValue],
        constraint_name: &str,
        table_id: TableId,
    ) -> Result<(), TableError>;
}

/// Accepts every foreign key unconditionally — the default for a table used
/// outside a [`crate::catalog::Catalog`], or one with no foreign keys.
#[derive(Default)]
pub struct NoopForeignKeys;

impl ForeignKeyChecker for NoopForeignKeys {
    fn check_foreign_key(
        &self,
        _ref_table: TableId,
        _ref_cols: &NonEmpty<ColId>,
        _key: &[CellValue],
        _constraint_name: &str,
        _table_id: TableId,
    ) -> Result<(), TableError> {
        Ok(())
    }
}

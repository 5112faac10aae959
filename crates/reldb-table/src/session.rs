use reldb_common::{CellValue, ColId, FilePosition, TableId};

use crate::error::TableError;

/// The session's transaction journal (spec.md §6's "addInsertAction" /
/// "addDeleteAction" callback surface).
pub trait ActionLog {
    fn record_insert(&mut self, table_id: TableId, pos: FilePosition);
    fn record_delete(&mut self, table_id: TableId, pos: FilePosition);
}

/// The transaction manager's monotonic commit counter (spec.md §6's
/// `globalChangeTimestamp`), read-only from the table's perspective.
pub trait TransactionClock {
    fn global_change_timestamp(&self) -> u64;
}

/// Everything a [`crate::table::Table`] needs from the calling session.
pub trait SessionContext: ActionLog + TransactionClock {}
impl<T: ActionLog + TransactionClock> SessionContext for T {}

/// Per-column type-coercion/range checking. Out of scope per spec.md §1;
/// a table still calls into it so the operation's place in the insert
/// sequence is visible, but the default implementation trusts its input.
pub trait TypeCoercion {
    fn check_and_coerce(&self, col: ColId, value: &mut CellValue) -> Result<(), TableError>;
}

#[derive(Default)]
pub struct NoopCoercion;

impl TypeCoercion for NoopCoercion {
    fn check_and_coerce(&self, _col: ColId, _value: &mut CellValue) -> Result<(), TableError> {
        Ok(())
    }
}

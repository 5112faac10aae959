use std::cell::Cell;

use reldb_common::{CellValue, FilePosition};
use smallvec::SmallVec;

/// Opaque reference to an entry on a session's transaction journal.
///
/// The journal itself lives with the session (an external `ActionLog`
/// collaborator); a row only needs to remember which entry, if any, records
/// its own pending insert/delete so `deleteNoCheck` can recognize a row a
/// cascade has already visited.
pub type RowActionId = u64;

/// A materialized row.
///
/// `nodes[i]` is this row's back-pointer into index `i`: `true` once the row
/// has been linked into that index, `false` once unlinked. A table's
/// invariant is that a row is linked into every one of its indexes or into
/// none — see [`crate::RowStore::commit`].
#[derive(Debug, Clone)]
pub struct Row {
    pub pos: FilePosition,
    pub values: Vec<CellValue>,
    pub(crate) nodes: SmallVec<[bool; 4]>,
    pub cascade_deleted: Cell<bool>,
    pub row_action: Option<RowActionId>,
}

impl Row {
    pub(crate) fn new(pos: FilePosition, values: Vec<CellValue>, num_indexes: usize) -> Self {
        Self {
            pos,
            values,
            nodes: SmallVec::from_elem(false, num_indexes),
            cascade_deleted: Cell::new(false),
            row_action: None,
        }
    }

    pub fn is_linked(&self, index_ordinal: usize) -> bool {
        self.nodes.get(index_ordinal).copied().unwrap_or(false)
    }

    pub fn mark_linked(&mut self, index_ordinal: usize) {
        self.nodes[index_ordinal] = true;
    }

    pub fn mark_unlinked(&mut self, index_ordinal: usize) {
        self.nodes[index_ordinal] = false;
    }

    pub fn is_cascade_deleted(&self) -> bool {
        self.cascade_deleted.get()
    }

    pub fn mark_cascade_deleted(&self) {
        self.cascade_deleted.set(true);
    }
}

use indexmap::IndexMap;
use reldb_common::{CellValue, FilePosition, TableId};
use reldb_tablespace::{DataSpaceManager, TableSpaceAllocator, TableSpaceConfig};
use smallvec::SmallVec;
use tracing::instrument;

use crate::error::RowStoreError;
use crate::row::Row;

/// Which of the three backing variants a [`RowStore`] implements.
///
/// Modeled as a closed sum rather than a trait object hierarchy: the three
/// variants differ only in how a position is minted (heap counter vs.
/// allocator-backed), not in the row lifecycle itself, so a `match` on the
/// kind is clearer than dynamic dispatch through a shared trait.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowStoreKind {
    /// Pure heap storage, positions are a monotonic in-process counter.
    Memory,
    /// File-backed, positions come from a [`TableSpaceAllocator`] and are
    /// cached in memory once materialized.
    Cached,
    /// File-backed like `Cached`, but the underlying extent holds
    /// line-oriented text rather than packed binary rows.
    Text,
}

impl RowStoreKind {
    fn is_file_backed(self) -> bool {
        matches!(self, RowStoreKind::Cached | RowStoreKind::Text)
    }
}

/// Rough on-disk footprint of a row, used to size file-backed allocations.
/// Not a wire format: the per-column overhead only needs to be a stable
/// upper bound for allocator sizing.
fn estimate_row_size(values: &[CellValue]) -> u64 {
    values.iter().map(|v| v.approx_byte_len() as u64).sum()
}

/// Abstraction over the three row-storage variants (spec.md §4.3).
///
/// Holds every materialized row plus, per index, the root-node position
/// ([`Self::get_accessor`]/[`Self::set_accessor`]) the index implementation
/// uses to find its own root without the row store knowing anything about
/// index internals.
pub struct RowStore {
    kind: RowStoreKind,
    space_id: TableId,
    rows: IndexMap<FilePosition, Row>,
    next_memory_pos: u64,
    allocator: Option<TableSpaceAllocator>,
    accessors: SmallVec<[Option<FilePosition>; 4]>,
    /// Divisor applied to accessor positions when they're serialised to the
    /// index-roots string (spec.md §6), taken from the table's
    /// [`TableSpaceConfig`] at construction.
    scale: u32,
}

impl RowStore {
    pub fn new(kind: RowStoreKind, space_id: TableId, config: TableSpaceConfig, num_indexes: usize) -> Self {
        Self {
            kind,
            space_id,
            rows: IndexMap::new(),
            next_memory_pos: 0,
            allocator: kind.is_file_backed().then(|| TableSpaceAllocator::new(space_id, config)),
            accessors: SmallVec::from_elem(None, num_indexes),
            scale: config.scale,
        }
    }

    pub fn kind(&self) -> RowStoreKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Allocate a row and make it reachable by position. Per spec.md §4.3,
    /// from this call until `commit` or an explicit `remove`, the row stays
    /// reachable via the returned position.
    #[instrument(skip(self, column_values, space))]
    pub fn get_new_cached_object(
        &mut self,
        column_values: Vec<CellValue>,
        num_indexes: usize,
        space: &mut dyn DataSpaceManager,
    ) -> Result<FilePosition, RowStoreError> {
        let pos = match self.kind {
            RowStoreKind::Memory => {
                let pos = FilePosition::new(self.next_memory_pos);
                self.next_memory_pos += 1;
                pos
            }
            RowStoreKind::Cached | RowStoreKind::Text => {
                let size = estimate_row_size(&column_values);
                self.allocator
                    .as_mut()
                    .expect("file-backed kind always carries an allocator")
                    .get_file_position(size, false, space)?
            }
        };

        self.rows.insert(pos, Row::new(pos, column_values, num_indexes));
        Ok(pos)
    }

    pub fn get(&self, pos: FilePosition) -> Option<&Row> {
        self.rows.get(&pos)
    }

    pub fn get_mut(&mut self, pos: FilePosition) -> Option<&mut Row> {
        self.rows.get_mut(&pos)
    }

    pub fn get_accessor(&self, index_ordinal: usize) -> Option<FilePosition> {
        self.accessors.get(index_ordinal).copied().flatten()
    }

    pub fn set_accessor(&mut self, index_ordinal: usize, root: Option<FilePosition>) {
        if index_ordinal >= self.accessors.len() {
            self.accessors.resize(index_ordinal + 1, None);
        }
        self.accessors[index_ordinal] = root;
    }

    /// Serialise every index's accessor as a whitespace-separated sequence
    /// of scaled 32-bit integers, `-1` standing in for an absent root
    /// (spec.md §6's index-roots persisted string).
    pub fn serialize_index_roots(&self) -> String {
        self.accessors
            .iter()
            .map(|root| match root.and_then(|pos| pos.to_scaled(self.scale)) {
                Some(scaled) => scaled.to_string(),
                None => "-1".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse the format written by [`Self::serialize_index_roots`] back into
    /// this store's accessors. Replaces the accessor list wholesale, so the
    /// caller must supply a string with one token per index.
    pub fn load_index_roots(&mut self, text: &str) -> Result<(), RowStoreError> {
        let mut roots = SmallVec::new();
        for token in text.split_whitespace() {
            let n: i64 = token
                .parse()
                .map_err(|_| RowStoreError::InvalidIndexRoots(text.to_string()))?;
            roots.push(if n < 0 {
                None
            } else {
                Some(FilePosition::from_scaled(n as u32, self.scale))
            });
        }
        self.accessors = roots;
        Ok(())
    }

    /// Mark a row as durably committed. The simplified single-tier store
    /// here has nothing further to flush; this exists so callers have a
    /// single place to call once a transaction settles, matching the
    /// teacher's `commit`/`remove` pairing.
    pub fn commit(&self, pos: FilePosition) -> Result<(), RowStoreError> {
        if self.rows.contains_key(&pos) {
            Ok(())
        } else {
            Err(RowStoreError::RowNotFound(pos))
        }
    }

    pub fn remove(&mut self, pos: FilePosition) -> Option<Row> {
        self.rows.shift_remove(&pos)
    }

    /// Hand any file-backed space back to the global manager and drop every
    /// cached row. Safe to call more than once.
    pub fn release(&mut self, space: &mut dyn DataSpaceManager) {
        if let Some(allocator) = self.allocator.as_mut() {
            allocator.close(space);
        }
        self.rows.clear();
        self.accessors.fill(None);
    }

    pub fn space_id(&self) -> TableId {
        self.space_id
    }

    /// Every position currently reachable in this store, in insertion
    /// order. Used by callers that need to sweep the whole table (commit
    /// purge, log-replay linear scan fallback).
    pub fn positions(&self) -> impl Iterator<Item = FilePosition> + '_ {
        self.rows.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldb_tablespace::BumpSpaceManager;

    #[test]
    fn memory_store_assigns_distinct_positions() {
        let mut store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 2);
        let mut space = BumpSpaceManager::new();
        let a = store
            .get_new_cached_object(vec![CellValue::Integer(1)], 2, &mut space)
            .unwrap();
        let b = store
            .get_new_cached_object(vec![CellValue::Integer(2)], 2, &mut space)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn cached_store_uses_allocator_positions() {
        let mut store = RowStore::new(RowStoreKind::Cached, TableId(1), TableSpaceConfig::default(), 1);
        let mut space = BumpSpaceManager::new();
        let a = store
            .get_new_cached_object(vec![CellValue::Text("hello".into())], 1, &mut space)
            .unwrap();
        let row = store.get(a).unwrap();
        assert_eq!(row.values, vec![CellValue::Text("hello".into())]);
    }

    #[test]
    fn row_reachable_until_removed() {
        let mut store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 1);
        let mut space = BumpSpaceManager::new();
        let pos = store.get_new_cached_object(vec![CellValue::Null], 1, &mut space).unwrap();
        assert!(store.get(pos).is_some());
        assert!(store.commit(pos).is_ok());
        let removed = store.remove(pos);
        assert!(removed.is_some());
        assert!(store.get(pos).is_none());
        assert!(store.commit(pos).is_err());
    }

    #[test]
    fn accessor_round_trips() {
        let mut store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 1);
        assert_eq!(store.get_accessor(0), None);
        store.set_accessor(0, Some(FilePosition::new(42)));
        assert_eq!(store.get_accessor(0), Some(FilePosition::new(42)));
    }

    #[test]
    fn index_roots_string_round_trips() {
        let mut store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 3);
        store.set_accessor(0, Some(FilePosition::new(32)));
        store.set_accessor(1, None);
        store.set_accessor(2, Some(FilePosition::new(160)));

        let text = store.serialize_index_roots();
        assert_eq!(text, "2 -1 10");

        let mut reloaded = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 0);
        reloaded.load_index_roots(&text).unwrap();
        assert_eq!(reloaded.get_accessor(0), Some(FilePosition::new(32)));
        assert_eq!(reloaded.get_accessor(1), None);
        assert_eq!(reloaded.get_accessor(2), Some(FilePosition::new(160)));

        // Serialising again must reproduce the same text (spec.md §8's
        // round-trip law).
        assert_eq!(reloaded.serialize_index_roots(), text);
    }

    #[test]
    fn empty_index_roots_string_is_all_sentinels() {
        let store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 2);
        assert_eq!(store.serialize_index_roots(), "-1 -1");
    }

    #[test]
    fn load_index_roots_rejects_garbage() {
        let mut store = RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 1);
        let err = store.load_index_roots("not-a-number").unwrap_err();
        assert!(matches!(err, RowStoreError::InvalidIndexRoots(_)));
    }

    #[test]
    fn release_returns_space_and_clears_rows() {
        let mut store = RowStore::new(RowStoreKind::Cached, TableId(3), TableSpaceConfig::default(), 1);
        let mut space = BumpSpaceManager::new();
        store
            .get_new_cached_object(vec![CellValue::Integer(7)], 1, &mut space)
            .unwrap();
        store.release(&mut space);
        assert!(store.is_empty());
        assert_eq!(store.get_accessor(0), None);
    }
}

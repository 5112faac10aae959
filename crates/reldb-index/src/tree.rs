use std::collections::{btree_set, BTreeSet};
use std::ops::{Bound, RangeBounds};

use nonempty::NonEmpty;
use reldb_common::{CellValue, ColId, FilePosition, IndexId, TableId};
use reldb_rowstore::Row;
use tracing::instrument;

use crate::error::IndexError;
use crate::key::{is_all_null, project, IndexKey};

/// Iterator over every row position currently in an [`IndexTree`], in key
/// order.
pub struct IndexIter<'a> {
    iter: btree_set::Iter<'a, IndexKey>,
}

impl Iterator for IndexIter<'_> {
    type Item = FilePosition;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|key| key.pos)
    }
}

/// Iterator over a bounded range of an [`IndexTree`], counting how many
/// entries it has walked so far — used by range scans that want to report
/// how much of the index they touched.
pub struct IndexRangeIter<'a> {
    range: btree_set::Range<'a, IndexKey>,
    num_keys_scanned: u64,
}

impl<'a> Iterator for IndexRangeIter<'a> {
    type Item = FilePosition;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.range.next()?;
        self.num_keys_scanned += 1;
        Some(next.pos)
    }
}

impl IndexRangeIter<'_> {
    pub fn keys_scanned(&self) -> u64 {
        self.num_keys_scanned
    }
}

/// Ordered index over a fixed, non-empty tuple of a table's columns
/// (spec.md §4.4).
pub struct IndexTree {
    pub index_id: IndexId,
    pub table_id: TableId,
    pub cols: NonEmpty<ColId>,
    pub name: String,
    pub is_unique: bool,
    /// Whether a unique index admits more than one row whose projected key
    /// is entirely null. Moot for primary keys, which are `NOT NULL` by
    /// construction; plumbed through for secondary unique indexes.
    pub allow_multiple_nulls: bool,
    set: BTreeSet<IndexKey>,
}

impl IndexTree {
    pub fn new(
        index_id: IndexId,
        table_id: TableId,
        cols: NonEmpty<ColId>,
        name: String,
        is_unique: bool,
        allow_multiple_nulls: bool,
    ) -> Self {
        Self {
            index_id,
            table_id,
            cols,
            name,
            is_unique,
            allow_multiple_nulls,
            set: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    fn key_for(&self, values: &[CellValue]) -> Vec<CellValue> {
        project(values, &self.cols)
    }

    /// Insert `row`'s projected key, linking it into this index. Fails with
    /// [`IndexError::UniqueViolation`] iff the index is unique, an equal key
    /// already exists, and the all-null slack rule does not apply.
    #[instrument(skip_all)]
    pub fn insert(&mut self, row: &mut Row, index_ordinal: usize) -> Result<(), IndexError> {
        self.insert_live(row, index_ordinal, &|_| true)
    }

    /// Like [`Self::insert`], but `is_live` filters which existing keys
    /// count toward the uniqueness check. A row already marked
    /// cascade-deleted this transaction is still linked in the index
    /// (snapshot isolation, spec.md §4.5's delete-shadowing) but must not
    /// block a same-transaction unique-key swap from seeing its slot as
    /// free.
    #[instrument(skip_all, fields(index_ordinal))]
    pub fn insert_live(&mut self, row: &mut Row, index_ordinal: usize, is_live: &dyn Fn(FilePosition) -> bool) -> Result<(), IndexError> {
        let value = self.key_for(&row.values);

        if self.is_unique
            && !(self.allow_multiple_nulls && is_all_null(&value))
            && self.seek(value.clone()..=value.clone()).any(|pos| is_live(pos))
        {
            return Err(IndexError::UniqueViolation {
                index_id: self.index_id,
                constraint_name: self.name.clone(),
                table_id: self.table_id,
                value,
            });
        }

        self.set.insert(IndexKey { value, pos: row.pos });
        row.mark_linked(index_ordinal);
        Ok(())
    }

    /// Unlink `row` from this index.
    #[instrument(skip_all)]
    pub fn delete(&mut self, row: &mut Row, index_ordinal: usize) {
        let value = self.key_for(&row.values);
        self.set.remove(&IndexKey { value, pos: row.pos });
        row.mark_unlinked(index_ordinal);
    }

    #[instrument(skip_all)]
    pub fn contains_any(&self, value: &[CellValue]) -> bool {
        self.seek(value.to_vec()..=value.to_vec()).next().is_some()
    }

    pub fn scan(&self) -> IndexIter<'_> {
        IndexIter { iter: self.set.iter() }
    }

    /// The position this index would persist as its "root" (spec.md §6):
    /// since `IndexTree` holds its keys in an ordered set rather than a
    /// handle-based on-disk tree, the lowest-keyed row's position stands in
    /// for a literal root node — `None` once the index is empty.
    pub fn root_position(&self) -> Option<FilePosition> {
        self.set.iter().next().map(|key| key.pos)
    }

    /// First row whose key equals `key` exactly.
    #[instrument(skip_all)]
    pub fn find_first_row(&self, key: &[CellValue]) -> Option<FilePosition> {
        self.seek(key.to_vec()..=key.to_vec()).next()
    }

    /// Like [`Self::find_first_row`], but projects `key` from `row` via
    /// `col_mapping` first (e.g. to probe a foreign key's referenced unique
    /// index using the referencing row's own columns).
    pub fn find_first_row_iterator(&self, row_values: &[CellValue], col_mapping: &[ColId]) -> IndexRangeIter<'_> {
        let key: Vec<CellValue> = col_mapping.iter().map(|&c| row_values[c.0 as usize].clone()).collect();
        self.seek(key.clone()..=key)
    }

    /// Bounded scan over the index's key order.
    #[instrument(skip_all)]
    pub fn seek(&self, range: impl RangeBounds<Vec<CellValue>>) -> IndexRangeIter<'_> {
        let map = |bound: Bound<&Vec<CellValue>>, pos| match bound {
            Bound::Included(v) => Bound::Included(IndexKey { value: v.clone(), pos }),
            Bound::Excluded(v) => Bound::Excluded(IndexKey { value: v.clone(), pos }),
            Bound::Unbounded => Bound::Unbounded,
        };
        let start = map(range.start_bound(), FilePosition::ZERO);
        let end = map(range.end_bound(), FilePosition::MAX);
        IndexRangeIter {
            range: self.set.range((start, end)),
            num_keys_scanned: 0,
        }
    }

    /// Lexicographic comparison of a standalone `key` against `row`'s own
    /// projected columns — used when probing a non-unique index without a
    /// materialized [`Row`] for the key side.
    pub fn compare_row_non_unique(&self, key: &[CellValue], row_values: &[CellValue]) -> std::cmp::Ordering {
        let row_key = self.key_for(row_values);
        key.cmp(&row_key)
    }

    /// Build the index from a batch of already-allocated rows (used when
    /// bringing a newly created index up to date over existing data).
    pub fn build_from_rows<'a>(&mut self, rows: impl Iterator<Item = &'a mut Row>, index_ordinal: usize) -> Result<(), IndexError> {
        for row in rows {
            self.insert(row, index_ordinal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldb_rowstore::{RowStore, RowStoreKind};
    use reldb_tablespace::{BumpSpaceManager, TableSpaceConfig};

    fn single_col_index(unique: bool, allow_multiple_nulls: bool) -> IndexTree {
        IndexTree::new(
            IndexId(1),
            TableId(1),
            NonEmpty::new(ColId(0)),
            "idx_a".to_string(),
            unique,
            allow_multiple_nulls,
        )
    }

    fn store() -> (RowStore, BumpSpaceManager) {
        (
            RowStore::new(RowStoreKind::Memory, TableId(1), TableSpaceConfig::default(), 1),
            BumpSpaceManager::new(),
        )
    }

    #[test]
    fn insert_and_find_first_row() {
        let mut index = single_col_index(false, false);
        let (mut rs, mut space) = store();
        let pos = rs.get_new_cached_object(vec![CellValue::Integer(5)], 1, &mut space).unwrap();
        index.insert(rs.get_mut(pos).unwrap(), 0).unwrap();
        assert_eq!(index.find_first_row(&[CellValue::Integer(5)]), Some(pos));
        assert!(rs.get(pos).unwrap().is_linked(0));
    }

    #[test]
    fn unique_violation_on_duplicate_key() {
        let mut index = single_col_index(true, false);
        let (mut rs, mut space) = store();
        let a = rs.get_new_cached_object(vec![CellValue::Integer(1)], 1, &mut space).unwrap();
        index.insert(rs.get_mut(a).unwrap(), 0).unwrap();

        let b = rs.get_new_cached_object(vec![CellValue::Integer(1)], 1, &mut space).unwrap();
        let err = index.insert(rs.get_mut(b).unwrap(), 0).unwrap_err();
        assert!(matches!(err, IndexError::UniqueViolation { .. }));
        assert!(!rs.get(b).unwrap().is_linked(0));
    }

    #[test]
    fn unique_index_allows_multiple_nulls_when_configured() {
        let mut index = single_col_index(true, true);
        let (mut rs, mut space) = store();
        let a = rs.get_new_cached_object(vec![CellValue::Null], 1, &mut space).unwrap();
        index.insert(rs.get_mut(a).unwrap(), 0).unwrap();
        let b = rs.get_new_cached_object(vec![CellValue::Null], 1, &mut space).unwrap();
        assert!(index.insert(rs.get_mut(b).unwrap(), 0).is_ok());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn delete_unlinks_and_removes() {
        let mut index = single_col_index(false, false);
        let (mut rs, mut space) = store();
        let pos = rs.get_new_cached_object(vec![CellValue::Integer(9)], 1, &mut space).unwrap();
        index.insert(rs.get_mut(pos).unwrap(), 0).unwrap();
        index.delete(rs.get_mut(pos).unwrap(), 0);
        assert!(index.find_first_row(&[CellValue::Integer(9)]).is_none());
        assert!(!rs.get(pos).unwrap().is_linked(0));
    }

    #[test]
    fn root_position_tracks_lowest_key() {
        let mut index = single_col_index(false, false);
        let (mut rs, mut space) = store();
        assert_eq!(index.root_position(), None);

        let mid = rs.get_new_cached_object(vec![CellValue::Integer(5)], 1, &mut space).unwrap();
        index.insert(rs.get_mut(mid).unwrap(), 0).unwrap();
        assert_eq!(index.root_position(), Some(mid));

        let low = rs.get_new_cached_object(vec![CellValue::Integer(1)], 1, &mut space).unwrap();
        index.insert(rs.get_mut(low).unwrap(), 0).unwrap();
        assert_eq!(index.root_position(), Some(low));

        index.delete(rs.get_mut(low).unwrap(), 0);
        assert_eq!(index.root_position(), Some(mid));

        index.delete(rs.get_mut(mid).unwrap(), 0);
        assert_eq!(index.root_position(), None);
    }

    #[test]
    fn seek_counts_keys_scanned() {
        let mut index = single_col_index(false, false);
        let (mut rs, mut space) = store();
        for v in [1, 2, 3, 4] {
            let pos = rs.get_new_cached_object(vec![CellValue::Integer(v)], 1, &mut space).unwrap();
            index.insert(rs.get_mut(pos).unwrap(), 0).unwrap();
        }
        let mut iter = index.seek(vec![CellValue::Integer(2)]..=vec![CellValue::Integer(3)]);
        let collected: Vec<_> = iter.by_ref().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(iter.keys_scanned(), 2);
    }
}

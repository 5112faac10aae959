use indexmap::IndexMap;
use nonempty::NonEmpty;
use reldb_common::{CellValue, ColId, FilePosition, TableId};
use reldb_index::IndexTree;
use reldb_rowstore::{RowStore, RowStoreKind};
use reldb_tablespace::{DataSpaceManager, TableSpaceConfig};
use tracing::instrument;

use crate::column::{Column, Constraint, ConstraintKind};
use crate::error::TableError;
use crate::fk::ForeignKeyChecker;
use crate::sequence::IdentitySequence;
use crate::session::{SessionContext, TypeCoercion};
use crate::trigger::{TriggerEvent, TriggerList};

/// Holds columns, constraints, triggers, indexes, identity sequence, and the
/// row store, and orchestrates row insert/update/delete (spec.md §4.5).
///
/// Index `0`, when present, is the primary index; constraint `0`, when
/// present, is the primary-key constraint — callers that build a `Table`
/// are expected to push those first.
pub struct Table {
    pub table_id: TableId,
    pub name: String,
    pub columns: IndexMap<String, Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<IndexTree>,
    pub triggers: TriggerList,
    identity: Option<(ColId, IdentitySequence)>,
    store: RowStore,
    pub read_only: bool,
    pub logged: bool,
    /// Session-toggled referential-integrity switch; when false, neither
    /// triggers nor foreign-key checks fire (spec.md §4.5).
    pub ri_enabled: bool,
}

impl Table {
    pub fn new(table_id: TableId, name: impl Into<String>, kind: RowStoreKind, config: TableSpaceConfig) -> Self {
        Self {
            table_id,
            name: name.into(),
            columns: IndexMap::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            triggers: TriggerList::new(),
            identity: None,
            store: RowStore::new(kind, table_id, config, 0),
            read_only: false,
            logged: false,
            ri_enabled: true,
        }
    }

    pub fn add_column(&mut self, column: Column) -> ColId {
        let ord = self.columns.len();
        self.columns.insert(column.name.clone(), column);
        ColId(ord as u32)
    }

    pub fn add_index(&mut self, index: IndexTree) {
        self.indexes.push(index);
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_identity(&mut self, col: ColId, sequence: IdentitySequence) {
        self.identity = Some((col, sequence));
        if let Some(column) = self.columns.get_index_mut(col.0 as usize) {
            column.1.is_identity = true;
        }
    }

    pub fn identity_peek(&self) -> Option<i128> {
        self.identity.as_ref().map(|(_, seq)| seq.peek())
    }

    pub fn row_count(&self) -> usize {
        self.store.len()
    }

    pub fn contains_row(&self, pos: FilePosition) -> bool {
        self.store.get(pos).is_some()
    }

    pub fn row_values(&self, pos: FilePosition) -> Option<&[CellValue]> {
        self.store.get(pos).map(|r| r.values.as_slice())
    }

    pub fn row_is_cascade_deleted(&self, pos: FilePosition) -> bool {
        self.store.get(pos).is_some_and(|r| r.is_cascade_deleted())
    }

    /// Linear scan for every live row whose projection onto `cols` equals
    /// `key`. Used by cascade processing, which has no guarantee a
    /// referencing table indexes its own foreign-key columns.
    pub fn find_rows_by_projection(&self, cols: &NonEmpty<ColId>, key: &[CellValue]) -> Vec<FilePosition> {
        self.store
            .positions()
            .filter(|&pos| {
                self.store.get(pos).is_some_and(|r| {
                    !r.is_cascade_deleted() && cols.iter().enumerate().all(|(i, &c)| r.values[c.0 as usize] == key[i])
                })
            })
            .collect()
    }

    pub fn index_root(&self, index_ordinal: usize) -> Option<FilePosition> {
        self.store.get_accessor(index_ordinal)
    }

    /// Recompute every index's accessor from its current root and push it
    /// into the row store, keeping [`Self::index_root`] (and the serialised
    /// index-roots string) in sync with the index contents.
    fn refresh_index_roots(&mut self) {
        for i in 0..self.indexes.len() {
            let root = self.indexes[i].root_position();
            self.store.set_accessor(i, root);
        }
    }

    /// The table's index roots as spec.md §6's whitespace-separated scaled
    /// integers, `-1` per empty index — what gets written to the storage
    /// file header.
    pub fn index_roots_string(&self) -> String {
        self.store.serialize_index_roots()
    }

    /// Restore accessors from a string written by [`Self::index_roots_string`]
    /// (e.g. on table open). Does not rebuild the indexes themselves — it
    /// only seeds the roots a fresh index build would otherwise have to
    /// recompute from scratch.
    pub fn load_index_roots(&mut self, text: &str) -> Result<(), TableError> {
        Ok(self.store.load_index_roots(text)?)
    }

    fn primary_index(&self) -> Option<usize> {
        self.indexes.first().filter(|idx| idx.is_unique).map(|_| 0)
    }

    fn set_identity_column(&mut self, data: &mut [CellValue]) {
        let Some((col, seq)) = self.identity.as_mut() else {
            return;
        };
        let idx = col.0 as usize;
        match data[idx] {
            CellValue::Null => {
                data[idx] = CellValue::Integer(seq.next_value() as i64);
            }
            CellValue::Integer(v) => seq.advance_past(v as i128),
            _ => {}
        }
    }

    /// The name of the `NotNull` constraint registered against `col`, if
    /// any — used only to label a violation; a column can be `not_null`
    /// without ever having had a named constraint pushed for it.
    fn not_null_constraint_name(&self, col: ColId) -> String {
        self.constraints
            .iter()
            .find_map(|c| match &c.kind {
                ConstraintKind::NotNull(nn_col) if *nn_col == col => Some(c.name.clone()),
                _ => None,
            })
            .unwrap_or_else(|| format!("{}_NOT_NULL", self.columns.get_index(col.0 as usize).map_or("?", |(name, _)| name.as_str())))
    }

    fn check_row_data(
        &self,
        data: &[CellValue],
        coercion: &dyn TypeCoercion,
        fk: &dyn ForeignKeyChecker,
    ) -> Result<(), TableError> {
        for i in 0..self.columns.len() {
            let mut v = data[i].clone();
            coercion.check_and_coerce(ColId(i as u32), &mut v)?;
        }

        // spec.md §4.5 `checkRowDataInsert`: "for each column with
        // `colNotNull[i]`, if value is null, fail" — driven directly off
        // each column's own flag, not off a separately registered
        // constraint (see `Column::not_null`'s doc comment).
        for (i, (_, column)) in self.columns.iter().enumerate() {
            if column.not_null && data[i].is_null() {
                let col = ColId(i as u32);
                return Err(TableError::NotNullViolation {
                    table: self.table_id,
                    col,
                    constraint: self.not_null_constraint_name(col),
                });
            }
        }

        for constraint in &self.constraints {
            match &constraint.kind {
                ConstraintKind::NotNull(_) => {
                    // Enforcement already happened above via `column.not_null`;
                    // this variant exists so a `NOT NULL` constraint has a
                    // catalog entry (name, id) for DDL purposes.
                }
                ConstraintKind::Check(predicate) => {
                    if !predicate(data) {
                        return Err(TableError::CheckConstraintViolation {
                            table: self.table_id,
                            constraint: constraint.name.clone(),
                        });
                    }
                }
                ConstraintKind::ForeignKey {
                    ref_table,
                    cols,
                    ref_cols,
                    ..
                } if self.ri_enabled => {
                    let key: Vec<CellValue> = cols.iter().map(|&c| data[c.0 as usize].clone()).collect();
                    if key.iter().any(CellValue::is_null) {
                        continue;
                    }
                    if *ref_table == self.table_id {
                        // A self-referencing foreign key (spec.md §8 scenario 4's
                        // `B(parent -> B.id)`) can't go through the external
                        // checker: the caller driving this table's own
                        // insert/update has necessarily taken `self` out of its
                        // table set for the duration of this call, so `self` is
                        // the only place that still has this table's own unique
                        // index to probe.
                        let found = self
                            .indexes
                            .iter()
                            .find(|idx| idx.is_unique && idx.cols.len() == ref_cols.len() && idx.cols.iter().eq(ref_cols.iter()))
                            .is_some_and(|idx| idx.find_first_row(&key).is_some());
                        if !found {
                            return Err(TableError::ForeignKeyViolation {
                                table: self.table_id,
                                constraint: constraint.name.clone(),
                            });
                        }
                        continue;
                    }
                    fk.check_foreign_key(*ref_table, ref_cols, &key, &constraint.name, self.table_id)?;
                }
                ConstraintKind::ForeignKey { .. } | ConstraintKind::PrimaryKey | ConstraintKind::Unique(_) => {}
            }
        }
        Ok(())
    }

    /// Allocate a row and link it into every index, rolling back partial
    /// linkage on the first unique-constraint failure (spec.md §4.5 step 4).
    ///
    /// `ignore` lists positions whose keys must not count toward a
    /// uniqueness conflict even though they are still physically linked —
    /// the old rows of an in-flight update (spec.md's delete-then-insert,
    /// see [`Self::update_rows`]).
    #[instrument(skip(self, data, space, ignore))]
    fn index_row(&mut self, data: Vec<CellValue>, space: &mut dyn DataSpaceManager, ignore: &[FilePosition]) -> Result<FilePosition, TableError> {
        let num_indexes = self.indexes.len();
        let pos = self.store.get_new_cached_object(data, num_indexes, space)?;
        let is_live = |candidate: FilePosition| !ignore.contains(&candidate);

        for i in 0..num_indexes {
            let row = self.store.get_mut(pos).expect("row just allocated");
            if let Err(e) = self.indexes[i].insert_live(row, i, &is_live) {
                for j in 0..i {
                    let row = self.store.get_mut(pos).expect("row still present during rollback");
                    self.indexes[j].delete(row, j);
                }
                self.store.remove(pos);
                return Err(e.into());
            }
        }
        Ok(pos)
    }

    /// Insert sequence per spec.md §4.5: identity, `BEFORE` triggers,
    /// validation, index installation, action recording.
    #[instrument(skip(self, session, coercion, fk, data, space))]
    pub fn insert_row(
        &mut self,
        session: &mut dyn SessionContext,
        coercion: &dyn TypeCoercion,
        fk: &dyn ForeignKeyChecker,
        mut data: Vec<CellValue>,
        space: &mut dyn DataSpaceManager,
    ) -> Result<FilePosition, TableError> {
        if self.read_only {
            return Err(TableError::DataReadOnly(self.table_id));
        }

        self.set_identity_column(&mut data);

        if self.ri_enabled {
            self.triggers.fire_before_row(TriggerEvent::Insert, None, &mut data)?;
        }

        self.check_row_data(&data, coercion, fk)?;
        let pos = self.index_row(data, space, &[])?;
        self.refresh_index_roots();

        if self.ri_enabled {
            let row = self.store.get(pos).expect("just inserted");
            self.triggers.fire_after_row(TriggerEvent::Insert, None, Some(&row.values))?;
        }

        session.record_insert(self.table_id, pos);
        Ok(pos)
    }

    /// Mark `pos` deleted. Idempotent: a row already marked cascade-deleted
    /// (by a direct delete or a cascade walk) is a no-op, satisfying both
    /// "double delete is a no-op" and the cascade cycle guard (spec.md §4.5,
    /// §8 invariant 6). The row stays linked in its indexes until
    /// [`Self::purge_deleted`] runs at commit.
    #[instrument(skip(self, session))]
    pub fn delete_no_check(&mut self, session: &mut dyn SessionContext, pos: FilePosition) -> Result<(), TableError> {
        let row = self.store.get(pos).ok_or(TableError::RowNotFound)?;
        if row.is_cascade_deleted() {
            return Ok(());
        }
        row.mark_cascade_deleted();
        session.record_delete(self.table_id, pos);
        Ok(())
    }

    /// Locate the row matching `data` via the primary index, else the best
    /// non-unique index, else a linear scan, and delete it (log-replay
    /// path, spec.md §4.5).
    pub fn delete_no_check_from_log(&mut self, session: &mut dyn SessionContext, data: &[CellValue]) -> Result<(), TableError> {
        let pos = self.find_matching_row(data).ok_or(TableError::RowNotFound)?;
        self.delete_no_check(session, pos)
    }

    fn find_matching_row(&self, data: &[CellValue]) -> Option<FilePosition> {
        if let Some(pk) = self.primary_index() {
            let key = reldb_index::project(data, &self.indexes[pk].cols);
            if let Some(pos) = self.indexes[pk].find_first_row(&key) {
                return Some(pos);
            }
        }
        for index in &self.indexes {
            if !index.is_unique {
                let key = reldb_index::project(data, &index.cols);
                if let Some(pos) = index.find_first_row(&key) {
                    return Some(pos);
                }
            }
        }
        self.store.positions().find(|&pos| self.store.get(pos).is_some_and(|r| r.values == data))
    }

    /// Delete-then-insert over a row set (spec.md §4.5 "Update"). Deleting
    /// every old row before inserting any new one allows a unique-key swap
    /// within a single call; [`IndexTree::insert_live`] is what lets the new
    /// row's uniqueness check see the about-to-be-purged old row as absent.
    #[instrument(skip(self, session, coercion, fk, pairs, space))]
    pub fn update_rows(
        &mut self,
        session: &mut dyn SessionContext,
        coercion: &dyn TypeCoercion,
        fk: &dyn ForeignKeyChecker,
        mut pairs: Vec<(FilePosition, Vec<CellValue>)>,
        space: &mut dyn DataSpaceManager,
    ) -> Result<Vec<FilePosition>, TableError> {
        if self.read_only {
            return Err(TableError::DataReadOnly(self.table_id));
        }

        for (pos, new_data) in pairs.iter_mut() {
            let old = self.store.get(*pos).ok_or(TableError::RowNotFound)?;
            if old.is_cascade_deleted() {
                return Err(TableError::RowNotFound);
            }
            let old_values = old.values.clone();
            if self.ri_enabled {
                self.triggers.fire_before_row(TriggerEvent::Update, Some(&old_values), new_data)?;
            }
            self.check_row_data(new_data, coercion, fk)?;
        }

        let old_positions: Vec<FilePosition> = pairs.iter().map(|(pos, _)| *pos).collect();
        for &pos in &old_positions {
            self.delete_no_check(session, pos)?;
        }

        let mut new_positions = Vec::with_capacity(pairs.len());
        for (_, data) in pairs {
            let pos = self.index_row(data, space, &old_positions)?;
            session.record_insert(self.table_id, pos);
            new_positions.push(pos);
        }
        self.refresh_index_roots();

        if self.ri_enabled {
            for &pos in &new_positions {
                let row = self.store.get(pos).expect("just inserted");
                self.triggers.fire_after_row(TriggerEvent::Update, None, Some(&row.values))?;
            }
        }

        Ok(new_positions)
    }

    /// Physically remove every row marked cascade-deleted from the store
    /// and every index. Called once a transaction commits.
    #[instrument(skip(self))]
    pub fn purge_deleted(&mut self) {
        let to_remove: Vec<FilePosition> = self
            .store
            .positions()
            .filter(|&pos| self.store.get(pos).is_some_and(|r| r.is_cascade_deleted()))
            .collect();

        for pos in to_remove {
            for i in 0..self.indexes.len() {
                if let Some(row) = self.store.get_mut(pos) {
                    self.indexes[i].delete(row, i);
                }
            }
            self.store.remove(pos);
        }
        self.refresh_index_roots();
    }

    pub fn release(&mut self, space: &mut dyn DataSpaceManager) {
        self.store.release(space);
    }

    /// Copy every live row into `target`, translating columns per
    /// `column_map[i] = Some(old_col)` (copy from the old position) or
    /// `None` (the new column has no source, e.g. a freshly added column;
    /// it is left null and, if it is `target`'s identity column,
    /// `insert_row` fills it in). Re-enforces constraints and re-indexes via
    /// the normal insert path. On any failure `target`'s store is released
    /// and `self` is left untouched (spec.md §4.5 "DDL-side definition
    /// moves").
    #[instrument(skip(self, target, session, coercion, fk, space))]
    pub fn move_data(
        &self,
        target: &mut Table,
        column_map: &[Option<usize>],
        session: &mut dyn SessionContext,
        coercion: &dyn TypeCoercion,
        fk: &dyn ForeignKeyChecker,
        space: &mut dyn DataSpaceManager,
    ) -> Result<(), TableError> {
        for pos in self.store.positions().collect::<Vec<_>>() {
            let Some(row) = self.store.get(pos) else { continue };
            if row.is_cascade_deleted() {
                continue;
            }
            let new_data: Vec<CellValue> = column_map
                .iter()
                .map(|slot| match slot {
                    Some(old_col) => row.values[*old_col].clone(),
                    None => CellValue::Null,
                })
                .collect();
            if let Err(e) = target.insert_row(session, coercion, fk, new_data, space) {
                target.release(space);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ConstraintKind;
    use crate::fk::NoopForeignKeys;
    use crate::session::NoopCoercion;
    use reldb_common::{ConstraintId, IndexId};
    use reldb_index::IndexTree;
    use reldb_tablespace::BumpSpaceManager;

    #[derive(Default)]
    struct TestSession {
        inserts: Vec<(TableId, FilePosition)>,
        deletes: Vec<(TableId, FilePosition)>,
    }

    impl crate::session::ActionLog for TestSession {
        fn record_insert(&mut self, table_id: TableId, pos: FilePosition) {
            self.inserts.push((table_id, pos));
        }
        fn record_delete(&mut self, table_id: TableId, pos: FilePosition) {
            self.deletes.push((table_id, pos));
        }
    }

    impl crate::session::TransactionClock for TestSession {
        fn global_change_timestamp(&self) -> u64 {
            0
        }
    }

    fn table_with_pk_and_secondary() -> Table {
        let mut table = Table::new(TableId(1), "t", RowStoreKind::Memory, TableSpaceConfig::default());
        table.add_column(Column::new("a", true));
        table.add_column(Column::new("b", false));
        table.add_index(IndexTree::new(IndexId(0), TableId(1), NonEmpty::new(ColId(0)), "pk".into(), true, false));
        table.add_index(IndexTree::new(IndexId(1), TableId(1), NonEmpty::new(ColId(1)), "b_idx".into(), false, false));
        table.add_constraint(Constraint {
            id: ConstraintId(0),
            name: "pk".into(),
            kind: ConstraintKind::PrimaryKey,
        });
        table
    }

    #[test]
    fn insert_enforces_not_null() {
        let mut table = Table::new(TableId(1), "t", RowStoreKind::Memory, TableSpaceConfig::default());
        table.add_column(Column::new("a", true));
        table.add_constraint(Constraint {
            id: ConstraintId(0),
            name: "a_not_null".into(),
            kind: ConstraintKind::NotNull(ColId(0)),
        });
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();
        let err = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Null], &mut space)
            .unwrap_err();
        assert!(matches!(err, TableError::NotNullViolation { .. }));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn column_not_null_flag_is_enforced_without_a_matching_constraint() {
        // No `ConstraintKind::NotNull` is registered here at all — the
        // column's own `not_null` flag must be enough.
        let mut table = Table::new(TableId(1), "t", RowStoreKind::Memory, TableSpaceConfig::default());
        table.add_column(Column::new("a", true));
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();
        let err = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Null], &mut space)
            .unwrap_err();
        assert!(matches!(err, TableError::NotNullViolation { .. }));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn unique_rollback_leaves_secondary_index_untouched() {
        // spec.md §8 scenario 3: primary key on (a), secondary index on (b).
        let mut table = table_with_pk_and_secondary();
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();

        table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(1), CellValue::Integer(10)], &mut space)
            .unwrap();

        let err = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(1), CellValue::Integer(20)], &mut space)
            .unwrap_err();
        assert!(matches!(err, TableError::UniqueViolation(_)));

        assert_eq!(table.indexes[1].len(), 1);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn update_allows_unique_key_swap() {
        let mut table = table_with_pk_and_secondary();
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();

        let p1 = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(1), CellValue::Integer(10)], &mut space)
            .unwrap();
        let p2 = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(2), CellValue::Integer(20)], &mut space)
            .unwrap();

        // Swap the primary keys of the two rows in one update call.
        let new_positions = table
            .update_rows(
                &mut session,
                &NoopCoercion,
                &NoopForeignKeys,
                vec![
                    (p1, vec![CellValue::Integer(2), CellValue::Integer(10)]),
                    (p2, vec![CellValue::Integer(1), CellValue::Integer(20)]),
                ],
                &mut space,
            )
            .unwrap();
        assert_eq!(new_positions.len(), 2);
        table.purge_deleted();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn delete_no_check_is_idempotent() {
        let mut table = table_with_pk_and_secondary();
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();
        let pos = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(1), CellValue::Integer(10)], &mut space)
            .unwrap();
        table.delete_no_check(&mut session, pos).unwrap();
        table.delete_no_check(&mut session, pos).unwrap();
        assert_eq!(session.deletes.len(), 1);
        table.purge_deleted();
        assert_eq!(table.row_count(), 0);
    }

    /// Like [`table_with_pk_and_secondary`], but file-backed — its positions
    /// come from the scale-aligned allocator rather than a raw memory
    /// counter, which is what the index-roots string's round-trip law
    /// actually depends on (spec.md §6, §8).
    fn table_with_pk_and_secondary_cached() -> Table {
        let mut table = Table::new(TableId(1), "t", RowStoreKind::Cached, TableSpaceConfig::default());
        table.add_column(Column::new("a", true));
        table.add_column(Column::new("b", false));
        table.add_index(IndexTree::new(IndexId(0), TableId(1), NonEmpty::new(ColId(0)), "pk".into(), true, false));
        table.add_index(IndexTree::new(IndexId(1), TableId(1), NonEmpty::new(ColId(1)), "b_idx".into(), false, false));
        table
    }

    #[test]
    fn index_roots_follow_inserts_and_deletes() {
        let mut table = table_with_pk_and_secondary_cached();
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();

        // Empty table: both indexes report no root.
        assert_eq!(table.index_roots_string(), "-1 -1");

        let p1 = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(5), CellValue::Integer(50)], &mut space)
            .unwrap();
        assert_eq!(table.index_root(0), Some(p1));
        assert_eq!(table.index_root(1), Some(p1));

        let p0 = table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Integer(1), CellValue::Integer(10)], &mut space)
            .unwrap();
        // Lowest primary key is now p0's row; the secondary index orders on
        // column b, where p0's value (10) is also the smaller one.
        assert_eq!(table.index_root(0), Some(p0));
        assert_eq!(table.index_root(1), Some(p0));

        let roots = table.index_roots_string();
        let mut reloaded = Table::new(TableId(1), "t", RowStoreKind::Cached, TableSpaceConfig::default());
        reloaded.load_index_roots(&roots).unwrap();
        assert_eq!(reloaded.index_root(0), Some(p0));
        assert_eq!(reloaded.index_root(1), Some(p0));

        table.delete_no_check(&mut session, p0).unwrap();
        table.purge_deleted();
        assert_eq!(table.index_root(0), Some(p1));
        assert_eq!(table.index_root(1), Some(p1));
    }

    #[test]
    fn identity_sequence_strictly_increases() {
        let mut table = Table::new(TableId(1), "t", RowStoreKind::Memory, TableSpaceConfig::default());
        table.add_column(Column::new("id", true));
        table.set_identity(ColId(0), IdentitySequence::new(1, 1, i128::MAX, 1));
        let mut session = TestSession::default();
        let mut space = BumpSpaceManager::new();

        let before = table.identity_peek().unwrap();
        table
            .insert_row(&mut session, &NoopCoercion, &NoopForeignKeys, vec![CellValue::Null], &mut space)
            .unwrap();
        let after = table.identity_peek().unwrap();
        assert!(after > before);

        let row = table.row_values(table.store.positions().next().unwrap()).unwrap();
        assert_eq!(row[0], CellValue::Integer(1));
    }
}

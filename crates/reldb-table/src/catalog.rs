use std::collections::{HashMap, HashSet, VecDeque};

use nonempty::NonEmpty;
use reldb_common::{CellValue, ColId, FilePosition, TableId};
use reldb_tablespace::DataSpaceManager;

use crate::column::{ConstraintKind, ReferentialAction};
use crate::error::TableError;
use crate::fk::{ForeignKeyChecker, NoopForeignKeys};
use crate::session::{NoopCoercion, SessionContext, TypeCoercion};
use crate::table::Table;

/// A directed graph of tables linked by their foreign keys, arena-owned by
/// id rather than by direct pointer (spec.md §9, "cyclic table graph").
/// Owns cross-table orchestration — referential-integrity checks on insert
/// and cascading deletes — that a standalone [`Table`] cannot perform on
/// its own.
#[derive(Default)]
pub struct Catalog {
    tables: HashMap<TableId, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.table_id, table);
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(&id)
    }

    /// Insert a row, checking foreign keys against the rest of the catalog.
    ///
    /// The target table is temporarily taken out of `tables` so the
    /// foreign-key checker can borrow the remaining tables (including,
    /// harmlessly, none of them being the one under mutation) while `Table`
    /// itself is driven standalone.
    pub fn insert_row(
        &mut self,
        table_id: TableId,
        session: &mut dyn SessionContext,
        data: Vec<CellValue>,
        space: &mut dyn DataSpaceManager,
    ) -> Result<FilePosition, TableError> {
        let mut table = self.tables.remove(&table_id).ok_or(TableError::RowNotFound)?;
        let checker = CatalogForeignKeyChecker { catalog: self };
        let result = table.insert_row(session, &NoopCoercion, &checker, data, space);
        self.tables.insert(table_id, table);
        result
    }

    pub fn update_rows(
        &mut self,
        table_id: TableId,
        session: &mut dyn SessionContext,
        pairs: Vec<(FilePosition, Vec<CellValue>)>,
        space: &mut dyn DataSpaceManager,
    ) -> Result<Vec<FilePosition>, TableError> {
        let mut table = self.tables.remove(&table_id).ok_or(TableError::RowNotFound)?;
        let checker = CatalogForeignKeyChecker { catalog: self };
        let result = table.update_rows(session, &NoopCoercion, &checker, pairs, space);
        self.tables.insert(table_id, table);
        result
    }

    fn referencing_constraints(&self, target: TableId) -> Vec<(TableId, String, NonEmpty<ColId>, NonEmpty<ColId>, ReferentialAction)> {
        self.tables
            .values()
            .flat_map(|t| {
                t.constraints.iter().filter_map(move |c| match &c.kind {
                    ConstraintKind::ForeignKey {
                        ref_table,
                        cols,
                        ref_cols,
                        on_delete,
                    } if *ref_table == target => Some((t.table_id, c.name.clone(), cols.clone(), ref_cols.clone(), *on_delete)),
                    _ => None,
                })
            })
            .collect()
    }

    /// Delete `pos` in `root_table` and every row reachable from it through
    /// `ON DELETE CASCADE` foreign keys, applying `SET NULL`/`SET DEFAULT`
    /// to rows referencing it non-destructively. The full delete closure is
    /// computed before any `SET NULL`/`SET DEFAULT` update is applied
    /// (spec.md §4.5 "Cascading referential actions"); `cascade_deleted`
    /// guards against revisiting a row a cycle has already reached.
    pub fn delete_row_cascading(
        &mut self,
        session: &mut dyn SessionContext,
        root_table: TableId,
        root_pos: FilePosition,
        space: &mut dyn DataSpaceManager,
    ) -> Result<(), TableError> {
        let mut queue: VecDeque<(TableId, FilePosition)> = VecDeque::new();
        let mut deletes: Vec<(TableId, FilePosition)> = Vec::new();
        let mut set_actions: Vec<(TableId, FilePosition, ColId, CellValue)> = Vec::new();
        // Rows already queued for deletion by this call. `cascade_deleted`
        // on the row itself isn't set until the finalization loop below, so
        // a true cascade cycle (B1 -> B2 -> B1) would otherwise re-enqueue
        // the same pair forever; this set is this BFS's own visited guard.
        let mut visited: HashSet<(TableId, FilePosition)> = HashSet::new();

        queue.push_back((root_table, root_pos));

        while let Some((tid, pos)) = queue.pop_front() {
            if !visited.insert((tid, pos)) {
                continue;
            }
            let Some(table) = self.tables.get(&tid) else { continue };
            if !table.contains_row(pos) || table.row_is_cascade_deleted(pos) {
                continue;
            }
            let Some(row_values) = table.row_values(pos).map(<[CellValue]>::to_vec) else {
                continue;
            };
            deletes.push((tid, pos));

            for (ref_tid, constraint_name, cols, ref_cols, on_delete) in self.referencing_constraints(tid) {
                let key: Vec<CellValue> = ref_cols.iter().map(|&c| row_values[c.0 as usize].clone()).collect();
                let Some(ref_table) = self.tables.get(&ref_tid) else { continue };
                let matches = ref_table.find_rows_by_projection(&cols, &key);
                let _ = &constraint_name;
                for m in matches {
                    match on_delete {
                        ReferentialAction::Cascade => queue.push_back((ref_tid, m)),
                        ReferentialAction::SetNull => {
                            for &c in cols.iter() {
                                set_actions.push((ref_tid, m, c, CellValue::Null));
                            }
                        }
                        // No default-value catalog is in scope (spec.md §1's
                        // type-coercion exclusion); nulling the column is the
                        // best available stand-in, matching the column's
                        // `NOT NULL`-exempt assumption for FK columns with a
                        // `SET DEFAULT` action.
                        ReferentialAction::SetDefault => {
                            for &c in cols.iter() {
                                set_actions.push((ref_tid, m, c, CellValue::Null));
                            }
                        }
                    }
                }
            }
        }

        for &(tid, pos) in &deletes {
            if let Some(table) = self.tables.get_mut(&tid) {
                table.delete_no_check(session, pos)?;
            }
        }

        let mut by_table: HashMap<TableId, Vec<(FilePosition, Vec<CellValue>)>> = HashMap::new();
        for (tid, pos, col, value) in set_actions {
            let Some(table) = self.tables.get(&tid) else { continue };
            if table.row_is_cascade_deleted(pos) {
                continue;
            }
            let entries = by_table.entry(tid).or_default();
            if let Some(existing) = entries.iter_mut().find(|(p, _)| *p == pos) {
                existing.1[col.0 as usize] = value;
            } else if let Some(values) = table.row_values(pos) {
                let mut values = values.to_vec();
                values[col.0 as usize] = value;
                entries.push((pos, values));
            }
        }

        for (tid, pairs) in by_table {
            if let Some(table) = self.tables.get_mut(&tid) {
                table.update_rows(session, &NoopCoercion, &NoopForeignKeys, pairs, space)?;
            }
        }

        Ok(())
    }

    /// Physically purge every row cascade-deletion marked for removal, in
    /// every table. Called once a transaction commits.
    pub fn purge_deleted(&mut self) {
        for table in self.tables.values_mut() {
            table.purge_deleted();
        }
    }
}

struct CatalogForeignKeyChecker<'a> {
    catalog: &'a Catalog,
}

impl ForeignKeyChecker for CatalogForeignKeyChecker<'_> {
    fn check_foreign_key(
        &self,
        ref_table: TableId,
        ref_cols: &NonEmpty<ColId>,
        key: &[CellValue],
        constraint_name: &str,
        table_id: TableId,
    ) -> Result<(), TableError> {
        let violation = || TableError::ForeignKeyViolation {
            table: table_id,
            constraint: constraint_name.to_string(),
        };
        let table = self.catalog.tables.get(&ref_table).ok_or_else(violation)?;
        let index = table
            .indexes
            .iter()
            .find(|idx| idx.is_unique && idx.cols.len() == ref_cols.len() && idx.cols.iter().eq(ref_cols.iter()))
            .ok_or_else(violation)?;
        if index.find_first_row(key).is_some() {
            Ok(())
        } else {
            Err(violation())
        }
    }
}

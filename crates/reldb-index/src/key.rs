use reldb_common::{CellValue, ColId, FilePosition};
use nonempty::NonEmpty;

/// Project a row's columns down to the tuple an index is keyed on.
pub fn project(values: &[CellValue], cols: &NonEmpty<ColId>) -> Vec<CellValue> {
    cols.iter().map(|&col| values[col.0 as usize].clone()).collect()
}

/// Lexicographic comparison of two full rows restricted to `cols`, in the
/// order `cols` lists them. Ties are broken by the caller (row position, for
/// a non-unique index's iteration order).
pub fn compare_rows(a: &[CellValue], b: &[CellValue], cols: &NonEmpty<ColId>) -> std::cmp::Ordering {
    for &col in cols.iter() {
        let ord = a[col.0 as usize].cmp(&b[col.0 as usize]);
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    std::cmp::Ordering::Equal
}

/// `true` iff every column of the projected key is null — the one case in
/// which a unique index may admit more than one matching row.
pub fn is_all_null(key: &[CellValue]) -> bool {
    key.iter().all(CellValue::is_null)
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub(crate) struct IndexKey {
    pub value: Vec<CellValue>,
    pub pos: FilePosition,
}

/// A single column value.
///
/// Type-coercion rules are an external collaborator per spec.md §1
/// ("Out of scope"); this enum only needs to support ordering (for index
/// keys) and null detection (for `NOT NULL` enforcement), so it is kept
/// deliberately small rather than modeling a full SQL type system.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellValue {
    Null,
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// A rough on-disk footprint, used by the row store to size
    /// allocations. Not a wire format.
    pub fn approx_byte_len(&self) -> usize {
        match self {
            CellValue::Null => 1,
            CellValue::Integer(_) => 1 + 8,
            CellValue::Text(s) => 1 + 4 + s.len(),
            CellValue::Bytes(b) => 1 + 4 + b.len(),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

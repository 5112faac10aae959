use nonempty::NonEmpty;
use reldb_common::{ColId, ConstraintId, TableId};

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// spec.md §4.5's `colNotNull[i]` — checked directly against every
    /// column on each insert/update by `Table::check_row_data`, independent
    /// of whether a matching `ConstraintKind::NotNull` is also present in
    /// the table's constraint list (that variant is metadata for naming
    /// and DDL drop/recreate, not a second enforcement path).
    pub not_null: bool,
    pub is_identity: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, not_null: bool) -> Self {
        Self {
            name: name.into(),
            not_null,
            is_identity: false,
        }
    }
}

/// What happens to a referencing row when the row it points to is deleted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique(NonEmpty<ColId>),
    ForeignKey {
        ref_table: TableId,
        cols: NonEmpty<ColId>,
        ref_cols: NonEmpty<ColId>,
        on_delete: ReferentialAction,
    },
    /// A domain-type predicate. Out of scope per spec.md §1's "type
    /// coercion rules" exclusion to implement a full expression evaluator,
    /// so the predicate is supplied by the caller rather than parsed here.
    Check(std::sync::Arc<dyn Fn(&[reldb_common::CellValue]) -> bool + Send + Sync>),
    NotNull(ColId),
}

#[derive(Clone)]
pub struct Constraint {
    pub id: ConstraintId,
    pub name: String,
    pub kind: ConstraintKind,
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

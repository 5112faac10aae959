use std::any::Any;
use std::fmt;
use std::sync::Arc;

use reldb_common::SchemaId;

/// An id not yet registered with the cache (spec.md §4.6 `registerStatement`:
/// "if `id < 0`, assign a new id").
pub const UNASSIGNED_ID: i64 = -1;

/// Request-side metadata a caller attaches to a compile/fetch call — the
/// generated-column info spec.md's compiled statement carries, but that
/// only the caller (not the cache) knows how to interpret. Kept as plain
/// string lists rather than a typed schema since column typing is out of
/// scope (spec.md §1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultProperties {
    pub column_names: Vec<String>,
    pub generated_column_info: Vec<String>,
}

/// A statement compiled by the session and interned by the cache
/// (spec.md §3 "Compiled statement").
///
/// `executable` is whatever the session's own compiler produced — SQL
/// planning is an external collaborator per spec.md §1, so the cache only
/// ever moves this handle around, never inspects it.
#[derive(Clone)]
pub struct CompiledStatement {
    pub id: i64,
    pub sql_text: String,
    pub schema: SchemaId,
    pub compile_timestamp: u64,
    pub result_properties: ResultProperties,
    pub executable: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStatement")
            .field("id", &self.id)
            .field("sql_text", &self.sql_text)
            .field("schema", &self.schema)
            .field("compile_timestamp", &self.compile_timestamp)
            .finish_non_exhaustive()
    }
}

impl CompiledStatement {
    /// Valid iff compiled at or after the schema's current change
    /// timestamp (spec.md §3's compiled-statement invariant).
    pub fn is_valid(&self, schema_change_timestamp: u64) -> bool {
        self.compile_timestamp >= schema_change_timestamp
    }
}

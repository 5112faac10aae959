use reldb_common::SchemaId;

use crate::error::StatementCacheError;
use crate::statement::{CompiledStatement, ResultProperties};

/// Everything [`crate::StatementCache`] needs from the calling session
/// (spec.md §6's "statement callback surface"). SQL parsing/planning
/// itself stays out of scope — `compile_statement` is the opaque seam.
pub trait SessionHook {
    fn compile_statement(&mut self, sql: &str, properties: &ResultProperties) -> Result<CompiledStatement, StatementCacheError>;

    fn current_schema(&self) -> SchemaId;
    fn set_current_schema(&mut self, schema: SchemaId);

    fn global_change_timestamp(&self) -> u64;
    fn schema_change_timestamp(&self) -> u64;
}

use thiserror::Error;

/// Errors surfaced by [`crate::StatementCache`] itself, distinct from
/// whatever the session's own compiler raises (that failure is opaque to
/// the cache — spec.md §4.6 "any failure during recompilation").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementCacheError {
    #[error("no statement registered under id {0}")]
    UnknownStatement(i64),
    #[error("compilation failed for statement id {0}")]
    CompileFailed(i64),
}

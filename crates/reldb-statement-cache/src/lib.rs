//! Prepared-statement cache: interns compiled statements per (schema, SQL)
//! and invalidates them on schema change (spec.md §4.6).
//!
//! Depends only on `reldb-common` — the cache is a standalone subsystem
//! whose sole external dependency is the session, modeled here by
//! [`SessionHook`] rather than anything from `reldb-table`.

mod cache;
mod config;
mod error;
mod session;
mod statement;

pub use cache::StatementCache;
pub use config::StatementCacheConfig;
pub use error::StatementCacheError;
pub use session::SessionHook;
pub use statement::{CompiledStatement, ResultProperties, UNASSIGNED_ID};

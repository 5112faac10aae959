use serde::{Deserialize, Serialize};

/// Per-database tuning for [`crate::StatementCache`].
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct StatementCacheConfig {
    pub max_entries: usize,
}

impl Default for StatementCacheConfig {
    fn default() -> Self {
        Self { max_entries: 4096 }
    }
}

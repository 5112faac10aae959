use serde::{Deserialize, Serialize};

/// Per-database tuning for every table's [`crate::TableSpaceAllocator`].
///
/// Mirrors the storage file header of spec.md §6: `scale` is the
/// power-of-two divisor applied to byte offsets, `fixed_block_size_unit`
/// is the alignment unit blob/CLOB pages require.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TableSpaceConfig {
    pub scale: u32,
    pub fixed_block_size_unit: u32,
    pub main_block_size: u64,
    pub free_list_capacity: usize,
}

impl Default for TableSpaceConfig {
    fn default() -> Self {
        Self {
            scale: 16,
            fixed_block_size_unit: 4096,
            main_block_size: 4096,
            free_list_capacity: 512,
        }
    }
}

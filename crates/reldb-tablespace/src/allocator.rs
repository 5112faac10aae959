use reldb_common::{round_up_to_unit, smallest_power_of_two_block, FilePosition, TableId};
use tracing::instrument;

use crate::config::TableSpaceConfig;
use crate::error::TableSpaceError;
use crate::free_block_index::FreeBlockIndex;
use crate::space_manager::DataSpaceManager;

/// A read-only snapshot of allocator occupancy, for diagnostics and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableSpaceStats {
    pub free_extents: usize,
    pub free_bytes: u64,
    pub fresh_remaining: u64,
}

/// Per-table slot allocator (spec.md §4.2).
///
/// Hands out row positions out of a current "fresh" extent, falling back to
/// a capacity-bounded [`FreeBlockIndex`] of previously released extents, and
/// requesting new extents from a shared [`DataSpaceManager`] on exhaustion.
pub struct TableSpaceAllocator {
    space_id: TableId,
    config: TableSpaceConfig,
    fresh_pos: FilePosition,
    fresh_free_pos: FilePosition,
    fresh_limit: FilePosition,
    lookup: FreeBlockIndex,
}

impl TableSpaceAllocator {
    pub fn new(space_id: TableId, config: TableSpaceConfig) -> Self {
        Self {
            space_id,
            lookup: FreeBlockIndex::new(config.free_list_capacity),
            config,
            fresh_pos: FilePosition::ZERO,
            fresh_free_pos: FilePosition::ZERO,
            fresh_limit: FilePosition::ZERO,
        }
    }

    pub fn stats(&self) -> TableSpaceStats {
        TableSpaceStats {
            free_extents: self.lookup.len(),
            free_bytes: self.lookup.iter().map(|e| e.size as u64).sum(),
            fresh_remaining: self.fresh_limit - self.fresh_free_pos,
        }
    }

    /// Hand out a position for a row of `row_size` bytes.
    ///
    /// If `as_blocks`, the size is rounded up to `fixed_block_size_unit` and
    /// the returned position is aligned to that unit (blob/CLOB pages);
    /// plain rows are rounded up to `scale` instead, which is what keeps
    /// every position this allocator ever hands out an exact multiple of
    /// `scale` — the precondition `FilePosition::to_scaled` needs to encode
    /// a position losslessly as the on-disk 32-bit field (spec.md §6).
    #[instrument(skip(self, space))]
    pub fn get_file_position(
        &mut self,
        row_size: u64,
        as_blocks: bool,
        space: &mut dyn DataSpaceManager,
    ) -> Result<FilePosition, TableSpaceError> {
        let size = if as_blocks {
            // A zero-size blocked row still claims exactly one alignment
            // unit: round_up_to_unit(0, unit) is 0, which would not advance
            // the fresh pointer at all and so would not be unit-aligned for
            // the *next* allocation.
            match round_up_to_unit(row_size, self.config.fixed_block_size_unit) {
                0 => self.config.fixed_block_size_unit as u64,
                rounded => rounded,
            }
        } else {
            match round_up_to_unit(row_size, self.config.scale) {
                0 => self.config.scale as u64,
                rounded => rounded,
            }
        };

        if size > FilePosition::MAX_UNSCALED || self.config.free_list_capacity == 0 {
            return self.get_new_block(size, space);
        }

        if let Some(pos) = self.take_from_lookup(size as u32, as_blocks) {
            return Ok(pos);
        }

        self.get_new_block(size, space)
    }

    fn take_from_lookup(&mut self, size: u32, as_blocks: bool) -> Option<FilePosition> {
        let mut idx = self.lookup.find_first_greater_equal_key_index(size)?;
        if as_blocks {
            let unit = self.config.fixed_block_size_unit as u64;
            loop {
                if idx >= self.lookup.len() {
                    return None;
                }
                if self.lookup.get_key(idx).0 % unit == 0 {
                    break;
                }
                idx += 1;
            }
        }
        let entry = self.lookup.remove(idx);
        let remainder = entry.size - size;
        if remainder > 0 {
            let remainder_pos = entry.pos.checked_add(size as u64).expect("extent within address space");
            self.lookup.add(remainder_pos, remainder);
        }
        Some(entry.pos)
    }

    fn get_new_block(
        &mut self,
        size: u64,
        space: &mut dyn DataSpaceManager,
    ) -> Result<FilePosition, TableSpaceError> {
        if self.fresh_free_pos.checked_add(size).map_or(false, |end| end <= self.fresh_limit) {
            let pos = self.fresh_free_pos;
            self.fresh_free_pos = pos.checked_add(size).unwrap();
            return Ok(pos);
        }

        self.return_fresh_tail_to_lookup(space);

        let request_size = self
            .config
            .main_block_size
            .max(smallest_power_of_two_block(self.config.main_block_size as u32, size));
        let (new_pos, new_size) = space
            .allocate_extent(self.space_id, request_size)
            .map_err(|_| TableSpaceError::NoSpace {
                space_id: self.space_id,
                requested_size: size,
            })?;

        self.fresh_pos = new_pos;
        self.fresh_free_pos = new_pos;
        self.fresh_limit = new_pos.checked_add(new_size).expect("extent within address space");

        let pos = self.fresh_free_pos;
        self.fresh_free_pos = pos.checked_add(size).expect("new extent sized for request");
        Ok(pos)
    }

    /// Release the unused tail of the current extent to `lookup`, so it can
    /// be handed out again before the allocator asks the global manager for
    /// a brand new extent.
    fn return_fresh_tail_to_lookup(&mut self, space: &mut dyn DataSpaceManager) {
        let tail = self.fresh_limit - self.fresh_free_pos;
        if tail == 0 {
            return;
        }
        self.release_raw(self.fresh_free_pos, tail as u32, space);
    }

    /// Mark `[pos, pos+size)` free. Positions `>= 2^31` are dropped; they
    /// become the global manager's responsibility on [`Self::close`].
    #[instrument(skip(self, space))]
    pub fn release(&mut self, pos: FilePosition, size: u32, space: &mut dyn DataSpaceManager) {
        if pos.is_beyond_31_bits() {
            return;
        }
        self.release_raw(pos, size, space);
    }

    fn release_raw(&mut self, pos: FilePosition, size: u32, space: &mut dyn DataSpaceManager) {
        if self.lookup.is_full() {
            self.flush_lookup(space);
        }
        self.lookup.add(pos, size);
    }

    fn flush_lookup(&mut self, space: &mut dyn DataSpaceManager) {
        for extent in self.lookup.reset() {
            space.release_extent(self.space_id, extent.pos, extent.size as u64);
        }
    }

    /// Hand the free list and the current extent's tail to the global
    /// manager and reset this allocator to its initial state.
    pub fn close(&mut self, space: &mut dyn DataSpaceManager) {
        self.flush_lookup(space);
        let tail = self.fresh_limit - self.fresh_free_pos;
        if tail > 0 {
            space.release_extent(self.space_id, self.fresh_free_pos, tail);
        }
        self.fresh_pos = FilePosition::ZERO;
        self.fresh_free_pos = FilePosition::ZERO;
        self.fresh_limit = FilePosition::ZERO;
    }
}

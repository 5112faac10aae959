use reldb_common::{FilePosition, TableId};

use crate::error::TableSpaceError;

/// The global, file-wide collaborator that hands out fresh extents to every
/// table's [`crate::TableSpaceAllocator`] and absorbs extents released back
/// when an allocator's free list fills up or the allocator closes.
///
/// Out of scope per spec.md §1 ("on-disk file I/O primitives"): this trait
/// is the seam through which the core calls into that external subsystem.
pub trait DataSpaceManager {
    /// Request a new extent of at least `size` bytes for `space_id`.
    /// Returns the extent's starting position and its actual size (the
    /// manager may round up).
    fn allocate_extent(&mut self, space_id: TableId, size: u64) -> Result<(FilePosition, u64), TableSpaceError>;

    /// Hand a released extent back to the manager's own free space.
    fn release_extent(&mut self, space_id: TableId, pos: FilePosition, size: u64);
}

/// An in-memory [`DataSpaceManager`] that bump-allocates from an unbounded
/// address space and never reuses released extents itself (reuse happens
/// one layer up, in each table's own [`crate::FreeBlockIndex`]). Useful for
/// tests and for memory-backed tables that have no underlying file.
#[derive(Default)]
pub struct BumpSpaceManager {
    next: u64,
    pub released: Vec<(TableId, FilePosition, u64)>,
}

impl BumpSpaceManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSpaceManager for BumpSpaceManager {
    fn allocate_extent(&mut self, _space_id: TableId, size: u64) -> Result<(FilePosition, u64), TableSpaceError> {
        let pos = FilePosition::new(self.next);
        self.next += size;
        Ok((pos, size))
    }

    fn release_extent(&mut self, space_id: TableId, pos: FilePosition, size: u64) {
        self.released.push((space_id, pos, size));
    }
}

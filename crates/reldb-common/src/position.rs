/// A byte offset into a table's data file.
///
/// Positions are stored on disk divided by a power-of-two `scale` so that a
/// 32-bit field can address up to `scale * 2^32` bytes (spec.md §6).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct FilePosition(pub u64);

impl FilePosition {
    pub const ZERO: FilePosition = FilePosition(0);
    pub const MAX: FilePosition = FilePosition(u64::MAX);

    /// The largest position a raw (unscaled) 32-bit field can represent.
    pub const MAX_UNSCALED: u64 = (1u64 << 31) - 1;

    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn is_beyond_31_bits(self) -> bool {
        self.0 >= 1u64 << 31
    }

    /// Encode this position divided by `scale` for on-disk/index storage.
    ///
    /// Returns `None` if the scaled value would overflow 32 bits.
    pub fn to_scaled(self, scale: u32) -> Option<u32> {
        let scaled = self.0 / scale as u64;
        u32::try_from(scaled).ok()
    }

    /// Reconstruct a position from a scaled 32-bit on-disk value.
    pub fn from_scaled(scaled: u32, scale: u32) -> Self {
        Self(scaled as u64 * scale as u64)
    }

    pub fn checked_add(self, bytes: u64) -> Option<Self> {
        self.0.checked_add(bytes).map(Self)
    }
}

impl std::ops::Sub for FilePosition {
    type Output = u64;
    fn sub(self, rhs: Self) -> u64 {
        self.0 - rhs.0
    }
}

/// Round `size` up to a multiple of `unit`, which must be a power of two.
pub fn round_up_to_unit(size: u64, unit: u32) -> u64 {
    let unit = unit as u64;
    (size + unit - 1) & !(unit - 1)
}

/// Smallest `n` such that `base * 2^n >= target`.
pub fn smallest_power_of_two_block(base: u32, target: u64) -> u64 {
    let mut size = base as u64;
    while size < target {
        size = size.saturating_mul(2);
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_roundtrip() {
        let pos = FilePosition::new(16 * 1024);
        let scaled = pos.to_scaled(16).unwrap();
        assert_eq!(FilePosition::from_scaled(scaled, 16), pos);
    }

    #[test]
    fn overflow_detected() {
        let pos = FilePosition::new((u32::MAX as u64 + 10) * 16);
        assert!(pos.to_scaled(16).is_none());
    }

    #[test]
    fn round_up_respects_unit() {
        assert_eq!(round_up_to_unit(0, 4096), 0);
        assert_eq!(round_up_to_unit(1, 4096), 4096);
        assert_eq!(round_up_to_unit(4096, 4096), 4096);
        assert_eq!(round_up_to_unit(4097, 4096), 8192);
    }

    #[test]
    fn smallest_block_doubles() {
        assert_eq!(smallest_power_of_two_block(4096, 1), 4096);
        assert_eq!(smallest_power_of_two_block(4096, 5000), 8192);
        assert_eq!(smallest_power_of_two_block(4096, 20000), 32768);
    }
}

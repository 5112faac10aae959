use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter, used for both the transaction
/// manager's `globalChangeTimestamp` and the schema manager's
/// `schemaChangeTimestamp` (spec.md §6).
///
/// Each database owns exactly one of these per role; they are never
/// module-global (spec.md "Design Notes" / Global state).
#[derive(Debug, Default)]
pub struct ChangeCounter(AtomicU64);

impl ChangeCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Current value without advancing it.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance the counter and return the new value.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_strictly() {
        let c = ChangeCounter::new();
        assert_eq!(c.current(), 0);
        assert_eq!(c.advance(), 1);
        assert_eq!(c.advance(), 2);
        assert_eq!(c.current(), 2);
    }
}

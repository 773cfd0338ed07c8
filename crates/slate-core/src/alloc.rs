//! Per-store identifier allocation.
//!
//! One allocator lives inside each [`crate::store::RecordStore`]; it is never
//! a process-wide global. Ids are strictly increasing starting at 1 and are
//! shared by all three record kinds, so records created in sequence can never
//! collide across kinds.

use crate::model::RecordId;

#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Issue the next identifier. Never returns the same value twice for the
    /// lifetime of the allocator.
    pub fn next(&mut self) -> RecordId {
        self.last += 1;
        RecordId(self.last)
    }

    /// Move the counter past `id` so that future [`Self::next`] calls stay
    /// above every identifier already live. Used after loading a store from
    /// disk.
    pub(crate) fn advance_past(&mut self, id: RecordId) {
        self.last = self.last.max(id.0);
    }

    /// Test support only: rewinds the counter to its initial state. Invoked
    /// solely by [`crate::store::RecordStore::reset`], which clears the store
    /// in the same step.
    pub(crate) fn reset(&mut self) {
        self.last = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::IdAllocator;
    use crate::model::RecordId;

    #[test]
    fn ids_are_strictly_increasing_from_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), RecordId(1));
        assert_eq!(ids.next(), RecordId(2));
        assert_eq!(ids.next(), RecordId(3));
    }

    #[test]
    fn advance_past_never_rewinds() {
        let mut ids = IdAllocator::new();
        ids.advance_past(RecordId(10));
        assert_eq!(ids.next(), RecordId(11));

        ids.advance_past(RecordId(5));
        assert_eq!(ids.next(), RecordId(12));
    }

    #[test]
    fn reset_starts_over() {
        let mut ids = IdAllocator::new();
        let _ = ids.next();
        let _ = ids.next();
        ids.reset();
        assert_eq!(ids.next(), RecordId(1));
    }
}

use super::global_id::{GlobalId, RESERVED_ID_MAX};

/// Monotonic allocator of [`GlobalId`]s for one session.
///
/// Values are strictly increasing and never recycled; the low range up to
/// [`RESERVED_ID_MAX`] is pre-allocated for session-scoped singletons and
/// handed out through [`IdAllocator::reserved`] only.
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: RESERVED_ID_MAX + 1,
        }
    }

    pub fn next_id(&mut self) -> GlobalId {
        let id = GlobalId::from_value(self.next);
        self.next += 1;
        id
    }

    /// Move the allocation point past an id adopted from outside, such as a
    /// loaded state file, so future allocations cannot collide with it.
    pub fn advance_past(&mut self, id: GlobalId) {
        if id.value() >= self.next {
            self.next = id.value() + 1;
        }
    }

    /// A reserved singleton id. `slot` 0 is the null reference and cannot be
    /// handed out.
    ///
    /// # Panics
    ///
    /// Panics on slot 0; reserving the null id is a programming error.
    pub fn reserved(slot: u8) -> GlobalId {
        if slot == 0 {
            panic!("reserved slot 0 is the null id and cannot be allocated");
        }
        GlobalId::from_value(slot as u64)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

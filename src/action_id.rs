use std::sync::atomic::{AtomicU32, Ordering};

/// Optional convenience: a monotone `action_id` source (spec.md §6's
/// `action_id_allocate`). The core itself never calls this — callers pass
/// `action_id` into `try_send` directly — but higher layers need *some*
/// monotone counter, and this is the uncontended-counter idiom used
/// throughout the corpus for ids that don't need to survive a restart.
#[derive(Debug, Default)]
pub struct AtomicActionIdAllocator {
    next: AtomicU32,
}

impl AtomicActionIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    pub fn allocate(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds, injectable so response expiration (spec.md §4.5) is
/// deterministic in tests (design note, §9: "time source should be
/// injectable for tests").
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> i64;
}

/// The default `Clock`, backed by `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs() as i64
    }
}

/// A manually-advanced clock for deterministic expiration tests.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    seconds: Arc<AtomicI64>,
}

impl VirtualClock {
    pub fn new(start: i64) -> Self {
        Self {
            seconds: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn advance(&self, delta: i64) {
        self.seconds.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set(&self, value: i64) {
        self.seconds.store(value, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now_seconds(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_advances() {
        let clock = VirtualClock::new(0);
        assert_eq!(clock.now_seconds(), 0);
        clock.advance(3);
        assert_eq!(clock.now_seconds(), 3);
        clock.set(100);
        assert_eq!(clock.now_seconds(), 100);
    }
}

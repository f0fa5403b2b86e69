// Path: crates/api/src/clock/mod.rs
//! The block-height source consumed by the registries.
//!
//! The registries never consult a wall clock. The host reads the height once
//! per operation from a `HeightSource` and hands it to the service in the
//! `CallContext`, so tests can move time forward deterministically.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically non-decreasing block-height counter.
pub trait HeightSource: Send + Sync {
    /// The current height.
    fn current_height(&self) -> u64;
}

impl<T: HeightSource + ?Sized> HeightSource for std::sync::Arc<T> {
    fn current_height(&self) -> u64 {
        (**self).current_height()
    }
}

/// A height counter advanced explicitly by its owner.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reporting `start_height`.
    pub fn new(start_height: u64) -> Self {
        Self {
            height: AtomicU64::new(start_height),
        }
    }

    /// Moves the clock forward by `blocks`, saturating at `u64::MAX`.
    /// Returns the new height.
    pub fn advance(&self, blocks: u64) -> u64 {
        let mut current = self.height.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(blocks);
            match self.height.compare_exchange_weak(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    /// Moves the clock to `height`. Heights never go backwards; a lower value
    /// is ignored. Returns the resulting height.
    pub fn set(&self, height: u64) -> u64 {
        let previous = self.height.fetch_max(height, Ordering::SeqCst);
        previous.max(height)
    }
}

impl HeightSource for ManualClock {
    fn current_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_monotonic() {
        let clock = ManualClock::new(5);
        assert_eq!(clock.current_height(), 5);
        assert_eq!(clock.advance(10), 15);
        assert_eq!(clock.set(3), 15);
        assert_eq!(clock.set(20), 20);
        assert_eq!(clock.current_height(), 20);
    }

    #[test]
    fn advance_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        assert_eq!(clock.advance(5), u64::MAX);
    }
}

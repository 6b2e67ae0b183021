//! Request generation tokens.
//!
//! A view that can have several loads in flight takes a token before each
//! one and applies a response only if its token is still the latest. A slow
//! response to an older load is discarded instead of overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: AtomicU64,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Makes every outstanding generation stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::RequestGenerations;

    #[test]
    fn only_the_latest_generation_is_current() {
        let generations = RequestGenerations::new();
        let first = generations.begin();
        let second = generations.begin();

        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn invalidate_makes_outstanding_generation_stale() {
        let generations = RequestGenerations::new();
        let pending = generations.begin();
        generations.invalidate();
        assert!(!generations.is_current(pending));
    }
}

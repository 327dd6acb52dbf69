use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared batch-generation counter.
///
/// Every batch runs under one generation; advancing the counter (a reset or a new selection)
/// makes results still in flight for older generations stale. Clones share the same counter,
/// so a handle can be given to another thread to invalidate a running batch.
#[derive(Clone, Debug, Default)]
pub struct BatchGeneration(Arc<AtomicU64>);

impl BatchGeneration {
    /// Fresh counter at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Start a new generation and return it.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Whether results tagged with `generation` may still be committed.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/generation.rs"]
mod tests;

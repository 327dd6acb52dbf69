use std::collections::HashSet;

use crate::foundation::error::{StickerError, StickerResult};
use crate::naming::sanitize::split_name;

const DEFAULT_FALLBACK_BASE: &str = "sticker";

/// Resolve `candidate` against `existing` without recording it.
///
/// An empty base becomes `fallback`. While the name is taken, `_1`, `_2`, … is appended before
/// the extension. Terminates after at most `existing.len() + 1` probes.
pub fn unique_name(
    candidate: &str,
    existing: &HashSet<String>,
    fallback: &str,
) -> StickerResult<String> {
    let (base, ext) = split_name(candidate);
    let base = if base.is_empty() { fallback } else { base };

    let mut name = format!("{base}{ext}");
    let mut n: u64 = 1;
    while existing.contains(&name) {
        name = format!("{base}_{n}{ext}");
        n = n
            .checked_add(1)
            .ok_or_else(|| StickerError::name_conflict(candidate.to_string()))?;
    }
    Ok(name)
}

/// A naming scope: the set of names already handed out.
///
/// One allocator lives per batch; exports create their own so format-specific names never leak
/// into the live batch.
#[derive(Clone, Debug)]
pub struct NameAllocator {
    allocated: HashSet<String>,
    fallback_base: String,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameAllocator {
    /// Empty scope with the default `sticker` fallback base.
    pub fn new() -> Self {
        Self::with_fallback(DEFAULT_FALLBACK_BASE)
    }

    /// Empty scope with a custom fallback base.
    pub fn with_fallback(fallback_base: impl Into<String>) -> Self {
        Self {
            allocated: HashSet::new(),
            fallback_base: fallback_base.into(),
        }
    }

    /// The name `candidate` would receive, without taking it.
    pub fn resolve(&self, candidate: &str) -> StickerResult<String> {
        unique_name(candidate, &self.allocated, &self.fallback_base)
    }

    /// Resolve `candidate` and record the result as taken.
    pub fn allocate(&mut self, candidate: &str) -> StickerResult<String> {
        let name = self.resolve(candidate)?;
        self.allocated.insert(name.clone());
        Ok(name)
    }

    /// Give `name` back. Returns whether it was taken.
    pub fn release(&mut self, name: &str) -> bool {
        self.allocated.remove(name)
    }

    /// Whether `name` is taken in this scope.
    pub fn contains(&self, name: &str) -> bool {
        self.allocated.contains(name)
    }

    /// Number of taken names.
    pub fn len(&self) -> usize {
        self.allocated.len()
    }

    /// Whether no name is taken.
    pub fn is_empty(&self) -> bool {
        self.allocated.is_empty()
    }

    /// Release every name.
    pub fn clear(&mut self) {
        self.allocated.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/naming/allocator.rs"]
mod tests;

//! Cache invalidation utilities shared across topology structures.
//!
//! Derived relations are validated against one global [`ChangeCounter`]: every
//! structural mutation bumps it, and a cached value is served only while the
//! stamp it was computed under equals the current count.

use serde::{Deserialize, Serialize};

/// Anything that caches derived topology (coboundaries, neighbors, boundary
/// flags, …) should implement this.
pub trait InvalidateCache {
    /// Invalidate *all* internal caches so future queries recompute correctly.
    fn invalidate_cache(&mut self);
}

// Blanket impl for Box<T>
impl<T: InvalidateCache + ?Sized> InvalidateCache for Box<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        (**self).invalidate_cache();
    }
}

/// Monotonic mutation counter of an element store. Never decremented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeCounter(u64);

impl ChangeCounter {
    pub const fn new() -> Self {
        ChangeCounter(0)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Advance the counter and return the new value.
    #[inline]
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// A cached value tagged with the counter it was computed under.
#[derive(Clone, Debug, Default)]
pub struct Stamped<T> {
    stamp: Option<u64>,
    value: T,
}

impl<T> Stamped<T> {
    /// Whether the value was computed under `counter`.
    #[inline]
    pub fn is_current(&self, counter: ChangeCounter) -> bool {
        self.stamp == Some(counter.get())
    }

    /// Record that the value now reflects `counter`.
    #[inline]
    pub fn mark_current(&mut self, counter: ChangeCounter) {
        self.stamp = Some(counter.get());
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable access for in-place rebuilds; callers re-stamp afterwards.
    #[inline]
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> InvalidateCache for Stamped<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        self.stamp = None;
    }
}

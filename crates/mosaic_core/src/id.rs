//! Process-wide id sequences.
//!
//! Ids are never reused within a process. Sequences are plain atomics so
//! they can live in `static`s and be shared by every thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id source.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Creates a sequence whose first id is `first`.
    #[must_use]
    pub const fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocates the next id.
    #[inline]
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the id the next call to [`Self::next_id`] would hand out.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Sequence shared by all collision shapes.
pub static COLLISION_IDS: IdSequence = IdSequence::new(1);

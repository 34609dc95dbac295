//! Type-safe counter for generating unique arena IDs.
//!
//! Entity and member IDs are handed out by the same kind of counter so the
//! "IDs start at 1, never 0" rule lives in one place.

use std::marker::PhantomData;
use std::num::NonZeroU32;

/// An ID type that can be minted from a non-zero counter value.
pub trait ArenaId: Copy {
    fn from_raw(raw: NonZeroU32) -> Self;
}

/// Sequential ID generator.
///
/// This type ensures that:
/// - IDs start at 1 (never 0)
/// - IDs are generated sequentially, so `id - 1` is a valid arena slot
/// - The counter cannot be misused as a regular integer
#[derive(Debug, Clone)]
pub struct IdCounter<I> {
    next_id: NonZeroU32,
    _marker: PhantomData<I>,
}

impl<I: ArenaId> IdCounter<I> {
    /// Creates a new counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: NonZeroU32::MIN,
            _marker: PhantomData,
        }
    }

    /// Generates the next ID and increments the counter.
    ///
    /// # Panics
    /// Panics if the counter would overflow (after 4 billion IDs).
    /// This is a theoretical limit that won't be reached in practice.
    pub fn next_id(&mut self) -> I {
        let current = self.next_id;

        self.next_id = current
            .checked_add(1)
            .expect("ID counter overflow - model has more than 4 billion records");

        I::from_raw(current)
    }

    /// Returns the number of IDs generated so far.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.next_id.get() - 1
    }
}

impl<I: ArenaId> Default for IdCounter<I> {
    fn default() -> Self {
        Self::new()
    }
}

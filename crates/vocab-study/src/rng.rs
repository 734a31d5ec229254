//! Randomness as an injectable capability.
//!
//! Every random decision the engine makes (entry order, distractor choice,
//! option order) goes through [`StudyRng`], so a seeded generator or
//! [`InOrder`] makes a whole session reproducible.

use rand::{Rng, seq::SliceRandom};

/// Shuffling and sampling used by question generation.
pub trait StudyRng {
    /// Permute `items` in place.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Pick up to `n` elements of `items` without replacement.
    fn pick_random<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T>;
}

impl<G: Rng + ?Sized> StudyRng for G {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        SliceRandom::shuffle(items, self);
    }

    fn pick_random<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        SliceRandom::choose_multiple(items, self, n)
            .cloned()
            .collect()
    }
}

/// A "random" source that never reorders anything and always picks from the
/// front. Useful for fixtures, replays and demos where order must be exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct InOrder;

impl StudyRng for InOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}

    fn pick_random<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        items.iter().take(n).cloned().collect()
    }
}

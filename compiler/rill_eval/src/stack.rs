//! Stack growth for recursive evaluation.
//!
//! User-defined functions may recurse as deep as memory allows, and map
//! literals and statement blocks nest arbitrarily. Each recursive step goes
//! through [`ensure_sufficient_stack`], which moves execution onto a fresh
//! stack segment when the current one runs low.

/// Space that must remain on the current segment before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

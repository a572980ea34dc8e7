//! Dataset builders for the two storage shapes.
//!
//! Contiguous datasets are one allocation holding every element. Scattered
//! datasets hold one `Box` per element, so each record lives in its own heap
//! cell and the outer vector only stores pointers.

use crate::record::Payload;
use crate::rng::PayloadRng;

/// `n` random payloads stored contiguously.
#[must_use]
pub fn values<T: Payload>(n: usize, seed: u64) -> Vec<T> {
    let mut rng = PayloadRng::new(seed);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(T::random(&mut rng));
    }
    out
}

/// `n` random payloads, each in its own heap cell.
///
/// Uses the same draw order as [`values`], so equal seeds give equal content.
#[must_use]
pub fn boxed<T: Payload>(n: usize, seed: u64) -> Vec<Box<T>> {
    let mut rng = PayloadRng::new(seed);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(Box::new(T::random(&mut rng)));
    }
    out
}

/// Four `i64` words: the layout of a zero-valued [`Record`].
///
/// [`Record`]: crate::record::Record
pub type RecordCell = [i64; 4];

/// `n` zero-valued record cells in a single zero-filled allocation.
///
/// Arrays of integers take the allocator's zeroed path, so the block is not
/// written element by element on the way in.
#[must_use]
pub fn zeroed_cells(n: usize) -> Vec<RecordCell> {
    vec![[0; 4]; n]
}

/// `n` index-tagged payloads, each in its own heap cell.
#[must_use]
pub fn indexed_boxed<T: Payload>(n: usize) -> Vec<Box<T>> {
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        out.push(Box::new(T::indexed(i)));
    }
    out
}

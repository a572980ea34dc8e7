//! Field summation over the three storage shapes.
//!
//! Sums wrap on overflow: random 63-bit keys over a million elements exceed
//! `i64`, and the total only exists to keep the loop observable.

use crate::record::Payload;

/// Sum over contiguous values.
#[inline]
#[must_use]
pub fn sum_values<T: Payload>(ds: &[T]) -> i64 {
    let mut sum = 0i64;
    for v in ds {
        sum = sum.wrapping_add(v.key());
    }
    sum
}

/// Sum over individually boxed elements.
#[inline]
#[must_use]
pub fn sum_boxed<T: Payload>(ds: &[Box<T>]) -> i64 {
    let mut sum = 0i64;
    for v in ds {
        sum = sum.wrapping_add(v.key());
    }
    sum
}

/// Sum over contiguous values reached through a reference to the vector.
#[inline]
#[must_use]
#[allow(clippy::ptr_arg)] // the `&Vec` hop is the indirection being measured
pub fn sum_through_ref<T: Payload>(ds: &Vec<T>) -> i64 {
    let mut sum = 0i64;
    for v in ds.iter() {
        sum = sum.wrapping_add(v.key());
    }
    sum
}

//! Produce -> pass -> serialize call chains.
//!
//! Each shape has its own three stages so the handoff between them moves the
//! shape being measured: a `Vec<T>` header, a `Vec<Box<T>>` header, or a
//! single `Box<Vec<T>>` pointer. The pass stages are never inlined so every
//! handoff is a real call.

use crate::dataset;
use crate::error::MemshapeError;
use crate::record::Payload;
use crate::scenario::StorageShape;

// Array of values.

#[must_use]
pub fn produce_values<T: Payload>(n: usize, seed: u64) -> Vec<T> {
    dataset::values(n, seed)
}

#[inline(never)]
#[must_use]
pub fn pass_values<T: Payload>(ds: Vec<T>) -> Vec<T> {
    ds
}

pub fn serialize_values<T: Payload>(ds: &[T]) -> Result<String, MemshapeError> {
    Ok(serde_json::to_string(ds)?)
}

// Array of references.

#[must_use]
pub fn produce_boxed<T: Payload>(n: usize, seed: u64) -> Vec<Box<T>> {
    dataset::boxed(n, seed)
}

#[inline(never)]
#[must_use]
pub fn pass_boxed<T: Payload>(ds: Vec<Box<T>>) -> Vec<Box<T>> {
    ds
}

pub fn serialize_boxed<T: Payload>(ds: &[Box<T>]) -> Result<String, MemshapeError> {
    Ok(serde_json::to_string(ds)?)
}

// Reference to an array of values.

#[must_use]
pub fn produce_slice_ref<T: Payload>(n: usize, seed: u64) -> Box<Vec<T>> {
    Box::new(dataset::values(n, seed))
}

#[inline(never)]
#[must_use]
#[allow(clippy::box_collection)] // the boxed vector is the shape under test
pub fn pass_slice_ref<T: Payload>(ds: Box<Vec<T>>) -> Box<Vec<T>> {
    ds
}

#[allow(clippy::ptr_arg)]
pub fn serialize_slice_ref<T: Payload>(ds: &Vec<T>) -> Result<String, MemshapeError> {
    Ok(serde_json::to_string(ds)?)
}

/// Run the full chain for `shape` and return the serialized text.
pub fn run_chain<T: Payload>(
    shape: StorageShape,
    n: usize,
    seed: u64,
) -> Result<String, MemshapeError> {
    match shape {
        StorageShape::Contiguous => {
            let ds = produce_values::<T>(n, seed);
            let ds = pass_values(ds);
            serialize_values(&ds)
        }
        StorageShape::Scattered => {
            let ds = produce_boxed::<T>(n, seed);
            let ds = pass_boxed(ds);
            serialize_boxed(&ds)
        }
        StorageShape::SliceReference => {
            let ds = produce_slice_ref::<T>(n, seed);
            let ds = pass_slice_ref(ds);
            serialize_slice_ref(&ds)
        }
    }
}

/// BLAKE3 hex digest of serialized chain output.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BigRecord, Record};

    #[test]
    fn all_shapes_serialize_byte_identical_records() {
        let by_value = run_chain::<Record>(StorageShape::Contiguous, 256, 13).unwrap();
        let by_ref = run_chain::<Record>(StorageShape::Scattered, 256, 13).unwrap();
        let by_slice_ref = run_chain::<Record>(StorageShape::SliceReference, 256, 13).unwrap();
        assert_eq!(by_value, by_ref);
        assert_eq!(by_value, by_slice_ref);
    }

    #[test]
    fn all_shapes_serialize_byte_identical_big_records() {
        let by_value = run_chain::<BigRecord>(StorageShape::Contiguous, 32, 21).unwrap();
        let by_ref = run_chain::<BigRecord>(StorageShape::Scattered, 32, 21).unwrap();
        let by_slice_ref = run_chain::<BigRecord>(StorageShape::SliceReference, 32, 21).unwrap();
        assert_eq!(fingerprint(&by_value), fingerprint(&by_ref));
        assert_eq!(fingerprint(&by_value), fingerprint(&by_slice_ref));
    }

    #[test]
    fn serialized_output_round_trips_to_same_records() {
        let ds = produce_values::<Record>(20, 4);
        let text = serialize_values(&ds).unwrap();
        let back: Vec<Record> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn empty_chain_is_empty_json_array() {
        assert_eq!(
            run_chain::<Record>(StorageShape::Scattered, 0, 1).unwrap(),
            "[]"
        );
    }

    #[test]
    fn fingerprint_is_hex_blake3() {
        let fp = fingerprint("[]");
        assert_eq!(fp.len(), 64);
        assert_ne!(fp, fingerprint("[ ]"));
    }
}

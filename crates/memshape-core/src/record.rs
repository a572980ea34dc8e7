//! Fixed-shape benchmark payloads.

use serde::{Deserialize, Serialize};

use crate::rng::PayloadRng;

/// Small payload: four 64-bit integers, 32 bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
    #[serde(rename = "C")]
    pub c: i64,
    #[serde(rename = "D")]
    pub d: i64,
}

/// Large payload used to amplify layout effects, 240 bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BigRecord {
    #[serde(rename = "Ints")]
    pub ints: [i64; 16],
    #[serde(rename = "Floats")]
    pub floats: [f64; 8],
    #[serde(rename = "Small")]
    pub small: [i32; 4],
    #[serde(rename = "Bytes")]
    pub bytes: [u8; 32],
}

/// A payload that datasets can be built from and traversed over.
pub trait Payload: Copy + Serialize {
    /// Every field drawn independently from `rng`.
    fn random(rng: &mut PayloadRng) -> Self;

    /// Zero value except for the leading field, which carries `index`.
    fn indexed(index: usize) -> Self;

    /// The field summed by traversal scenarios.
    fn key(&self) -> i64;
}

impl Payload for Record {
    #[inline]
    fn random(rng: &mut PayloadRng) -> Self {
        Self {
            a: rng.next_i63(),
            b: rng.next_i63(),
            c: rng.next_i63(),
            d: rng.next_i63(),
        }
    }

    #[inline]
    fn indexed(index: usize) -> Self {
        Self {
            a: index as i64,
            ..Self::default()
        }
    }

    #[inline]
    fn key(&self) -> i64 {
        self.a
    }
}

impl Payload for BigRecord {
    fn random(rng: &mut PayloadRng) -> Self {
        let mut out = Self::default();
        for v in &mut out.ints {
            *v = rng.next_i63();
        }
        for v in &mut out.floats {
            *v = rng.next_f64();
        }
        for v in &mut out.small {
            *v = rng.next_i31();
        }
        for v in &mut out.bytes {
            *v = rng.next_byte();
        }
        out
    }

    #[inline]
    fn indexed(index: usize) -> Self {
        let mut out = Self::default();
        out.ints[0] = index as i64;
        out
    }

    #[inline]
    fn key(&self) -> i64 {
        self.ints[0]
    }
}

//! Even-value filtering with and without a pre-sized result.

use serde::{Deserialize, Serialize};

/// How the filter allocates its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityStrategy {
    /// Result reserved to the full input length up front.
    Presized,
    /// Result starts empty and grows on demand.
    Growable,
}

impl CapacityStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Presized => "presized",
            Self::Growable => "growable",
        }
    }
}

/// The integers `0..n`.
#[must_use]
pub fn source_sequence(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

/// Even values of `src`, result reserved to `src.len()`.
#[must_use]
pub fn filter_even_presized(src: &[i64]) -> Vec<i64> {
    let mut res = Vec::with_capacity(src.len());
    for &v in src {
        if v % 2 == 0 {
            res.push(v);
        }
    }
    res
}

/// Even values of `src`, result grown from empty.
#[must_use]
pub fn filter_even_growable(src: &[i64]) -> Vec<i64> {
    let mut res = Vec::new();
    for &v in src {
        if v % 2 == 0 {
            res.push(v);
        }
    }
    res
}

#[must_use]
pub fn filter_even(src: &[i64], strategy: CapacityStrategy) -> Vec<i64> {
    match strategy {
        CapacityStrategy::Presized => filter_even_presized(src),
        CapacityStrategy::Growable => filter_even_growable(src),
    }
}

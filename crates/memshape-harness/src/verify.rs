//! Runtime property checks over the core operations.
//!
//! The benches only time things; `harness verify` confirms that the shapes
//! being compared really compute the same answer before anyone reads numbers.

use memshape_core::record::{BigRecord, Payload, Record};
use memshape_core::scenario::StorageShape;
use memshape_core::{chain, dataset, filter, traverse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl PropertyCheck {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
        }
    }
}

/// Run every property check at dataset size `n`.
///
/// The 100-element filter check always runs; a second filter check at `n`
/// is added when `n` differs, so check names stay unique.
#[must_use]
pub fn verify_properties(n: usize, seed: u64) -> Vec<PropertyCheck> {
    let mut checks = vec![check_dataset_sizes(n, seed), check_filter(100)];
    if n != 100 {
        checks.push(check_filter(n));
    }
    checks.extend([
        check_sums::<Record>("sum_equal_record", n, seed),
        check_sums::<BigRecord>("sum_equal_big_record", n, seed),
        check_serialization::<Record>("serialization_identical_record", n, seed),
        check_serialization::<BigRecord>("serialization_identical_big_record", n, seed),
    ]);
    checks
}

fn check_dataset_sizes(n: usize, seed: u64) -> PropertyCheck {
    let lens = [
        dataset::values::<Record>(n, seed).len(),
        dataset::boxed::<Record>(n, seed).len(),
        dataset::zeroed_cells(n).len(),
        dataset::indexed_boxed::<Record>(n).len(),
        dataset::values::<BigRecord>(n, seed).len(),
        dataset::boxed::<BigRecord>(n, seed).len(),
    ];
    let passed = lens.iter().all(|&l| l == n);
    PropertyCheck::new("dataset_size", passed, format!("n={n} lens={lens:?}"))
}

fn check_filter(n: usize) -> PropertyCheck {
    let src = filter::source_sequence(n);
    let expected: Vec<i64> = src.iter().copied().filter(|v| v % 2 == 0).collect();
    let pre = filter::filter_even_presized(&src);
    let grow = filter::filter_even_growable(&src);
    let passed = pre == expected && grow == expected;
    PropertyCheck::new(
        &format!("filter_even_{n}"),
        passed,
        format!(
            "expected={} presized={} growable={}",
            expected.len(),
            pre.len(),
            grow.len()
        ),
    )
}

fn check_sums<T: Payload>(name: &str, n: usize, seed: u64) -> PropertyCheck {
    let vals = dataset::values::<T>(n, seed);
    let refs = dataset::boxed::<T>(n, seed);
    let a = traverse::sum_values(&vals);
    let b = traverse::sum_boxed(&refs);
    let c = traverse::sum_through_ref(&vals);
    PropertyCheck::new(
        name,
        a == b && a == c,
        format!("values={a} references={b} slice_reference={c}"),
    )
}

fn check_serialization<T: Payload>(name: &str, n: usize, seed: u64) -> PropertyCheck {
    let mut prints = Vec::with_capacity(StorageShape::ALL.len());
    for shape in StorageShape::ALL {
        match chain::run_chain::<T>(shape, n, seed) {
            Ok(text) => prints.push((shape, chain::fingerprint(&text))),
            Err(err) => {
                return PropertyCheck::new(name, false, format!("{}: {err}", shape.label()));
            }
        }
    }
    let passed = prints.windows(2).all(|w| w[0].1 == w[1].1);
    let detail = prints
        .iter()
        .map(|(shape, fp)| format!("{}={}", shape.label(), &fp[..16]))
        .collect::<Vec<_>>()
        .join(" ");
    PropertyCheck::new(name, passed, detail)
}

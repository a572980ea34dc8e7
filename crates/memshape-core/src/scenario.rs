//! Named scenario catalog shared by the bench targets and the harness.

use serde::{Deserialize, Serialize};

use crate::alloc_stats::AllocLayout;
use crate::config::ScaleProfile;
use crate::error::MemshapeError;
use crate::filter::CapacityStrategy;

/// Scenario family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Contiguous vs heap-scattered allocation, measured at release.
    AllocationShape,
    /// Filtering into a pre-sized vs growable result.
    CapacityPresizing,
    /// Summing one field over values, boxes, or a reference to values.
    TraversalLocality,
    /// Produce -> pass -> serialize under each storage shape.
    CallChain,
}

impl Family {
    pub const ALL: [Self; 4] = [
        Self::AllocationShape,
        Self::CapacityPresizing,
        Self::TraversalLocality,
        Self::CallChain,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AllocationShape => "allocation_shape",
            Self::CapacityPresizing => "capacity_presizing",
            Self::TraversalLocality => "traversal_locality",
            Self::CallChain => "call_chain",
        }
    }

    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "allocation_shape" | "alloc" | "allocation" => Some(Self::AllocationShape),
            "capacity_presizing" | "capacity" | "filter" => Some(Self::CapacityPresizing),
            "traversal_locality" | "traversal" | "sum" => Some(Self::TraversalLocality),
            "call_chain" | "chain" => Some(Self::CallChain),
            _ => None,
        }
    }
}

/// Element type carried by traversal and call-chain datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Record,
    BigRecord,
}

/// How a dataset is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageShape {
    /// `Vec<T>`: one allocation, elements adjacent.
    Contiguous,
    /// `Vec<Box<T>>`: one heap cell per element.
    Scattered,
    /// `Vec<T>` reached through one extra indirection.
    SliceReference,
}

impl StorageShape {
    pub const ALL: [Self; 3] = [Self::Contiguous, Self::Scattered, Self::SliceReference];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contiguous => "contiguous",
            Self::Scattered => "scattered",
            Self::SliceReference => "slice_reference",
        }
    }
}

/// What a scenario executes, carrying only the parameters its family uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    AllocationShape {
        layout: AllocLayout,
    },
    CapacityPresizing {
        strategy: CapacityStrategy,
    },
    TraversalLocality {
        payload: PayloadKind,
        shape: StorageShape,
    },
    CallChain {
        payload: PayloadKind,
        shape: StorageShape,
    },
}

impl Workload {
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::AllocationShape { .. } => Family::AllocationShape,
            Self::CapacityPresizing { .. } => Family::CapacityPresizing,
            Self::TraversalLocality { .. } => Family::TraversalLocality,
            Self::CallChain { .. } => Family::CallChain,
        }
    }
}

/// One named benchmark scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub workload: Workload,
    /// Dataset size under the `full` profile.
    pub base_size: usize,
}

impl Scenario {
    const fn new(name: &'static str, workload: Workload, base_size: usize) -> Self {
        Self {
            name,
            workload,
            base_size,
        }
    }

    #[must_use]
    pub const fn family(&self) -> Family {
        self.workload.family()
    }

    /// Dataset size under `profile`.
    ///
    /// Capacity scenarios are defined by their size, so they never scale.
    #[must_use]
    pub fn size(&self, profile: ScaleProfile) -> usize {
        match self.workload {
            Workload::CapacityPresizing { .. } => self.base_size,
            _ => profile.scale(self.base_size),
        }
    }
}

pub const ALLOCATION_SIZE: usize = 10_000_000;
pub const RECORD_SIZE: usize = 1_000_000;
pub const BIG_RECORD_SIZE: usize = 100_000;

const fn alloc(layout: AllocLayout) -> Workload {
    Workload::AllocationShape { layout }
}

const fn filter(strategy: CapacityStrategy) -> Workload {
    Workload::CapacityPresizing { strategy }
}

const fn sum(payload: PayloadKind, shape: StorageShape) -> Workload {
    Workload::TraversalLocality { payload, shape }
}

const fn chain(payload: PayloadKind, shape: StorageShape) -> Workload {
    Workload::CallChain { payload, shape }
}

use CapacityStrategy::{Growable, Presized};
use PayloadKind::{BigRecord, Record};
use StorageShape::{Contiguous, Scattered, SliceReference};

#[rustfmt::skip]
pub const CATALOG: &[Scenario] = &[
    Scenario::new("ContiguousAllocation", alloc(AllocLayout::Contiguous), ALLOCATION_SIZE),
    Scenario::new("HeapScatteredAllocation", alloc(AllocLayout::Scattered), ALLOCATION_SIZE),
    Scenario::new("FilterWithPresizedCapacity100", filter(Presized), 100),
    Scenario::new("FilterWithDefaultCapacity100", filter(Growable), 100),
    Scenario::new("FilterWithPresizedCapacity10000", filter(Presized), 10_000),
    Scenario::new("FilterWithDefaultCapacity10000", filter(Growable), 10_000),
    Scenario::new("SumOverValueSlice", sum(Record, Contiguous), RECORD_SIZE),
    Scenario::new("SumOverReferenceSlice", sum(Record, Scattered), RECORD_SIZE),
    Scenario::new("SumOverSliceReference", sum(Record, SliceReference), RECORD_SIZE),
    Scenario::new("SumOverBigValueSlice", sum(BigRecord, Contiguous), BIG_RECORD_SIZE),
    Scenario::new("SumOverBigReferenceSlice", sum(BigRecord, Scattered), BIG_RECORD_SIZE),
    Scenario::new("SumOverBigSliceReference", sum(BigRecord, SliceReference), BIG_RECORD_SIZE),
    Scenario::new("ChainValuePayload", chain(Record, Contiguous), RECORD_SIZE),
    Scenario::new("ChainReferencePayload", chain(Record, Scattered), RECORD_SIZE),
    Scenario::new("ChainSliceReferencePayload", chain(Record, SliceReference), RECORD_SIZE),
    Scenario::new("ChainBigValuePayload", chain(BigRecord, Contiguous), BIG_RECORD_SIZE),
    Scenario::new("ChainBigReferencePayload", chain(BigRecord, Scattered), BIG_RECORD_SIZE),
    Scenario::new("ChainBigSliceReferencePayload", chain(BigRecord, SliceReference), BIG_RECORD_SIZE),
];

/// Look up a scenario by name (case-insensitive).
pub fn find(name: &str) -> Result<&'static Scenario, MemshapeError> {
    CATALOG
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| MemshapeError::UnknownScenario(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn family_counts() {
        let count = |f: Family| CATALOG.iter().filter(|s| s.family() == f).count();
        assert_eq!(count(Family::AllocationShape), 2);
        assert_eq!(count(Family::CapacityPresizing), 4);
        assert_eq!(count(Family::TraversalLocality), 6);
        assert_eq!(count(Family::CallChain), 6);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find("sumovervalueslice").unwrap().name, "SumOverValueSlice");
        assert!(matches!(
            find("NoSuchScenario"),
            Err(MemshapeError::UnknownScenario(_))
        ));
    }

    #[test]
    fn capacity_sizes_ignore_profile() {
        let s = find("FilterWithDefaultCapacity10000").unwrap();
        assert_eq!(s.size(ScaleProfile::Quick), 10_000);
        let big = find("SumOverBigValueSlice").unwrap();
        assert_eq!(big.size(ScaleProfile::Full), 100_000);
        assert_eq!(big.size(ScaleProfile::Quick), 1_000);
    }

    #[test]
    fn every_shape_appears_once_per_payload() {
        for payload in [PayloadKind::Record, PayloadKind::BigRecord] {
            for shape in StorageShape::ALL {
                let sums = CATALOG
                    .iter()
                    .filter(|s| s.workload == sum(payload, shape))
                    .count();
                let chains = CATALOG
                    .iter()
                    .filter(|s| s.workload == chain(payload, shape))
                    .count();
                assert_eq!((sums, chains), (1, 1), "{payload:?} {shape:?}");
            }
        }
    }

    #[test]
    fn allocation_scenarios_cover_both_layouts() {
        let contiguous = find("ContiguousAllocation").unwrap();
        assert_eq!(contiguous.workload, alloc(AllocLayout::Contiguous));
        let scattered = find("HeapScatteredAllocation").unwrap();
        assert_eq!(scattered.workload, alloc(AllocLayout::Scattered));
        assert_eq!(scattered.family(), Family::AllocationShape);
    }

    #[test]
    fn family_labels_round_trip() {
        for f in Family::ALL {
            assert_eq!(Family::from_str_loose(f.label()), Some(f));
        }
        assert_eq!(Family::from_str_loose("chain"), Some(Family::CallChain));
        assert_eq!(Family::from_str_loose("gc"), None);
    }
}

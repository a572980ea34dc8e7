//! Allocator statistics standing in for collector statistics.
//!
//! Rust has no tracing collector, so the allocation-shape scenarios count
//! what the allocator sees instead. A binary installs [`CountingAllocator`]
//! as its `#[global_allocator]`; scenarios snapshot the counters before and
//! after releasing a dataset. One deallocation during the release is one
//! reclamation event, and the wall time of the release is the pause.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::dataset;
use crate::record::Record;

/// Memory layout of an allocation-shape dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocLayout {
    /// One zero-filled block holding every record.
    Contiguous,
    /// One heap cell per record, referenced from an outer vector.
    Scattered,
}

impl AllocLayout {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contiguous => "contiguous",
            Self::Scattered => "scattered",
        }
    }
}

/// Global allocator wrapper that counts every call it forwards.
pub struct CountingAllocator<A = System> {
    inner: A,
    allocations: AtomicU64,
    zeroed_allocations: AtomicU64,
    deallocations: AtomicU64,
    reallocations: AtomicU64,
    bytes_allocated: AtomicU64,
    bytes_freed: AtomicU64,
}

impl CountingAllocator<System> {
    #[must_use]
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl<A> CountingAllocator<A> {
    #[must_use]
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            zeroed_allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
            reallocations: AtomicU64::new(0),
            bytes_allocated: AtomicU64::new(0),
            bytes_freed: AtomicU64::new(0),
        }
    }

    #[inline]
    fn note_alloc(&self, size: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated.fetch_add(size as u64, Ordering::Relaxed);
    }

    #[inline]
    fn note_free(&self, size: usize) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_freed.fetch_add(size as u64, Ordering::Relaxed);
    }
}

// SAFETY: every call is forwarded unchanged to `inner`; the wrapper only
// updates relaxed counters, which never allocate.
unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            self.note_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.zeroed_allocations.fetch_add(1, Ordering::Relaxed);
            self.note_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        self.note_free(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let out = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !out.is_null() {
            self.reallocations.fetch_add(1, Ordering::Relaxed);
            self.bytes_allocated.fetch_add(new_size as u64, Ordering::Relaxed);
            self.bytes_freed.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        out
    }
}

/// Point-in-time allocator counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocSnapshot {
    pub allocations: u64,
    /// Subset of `allocations` served already zero-filled.
    pub zeroed_allocations: u64,
    pub deallocations: u64,
    pub reallocations: u64,
    pub bytes_allocated: u64,
    pub bytes_freed: u64,
}

impl AllocSnapshot {
    /// Counter growth from `self` to `later`.
    #[must_use]
    pub fn delta(&self, later: &Self) -> Self {
        Self {
            allocations: later.allocations.saturating_sub(self.allocations),
            zeroed_allocations: later
                .zeroed_allocations
                .saturating_sub(self.zeroed_allocations),
            deallocations: later.deallocations.saturating_sub(self.deallocations),
            reallocations: later.reallocations.saturating_sub(self.reallocations),
            bytes_allocated: later.bytes_allocated.saturating_sub(self.bytes_allocated),
            bytes_freed: later.bytes_freed.saturating_sub(self.bytes_freed),
        }
    }
}

/// Source of allocator snapshots.
pub trait AllocProbe {
    fn snapshot(&self) -> AllocSnapshot;

    /// False when counts are unavailable and deltas will read zero.
    fn is_live(&self) -> bool {
        true
    }
}

impl<A> AllocProbe for CountingAllocator<A> {
    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocations: self.allocations.load(Ordering::Relaxed),
            zeroed_allocations: self.zeroed_allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            reallocations: self.reallocations.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            bytes_freed: self.bytes_freed.load(Ordering::Relaxed),
        }
    }
}

/// Probe for binaries that did not install a counting allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl AllocProbe for NullProbe {
    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot::default()
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// What one release of a dataset cost.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimDelta {
    pub reclaim_events: u64,
    pub bytes_reclaimed: u64,
    pub pause: Duration,
}

/// Drop `value` between two snapshots and time the drop.
pub fn measure_release<T, P: AllocProbe + ?Sized>(probe: &P, value: T) -> ReclaimDelta {
    let before = probe.snapshot();
    let start = Instant::now();
    drop(value);
    let pause = start.elapsed();
    let d = before.delta(&probe.snapshot());
    ReclaimDelta {
        reclaim_events: d.deallocations,
        bytes_reclaimed: d.bytes_freed,
        pause,
    }
}

/// One allocation-shape iteration: build the dataset, then release it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSample {
    pub build: Duration,
    pub allocation_events: u64,
    pub zeroed_allocation_events: u64,
    pub bytes_allocated: u64,
    pub reclaim: ReclaimDelta,
}

/// Build `n` records in `layout`, release them, and report both halves.
///
/// Contiguous datasets are zero-valued record cells; scattered datasets tag
/// each cell with its index so every element is a distinct heap object.
pub fn run_allocation_shape<P: AllocProbe + ?Sized>(
    probe: &P,
    layout: AllocLayout,
    n: usize,
) -> AllocationSample {
    let before = probe.snapshot();
    let start = Instant::now();
    let (build, after_build, reclaim) = match layout {
        AllocLayout::Contiguous => {
            let ds = std::hint::black_box(dataset::zeroed_cells(n));
            let build = start.elapsed();
            (build, probe.snapshot(), measure_release(probe, ds))
        }
        AllocLayout::Scattered => {
            let ds = std::hint::black_box(dataset::indexed_boxed::<Record>(n));
            let build = start.elapsed();
            (build, probe.snapshot(), measure_release(probe, ds))
        }
    };
    let built = before.delta(&after_build);
    AllocationSample {
        build,
        allocation_events: built.allocations,
        zeroed_allocation_events: built.zeroed_allocations,
        bytes_allocated: built.bytes_allocated,
        reclaim,
    }
}

/// Running totals over many allocation-shape iterations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimTotals {
    pub iterations: u64,
    pub allocation_events: u64,
    pub zeroed_allocation_events: u64,
    pub reclaim_events: u64,
    pub pause: Duration,
}

impl ReclaimTotals {
    pub fn record(&mut self, sample: &AllocationSample) {
        self.iterations = self.iterations.saturating_add(1);
        self.allocation_events = self
            .allocation_events
            .saturating_add(sample.allocation_events);
        self.zeroed_allocation_events = self
            .zeroed_allocation_events
            .saturating_add(sample.zeroed_allocation_events);
        self.reclaim_events = self
            .reclaim_events
            .saturating_add(sample.reclaim.reclaim_events);
        self.pause = self.pause.saturating_add(sample.reclaim.pause);
    }

    #[must_use]
    pub fn mean_allocation_events(&self) -> f64 {
        self.allocation_events as f64 / self.iterations.max(1) as f64
    }

    #[must_use]
    pub fn mean_zeroed_allocation_events(&self) -> f64 {
        self.zeroed_allocation_events as f64 / self.iterations.max(1) as f64
    }

    #[must_use]
    pub fn mean_reclaim_events(&self) -> f64 {
        self.reclaim_events as f64 / self.iterations.max(1) as f64
    }

    /// Mean pause per iteration in milliseconds.
    #[must_use]
    pub fn mean_pause_ms(&self) -> f64 {
        self.pause.as_secs_f64() * 1e3 / self.iterations.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_subtracts_each_counter() {
        let a = AllocSnapshot {
            allocations: 10,
            zeroed_allocations: 2,
            deallocations: 4,
            reallocations: 1,
            bytes_allocated: 1000,
            bytes_freed: 200,
        };
        let b = AllocSnapshot {
            allocations: 15,
            zeroed_allocations: 3,
            deallocations: 9,
            reallocations: 1,
            bytes_allocated: 1600,
            bytes_freed: 900,
        };
        let d = a.delta(&b);
        assert_eq!(d.allocations, 5);
        assert_eq!(d.zeroed_allocations, 1);
        assert_eq!(d.deallocations, 5);
        assert_eq!(d.reallocations, 0);
        assert_eq!(d.bytes_allocated, 600);
        assert_eq!(d.bytes_freed, 700);
    }

    #[test]
    fn delta_saturates_when_counters_go_backwards() {
        let a = AllocSnapshot {
            allocations: 5,
            ..AllocSnapshot::default()
        };
        assert_eq!(a.delta(&AllocSnapshot::default()).allocations, 0);
    }

    #[test]
    fn null_probe_reads_zero_but_still_times() {
        let sample = run_allocation_shape(&NullProbe, AllocLayout::Scattered, 1_000);
        assert_eq!(sample.allocation_events, 0);
        assert_eq!(sample.reclaim.reclaim_events, 0);
        assert!(!NullProbe.is_live());
    }

    #[test]
    fn totals_average_per_iteration() {
        let mut totals = ReclaimTotals::default();
        for events in [10u64, 30] {
            totals.record(&AllocationSample {
                allocation_events: events,
                zeroed_allocation_events: 1,
                reclaim: ReclaimDelta {
                    reclaim_events: events,
                    bytes_reclaimed: 0,
                    pause: Duration::from_millis(2),
                },
                ..AllocationSample::default()
            });
        }
        assert_eq!(totals.iterations, 2);
        assert!((totals.mean_reclaim_events() - 20.0).abs() < f64::EPSILON);
        assert!((totals.mean_allocation_events() - 20.0).abs() < f64::EPSILON);
        assert!((totals.mean_zeroed_allocation_events() - 1.0).abs() < f64::EPSILON);
        assert!((totals.mean_pause_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_totals_do_not_divide_by_zero() {
        let totals = ReclaimTotals::default();
        assert_eq!(totals.mean_reclaim_events(), 0.0);
        assert_eq!(totals.mean_pause_ms(), 0.0);
    }
}

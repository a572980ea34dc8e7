//! Scenario execution engine.
//!
//! Criterion gives the authoritative numbers; this runner exists so a single
//! binary can sweep the catalog, attach allocator deltas, and write reports
//! that are easy to diff between machines.

use std::time::{Duration, Instant};

use memshape_core::alloc_stats::{AllocLayout, AllocProbe, ReclaimTotals, run_allocation_shape};
use memshape_core::filter::{self, CapacityStrategy};
use memshape_core::record::{BigRecord, Payload, Record};
use memshape_core::scenario::{Family, PayloadKind, Scenario, StorageShape, Workload};
use memshape_core::{MemshapeError, ScaleProfile, chain, dataset, traverse};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrobenchConfig {
    pub warmup_iters: u64,
    pub sample_count: usize,
    pub sample_iters: u64,
}

impl MicrobenchConfig {
    /// Defaults sized to each family's per-iteration cost.
    #[must_use]
    pub const fn for_family(family: Family) -> Self {
        match family {
            Family::AllocationShape => Self {
                warmup_iters: 0,
                sample_count: 5,
                sample_iters: 1,
            },
            Family::CapacityPresizing => Self {
                warmup_iters: 1_000,
                sample_count: 25,
                sample_iters: 10_000,
            },
            Family::TraversalLocality => Self {
                warmup_iters: 2,
                sample_count: 15,
                sample_iters: 5,
            },
            Family::CallChain => Self {
                warmup_iters: 1,
                sample_count: 5,
                sample_iters: 1,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub samples: usize,
    pub p50_ns_op: f64,
    pub p95_ns_op: f64,
    pub p99_ns_op: f64,
    pub mean_ns_op: f64,
}

/// Allocator deltas averaged per iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReclaimMetrics {
    pub iterations: u64,
    pub allocation_events: f64,
    /// Allocations served already zero-filled.
    pub zeroed_allocation_events: f64,
    pub reclaim_events: f64,
    pub pause_ms: f64,
    /// False when no counting allocator was installed; event counts read zero.
    pub probe_live: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub family: Family,
    pub workload: Workload,
    pub n: usize,
    pub config: MicrobenchConfig,
    pub latency: LatencyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaim: Option<ReclaimMetrics>,
    /// Mean allocator reallocations per filter call (capacity family, live probe).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reallocations_per_iter: Option<f64>,
    /// Output observed on the last iteration (sum, kept length, or digest).
    pub observed: String,
    pub wall_ms: u64,
}

/// Runs catalog scenarios under one profile and seed.
pub struct ScenarioRunner<'a> {
    pub profile: ScaleProfile,
    pub seed: u64,
    probe: &'a dyn AllocProbe,
    config_override: Option<MicrobenchConfig>,
}

impl<'a> ScenarioRunner<'a> {
    #[must_use]
    pub fn new(profile: ScaleProfile, seed: u64, probe: &'a dyn AllocProbe) -> Self {
        Self {
            profile,
            seed,
            probe,
            config_override: None,
        }
    }

    /// Use `cfg` for every scenario instead of the per-family defaults.
    #[must_use]
    pub fn with_config(mut self, cfg: MicrobenchConfig) -> Self {
        self.config_override = Some(cfg);
        self
    }

    #[must_use]
    pub fn config_for(&self, family: Family) -> MicrobenchConfig {
        self.config_override
            .unwrap_or_else(|| MicrobenchConfig::for_family(family))
    }

    pub fn run(&self, sc: &Scenario) -> Result<ScenarioResult, HarnessError> {
        let started = Instant::now();
        let n = sc.size(self.profile);
        let cfg = self.config_for(sc.family());

        let mut reclaim = None;
        let mut reallocations_per_iter = None;
        let (latency, observed) = match sc.workload {
            Workload::AllocationShape { layout } => {
                let (latency, metrics) = self.bench_allocation(layout, n, cfg);
                reclaim = Some(metrics);
                (latency, format!("n={n}"))
            }
            Workload::CapacityPresizing { strategy } => {
                let (latency, kept, reallocs) = self.bench_filter(strategy, n, cfg);
                reallocations_per_iter = reallocs;
                (latency, format!("kept={kept}"))
            }
            Workload::TraversalLocality { payload, shape } => {
                let (latency, sum) = match payload {
                    PayloadKind::Record => bench_sum::<Record>(shape, n, self.seed, cfg),
                    PayloadKind::BigRecord => bench_sum::<BigRecord>(shape, n, self.seed, cfg),
                };
                (latency, format!("sum={sum}"))
            }
            Workload::CallChain { payload, shape } => {
                let (latency, digest) = match payload {
                    PayloadKind::Record => bench_chain::<Record>(shape, n, self.seed, cfg)?,
                    PayloadKind::BigRecord => bench_chain::<BigRecord>(shape, n, self.seed, cfg)?,
                };
                (latency, format!("blake3={digest}"))
            }
        };

        Ok(ScenarioResult {
            name: sc.name.to_string(),
            family: sc.family(),
            workload: sc.workload,
            n,
            config: cfg,
            latency,
            reclaim,
            reallocations_per_iter,
            observed,
            wall_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn bench_allocation(
        &self,
        layout: AllocLayout,
        n: usize,
        cfg: MicrobenchConfig,
    ) -> (LatencyStats, ReclaimMetrics) {
        for _ in 0..cfg.warmup_iters {
            run_allocation_shape(self.probe, layout, n);
        }

        let mut totals = ReclaimTotals::default();
        let mut samples = Vec::with_capacity(cfg.sample_count);
        let iters = cfg.sample_iters.max(1);
        for _ in 0..cfg.sample_count {
            let mut dur = Duration::ZERO;
            for _ in 0..iters {
                let sample = run_allocation_shape(self.probe, layout, n);
                dur += sample.build + sample.reclaim.pause;
                totals.record(&sample);
            }
            let dur = dur.max(Duration::from_nanos(1));
            samples.push(dur.as_nanos() as f64 / iters as f64);
        }

        let metrics = ReclaimMetrics {
            iterations: totals.iterations,
            allocation_events: totals.mean_allocation_events(),
            zeroed_allocation_events: totals.mean_zeroed_allocation_events(),
            reclaim_events: totals.mean_reclaim_events(),
            pause_ms: totals.mean_pause_ms(),
            probe_live: self.probe.is_live(),
        };
        (stats_from_samples(samples), metrics)
    }

    /// Time the filter and, with a live probe, count reallocations per call.
    fn bench_filter(
        &self,
        strategy: CapacityStrategy,
        n: usize,
        cfg: MicrobenchConfig,
    ) -> (LatencyStats, usize, Option<f64>) {
        let src = filter::source_sequence(n);
        let mut kept = 0;
        let mut calls = 0u64;
        let before = self.probe.snapshot();
        let stats = sample_loop(cfg, || {
            let out = filter::filter_even(std::hint::black_box(&src), strategy);
            kept = out.len();
            calls += 1;
            std::hint::black_box(out);
            Ok(())
        });
        let grown = before.delta(&self.probe.snapshot());
        let reallocs = self
            .probe
            .is_live()
            .then(|| grown.reallocations as f64 / calls.max(1) as f64);
        // The closure never fails.
        (stats.unwrap_or_default(), kept, reallocs)
    }
}

fn bench_sum<T: Payload>(
    shape: StorageShape,
    n: usize,
    seed: u64,
    cfg: MicrobenchConfig,
) -> (LatencyStats, i64) {
    let mut sum = 0i64;
    let stats = match shape {
        StorageShape::Contiguous => {
            let ds = dataset::values::<T>(n, seed);
            sample_loop(cfg, || {
                sum = std::hint::black_box(traverse::sum_values(std::hint::black_box(&ds)));
                Ok(())
            })
        }
        StorageShape::Scattered => {
            let ds = dataset::boxed::<T>(n, seed);
            sample_loop(cfg, || {
                sum = std::hint::black_box(traverse::sum_boxed(std::hint::black_box(&ds)));
                Ok(())
            })
        }
        StorageShape::SliceReference => {
            let ds = dataset::values::<T>(n, seed);
            let ptr = &ds;
            sample_loop(cfg, || {
                sum = std::hint::black_box(traverse::sum_through_ref(std::hint::black_box(ptr)));
                Ok(())
            })
        }
    };
    (stats.unwrap_or_default(), sum)
}

fn bench_chain<T: Payload>(
    shape: StorageShape,
    n: usize,
    seed: u64,
    cfg: MicrobenchConfig,
) -> Result<(LatencyStats, String), MemshapeError> {
    let mut last = String::new();
    let stats = sample_loop(cfg, || {
        last = chain::run_chain::<T>(shape, n, seed)?;
        Ok(())
    })?;
    Ok((stats, chain::fingerprint(&last)))
}

/// Warm up, then collect `sample_count` samples of `sample_iters` calls each.
fn sample_loop<F>(cfg: MicrobenchConfig, mut op: F) -> Result<LatencyStats, MemshapeError>
where
    F: FnMut() -> Result<(), MemshapeError>,
{
    for _ in 0..cfg.warmup_iters {
        op()?;
    }

    let iters = cfg.sample_iters.max(1);
    let mut samples = Vec::with_capacity(cfg.sample_count);
    for _ in 0..cfg.sample_count {
        let start = Instant::now();
        for _ in 0..iters {
            op()?;
        }
        let dur = start.elapsed().max(Duration::from_nanos(1));
        samples.push(dur.as_nanos() as f64 / iters as f64);
    }
    Ok(stats_from_samples(samples))
}

fn stats_from_samples(mut samples: Vec<f64>) -> LatencyStats {
    if samples.is_empty() {
        return LatencyStats::default();
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    LatencyStats {
        samples: samples.len(),
        p50_ns_op: percentile_sorted(&samples, 0.50),
        p95_ns_op: percentile_sorted(&samples, 0.95),
        p99_ns_op: percentile_sorted(&samples, 0.99),
        mean_ns_op: mean,
    }
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&p));
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use memshape_core::alloc_stats::NullProbe;
    use memshape_core::scenario;

    const TINY: MicrobenchConfig = MicrobenchConfig {
        warmup_iters: 1,
        sample_count: 3,
        sample_iters: 2,
    };

    fn runner() -> ScenarioRunner<'static> {
        ScenarioRunner::new(ScaleProfile::Quick, 42, &NullProbe).with_config(TINY)
    }

    #[test]
    fn filter_scenario_reports_kept_count() {
        let sc = scenario::find("FilterWithPresizedCapacity100").unwrap();
        let res = runner().run(sc).unwrap();
        assert_eq!(res.n, 100);
        assert_eq!(res.observed, "kept=50");
        assert_eq!(res.latency.samples, 3);
        assert!(res.reclaim.is_none());
        // No counting allocator behind a null probe.
        assert!(res.reallocations_per_iter.is_none());
        assert_eq!(
            res.workload,
            Workload::CapacityPresizing {
                strategy: CapacityStrategy::Presized
            }
        );
    }

    #[test]
    fn traversal_shapes_observe_same_sum() {
        let r = runner();
        let a = r.run(scenario::find("SumOverValueSlice").unwrap()).unwrap();
        let b = r.run(scenario::find("SumOverReferenceSlice").unwrap()).unwrap();
        let c = r.run(scenario::find("SumOverSliceReference").unwrap()).unwrap();
        assert_eq!(a.observed, b.observed);
        assert_eq!(a.observed, c.observed);
    }

    #[test]
    fn chain_shapes_observe_same_digest() {
        let r = runner();
        let a = r.run(scenario::find("ChainBigValuePayload").unwrap()).unwrap();
        let b = r.run(scenario::find("ChainBigReferencePayload").unwrap()).unwrap();
        assert!(a.observed.starts_with("blake3="));
        assert_eq!(a.observed, b.observed);
    }

    #[test]
    fn allocation_scenario_carries_reclaim_metrics() {
        let sc = scenario::find("HeapScatteredAllocation").unwrap();
        let res = runner().run(sc).unwrap();
        let reclaim = res.reclaim.expect("allocation family reports reclaim");
        assert_eq!(reclaim.iterations, 6);
        assert!(!reclaim.probe_live);
        assert_eq!(res.n, 100_000);
    }

    #[test]
    fn family_defaults_apply_without_override() {
        let r = ScenarioRunner::new(ScaleProfile::Quick, 1, &NullProbe);
        assert_eq!(
            r.config_for(Family::CallChain),
            MicrobenchConfig::for_family(Family::CallChain)
        );
        assert_eq!(runner().config_for(Family::CallChain), TINY);
    }

    #[test]
    fn stats_percentiles_from_sorted_samples() {
        let stats = stats_from_samples(vec![5.0, 1.0, 3.0, 2.0, 4.0]);
        assert_eq!(stats.samples, 5);
        assert_eq!(stats.p50_ns_op, 3.0);
        assert_eq!(stats.p99_ns_op, 5.0);
        assert!((stats.mean_ns_op - 3.0).abs() < f64::EPSILON);
        assert_eq!(stats_from_samples(Vec::new()), LatencyStats::default());
    }
}

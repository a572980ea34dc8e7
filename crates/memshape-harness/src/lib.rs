//! Scenario runner and reporting for memshape.
//!
//! This crate provides:
//! - Runner: warmup + sampled microbench per scenario, with allocator deltas
//!   for the allocation-shape family
//! - Structured log: JSONL event records with a line validator
//! - Report: JSON + Markdown run reports and a SHA-256 artifact index
//! - Verify: runtime checks of dataset, filter, sum and serialization properties

#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use report::{ArtifactIndex, RunReport};
pub use runner::{MicrobenchConfig, ScenarioResult, ScenarioRunner};
pub use verify::{PropertyCheck, verify_properties};

/// Guidance printed when the harness binary runs without a subcommand.
#[must_use]
pub fn usage_guidance() -> &'static str {
    "memshape: memory-layout micro-benchmarks\n\
     \n\
     Run the criterion benches:\n\
     \x20 cargo bench -p memshape-bench\n\
     \x20 cargo bench -p memshape-bench --bench traversal_bench\n\
     \n\
     Smoke sizes (sizes / 100): MEMSHAPE_PROFILE=quick cargo bench -p memshape-bench\n\
     Fixed payload seed:        MEMSHAPE_SEED=0x1234 cargo bench -p memshape-bench\n\
     \n\
     Profiling:\n\
     \x20 cargo bench -p memshape-bench --bench chain_bench -- --profile-time 10\n\
     \x20 perf record -g target/release/deps/traversal_bench-* --bench --profile-time 10\n\
     \n\
     Harness subcommands: list, run, verify (see --help)."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_mentions_bench_and_profiling() {
        let text = usage_guidance();
        assert!(text.contains("cargo bench -p memshape-bench"));
        assert!(text.contains("--profile-time"));
        assert!(text.contains("MEMSHAPE_PROFILE"));
    }
}

//! Run reports: machine-readable JSON, Markdown tables, artifact index.

use std::fmt::Write as _;
use std::path::Path;

use memshape_core::scenario::Family;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;
use crate::runner::ScenarioResult;
use crate::structured_log::now_utc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub generated_utc: String,
    pub profile: String,
    pub seed: u64,
    /// Whether allocator counters were live for this run.
    pub probe_live: bool,
    pub results: Vec<ScenarioResult>,
    pub notes: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn new(run_id: impl Into<String>, profile: &str, seed: u64, probe_live: bool) -> Self {
        let mut notes = vec![String::from(
            "Numbers depend on the machine; compare shapes within one run, not across hosts.",
        )];
        if !probe_live {
            notes.push(String::from(
                "Allocator counters were not installed; event and reallocation columns read zero.",
            ));
        }
        Self {
            run_id: run_id.into(),
            generated_utc: now_utc(),
            profile: profile.to_string(),
            seed,
            probe_live,
            results: Vec::new(),
            notes,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

pub fn render_markdown(report: &RunReport) -> String {
    let mut out = String::new();

    writeln!(out, "# memshape Run Report").ok();
    writeln!(out).ok();
    writeln!(
        out,
        "- Run: `{}` profile={} seed=0x{:X}",
        report.run_id, report.profile, report.seed
    )
    .ok();
    writeln!(out, "- Generated: {}", report.generated_utc).ok();
    writeln!(out).ok();

    for family in Family::ALL {
        let rows: Vec<&ScenarioResult> = report
            .results
            .iter()
            .filter(|r| r.family == family)
            .collect();
        if rows.is_empty() {
            continue;
        }

        writeln!(out, "## {}", family.label()).ok();
        writeln!(out).ok();

        // The first row of a family is the baseline for the delta column.
        let base = rows[0].latency.p50_ns_op;
        if family == Family::AllocationShape {
            writeln!(
                out,
                "| Scenario | n | p50 ns/iter | delta | allocs | zeroed | reclaims | pause ms |"
            )
            .ok();
            writeln!(
                out,
                "|----------|--:|------------:|------:|-------:|-------:|---------:|---------:|"
            )
            .ok();
            for r in &rows {
                let m = r.reclaim.clone().unwrap_or_default();
                writeln!(
                    out,
                    "| {} | {} | {:.1} | {} | {:.1} | {:.1} | {:.1} | {:.3} |",
                    r.name,
                    r.n,
                    r.latency.p50_ns_op,
                    pct_delta(base, r.latency.p50_ns_op),
                    m.allocation_events,
                    m.zeroed_allocation_events,
                    m.reclaim_events,
                    m.pause_ms
                )
                .ok();
            }
        } else if family == Family::CapacityPresizing {
            writeln!(
                out,
                "| Scenario | n | p50 ns/iter | p95 ns/iter | delta | reallocs/iter | observed |"
            )
            .ok();
            writeln!(
                out,
                "|----------|--:|------------:|------------:|------:|--------------:|----------|"
            )
            .ok();
            for r in &rows {
                let reallocs = r
                    .reallocations_per_iter
                    .map_or_else(|| String::from("-"), |v| format!("{v:.1}"));
                writeln!(
                    out,
                    "| {} | {} | {:.1} | {:.1} | {} | {reallocs} | `{}` |",
                    r.name,
                    r.n,
                    r.latency.p50_ns_op,
                    r.latency.p95_ns_op,
                    pct_delta(base, r.latency.p50_ns_op),
                    r.observed
                )
                .ok();
            }
        } else {
            writeln!(
                out,
                "| Scenario | n | p50 ns/iter | p95 ns/iter | mean ns/iter | delta | observed |"
            )
            .ok();
            writeln!(
                out,
                "|----------|--:|------------:|------------:|-------------:|------:|----------|"
            )
            .ok();
            for r in &rows {
                writeln!(
                    out,
                    "| {} | {} | {:.1} | {:.1} | {:.1} | {} | `{}` |",
                    r.name,
                    r.n,
                    r.latency.p50_ns_op,
                    r.latency.p95_ns_op,
                    r.latency.mean_ns_op,
                    pct_delta(base, r.latency.p50_ns_op),
                    r.observed
                )
                .ok();
            }
        }
        writeln!(out).ok();
    }

    writeln!(out, "## Notes").ok();
    for note in &report.notes {
        writeln!(out, "- {note}").ok();
    }

    out
}

fn pct_delta(base: f64, current: f64) -> String {
    if base <= 0.0 {
        return String::from("n/a");
    }
    let pct = ((current - base) / base) * 100.0;
    format!("{pct:+.2}%")
}

// ---------------------------------------------------------------------------
// Artifact index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub kind: String,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Written files from one run, each with its SHA-256.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub index_version: u32,
    pub run_id: String,
    pub generated_utc: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Hash `path` and record it under `kind`.
    pub fn add_file(&mut self, path: &Path, kind: impl Into<String>) -> std::io::Result<&mut Self> {
        let bytes = std::fs::read(path)?;
        self.artifacts.push(ArtifactEntry {
            path: path.display().to_string(),
            kind: kind.into(),
            sha256: sha256_hex(&bytes),
            size_bytes: bytes.len() as u64,
        });
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        write!(out, "{b:02x}").ok();
    }
    out
}

/// Paths written by [`write_report_bundle`].
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub json: std::path::PathBuf,
    pub markdown: std::path::PathBuf,
    pub index: std::path::PathBuf,
}

/// Write `report.json`, `report.md` and `artifacts.json` into `dir`.
///
/// `extra` files (such as the JSONL log) are hashed into the index too.
pub fn write_report_bundle(
    dir: &Path,
    report: &RunReport,
    extra: &[(&Path, &str)],
) -> Result<ReportBundle, HarnessError> {
    std::fs::create_dir_all(dir)?;
    let json = dir.join("report.json");
    let markdown = dir.join("report.md");
    let index_path = dir.join("artifacts.json");

    std::fs::write(&json, report.to_json()?)?;
    std::fs::write(&markdown, render_markdown(report))?;

    let mut index = ArtifactIndex::new(report.run_id.clone());
    index.add_file(&json, "report_json")?;
    index.add_file(&markdown, "report_markdown")?;
    for (path, kind) in extra {
        index.add_file(path, *kind)?;
    }
    std::fs::write(&index_path, index.to_json()?)?;

    Ok(ReportBundle {
        json,
        markdown,
        index: index_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{LatencyStats, MicrobenchConfig, ReclaimMetrics};
    use memshape_core::filter::CapacityStrategy;
    use memshape_core::scenario::{PayloadKind, StorageShape, Workload};

    fn result(name: &str, family: Family, p50: f64) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            family,
            workload: Workload::TraversalLocality {
                payload: PayloadKind::Record,
                shape: StorageShape::Contiguous,
            },
            n: 1_000,
            config: MicrobenchConfig::for_family(family),
            latency: LatencyStats {
                samples: 3,
                p50_ns_op: p50,
                p95_ns_op: p50,
                p99_ns_op: p50,
                mean_ns_op: p50,
            },
            reclaim: None,
            reallocations_per_iter: None,
            observed: String::from("sum=1"),
            wall_ms: 1,
        }
    }

    #[test]
    fn markdown_groups_by_family_with_deltas() {
        let mut report = RunReport::new("r1", "quick", 0x10, true);
        report
            .results
            .push(result("SumOverValueSlice", Family::TraversalLocality, 100.0));
        report
            .results
            .push(result("SumOverReferenceSlice", Family::TraversalLocality, 250.0));
        let md = render_markdown(&report);
        assert!(md.contains("## traversal_locality"));
        assert!(md.contains("+150.00%"));
        assert!(md.contains("+0.00%"));
        assert!(!md.contains("## call_chain"));
    }

    #[test]
    fn allocation_rows_show_reclaim_columns() {
        let mut r = result("HeapScatteredAllocation", Family::AllocationShape, 10.0);
        r.reclaim = Some(ReclaimMetrics {
            iterations: 5,
            allocation_events: 1001.0,
            zeroed_allocation_events: 0.0,
            reclaim_events: 1001.0,
            pause_ms: 1.5,
            probe_live: true,
        });
        let mut report = RunReport::new("r2", "full", 1, true);
        report.results.push(r);
        let md = render_markdown(&report);
        assert!(md.contains("| reclaims |"));
        assert!(md.contains("| 1001.0 | 0.0 | 1001.0 | 1.500 |"));
    }

    #[test]
    fn capacity_rows_show_reallocations() {
        let mut grow = result("FilterWithDefaultCapacity100", Family::CapacityPresizing, 80.0);
        grow.workload = Workload::CapacityPresizing {
            strategy: CapacityStrategy::Growable,
        };
        grow.reallocations_per_iter = Some(4.0);
        let pre = result("FilterWithPresizedCapacity100", Family::CapacityPresizing, 40.0);
        let mut report = RunReport::new("r4", "quick", 1, true);
        report.results.push(pre);
        report.results.push(grow);
        let md = render_markdown(&report);
        assert!(md.contains("reallocs/iter"));
        assert!(md.contains("| +100.00% | 4.0 |"));
        assert!(md.contains("| +0.00% | - |"));
    }

    #[test]
    fn missing_counters_note_lands_under_notes() {
        let md = render_markdown(&RunReport::new("r5", "quick", 1, false));
        let notes = md.find("## Notes").unwrap();
        let warning = md.find("Allocator counters were not installed").unwrap();
        assert!(warning > notes);

        let live = render_markdown(&RunReport::new("r6", "quick", 1, true));
        assert!(!live.contains("Allocator counters were not installed"));
    }

    #[test]
    fn report_json_round_trips() {
        let mut report = RunReport::new("r3", "quick", 7, false);
        report
            .results
            .push(result("ChainValuePayload", Family::CallChain, 5.0));
        let back = RunReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(back.results.len(), 1);
        assert_eq!(back.results[0].name, "ChainValuePayload");
        assert!(!back.probe_live);
    }

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn pct_delta_handles_zero_base() {
        assert_eq!(pct_delta(0.0, 5.0), "n/a");
        assert_eq!(pct_delta(200.0, 100.0), "-50.00%");
    }
}

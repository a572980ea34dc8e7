//! CLI entrypoint for the memshape harness.

// `#[global_allocator]` expands to allocator shims.
#![allow(unsafe_code)]

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use memshape_core::alloc_stats::AllocProbe;
use memshape_core::config::parse_seed;
use memshape_core::scenario::{self, CATALOG, Family, Scenario};
use memshape_core::{CountingAllocator, MemshapeError, ScaleProfile, payload_seed, scale_profile};
use memshape_harness::report::{RunReport, write_report_bundle};
use memshape_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use memshape_harness::{HarnessError, MicrobenchConfig, ScenarioRunner, verify_properties};

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator::system();

/// Memory-layout micro-benchmark harness.
#[derive(Debug, Parser)]
#[command(name = "memshape-harness")]
#[command(about = "Run, list and verify memshape benchmark scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every scenario with its resolved dataset size.
    List {
        /// Size profile (`full` or `quick`); defaults to MEMSHAPE_PROFILE.
        #[arg(long, value_parser = parse_profile)]
        profile: Option<ScaleProfile>,
    },
    /// Run scenarios and write JSON/Markdown reports plus a JSONL log.
    Run {
        /// Scenario name (repeatable). Runs the whole catalog when omitted.
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
        /// Restrict to one family (`allocation_shape`, `capacity_presizing`,
        /// `traversal_locality`, `call_chain`).
        #[arg(long)]
        family: Option<String>,
        /// Size profile (`full` or `quick`); defaults to MEMSHAPE_PROFILE.
        #[arg(long, value_parser = parse_profile)]
        profile: Option<ScaleProfile>,
        /// Payload seed (decimal or 0x...); defaults to MEMSHAPE_SEED.
        #[arg(long, value_parser = parse_seed_arg)]
        seed: Option<u64>,
        /// Warmup iterations (overrides per-family defaults together with
        /// --samples and --iters).
        #[arg(long)]
        warmup: Option<u64>,
        /// Sample count.
        #[arg(long)]
        samples: Option<usize>,
        /// Iterations per sample.
        #[arg(long)]
        iters: Option<u64>,
        /// Output directory for report.json, report.md, run.log.jsonl, artifacts.json.
        #[arg(long, default_value = "target/memshape")]
        output_dir: PathBuf,
    },
    /// Check dataset, filter, sum and serialization properties.
    Verify {
        /// Dataset size for the checks.
        #[arg(long, default_value_t = 10_000)]
        size: usize,
        /// Payload seed (decimal or 0x...); defaults to MEMSHAPE_SEED.
        #[arg(long, value_parser = parse_seed_arg)]
        seed: Option<u64>,
    },
}

fn parse_profile(raw: &str) -> Result<ScaleProfile, String> {
    ScaleProfile::parse(raw).map_err(|e| e.to_string())
}

fn parse_seed_arg(raw: &str) -> Result<u64, String> {
    parse_seed(raw).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        None => {
            println!("{}", memshape_harness::usage_guidance());
            Ok(())
        }
        Some(Command::List { profile }) => {
            list(profile.unwrap_or_else(scale_profile));
            Ok(())
        }
        Some(Command::Run {
            scenarios,
            family,
            profile,
            seed,
            warmup,
            samples,
            iters,
            output_dir,
        }) => {
            let cfg = match (warmup, samples, iters) {
                (None, None, None) => None,
                (w, s, i) => Some(MicrobenchConfig {
                    warmup_iters: w.unwrap_or(1),
                    sample_count: s.unwrap_or(5),
                    sample_iters: i.unwrap_or(1),
                }),
            };
            run(RunArgs {
                scenarios,
                family,
                profile: profile.unwrap_or_else(scale_profile),
                seed: seed.unwrap_or_else(payload_seed),
                config: cfg,
                output_dir,
            })
        }
        Some(Command::Verify { size, seed }) => verify(size, seed.unwrap_or_else(payload_seed)),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn list(profile: ScaleProfile) {
    println!("{:<32} {:<20} {:>12}", "SCENARIO", "FAMILY", "N");
    for sc in CATALOG {
        println!(
            "{:<32} {:<20} {:>12}",
            sc.name,
            sc.family().label(),
            sc.size(profile)
        );
    }
}

struct RunArgs {
    scenarios: Vec<String>,
    family: Option<String>,
    profile: ScaleProfile,
    seed: u64,
    config: Option<MicrobenchConfig>,
    output_dir: PathBuf,
}

fn select(names: &[String], family: Option<&str>) -> Result<Vec<&'static Scenario>, HarnessError> {
    let mut selected: Vec<&'static Scenario> = if names.is_empty() {
        CATALOG.iter().collect()
    } else {
        names
            .iter()
            .map(|n| scenario::find(n))
            .collect::<Result<_, _>>()?
    };
    if let Some(raw) = family {
        let fam = Family::from_str_loose(raw)
            .ok_or_else(|| MemshapeError::UnknownFamily(raw.to_string()))?;
        selected.retain(|s| s.family() == fam);
    }
    if selected.is_empty() {
        return Err(HarnessError::NothingSelected);
    }
    Ok(selected)
}

fn run(args: RunArgs) -> Result<(), HarnessError> {
    let selected = select(&args.scenarios, args.family.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let run_id = format!(
        "{}-{}",
        args.profile.label(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    );
    let log_path = args.output_dir.join("run.log.jsonl");
    let mut log = LogEmitter::to_file(&log_path, &run_id)?;
    log.emit_entry(
        LogEntry::new("", LogLevel::Info, "run_start")
            .with_profile(args.profile.label())
            .with_details(serde_json::json!({
                "seed": args.seed,
                "scenarios": selected.len(),
                "probe_live": ALLOC.is_live(),
            })),
    )?;

    let mut runner = ScenarioRunner::new(args.profile, args.seed, &ALLOC);
    if let Some(cfg) = args.config {
        runner = runner.with_config(cfg);
    }

    let mut report = RunReport::new(
        run_id.clone(),
        args.profile.label(),
        args.seed,
        ALLOC.is_live(),
    );
    let started = Instant::now();
    for sc in selected {
        eprintln!("running {} (n={})", sc.name, sc.size(args.profile));
        match runner.run(sc) {
            Ok(res) => {
                let mut entry = LogEntry::new("", LogLevel::Info, "scenario_done")
                    .with_scenario(sc.name, sc.family().label())
                    .with_profile(args.profile.label())
                    .with_outcome(Outcome::Pass)
                    .with_latency_ns(res.latency.p50_ns_op.round() as u64)
                    .with_duration_ms(res.wall_ms);
                if let Some(m) = &res.reclaim {
                    entry = entry.with_details(serde_json::json!({
                        "allocation_events": m.allocation_events,
                        "zeroed_allocation_events": m.zeroed_allocation_events,
                        "reclaim_events": m.reclaim_events,
                        "pause_ms": m.pause_ms,
                    }));
                } else if let Some(reallocs) = res.reallocations_per_iter {
                    entry = entry.with_details(serde_json::json!({
                        "reallocations_per_iter": reallocs,
                    }));
                }
                log.emit_entry(entry)?;
                println!(
                    "{:<32} p50={:>14.1} ns/iter  {}",
                    res.name, res.latency.p50_ns_op, res.observed
                );
                report.results.push(res);
            }
            Err(err) => {
                log.emit_entry(
                    LogEntry::new("", LogLevel::Error, "scenario_failed")
                        .with_scenario(sc.name, sc.family().label())
                        .with_outcome(Outcome::Error)
                        .with_details(serde_json::json!({ "error": err.to_string() })),
                )?;
                log.flush()?;
                return Err(err);
            }
        }
    }

    log.emit_entry(
        LogEntry::new("", LogLevel::Info, "run_done")
            .with_profile(args.profile.label())
            .with_duration_ms(started.elapsed().as_millis() as u64),
    )?;
    log.flush()?;
    drop(log);

    let bundle = write_report_bundle(
        &args.output_dir,
        &report,
        &[(log_path.as_path(), "log_jsonl")],
    )?;
    println!("report: {}", bundle.markdown.display());
    println!("index:  {}", bundle.index.display());
    Ok(())
}

fn verify(size: usize, seed: u64) -> Result<(), HarnessError> {
    let checks = verify_properties(size, seed);
    let total = checks.len();
    let mut failed = 0;
    for check in &checks {
        let mark = if check.passed { "PASS" } else { "FAIL" };
        println!("{mark} {:<36} {}", check.name, check.detail);
        if !check.passed {
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(HarnessError::Verification { failed, total });
    }
    Ok(())
}

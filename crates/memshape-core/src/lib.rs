//! Datasets and operations for memory-layout micro-benchmarks.
//!
//! This crate provides:
//! - [`record`]: the fixed-shape `Record` and `BigRecord` payloads
//! - [`dataset`]: contiguous (`Vec<T>`) and heap-scattered (`Vec<Box<T>>`) builders
//! - [`filter`]: even-value filtering with and without a pre-sized result
//! - [`traverse`]: field summation over the three storage shapes
//! - [`chain`]: produce -> pass -> serialize call chains
//! - [`alloc_stats`]: a counting global allocator standing in for collector statistics
//! - [`scenario`]: the named scenario catalog shared by benches and the harness

pub mod alloc_stats;
pub mod chain;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod record;
pub mod rng;
pub mod scenario;
pub mod traverse;

pub use alloc_stats::{AllocLayout, AllocSnapshot, CountingAllocator, ReclaimDelta};
pub use config::{ScaleProfile, payload_seed, scale_profile};
pub use error::MemshapeError;
pub use record::{BigRecord, Payload, Record};
pub use scenario::{Family, PayloadKind, Scenario, StorageShape, Workload};

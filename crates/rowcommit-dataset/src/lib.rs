//! Dataset side of rowcommit: rows in, leaf pre-images and batches out.
//!
//! This crate provides small building blocks that know nothing about trees:
//!
//! - `format`: the `Row` / `CleanDataset` envelope.
//! - `canonical`: the deterministic row encoding every leaf hashes.
//! - `partition`: slicing `[0, rows)` into sequential `BatchRange`s.
//! - `sanitize`: CSV column filtering, cleaned-file writing and fingerprinting.
//! - `generator`: a deterministic synthetic dataset for tests/benches.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `rowcommit_dataset::partition::partition_rows`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Deterministic row canonicalization and leaf hashing.
pub mod canonical;
/// Row and dataset envelope.
pub mod format;
/// Deterministic synthetic dataset generator (for tests/benches/CLI).
pub mod generator;
/// Contiguous batch partitioning.
pub mod partition;
/// CSV sanitizer and cleaned-file loader.
pub mod sanitize;

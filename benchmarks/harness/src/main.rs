//! rowcommit-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> sanitize+build -> verify)
//! and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run --release -p rowcommit-bench-harness -- --profile benchmarks/profiles/small.toml
//!   cargo run --release -p rowcommit-bench-harness -- --profile benchmarks/profiles/large.toml

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use rowcommit_core::{ArtifactFormat, CanonicalEncoding};
use rowcommit_dataset::generator::write_synthetic_csv;
use rowcommit_pipeline::build::bundle_path;
use rowcommit_pipeline::{build_from_csv, verify_row, CancelFlag, PipelineConfig};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Profile {
    /// Synthetic data rows
    rows: usize,
    /// Rows per batch
    batch_size: usize,
    /// Generator seed
    #[serde(default = "default_seed")]
    seed: u64,
    /// Repetitions of the whole pipeline
    repeats: u32,
    /// Build batches on the rayon pool
    #[serde(default = "default_parallel")]
    parallel: bool,
    /// Leaf pre-image encoding
    #[serde(default)]
    encoding: CanonicalEncoding,
}

const fn default_seed() -> u64 {
    42
}

const fn default_parallel() -> bool {
    true
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "benchmarks/profiles/small.toml"));
    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    println!(
        "Profile: rows={}, batch_size={}, seed={}, repeats={}, parallel={}, encoding={:?}",
        profile.rows, profile.batch_size, profile.seed, profile.repeats, profile.parallel, profile.encoding
    );

    let cfg = PipelineConfig {
        parallel: profile.parallel,
        encoding: profile.encoding,
        ..PipelineConfig::default().with_batch_size(profile.batch_size)
    };
    cfg.validate()?;

    fs::create_dir_all("benchmarks/reports").context("create benchmarks/reports")?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .with_context(|| format!("open report {}", csv_path.display()))?;
    writeln!(csv, "timestamp,rows,batch_size,parallel,repeat,stage,ms,extra")?;

    for rep in 0..profile.repeats {
        let work = tempfile::tempdir().context("create work directory")?;
        let raw = work.path().join("raw.csv");
        let out = work.path().join("out");
        let row_prefix = format!(
            "{ts},{},{},{},{rep}",
            profile.rows, profile.batch_size, profile.parallel
        );

        // 1) generate
        let t0 = Instant::now();
        write_synthetic_csv(&raw, profile.rows, profile.seed.wrapping_add(u64::from(rep)))?;
        writeln!(csv, "{row_prefix},gen,{},", dur_ms(t0.elapsed()))?;

        // 2) sanitize + build + commit
        let t0 = Instant::now();
        let index = build_from_csv(&raw, &cfg, &out, &CancelFlag::new())?;
        writeln!(
            csv,
            "{row_prefix},build,{},batches={}",
            dur_ms(t0.elapsed()),
            index.batches.len()
        )?;

        // 3) verify first and last row of every batch
        let t0 = Instant::now();
        let mut checked = 0usize;
        for b in &index.batches {
            let path = bundle_path(&out, b.batch_id, ArtifactFormat::Json);
            for offset in [0, b.leaf_count - 1] {
                anyhow::ensure!(
                    verify_row(&path, offset)?.ok,
                    "batch {} row {offset} failed to verify",
                    b.batch_id
                );
                checked += 1;
            }
        }
        writeln!(csv, "{row_prefix},verify,{},rows={checked}", dur_ms(t0.elapsed()))?;
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}

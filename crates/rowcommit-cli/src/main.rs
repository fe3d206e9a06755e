// crates/rowcommit-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rowcommit_core::io::read_bundle_auto;
use rowcommit_core::{ArtifactFormat, CanonicalEncoding, Digest};
use rowcommit_dataset::generator::write_synthetic_csv;
use rowcommit_dataset::sanitize::sanitize_csv;
use rowcommit_pipeline::build::{CLEAN_CSV_FILE, INDEX_FILE, META_FILE, PROOFS_DIR};
use rowcommit_pipeline::{
    build_from_csv, check_bundle, find_bundle, verify_row, verify_row_against_anchor, CancelFlag,
    JsonAnchorStore, PipelineConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "rowcommit",
    about = "Commit tabular datasets to per-batch Merkle roots",
    long_about = "Commit tabular datasets to per-batch Merkle roots.\n\nSanitize a CSV, build per-batch SHA-256 Merkle trees with inclusion proofs, and verify single rows against bundle or anchored roots.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write a deterministic synthetic supply-chain CSV.
    Simulate {
        /// Number of data rows (>0)
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        rows: u64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path
        #[arg(long, default_value = "data/synthetic.csv")]
        out: PathBuf,
    },

    /// Drop denylisted columns and fingerprint the cleaned CSV
    Sanitize {
        /// Raw input CSV
        #[arg(long)]
        csv: PathBuf,

        /// Output directory for the cleaned CSV and meta.json
        #[arg(long, default_value = "artifacts/clean")]
        out: PathBuf,

        /// Optional pipeline config (TOML); its drop_columns are used
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Sanitize, partition, commit every batch and write proof bundles
    Build {
        /// Raw input CSV
        #[arg(long)]
        csv: PathBuf,

        /// Output directory (replaced atomically on success)
        #[arg(long, default_value = "artifacts")]
        out: PathBuf,

        /// Optional pipeline config (TOML); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rows per batch (>0)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        batch_size: Option<u64>,

        /// Leaf pre-image encoding
        #[arg(long, value_enum)]
        encoding: Option<EncodingOpt>,

        /// Proof bundle encoding
        #[arg(long, value_enum)]
        format: Option<FormatOpt>,

        /// Build batches one after another
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },

    /// Verify one row's inclusion proof; prints {ok, root, leaf}
    Verify {
        /// Build output directory or its proofs/ sub-directory
        #[arg(long, default_value = "artifacts/proofs")]
        proofs: PathBuf,

        /// Batch id
        #[arg(long)]
        batch: usize,

        /// Row offset inside the batch
        #[arg(long)]
        row: usize,

        /// Anchors file; when given, the anchored root is the trusted root
        #[arg(long)]
        anchors: Option<PathBuf>,
    },

    /// Rebuild a bundle's tree from its leaves and check every stored proof
    Check {
        /// Proof bundle (JSON/CBOR)
        #[arg(long)]
        bundle: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum EncodingOpt {
    /// `h1=v1|h2=v2|...`
    Delimited,
    /// Little-endian u64 length prefixes
    LengthPrefixed,
}

impl From<EncodingOpt> for CanonicalEncoding {
    fn from(e: EncodingOpt) -> Self {
        match e {
            EncodingOpt::Delimited => Self::Delimited,
            EncodingOpt::LengthPrefixed => Self::LengthPrefixed,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum FormatOpt {
    Json,
    Cbor,
}

impl From<FormatOpt> for ArtifactFormat {
    fn from(f: FormatOpt) -> Self {
        match f {
            FormatOpt::Json => Self::Json,
            FormatOpt::Cbor => Self::Cbor,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate { rows, seed, out } => simulate(rows, seed, &out),

        Cmd::Sanitize { csv, out, config } => sanitize(&csv, &out, config.as_deref()),

        Cmd::Build {
            csv,
            out,
            config,
            batch_size,
            encoding,
            format,
            sequential,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(n) = batch_size {
                cfg.batch_size = usize::try_from(n).context("--batch-size does not fit usize")?;
            }
            if let Some(e) = encoding {
                cfg.encoding = e.into();
            }
            if let Some(f) = format {
                cfg.format = f.into();
            }
            if sequential {
                cfg.parallel = false;
            }
            build(&csv, &out, &cfg)
        }

        Cmd::Verify {
            proofs,
            batch,
            row,
            anchors,
        } => verify(&proofs, batch, row, anchors.as_deref()),

        Cmd::Check { bundle } => check(&bundle),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    path.map_or_else(|| Ok(PipelineConfig::default()), PipelineConfig::load)
}

fn simulate(rows: u64, seed: u64, out: &Path) -> Result<()> {
    let n = usize::try_from(rows).context("--rows does not fit usize")?;
    info!(rows = n, seed, out = %out.display(), "generating synthetic dataset");
    write_synthetic_csv(out, n, seed)?;
    println!("Wrote {n} rows → {}", out.display());
    Ok(())
}

fn sanitize(csv: &Path, out: &Path, config: Option<&Path>) -> Result<()> {
    let cfg = load_config(config)?;
    let report = sanitize_csv(
        csv,
        &out.join(CLEAN_CSV_FILE),
        &out.join(META_FILE),
        &cfg.drop_columns,
    )?;
    println!("Clean CSV: {}", out.join(CLEAN_CSV_FILE).display());
    println!("Rows: {}", report.row_count);
    println!("File hash (cleaned): {}", report.file_hash);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildSummary<'a> {
    file_hash: Digest,
    rows: usize,
    batches: usize,
    index: PathBuf,
    proofs: PathBuf,
    roots: Vec<&'a Digest>,
}

fn build(csv: &Path, out: &Path, cfg: &PipelineConfig) -> Result<()> {
    info!(csv = %csv.display(), out = %out.display(), "building dataset commitment");
    let index = build_from_csv(csv, cfg, out, &CancelFlag::new())?;

    let summary = BuildSummary {
        file_hash: index.file_hash,
        rows: index.total_rows(),
        batches: index.batches.len(),
        index: out.join(INDEX_FILE),
        proofs: out.join(PROOFS_DIR),
        roots: index.batches.iter().map(|b| &b.root).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn verify(proofs: &Path, batch: usize, row: usize, anchors: Option<&Path>) -> Result<()> {
    let bundle = find_bundle(proofs, batch)?;
    info!(bundle = %bundle.display(), row, anchored = anchors.is_some(), "verifying row");

    let res = match anchors {
        Some(path) => verify_row_against_anchor(&bundle, row, &JsonAnchorStore::open(path)?)?,
        None => verify_row(&bundle, row)?,
    };
    println!("{}", serde_json::to_string_pretty(&res)?);
    Ok(())
}

fn check(bundle: &Path) -> Result<()> {
    let b = read_bundle_auto(bundle)?;
    let report = check_bundle(&b).with_context(|| format!("check {}", bundle.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_ok() {
        bail!("bundle {} is inconsistent", bundle.display());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from([
            "rowcommit",
            "build",
            "--csv",
            "in.csv",
            "--batch-size",
            "4",
            "--encoding",
            "length-prefixed",
            "--format",
            "cbor",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        match cli.cmd {
            Cmd::Build {
                batch_size,
                encoding,
                format,
                sequential,
                ..
            } => {
                assert_eq!(batch_size, Some(4));
                assert_eq!(encoding, Some(EncodingOpt::LengthPrefixed));
                assert_eq!(format, Some(FormatOpt::Cbor));
                assert!(!sequential);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(Cli::try_parse_from(["rowcommit", "build", "--csv", "x", "--batch-size", "0"]).is_err());
    }
}

//! Batch build driver.
//!
//! Order of work for one run:
//! 1. partition rows into batches;
//! 2. per batch: canonicalize and hash rows, build the tree, record the root,
//!    generate every inclusion proof;
//! 3. persist one proof bundle per batch and the dataset index.
//!
//! Artifacts are written into a staging directory next to the output and
//! moved into place with a directory rename once everything succeeded, so a
//! failed or cancelled run never disturbs the previous output.
//!
//! Output layout:
//! ```text
//! <out>/batches.json            dataset index
//! <out>/proofs/batch_<id>.json  proof bundle (or .cbor)
//! <out>/clean/cleaned.csv       sanitized input (build_from_csv only)
//! <out>/clean/meta.json         sanitizer report (build_from_csv only)
//! ```

use crate::cancel::CancelFlag;
use crate::config::PipelineConfig;
use anyhow::{bail, Context, Result};
use rowcommit_core::io::{write_auto, write_json};
use rowcommit_core::{
    ArtifactFormat, BatchMeta, BatchRange, CanonicalEncoding, CommitError, CommitResult,
    DatasetIndex, Digest, ProofBundle, ProofEntry,
};
use rowcommit_dataset::canonical::leaf_for_row;
use rowcommit_dataset::format::CleanDataset;
use rowcommit_dataset::partition::partition_rows;
use rowcommit_dataset::sanitize::{load_clean_csv, sanitize_csv};
use rowcommit_merkle::MerkleTree;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Dataset index file name inside the output directory.
pub const INDEX_FILE: &str = "batches.json";
/// Sub-directory holding one proof bundle per batch.
pub const PROOFS_DIR: &str = "proofs";
/// Sub-directory holding the sanitized CSV and its report.
pub const CLEAN_DIR: &str = "clean";
/// Cleaned CSV file name inside [`CLEAN_DIR`].
pub const CLEAN_CSV_FILE: &str = "cleaned.csv";
/// Sanitizer report file name inside [`CLEAN_DIR`].
pub const META_FILE: &str = "meta.json";

/// `batch_<id>.<ext>`
#[must_use]
pub fn bundle_file_name(batch_id: usize, format: ArtifactFormat) -> String {
    format!("batch_{batch_id}.{}", format.extension())
}

/// Where the bundle for `batch_id` lands under an output directory.
#[must_use]
pub fn bundle_path(out_dir: &Path, batch_id: usize, format: ArtifactFormat) -> PathBuf {
    out_dir.join(PROOFS_DIR).join(bundle_file_name(batch_id, format))
}

/// Build the proof bundle for one batch.
///
/// Leaf `i` of the bundle is the hash of row `range.start_row + i`.
pub fn build_batch(
    dataset: &CleanDataset,
    range: BatchRange,
    encoding: CanonicalEncoding,
) -> CommitResult<ProofBundle> {
    let rows = dataset
        .rows
        .get(range.rows())
        .ok_or(CommitError::IndexOutOfRange {
            index: range.end_row.saturating_sub(1),
            leaf_count: dataset.len(),
        })?;

    let leaves: Vec<Digest> = rows
        .iter()
        .map(|r| leaf_for_row(r, &dataset.headers, encoding))
        .collect();
    let tree = MerkleTree::from_leaves(&leaves)?;
    let batch = BatchMeta::new(range, tree.root());

    let proofs = tree
        .all_proofs()
        .into_iter()
        .zip(&leaves)
        .enumerate()
        .map(|(idx, (proof, leaf))| ProofEntry { idx, leaf: *leaf, proof })
        .collect();

    Ok(ProofBundle {
        batch,
        file_hash: dataset.file_hash,
        headers: dataset.headers.clone(),
        leaves,
        proofs,
    })
}

/// Build every batch in memory, ordered by batch id.
///
/// The cancel flag is consulted before each batch starts; the first batch
/// that observes it fails the whole run with [`CommitError::Cancelled`].
pub fn build_bundles(
    dataset: &CleanDataset,
    config: &PipelineConfig,
    cancel: &CancelFlag,
) -> CommitResult<Vec<ProofBundle>> {
    config.validate()?;
    let ranges = partition_rows(dataset.len(), config.batch_size)?;

    let one = |range: BatchRange| {
        if cancel.is_cancelled() {
            return Err(CommitError::Cancelled(range.batch_id));
        }
        build_batch(dataset, range, config.encoding)
    };

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return ranges.into_par_iter().map(one).collect();
        }
    }
    ranges.into_iter().map(one).collect()
}

/// Dataset index summarizing already-built bundles.
#[must_use]
pub fn index_for(
    dataset: &CleanDataset,
    config: &PipelineConfig,
    bundles: &[ProofBundle],
) -> DatasetIndex {
    DatasetIndex {
        file_hash: dataset.file_hash,
        headers: dataset.headers.clone(),
        batch_size: config.batch_size,
        encoding: config.encoding,
        batches: bundles.iter().map(|b| b.batch.clone()).collect(),
    }
}

/// Build all batches of `dataset` and commit them under `out_dir`.
pub fn build_batches(
    dataset: &CleanDataset,
    config: &PipelineConfig,
    out_dir: &Path,
    cancel: &CancelFlag,
) -> Result<DatasetIndex> {
    let t0 = Instant::now();
    info!(
        rows = dataset.len(),
        batch_size = config.batch_size,
        encoding = ?config.encoding,
        parallel = config.parallel,
        "building batches"
    );

    ensure_replaceable(out_dir)?;
    let bundles = build_bundles(dataset, config, cancel)?;
    let index = index_for(dataset, config, &bundles);
    commit_dir(out_dir, |staging| {
        write_artifacts(staging, &index, &bundles, config.format)
    })?;

    info!(
        batches = index.batches.len(),
        out = %out_dir.display(),
        ms = t0.elapsed().as_millis(),
        "committed batches"
    );
    Ok(index)
}

/// Sanitize `raw_csv`, then build and commit all batches under `out_dir`.
///
/// The cleaned CSV and sanitizer report are committed alongside the proofs.
pub fn build_from_csv(
    raw_csv: &Path,
    config: &PipelineConfig,
    out_dir: &Path,
    cancel: &CancelFlag,
) -> Result<DatasetIndex> {
    config.validate()?;
    ensure_replaceable(out_dir)?;
    let work = tempfile::tempdir().context("create sanitize work directory")?;
    let clean_csv = work.path().join(CLEAN_CSV_FILE);
    let meta = work.path().join(META_FILE);

    let report = sanitize_csv(raw_csv, &clean_csv, &meta, &config.drop_columns)?;
    let dataset = load_clean_csv(&clean_csv)?;
    debug!(rows = report.row_count, file_hash = %report.file_hash, "loaded cleaned dataset");

    let t0 = Instant::now();
    let bundles = build_bundles(&dataset, config, cancel)?;
    let index = index_for(&dataset, config, &bundles);
    commit_dir(out_dir, |staging| {
        write_artifacts(staging, &index, &bundles, config.format)?;
        let clean_dir = staging.join(CLEAN_DIR);
        fs::create_dir_all(&clean_dir)
            .with_context(|| format!("create {}", clean_dir.display()))?;
        fs::copy(&clean_csv, clean_dir.join(CLEAN_CSV_FILE)).context("stage cleaned CSV")?;
        fs::copy(&meta, clean_dir.join(META_FILE)).context("stage sanitizer report")?;
        Ok(())
    })?;

    info!(
        rows = index.total_rows(),
        batches = index.batches.len(),
        file_hash = %index.file_hash,
        out = %out_dir.display(),
        ms = t0.elapsed().as_millis(),
        "built dataset commitment"
    );
    Ok(index)
}

fn write_artifacts(
    dir: &Path,
    index: &DatasetIndex,
    bundles: &[ProofBundle],
    format: ArtifactFormat,
) -> Result<()> {
    for b in bundles {
        write_auto(bundle_path(dir, b.batch.batch_id, format), b)
            .with_context(|| format!("write proof bundle for batch {}", b.batch.batch_id))?;
    }
    write_json(dir.join(INDEX_FILE), index).context("write dataset index")
}

/// Refuse to replace anything but a missing or empty directory or a previous
/// build output (one holding [`INDEX_FILE`]).
pub fn ensure_replaceable(out_dir: &Path) -> Result<()> {
    if !out_dir.exists() {
        return Ok(());
    }
    if !out_dir.is_dir() {
        bail!("output path {} exists and is not a directory", out_dir.display());
    }
    if out_dir.join(INDEX_FILE).is_file() {
        return Ok(());
    }
    let mut entries = fs::read_dir(out_dir)
        .with_context(|| format!("read output directory {}", out_dir.display()))?;
    if entries.next().is_some() {
        bail!(
            "refusing to replace {}: it is not empty and holds no {INDEX_FILE} from a previous build",
            out_dir.display()
        );
    }
    Ok(())
}

/// Populate a fresh staging directory via `fill`, then swap it in for `out_dir`.
fn commit_dir<F>(out_dir: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    ensure_replaceable(out_dir)?;
    let parent = match out_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("creating parent directory {}", parent.display()))?;

    // Both temp dirs live beside the output so the renames stay on one filesystem.
    let staging = tempfile::Builder::new()
        .prefix(".rowcommit-staging-")
        .tempdir_in(&parent)
        .with_context(|| format!("create staging directory in {}", parent.display()))?;
    fill(staging.path())?;

    let retired = tempfile::Builder::new()
        .prefix(".rowcommit-previous-")
        .tempdir_in(&parent)
        .with_context(|| format!("create retirement directory in {}", parent.display()))?;
    let previous = retired.path().join("output");
    let had_previous = out_dir.exists();
    if had_previous {
        fs::rename(out_dir, &previous)
            .with_context(|| format!("move aside previous output {}", out_dir.display()))?;
    }

    if let Err(e) = fs::rename(staging.path(), out_dir) {
        if had_previous {
            if let Err(restore) = fs::rename(&previous, out_dir) {
                warn!(error = %restore, out = %out_dir.display(), "could not restore previous output");
            }
        }
        return Err(e).with_context(|| format!("commit output {}", out_dir.display()));
    }
    debug!(out = %out_dir.display(), replaced = had_previous, "output committed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcommit_crypto::sha256;
    use rowcommit_merkle::verify_proof;

    fn dataset(n: usize) -> CleanDataset {
        CleanDataset {
            headers: vec!["id".to_owned(), "v".to_owned()],
            rows: (0..n)
                .map(|i| CleanDataset::row([("id", i.to_string()), ("v", format!("value {i}"))]))
                .collect(),
            file_hash: sha256(b"fixture"),
        }
    }

    #[test]
    fn bundle_proofs_verify_against_batch_root() {
        let ds = dataset(7);
        let b = build_batch(&ds, BatchRange { batch_id: 1, start_row: 4, end_row: 7 }, CanonicalEncoding::Delimited)
            .unwrap();
        assert_eq!(b.batch.leaf_count, 3);
        assert_eq!(b.leaves.len(), 3);
        assert_eq!(b.file_hash, ds.file_hash);
        for (i, e) in b.proofs.iter().enumerate() {
            assert_eq!(e.idx, i);
            assert!(verify_proof(&e.leaf, &e.proof, &b.batch.root));
        }
    }

    #[test]
    fn range_past_the_end_is_rejected() {
        let ds = dataset(3);
        let err = build_batch(&ds, BatchRange { batch_id: 0, start_row: 0, end_row: 4 }, CanonicalEncoding::Delimited)
            .unwrap_err();
        assert!(matches!(err, CommitError::IndexOutOfRange { .. }));
    }

    #[test]
    fn sequential_and_parallel_builds_agree() {
        let ds = dataset(50);
        let cfg = PipelineConfig::default().with_batch_size(8);
        let seq = PipelineConfig { parallel: false, ..cfg.clone() };
        let cancel = CancelFlag::new();
        assert_eq!(
            build_bundles(&ds, &cfg, &cancel).unwrap(),
            build_bundles(&ds, &seq, &cancel).unwrap()
        );
    }

    #[test]
    fn raised_flag_cancels_before_any_batch() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let cfg = PipelineConfig { parallel: false, ..PipelineConfig::default().with_batch_size(2) };
        assert_eq!(build_bundles(&dataset(5), &cfg, &cancel), Err(CommitError::Cancelled(0)));
    }

    #[test]
    fn encoding_changes_roots() {
        let ds = dataset(4);
        let r = BatchRange { batch_id: 0, start_row: 0, end_row: 4 };
        let a = build_batch(&ds, r, CanonicalEncoding::Delimited).unwrap();
        let b = build_batch(&ds, r, CanonicalEncoding::LengthPrefixed).unwrap();
        assert_ne!(a.batch.root, b.batch.root);
    }
}

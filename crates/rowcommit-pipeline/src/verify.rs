//! Row verification and bundle consistency checks over persisted artifacts.

use crate::anchor::AnchorStore;
use crate::build::{bundle_file_name, PROOFS_DIR};
use anyhow::{bail, Context, Result};
use rowcommit_core::io::read_bundle_auto;
use rowcommit_core::{ArtifactFormat, CommitError, CommitResult, Digest, ProofBundle};
use rowcommit_merkle::{verify_proof, MerkleTree};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of checking one row's inclusion proof.
///
/// `ok == false` is a normal answer, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RowVerification {
    /// Whether the proof folds to `root`.
    pub ok: bool,
    /// Root the proof was checked against.
    pub root: Digest,
    /// Leaf recorded for the row.
    pub leaf: Digest,
}

/// Check the entry at `offset` of `bundle` against `root`.
pub fn verify_entry(
    bundle: &ProofBundle,
    offset: usize,
    root: &Digest,
) -> CommitResult<RowVerification> {
    let entry = bundle.entry(offset)?;
    Ok(RowVerification {
        ok: verify_proof(&entry.leaf, &entry.proof, root),
        root: *root,
        leaf: entry.leaf,
    })
}

/// Locate the bundle for `batch_id` under either an output directory or its
/// `proofs/` sub-directory, in JSON or CBOR.
pub fn find_bundle(dir: &Path, batch_id: usize) -> Result<PathBuf> {
    for base in [dir.join(PROOFS_DIR), dir.to_path_buf()] {
        for format in [ArtifactFormat::Json, ArtifactFormat::Cbor] {
            let p = base.join(bundle_file_name(batch_id, format));
            if p.is_file() {
                return Ok(p);
            }
        }
    }
    bail!(
        "proof bundle for batch {batch_id} not found under {}; run build first",
        dir.display()
    )
}

/// Load a bundle and verify row `offset` against the bundle's own root.
pub fn verify_row(bundle_path: &Path, offset: usize) -> Result<RowVerification> {
    let bundle = read_bundle_auto(bundle_path)?;
    let res = verify_entry(&bundle, offset, &bundle.batch.root)
        .with_context(|| format!("verify row in {}", bundle_path.display()))?;
    debug!(batch = bundle.batch.batch_id, offset, ok = res.ok, "verified row");
    Ok(res)
}

/// Load a bundle and verify row `offset` against the anchored root of its
/// batch.
pub fn verify_row_against_anchor(
    bundle_path: &Path,
    offset: usize,
    anchors: &dyn AnchorStore,
) -> Result<RowVerification> {
    let bundle = read_bundle_auto(bundle_path)?;
    let batch_id = bundle.batch.batch_id;
    let anchor = anchors
        .anchor(batch_id)
        .ok_or(CommitError::AnchorNotFound(batch_id))?;

    if anchor.file_hash != bundle.file_hash {
        warn!(
            batch = batch_id,
            anchored = %anchor.file_hash,
            bundle = %bundle.file_hash,
            "anchored file hash differs from bundle"
        );
    }
    if anchor.start_row != bundle.batch.start_row || anchor.end_row != bundle.batch.end_row {
        warn!(batch = batch_id, "anchored row range differs from bundle");
    }

    let res = verify_entry(&bundle, offset, &anchor.merkle_root)
        .with_context(|| format!("verify row in {}", bundle_path.display()))?;
    debug!(batch = batch_id, offset, ok = res.ok, "verified row against anchor");
    Ok(res)
}

/// Result of re-deriving a bundle from its own leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleCheck {
    /// Batch the bundle claims to cover.
    pub batch_id: usize,
    /// Rebuilt root equals the recorded root.
    pub root_matches: bool,
    /// Leaves, proof entries, `leafCount` and the row range all agree, and
    /// the entries cover each offset `0..n` exactly once.
    pub counts_match: bool,
    /// Offsets whose entry does not match its leaf or does not verify.
    pub failed_proofs: Vec<usize>,
}

impl BundleCheck {
    /// Everything checked out.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.root_matches && self.counts_match && self.failed_proofs.is_empty()
    }
}

/// Rebuild the tree from `bundle.leaves` and check root, counts and every proof.
pub fn check_bundle(bundle: &ProofBundle) -> CommitResult<BundleCheck> {
    let tree = MerkleTree::from_leaves(&bundle.leaves)?;
    let meta = &bundle.batch;
    let n = bundle.leaves.len();

    let failed_proofs = bundle
        .proofs
        .iter()
        .filter(|e| {
            bundle.leaves.get(e.idx) != Some(&e.leaf)
                || !verify_proof(&e.leaf, &e.proof, &meta.root)
        })
        .map(|e| e.idx)
        .collect();

    let mut seen = vec![false; n];
    let offsets_complete = bundle.proofs.iter().all(|e| match seen.get_mut(e.idx) {
        Some(s) if !*s => {
            *s = true;
            true
        }
        _ => false,
    });

    Ok(BundleCheck {
        batch_id: meta.batch_id,
        root_matches: tree.root() == meta.root,
        counts_match: meta.leaf_count == n
            && meta.end_row.checked_sub(meta.start_row) == Some(n)
            && bundle.proofs.len() == n
            && offsets_complete,
        failed_proofs,
    })
}

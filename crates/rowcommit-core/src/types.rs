//! Wire types shared across the workspace: proof steps, batch metadata,
//! per-batch proof bundles, the dataset index, and anchor records.
//!
//! Field names serialize in camelCase (`batchId`, `isLeftSibling`, …) so the
//! files stay readable by verifiers that were written against the same layout
//! in other languages.
//!
//! ## Compatibility
//! - No `#[serde(deny_unknown_fields)]`: newer producers may add fields.
//! - New fields must be optional with `#[serde(default)]`.

use crate::digest::Digest;
use crate::error::{CommitError, CommitResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One step of an inclusion proof, leaf level first.
///
/// The variant says on which side the *sibling* sits, i.e. how the verifier
/// must order the concatenation at this level:
/// - `Left(s)`: `parent = H(s || acc)`
/// - `Right(s)`: `parent = H(acc || s)`
///
/// On the wire this is `{ "sibling": "0x…", "isLeftSibling": bool }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireStep", into = "WireStep")]
pub enum ProofStep {
    /// Sibling is the left child; the running node is on the right.
    Left(Digest),
    /// Sibling is the right child (or a duplicate of the running node).
    Right(Digest),
}

impl ProofStep {
    /// Build from the wire pair.
    #[inline]
    #[must_use]
    pub const fn from_parts(sibling: Digest, is_left_sibling: bool) -> Self {
        if is_left_sibling {
            Self::Left(sibling)
        } else {
            Self::Right(sibling)
        }
    }

    /// The sibling digest regardless of side.
    #[inline]
    #[must_use]
    pub const fn sibling(&self) -> &Digest {
        match self {
            Self::Left(d) | Self::Right(d) => d,
        }
    }

    /// Whether the sibling sits to the left of the running node.
    #[inline]
    #[must_use]
    pub const fn is_left_sibling(&self) -> bool {
        matches!(self, Self::Left(_))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStep {
    sibling: Digest,
    is_left_sibling: bool,
}

impl From<WireStep> for ProofStep {
    fn from(w: WireStep) -> Self {
        Self::from_parts(w.sibling, w.is_left_sibling)
    }
}

impl From<ProofStep> for WireStep {
    fn from(s: ProofStep) -> Self {
        Self {
            sibling: *s.sibling(),
            is_left_sibling: s.is_left_sibling(),
        }
    }
}

/// Ordered proof, leaf level to (excluding) the root level.
pub type Proof = Vec<ProofStep>;

/// Half-open row range `[start_row, end_row)` committed under one root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRange {
    /// Sequential id, starting at 0.
    pub batch_id: usize,
    /// First row (inclusive, 0-based).
    pub start_row: usize,
    /// One past the last row (exclusive).
    pub end_row: usize,
}

impl BatchRange {
    /// Number of rows (= leaves) in the batch.
    #[inline]
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.end_row - self.start_row
    }

    /// The rows as a `Range` for slicing.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    /// Whether the global row index falls inside this batch.
    #[inline]
    #[must_use]
    pub const fn contains(&self, row: usize) -> bool {
        self.start_row <= row && row < self.end_row
    }
}

/// Batch metadata recorded once the batch root exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    /// Sequential id, starting at 0.
    pub batch_id: usize,
    /// First row (inclusive).
    pub start_row: usize,
    /// One past the last row.
    pub end_row: usize,
    /// `end_row - start_row`.
    pub leaf_count: usize,
    /// Merkle root over the batch leaves in row order.
    pub root: Digest,
}

impl BatchMeta {
    /// Attach a root to a range.
    #[must_use]
    pub const fn new(range: BatchRange, root: Digest) -> Self {
        Self {
            batch_id: range.batch_id,
            start_row: range.start_row,
            end_row: range.end_row,
            leaf_count: range.leaf_count(),
            root,
        }
    }

    /// The covered row range.
    #[must_use]
    pub const fn range(&self) -> BatchRange {
        BatchRange {
            batch_id: self.batch_id,
            start_row: self.start_row,
            end_row: self.end_row,
        }
    }
}

/// One row's inclusion proof inside a bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEntry {
    /// Row offset inside the batch (0-based).
    pub idx: usize,
    /// Leaf digest of the row.
    pub leaf: Digest,
    /// Path from the leaf to the batch root.
    pub proof: Proof,
}

/// Per-batch persisted record (`proofs/batch_<id>.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    /// Range + root of this batch.
    pub batch: BatchMeta,
    /// SHA-256 of the cleaned dataset file.
    pub file_hash: Digest,
    /// Header list used for canonicalization.
    pub headers: Vec<String>,
    /// Leaf digests in row order.
    pub leaves: Vec<Digest>,
    /// One entry per row in the batch, ordered by `idx`.
    pub proofs: Vec<ProofEntry>,
}

impl ProofBundle {
    /// Look up the entry for an in-batch row offset.
    ///
    /// Entries are normally stored at their own offset; a linear scan is the
    /// fallback for hand-edited or reordered files.
    pub fn entry(&self, offset: usize) -> CommitResult<&ProofEntry> {
        self.proofs
            .get(offset)
            .filter(|e| e.idx == offset)
            .or_else(|| self.proofs.iter().find(|e| e.idx == offset))
            .ok_or(CommitError::ProofEntryNotFound {
                batch_id: self.batch.batch_id,
                offset,
            })
    }
}

/// Pre-image rule used to turn a row into leaf bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalEncoding {
    /// `header=value` pairs joined by `|` (unescaped).
    #[default]
    Delimited,
    /// Little-endian `u64` length prefixes before every header and value.
    LengthPrefixed,
}

/// Per-run dataset index (`batches.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetIndex {
    /// SHA-256 of the cleaned dataset file.
    pub file_hash: Digest,
    /// Header list used for canonicalization.
    pub headers: Vec<String>,
    /// Batch size the run was partitioned with.
    pub batch_size: usize,
    /// Leaf pre-image rule; older files without the field are `delimited`.
    #[serde(default)]
    pub encoding: CanonicalEncoding,
    /// All batches, ordered by id.
    pub batches: Vec<BatchMeta>,
}

impl DatasetIndex {
    /// Metadata of one batch.
    #[must_use]
    pub fn batch(&self, batch_id: usize) -> Option<&BatchMeta> {
        self.batches
            .get(batch_id)
            .filter(|b| b.batch_id == batch_id)
            .or_else(|| self.batches.iter().find(|b| b.batch_id == batch_id))
    }

    /// Batch that holds a global row index.
    #[must_use]
    pub fn batch_for_row(&self, row: usize) -> Option<&BatchMeta> {
        self.batches.iter().find(|b| b.range().contains(row))
    }

    /// Total rows covered by the index.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(|b| b.leaf_count).sum()
    }
}

/// Externally anchored, read-only record for one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    /// Batch id the record is keyed by.
    pub batch_id: usize,
    /// Dataset file hash at anchoring time.
    pub file_hash: Digest,
    /// First row (inclusive).
    pub start_row: usize,
    /// One past the last row.
    pub end_row: usize,
    /// Trusted root for the batch.
    pub merkle_root: Digest,
    /// Anchoring time (seconds since the Unix epoch).
    #[serde(default)]
    pub anchored_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(b: u8) -> Digest {
        Digest::new([b; 32])
    }

    #[test]
    fn proof_step_wire_shape() {
        let step = ProofStep::Left(d(2));
        let v = serde_json::to_value(step).unwrap();
        assert_eq!(v, json!({ "sibling": d(2).to_hex(), "isLeftSibling": true }));

        let back: ProofStep = serde_json::from_value(json!({
            "sibling": d(3).to_hex(),
            "isLeftSibling": false
        }))
        .unwrap();
        assert_eq!(back, ProofStep::Right(d(3)));
    }

    #[test]
    fn batch_meta_camel_case() {
        let meta = BatchMeta::new(BatchRange { batch_id: 1, start_row: 4, end_row: 7 }, d(9));
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["batchId"], 1);
        assert_eq!(v["startRow"], 4);
        assert_eq!(v["endRow"], 7);
        assert_eq!(v["leafCount"], 3);
    }

    #[test]
    fn bundle_entry_lookup() {
        let bundle = ProofBundle {
            batch: BatchMeta::new(BatchRange { batch_id: 2, start_row: 0, end_row: 2 }, d(0)),
            file_hash: d(1),
            headers: vec!["a".into()],
            leaves: vec![d(5), d(6)],
            proofs: vec![
                ProofEntry { idx: 1, leaf: d(6), proof: vec![ProofStep::Left(d(5))] },
                ProofEntry { idx: 0, leaf: d(5), proof: vec![ProofStep::Right(d(6))] },
            ],
        };
        assert_eq!(bundle.entry(0).unwrap().leaf, d(5));
        assert_eq!(bundle.entry(1).unwrap().leaf, d(6));
        assert_eq!(
            bundle.entry(2).unwrap_err(),
            CommitError::ProofEntryNotFound { batch_id: 2, offset: 2 }
        );
    }

    #[test]
    fn index_without_encoding_defaults_to_delimited() {
        let v = json!({
            "fileHash": d(1).to_hex(),
            "headers": ["id"],
            "batchSize": 4,
            "batches": []
        });
        let idx: DatasetIndex = serde_json::from_value(v).unwrap();
        assert_eq!(idx.encoding, CanonicalEncoding::Delimited);
        assert_eq!(idx.total_rows(), 0);
    }
}

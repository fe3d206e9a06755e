//! Read-only access to anchored batch roots.
//!
//! Anchors are written by an external registry; this side only looks up the
//! `merkleRoot` recorded for a batch and uses it as the trusted root.

use anyhow::{bail, Context, Result};
use rowcommit_core::io::read_json;
use rowcommit_core::{AnchorRecord, DatasetIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Lookup of the anchor recorded for a batch.
pub trait AnchorStore {
    /// The record anchored for `batch_id`, if any.
    fn anchor(&self, batch_id: usize) -> Option<AnchorRecord>;
}

/// Anchors held in memory, keyed by batch id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryAnchorStore {
    records: BTreeMap<usize, AnchorRecord>,
}

impl MemoryAnchorStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its batch; returns the replaced one.
    pub fn insert(&mut self, record: AnchorRecord) -> Option<AnchorRecord> {
        self.records.insert(record.batch_id, record)
    }

    /// Number of anchored batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is anchored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AnchorRecord> for MemoryAnchorStore {
    fn from_iter<I: IntoIterator<Item = AnchorRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.batch_id, r)).collect(),
        }
    }
}

impl AnchorStore for MemoryAnchorStore {
    fn anchor(&self, batch_id: usize) -> Option<AnchorRecord> {
        self.records.get(&batch_id).cloned()
    }
}

/// On-disk shape of an anchors file: `{"anchors": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorFile {
    /// One record per anchored batch.
    pub anchors: Vec<AnchorRecord>,
}

impl AnchorFile {
    /// The records a registry would hold after anchoring every batch of `index`.
    #[must_use]
    pub fn from_index(index: &DatasetIndex, anchored_at: u64) -> Self {
        Self {
            anchors: index
                .batches
                .iter()
                .map(|b| AnchorRecord {
                    batch_id: b.batch_id,
                    file_hash: index.file_hash,
                    start_row: b.start_row,
                    end_row: b.end_row,
                    merkle_root: b.root,
                    anchored_at,
                })
                .collect(),
        }
    }
}

/// Anchors loaded once from a JSON anchors file.
#[derive(Clone, Debug)]
pub struct JsonAnchorStore {
    path: PathBuf,
    inner: MemoryAnchorStore,
}

impl JsonAnchorStore {
    /// Load `path`; a batch anchored twice is rejected.
    pub fn open(path: &Path) -> Result<Self> {
        let file: AnchorFile =
            read_json(path).with_context(|| format!("load anchors {}", path.display()))?;
        let mut inner = MemoryAnchorStore::new();
        for record in file.anchors {
            let id = record.batch_id;
            if inner.insert(record).is_some() {
                bail!("duplicate anchor for batch {id} in {}", path.display());
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// File the anchors were read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnchorStore for JsonAnchorStore {
    fn anchor(&self, batch_id: usize) -> Option<AnchorRecord> {
        self.inner.anchor(batch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcommit_core::io::write_json;
    use rowcommit_core::{BatchMeta, BatchRange, Digest};

    fn index() -> DatasetIndex {
        DatasetIndex {
            file_hash: Digest::new([9; 32]),
            headers: vec!["id".to_owned()],
            batch_size: 4,
            encoding: rowcommit_core::CanonicalEncoding::Delimited,
            batches: vec![
                BatchMeta::new(BatchRange { batch_id: 0, start_row: 0, end_row: 4 }, Digest::new([1; 32])),
                BatchMeta::new(BatchRange { batch_id: 1, start_row: 4, end_row: 7 }, Digest::new([2; 32])),
            ],
        }
    }

    #[test]
    fn memory_store_lookup() {
        let store: MemoryAnchorStore = AnchorFile::from_index(&index(), 1_700_000_000).anchors.into_iter().collect();
        assert_eq!(store.len(), 2);
        assert_eq!(store.anchor(1).unwrap().merkle_root, Digest::new([2; 32]));
        assert!(store.anchor(2).is_none());
    }

    #[test]
    fn json_store_roundtrip_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        write_json(&path, &AnchorFile::from_index(&index(), 5)).unwrap();
        let store = JsonAnchorStore::open(&path).unwrap();
        assert_eq!(store.anchor(0).unwrap().end_row, 4);
        assert_eq!(store.anchor(0).unwrap().anchored_at, 5);

        let mut dup = AnchorFile::from_index(&index(), 5);
        dup.anchors.push(dup.anchors[0].clone());
        write_json(&path, &dup).unwrap();
        assert!(JsonAnchorStore::open(&path).is_err());
    }
}

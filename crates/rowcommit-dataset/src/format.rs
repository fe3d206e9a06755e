// crates/rowcommit-dataset/src/format.rs

//! In-memory dataset envelope handed from the sanitizer to the pipeline.

use rowcommit_core::Digest;
use std::collections::BTreeMap;

/// One record: field name → raw string value.
///
/// A row may omit headers (they canonicalize as empty) or carry extra fields
/// (ignored by canonicalization).
pub type Row = BTreeMap<String, String>;

/// Cleaned dataset: ordered rows, the header list used for canonicalization,
/// and the SHA-256 of the cleaned file the rows were read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanDataset {
    /// Header list after column filtering, in source order.
    pub headers: Vec<String>,
    /// Rows in file order; the position is the global row index.
    pub rows: Vec<Row>,
    /// Fingerprint of the cleaned file.
    pub file_hash: Digest,
}

impl CleanDataset {
    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a row from `(field, value)` pairs.
    #[must_use]
    pub fn row<K, V, I>(pairs: I) -> Row
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }
}

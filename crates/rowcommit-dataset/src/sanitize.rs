//! CSV sanitizer: drop denylisted columns, write a cleaned CSV, fingerprint it.
//!
//! The cleaned file, not the raw input, is what the commitment refers to:
//! its SHA-256 becomes the dataset `fileHash` recorded in every bundle.
//! Records are streamed from input to output; only the header list is held.

use crate::format::{CleanDataset, Row};
use anyhow::{Context, Result};
use rowcommit_core::Digest;
use rowcommit_crypto::hash_file;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Columns removed unless the caller supplies its own denylist: direct
/// identifiers that should never reach a published commitment.
pub const DEFAULT_DROP_COLUMNS: &[&str] = &["Customer Email", "Customer Password", "Customer Street"];

/// The default denylist as an owned set.
#[must_use]
pub fn default_denylist() -> BTreeSet<String> {
    DEFAULT_DROP_COLUMNS.iter().map(|s| (*s).to_owned()).collect()
}

/// Summary written next to the cleaned CSV (`meta.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeReport {
    /// Retained headers, in source order.
    pub headers: Vec<String>,
    /// Data rows written.
    pub row_count: usize,
    /// The denylist that was applied.
    pub dropped_columns: Vec<String>,
    /// SHA-256 of the cleaned CSV bytes.
    pub file_hash: Digest,
}

fn lenient_reader() -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(true).flexible(true).trim(csv::Trim::None);
    b
}

/// Distinct header names in first-occurrence order, each paired with the
/// column its value is read from. A repeated name keeps its first position
/// but takes the value of its last column, as keyed-record CSV readers do.
fn unique_headers(record: &csv::StringRecord) -> Vec<(usize, String)> {
    let mut columns: Vec<(usize, String)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for (i, h) in record.iter().enumerate() {
        if let Some(&slot) = slots.get(h) {
            columns[slot].0 = i;
        } else {
            slots.insert(h, columns.len());
            columns.push((i, h.to_owned()));
        }
    }
    columns
}

/// Read `input`, drop `denylist` columns, write the cleaned CSV and its meta.
///
/// Ragged records are accepted: missing cells become empty strings and
/// surplus cells are ignored.
pub fn sanitize_csv(
    input: &Path,
    out_csv: &Path,
    out_meta: &Path,
    denylist: &BTreeSet<String>,
) -> Result<SanitizeReport> {
    let mut rdr = lenient_reader()
        .from_path(input)
        .with_context(|| format!("open CSV {}", input.display()))?;

    let source_headers = rdr
        .headers()
        .with_context(|| format!("read CSV header of {}", input.display()))?
        .clone();
    let kept: Vec<(usize, String)> = unique_headers(&source_headers)
        .into_iter()
        .filter(|(_, h)| !denylist.contains(h))
        .collect();
    let headers: Vec<String> = kept.iter().map(|(_, h)| h.clone()).collect();
    debug!(
        source = source_headers.len(),
        kept = headers.len(),
        "filtered header list"
    );

    if let Some(dir) = out_csv.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating parent directory {}", dir.display()))?;
    }
    let mut w = csv::Writer::from_path(out_csv)
        .with_context(|| format!("create cleaned CSV {}", out_csv.display()))?;
    w.write_record(&headers).context("write cleaned CSV header")?;

    let mut row_count = 0usize;
    let mut record = csv::StringRecord::new();
    while rdr
        .read_record(&mut record)
        .with_context(|| format!("read CSV record {} of {}", row_count + 1, input.display()))?
    {
        w.write_record(kept.iter().map(|(i, _)| record.get(*i).unwrap_or("")))
            .with_context(|| format!("write cleaned record {}", row_count + 1))?;
        row_count += 1;
    }
    w.flush().context("flush cleaned CSV")?;
    drop(w);

    let file_hash = hash_file(out_csv)?;
    let report = SanitizeReport {
        headers,
        row_count,
        dropped_columns: denylist.iter().cloned().collect(),
        file_hash,
    };
    rowcommit_core::io::write_json(out_meta, &report)
        .with_context(|| format!("write sanitize meta {}", out_meta.display()))?;

    info!(
        rows = row_count,
        columns = report.headers.len(),
        file_hash = %file_hash,
        out = %out_csv.display(),
        "sanitized CSV"
    );
    Ok(report)
}

/// Load a cleaned CSV back into headers, rows and its file fingerprint.
pub fn load_clean_csv(path: &Path) -> Result<CleanDataset> {
    let mut rdr = lenient_reader()
        .from_path(path)
        .with_context(|| format!("open cleaned CSV {}", path.display()))?;
    let columns = unique_headers(
        rdr.headers()
            .with_context(|| format!("read header of {}", path.display()))?,
    );

    let mut rows = Vec::new();
    for (n, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("read record {} of {}", n + 1, path.display()))?;
        let row: Row = columns
            .iter()
            .filter_map(|(i, h)| rec.get(*i).map(|v| (h.clone(), v.to_owned())))
            .collect();
        rows.push(row);
    }

    let file_hash = hash_file(path)?;
    Ok(CleanDataset {
        headers: columns.into_iter().map(|(_, h)| h).collect(),
        rows,
        file_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_denylist_has_identifiers() {
        let d = default_denylist();
        assert!(d.contains("Customer Email"));
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn duplicate_headers_keep_first_position_and_last_value() {
        let rec = csv::StringRecord::from(vec!["a", "b", "a", "c"]);
        let u = unique_headers(&rec);
        assert_eq!(
            u,
            vec![(2, "a".to_owned()), (1, "b".to_owned()), (3, "c".to_owned())]
        );
    }
}

//! Sanitize a raw CSV on disk, then load the cleaned file back.

#![allow(clippy::unwrap_used)]

use rowcommit_core::{CanonicalEncoding, Digest};
use rowcommit_crypto::sha256;
use rowcommit_dataset::canonical::{canonicalize_row, leaf_for_row};
use rowcommit_dataset::generator::{write_synthetic_csv, SYNTHETIC_HEADERS};
use rowcommit_dataset::sanitize::{default_denylist, load_clean_csv, sanitize_csv, SanitizeReport};
use std::collections::BTreeSet;
use std::fs;

#[test]
fn drops_denylisted_columns_and_fingerprints_cleaned_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let clean = dir.path().join("out/clean.csv");
    let meta = dir.path().join("out/meta.json");
    write_synthetic_csv(&raw, 25, 42).unwrap();

    let report = sanitize_csv(&raw, &clean, &meta, &default_denylist()).unwrap();
    assert_eq!(report.row_count, 25);
    assert_eq!(report.headers.len(), SYNTHETIC_HEADERS.len() - 3);
    for h in ["Customer Email", "Customer Password", "Customer Street"] {
        assert!(!report.headers.iter().any(|x| x == h), "{h} kept");
    }

    let bytes = fs::read(&clean).unwrap();
    assert_eq!(report.file_hash, sha256(&bytes));

    let on_disk: SanitizeReport = serde_json::from_slice(&fs::read(&meta).unwrap()).unwrap();
    assert_eq!(on_disk, report);

    let ds = load_clean_csv(&clean).unwrap();
    assert_eq!(ds.headers, report.headers);
    assert_eq!(ds.len(), 25);
    assert_eq!(ds.file_hash, report.file_hash);
    assert!(ds.rows.iter().all(|r| !r.contains_key("Customer Email")));
}

#[test]
fn ragged_rows_fill_missing_cells_with_empty_values() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let clean = dir.path().join("clean.csv");
    fs::write(&raw, "id,name,city\n1,Alice\n2,Bob,Lyon,extra\n").unwrap();

    let report = sanitize_csv(&raw, &clean, &dir.path().join("meta.json"), &BTreeSet::new()).unwrap();
    assert_eq!(report.row_count, 2);
    assert_eq!(fs::read_to_string(&clean).unwrap(), "id,name,city\n1,Alice,\n2,Bob,Lyon\n");

    let ds = load_clean_csv(&clean).unwrap();
    assert_eq!(canonicalize_row(&ds.rows[0], &ds.headers), "id=1|name=Alice|city=");
    assert_eq!(canonicalize_row(&ds.rows[1], &ds.headers), "id=2|name=Bob|city=Lyon");
}

#[test]
fn whitespace_variants_share_a_leaf() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let clean = dir.path().join("clean.csv");
    fs::write(&raw, "id,name\n1,\"  Alice   Smith \"\n1,Alice Smith\n").unwrap();

    sanitize_csv(&raw, &clean, &dir.path().join("meta.json"), &BTreeSet::new()).unwrap();
    let ds = load_clean_csv(&clean).unwrap();
    let a = leaf_for_row(&ds.rows[0], &ds.headers, CanonicalEncoding::Delimited);
    let b = leaf_for_row(&ds.rows[1], &ds.headers, CanonicalEncoding::Delimited);
    assert_eq!(a, b);
    assert_ne!(a, Digest::default());
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = sanitize_csv(
        &dir.path().join("nope.csv"),
        &dir.path().join("clean.csv"),
        &dir.path().join("meta.json"),
        &default_denylist(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn repeated_header_keeps_first_position_and_last_value() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let clean = dir.path().join("clean.csv");
    fs::write(&raw, "id,name,id\n1,Alice,9\n").unwrap();

    let report = sanitize_csv(&raw, &clean, &dir.path().join("meta.json"), &BTreeSet::new()).unwrap();
    assert_eq!(report.headers, vec!["id", "name"]);
    assert_eq!(fs::read_to_string(&clean).unwrap(), "id,name\n9,Alice\n");

    let ds = load_clean_csv(&clean).unwrap();
    assert_eq!(canonicalize_row(&ds.rows[0], &ds.headers), "id=9|name=Alice");
}

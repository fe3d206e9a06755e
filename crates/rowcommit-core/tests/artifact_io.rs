//! Artifact I/O: bundles and indexes survive the trip through disk in both
//! encodings, and unsupported extensions are rejected on read.

#![allow(clippy::unwrap_used)]

use rowcommit_core::io::{read_auto, read_bundle_auto, read_index_auto, write_bundle_auto, write_index_auto};
use rowcommit_core::{
    BatchMeta, BatchRange, CanonicalEncoding, DatasetIndex, Digest, ProofBundle, ProofEntry,
    ProofStep,
};

fn sample_bundle() -> ProofBundle {
    let a = Digest::new([0x11; 32]);
    let b = Digest::new([0x22; 32]);
    let root = Digest::new([0x33; 32]);
    ProofBundle {
        batch: BatchMeta::new(BatchRange { batch_id: 0, start_row: 0, end_row: 2 }, root),
        file_hash: Digest::new([0x44; 32]),
        headers: vec!["Order Id".into(), "Product Name".into()],
        leaves: vec![a, b],
        proofs: vec![
            ProofEntry { idx: 0, leaf: a, proof: vec![ProofStep::Right(b)] },
            ProofEntry { idx: 1, leaf: b, proof: vec![ProofStep::Left(a)] },
        ],
    }
}

#[test]
fn bundle_json_file_is_human_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proofs").join("batch_0.json");
    let bundle = sample_bundle();

    write_bundle_auto(&path, &bundle).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"isLeftSibling\": true"));
    assert!(text.contains(&Digest::new([0x33; 32]).to_hex()));

    assert_eq!(read_bundle_auto(&path).unwrap(), bundle);
}

#[test]
fn bundle_cbor_matches_json_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch_0.CBOR");
    let bundle = sample_bundle();

    write_bundle_auto(&path, &bundle).unwrap();
    assert_eq!(read_bundle_auto(&path).unwrap(), bundle);
}

#[test]
fn index_roundtrip_keeps_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batches.json");
    let index = DatasetIndex {
        file_hash: Digest::new([1; 32]),
        headers: vec!["id".into()],
        batch_size: 4,
        encoding: CanonicalEncoding::LengthPrefixed,
        batches: vec![sample_bundle().batch],
    };
    write_index_auto(&path, &index).unwrap();
    let back = read_index_auto(&path).unwrap();
    assert_eq!(back, index);
    assert_eq!(back.batch(0).unwrap().leaf_count, 2);
    assert_eq!(back.batch_for_row(1).unwrap().batch_id, 0);
    assert!(back.batch_for_row(2).is_none());
}

#[test]
fn unknown_extension_is_rejected_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.yaml");
    std::fs::write(&path, "{}").unwrap();
    let err = read_auto::<DatasetIndex, _>(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported artifact extension"));
}

//! Wide levels (hashed on the rayon pool under the `parallel` feature) must
//! produce exactly the levels a plain sequential reduction produces.

#![allow(clippy::unwrap_used)]

use rowcommit_core::Digest;
use rowcommit_crypto::{hash_pair, sha256};
use rowcommit_merkle::MerkleTree;

fn reference_levels(leaves: &[Digest]) -> Vec<Vec<Digest>> {
    let mut levels = vec![leaves.to_vec()];
    while levels.last().unwrap().len() > 1 {
        let cur = levels.last().unwrap();
        let mut next = Vec::with_capacity(cur.len().div_ceil(2));
        let mut i = 0;
        while i < cur.len() {
            let right = if i + 1 < cur.len() { cur[i + 1] } else { cur[i] };
            next.push(hash_pair(&cur[i], &right));
            i += 2;
        }
        levels.push(next);
    }
    levels
}

#[test]
fn wide_tree_matches_reference() {
    // Odd at several levels and wider than the parallel threshold.
    let n = 10_001;
    let leaves: Vec<Digest> = (0..n).map(|i: u32| sha256(&i.to_le_bytes())).collect();
    let tree = MerkleTree::from_leaves(&leaves).unwrap();
    let want = reference_levels(&leaves);
    assert_eq!(tree.levels(), want.as_slice());
    assert_eq!(tree.height(), want.len() - 1);
}

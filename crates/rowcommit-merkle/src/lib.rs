// crates/rowcommit-merkle/src/lib.rs

//! Binary Merkle tree over one batch of row leaves.
//!
//! - Level 0 is the leaf digests in row order; each parent is
//!   `SHA-256(left || right)`; the last level holds exactly one node, the root.
//! - Odd-length levels pair their last node **with itself** (duplicate-self
//!   rule). This differs from left-balanced promotion and must not change:
//!   verifiers that check anchored roots apply the same rule.
//! - The tree is kept as a flat list of levels so proofs are simple index
//!   walks and a level's pairs can be hashed independently.
//!
//! Verification ([`verify_proof`]) needs only the leaf, the proof and the
//! expected root; it never consults a tree.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use rowcommit_core::{CommitError, CommitResult, Digest, Proof, ProofStep};
use rowcommit_crypto::hash_pair;

/// Levels at least this wide are hashed on the rayon pool (`parallel` feature).
#[cfg(feature = "parallel")]
const PAR_MIN_LEVEL: usize = 1 << 12;

/// Fully materialized Merkle tree; `levels[0]` are the leaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build from 32-byte leaf digests in row order.
    ///
    /// # Errors
    /// [`CommitError::EmptyInput`] if `leaves` is empty.
    pub fn from_leaves(leaves: &[Digest]) -> CommitResult<Self> {
        if leaves.is_empty() {
            return Err(CommitError::EmptyInput);
        }
        let mut levels = vec![leaves.to_vec()];
        while let Some(cur) = levels.last().filter(|lvl| lvl.len() > 1) {
            let next = next_level(cur);
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Build from raw byte leaves, each of which must be exactly 32 bytes.
    ///
    /// # Errors
    /// [`CommitError::EmptyInput`] or [`CommitError::InvalidLeafSize`].
    pub fn from_leaf_bytes<B: AsRef<[u8]>>(leaves: &[B]) -> CommitResult<Self> {
        if leaves.is_empty() {
            return Err(CommitError::EmptyInput);
        }
        let digests = leaves
            .iter()
            .enumerate()
            .map(|(i, b)| Digest::from_slice(b.as_ref(), i))
            .collect::<CommitResult<Vec<_>>>()?;
        Self::from_leaves(&digests)
    }

    /// Build from `0x`-prefixed hex leaves.
    ///
    /// Non-hex text is [`CommitError::MalformedDigest`]; well-formed hex of
    /// the wrong width is [`CommitError::InvalidLeafSize`].
    pub fn from_hex_leaves<S: AsRef<str>>(leaves: &[S]) -> CommitResult<Self> {
        let raw = leaves
            .iter()
            .map(|s| decode_prefixed_hex(s.as_ref()))
            .collect::<CommitResult<Vec<_>>>()?;
        Self::from_leaf_bytes(&raw)
    }

    /// The single top-level digest.
    #[must_use]
    pub fn root(&self) -> Digest {
        // Construction guarantees a non-empty last level of length 1.
        self.levels
            .last()
            .and_then(|lvl| lvl.first())
            .copied()
            .unwrap_or_default()
    }

    /// Number of levels above the leaves (= proof length).
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Number of leaves.
    #[inline]
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Leaf digests in row order.
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// All levels, leaves first, root last.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Inclusion proof for the leaf at `index`.
    ///
    /// Odd positions are right children (sibling at `index - 1`, on the left);
    /// even positions take `index + 1`, or themselves when that is past the
    /// end of the level.
    ///
    /// # Errors
    /// [`CommitError::IndexOutOfRange`] if `index >= leaf_count()`.
    pub fn proof(&self, index: usize) -> CommitResult<Proof> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(CommitError::IndexOutOfRange { index, leaf_count });
        }

        let mut idx = index;
        let mut proof = Vec::with_capacity(self.height());
        for level in &self.levels[..self.height()] {
            let step = if idx & 1 == 1 {
                ProofStep::Left(level[idx - 1])
            } else {
                ProofStep::Right(*level.get(idx + 1).unwrap_or(&level[idx]))
            };
            proof.push(step);
            idx /= 2;
        }
        Ok(proof)
    }

    /// Proofs for every leaf, in leaf order.
    #[must_use]
    pub fn all_proofs(&self) -> Vec<Proof> {
        (0..self.leaf_count())
            .filter_map(|i| self.proof(i).ok())
            .collect()
    }
}

/// Hash one level into the next, applying the duplicate-self rule.
fn next_level(cur: &[Digest]) -> Vec<Digest> {
    #[cfg(feature = "parallel")]
    {
        if cur.len() >= PAR_MIN_LEVEL {
            use rayon::prelude::*;
            return cur.par_chunks(2).map(parent).collect();
        }
    }
    cur.chunks(2).map(parent).collect()
}

#[inline]
fn parent(pair: &[Digest]) -> Digest {
    match pair {
        [left, right] => hash_pair(left, right),
        [only] => hash_pair(only, only),
        _ => unreachable!("chunks(2) yields one or two nodes"),
    }
}

fn decode_prefixed_hex(s: &str) -> CommitResult<Vec<u8>> {
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| CommitError::MalformedDigest {
            input: s.chars().take(80).collect(),
            reason: "missing 0x prefix",
        })?;
    hex::decode(body).map_err(|_| CommitError::MalformedDigest {
        input: s.chars().take(80).collect(),
        reason: "invalid hex digit",
    })
}

/// Recompute the root implied by `leaf` and `proof`.
#[must_use]
pub fn compute_root(leaf: &Digest, proof: &[ProofStep]) -> Digest {
    proof.iter().fold(*leaf, |acc, step| match step {
        ProofStep::Left(sib) => hash_pair(sib, &acc),
        ProofStep::Right(sib) => hash_pair(&acc, sib),
    })
}

/// Whether `proof` takes `leaf` to `root`.
///
/// Pure: a mismatch is `false`, never an error.
#[must_use]
pub fn verify_proof(leaf: &Digest, proof: &[ProofStep], root: &Digest) -> bool {
    compute_root(leaf, proof) == *root
}

/// [`verify_proof`] over hex-encoded leaf and root (case-insensitive).
///
/// # Errors
/// [`CommitError::MalformedDigest`] when either string is not a digest; the
/// proof cannot be attempted at all in that case.
pub fn verify_proof_hex(leaf: &str, proof: &[ProofStep], root: &str) -> CommitResult<bool> {
    let leaf = Digest::from_hex(leaf)?;
    let root = Digest::from_hex(root)?;
    Ok(verify_proof(&leaf, proof, &root))
}

// crates/rowcommit-crypto/src/lib.rs

//! Hashing substrate: SHA-256 for row leaves, Merkle parents and file
//! fingerprints.
//!
//! Leaves and inner nodes deliberately share one hash function with **no**
//! domain separation and no length prefix: a parent is `SHA-256(left || right)`
//! over the raw 64 bytes. Anchored roots produced elsewhere are only
//! reproducible if that stays exactly so.

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

use anyhow::{Context, Result};
use rowcommit_core::Digest;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read buffer for streaming file hashes (8 KiB).
const BUFFER_SIZE: usize = 8192;

/// SHA-256 of arbitrary bytes.
#[inline]
#[must_use]
pub fn sha256(bytes: &[u8]) -> Digest {
    Digest::new(Sha256::digest(bytes).into())
}

/// Leaf digest of one canonical record.
#[inline]
#[must_use]
pub fn hash_row(canonical: &[u8]) -> Digest {
    sha256(canonical)
}

/// Merkle parent: `SHA-256(left || right)`, no separator.
#[inline]
#[must_use]
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut h = Sha256::new();
    h.update(left.as_bytes());
    h.update(right.as_bytes());
    Digest::new(h.finalize().into())
}

/// Stream a reader through SHA-256 with a fixed buffer.
pub fn hash_reader<R: Read>(mut rdr: R) -> io::Result<Digest> {
    let mut h = Sha256::new();
    let mut buf = [0u8; BUFFER_SIZE];
    loop {
        let n = rdr.read(&mut buf)?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(Digest::new(h.finalize().into()))
}

/// SHA-256 of a file's bytes, read in constant memory.
pub fn hash_file<P: AsRef<Path>>(path: P) -> Result<Digest> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {} for hashing", path.display()))?;
    hash_reader(BufReader::with_capacity(BUFFER_SIZE, f))
        .with_context(|| format!("read {} for hashing", path.display()))
}

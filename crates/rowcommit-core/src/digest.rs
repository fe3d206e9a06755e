//! 32-byte digests and their `0x`-prefixed hex boundary encoding.
//!
//! Every digest that crosses a process boundary (bundle files, the dataset
//! index, anchor records, CLI output) is written as lowercase hex with a `0x`
//! prefix and exactly 64 hex characters. Parsing accepts either case so roots
//! copied from other tooling compare equal.

use crate::error::{CommitError, CommitResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed 32-byte hash value (SHA-256 output).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Byte width of every digest.
    pub const LEN: usize = 32;

    /// Wrap raw bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into raw bytes.
    #[inline]
    #[must_use]
    pub const fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Copy from a slice that must be exactly 32 bytes long.
    ///
    /// `index` is only used to label the error.
    pub fn from_slice(bytes: &[u8], index: usize) -> CommitResult<Self> {
        <[u8; 32]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CommitError::InvalidLeafSize { index, len: bytes.len() })
    }

    /// `0x` + 64 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse `0x` + 64 hex characters (case-insensitive).
    pub fn from_hex(s: &str) -> CommitResult<Self> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| malformed(s, "missing 0x prefix"))?;
        if body.len() != 2 * Self::LEN {
            return Err(malformed(s, "expected 64 hex characters"));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(body, &mut out).map_err(|_| malformed(s, "invalid hex digit"))?;
        Ok(Self(out))
    }
}

fn malformed(input: &str, reason: &'static str) -> CommitError {
    let mut shown: String = input.chars().take(80).collect();
    if shown.len() < input.len() {
        shown.push('…');
    }
    CommitError::MalformedDigest { input: shown, reason }
}

impl From<[u8; 32]> for Digest {
    #[inline]
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; 32] {
    #[inline]
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl AsRef<[u8]> for Digest {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Digest {
    type Err = CommitError;

    fn from_str(s: &str) -> CommitResult<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = Digest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 0x-prefixed 32-byte hex digest")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Digest, E> {
                Digest::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

//! Row canonicalization: the exact pre-image every leaf hash is taken over.
//!
//! For each header, in header-list order, the value is fetched (missing →
//! empty), whitespace runs collapse to a single space, and the result is
//! trimmed. Two encodings exist:
//!
//! - [`CanonicalEncoding::Delimited`]: `h1=v1|h2=v2|…`. Neither `|` nor `=`
//!   is escaped, so a value containing them can alias another row's record.
//!   Kept byte-for-byte because already-anchored roots depend on it.
//! - [`CanonicalEncoding::LengthPrefixed`]: `len(h)‖h‖len(v)‖v` per header,
//!   lengths as little-endian `u64`. Unambiguous.

use crate::format::Row;
use rowcommit_core::{CanonicalEncoding, Digest};
use rowcommit_crypto::hash_row;

/// Separator between `header=value` pairs in the delimited encoding.
pub const FIELD_DELIMITER: char = '|';

/// Separator between a header and its value in the delimited encoding.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Whitespace that collapses: Unicode `White_Space` without U+0085, plus
/// U+FEFF. This is the class the producers of existing roots normalize with.
#[inline]
const fn is_collapsible_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Append `raw` with whitespace runs collapsed and both ends trimmed.
fn push_normalized(out: &mut String, raw: &str) {
    let mut words = raw.split(is_collapsible_space).filter(|w| !w.is_empty());
    if let Some(first) = words.next() {
        out.push_str(first);
        for w in words {
            out.push(' ');
            out.push_str(w);
        }
    }
}

/// Collapse whitespace runs to one space and trim.
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    push_normalized(&mut out, raw);
    out
}

/// Delimited canonical record (`h1=v1|h2=v2|…`).
#[must_use]
pub fn canonicalize_row(row: &Row, headers: &[String]) -> String {
    let mut out = String::new();
    for (i, h) in headers.iter().enumerate() {
        if i > 0 {
            out.push(FIELD_DELIMITER);
        }
        out.push_str(h);
        out.push(KEY_VALUE_SEPARATOR);
        push_normalized(&mut out, row.get(h).map_or("", String::as_str));
    }
    out
}

/// Length-prefixed canonical record.
#[must_use]
pub fn canonicalize_row_length_prefixed(row: &Row, headers: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut value = String::new();
    for h in headers {
        value.clear();
        push_normalized(&mut value, row.get(h).map_or("", String::as_str));
        out.extend_from_slice(&(h.len() as u64).to_le_bytes());
        out.extend_from_slice(h.as_bytes());
        out.extend_from_slice(&(value.len() as u64).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// Canonical bytes of `row` under `encoding`.
#[must_use]
pub fn encode_row(row: &Row, headers: &[String], encoding: CanonicalEncoding) -> Vec<u8> {
    match encoding {
        CanonicalEncoding::Delimited => canonicalize_row(row, headers).into_bytes(),
        CanonicalEncoding::LengthPrefixed => canonicalize_row_length_prefixed(row, headers),
    }
}

/// Leaf digest of `row`: canonicalize, then SHA-256.
#[must_use]
pub fn leaf_for_row(row: &Row, headers: &[String], encoding: CanonicalEncoding) -> Digest {
    hash_row(&encode_row(row, headers, encoding))
}

//! Serialization helpers for proof bundles and the dataset index.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes.

use crate::{DatasetIndex, ProofBundle};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk encoding for persisted artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// CBOR via `ciborium`.
    Cbor,
}

impl ArtifactFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Cbor => "cbor",
        }
    }

    /// Detect from a path extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match ext_lower(path).as_deref() {
            Some("json") => Some(Self::Json),
            Some("cbor") => Some(Self::Cbor),
            _ => None,
        }
    }
}

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/* ---------------- Generic JSON / CBOR ---------------- */

/// Read any deserializable value from **JSON**.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).with_context(|| format!("deserialize JSON {}", display(path_ref)))
}

/// Write any serializable value to **JSON** (pretty).
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v)
        .with_context(|| format!("serialize JSON {}", display(path_ref)))?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// Read any deserializable value from **CBOR**.
pub fn read_cbor<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr)
        .with_context(|| format!("deserialize CBOR {}", display(path_ref)))
}

/// Write any serializable value to **CBOR**.
pub fn write_cbor<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w)
        .with_context(|| format!("serialize CBOR {}", display(path_ref)))?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_json(path),
        Some("cbor") => read_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported artifact extension: {} (supported: .json, .cbor)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_auto<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    match ArtifactFormat::from_path(path.as_ref()) {
        Some(ArtifactFormat::Cbor) => write_cbor(path, v),
        _ => write_json(path, v),
    }
}

/* ---------------- Typed conveniences ---------------- */

/// Read a [`ProofBundle`] (JSON/CBOR by extension).
pub fn read_bundle_auto<P: AsRef<Path>>(path: P) -> Result<ProofBundle> {
    read_auto(path)
}

/// Write a [`ProofBundle`] (JSON unless the extension says CBOR).
pub fn write_bundle_auto<P: AsRef<Path>>(path: P, bundle: &ProofBundle) -> Result<()> {
    write_auto(path, bundle)
}

/// Read a [`DatasetIndex`] (JSON/CBOR by extension).
pub fn read_index_auto<P: AsRef<Path>>(path: P) -> Result<DatasetIndex> {
    read_auto(path)
}

/// Write a [`DatasetIndex`] (JSON unless the extension says CBOR).
pub fn write_index_auto<P: AsRef<Path>>(path: P, index: &DatasetIndex) -> Result<()> {
    write_auto(path, index)
}

/* ---------------- Small helpers ---------------- */

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[inline]
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

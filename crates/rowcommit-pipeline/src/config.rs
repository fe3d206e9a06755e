//! Build configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! batch_size = 1024
//! drop_columns = ["Customer Email", "Customer Password", "Customer Street"]
//! encoding = "delimited"      # or "length-prefixed"
//! format = "json"             # or "cbor"
//! parallel = true
//! ```

use anyhow::{Context, Result};
use rowcommit_core::{ArtifactFormat, CanonicalEncoding, CommitError, CommitResult};
use rowcommit_dataset::sanitize::default_denylist;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Rows per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Knobs for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Rows per batch (last batch may be shorter). Must be at least 1.
    pub batch_size: usize,
    /// Columns removed by the sanitizer.
    pub drop_columns: BTreeSet<String>,
    /// Leaf pre-image encoding.
    pub encoding: CanonicalEncoding,
    /// On-disk encoding of per-batch proof bundles.
    pub format: ArtifactFormat,
    /// Build batches on the rayon pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            drop_columns: default_denylist(),
            encoding: CanonicalEncoding::default(),
            format: ArtifactFormat::default(),
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(src).context("parse pipeline config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("in config {}", path.display()))
    }

    /// Reject settings no run could use.
    pub const fn validate(&self) -> CommitResult<()> {
        if self.batch_size == 0 {
            return Err(CommitError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }

    /// Builder-style override of the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.batch_size, 1024);
        assert!(cfg.drop_columns.contains("Customer Street"));
        assert!(cfg.parallel);
    }

    #[test]
    fn overrides_individual_fields() {
        let cfg = PipelineConfig::from_toml_str(
            "batch_size = 4\nencoding = \"length-prefixed\"\nformat = \"cbor\"\ndrop_columns = []\n",
        )
        .unwrap();
        assert_eq!(cfg.batch_size, 4);
        assert_eq!(cfg.encoding, CanonicalEncoding::LengthPrefixed);
        assert_eq!(cfg.format, ArtifactFormat::Cbor);
        assert!(cfg.drop_columns.is_empty());
        assert!(cfg.parallel);
    }

    #[test]
    fn rejects_zero_batch_size_and_unknown_keys() {
        let err = PipelineConfig::from_toml_str("batch_size = 0").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CommitError>(),
            Some(&CommitError::InvalidBatchSize(0))
        );
        assert!(PipelineConfig::from_toml_str("batchsize = 3").is_err());
    }
}

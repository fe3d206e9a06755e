//! Build driver and verification entry points for rowcommit.
//!
//! - [`config`]: `PipelineConfig` loaded from TOML.
//! - [`build`]: sanitize → partition → per-batch tree → staged, atomic output.
//! - [`verify`]: row inclusion checks against bundle or anchored roots.
//! - [`anchor`]: read-only anchor lookup.
//! - [`cancel`]: cooperative cancellation at batch boundaries.

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
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod anchor;
pub mod build;
pub mod cancel;
pub mod config;
pub mod verify;

pub use anchor::{AnchorFile, AnchorStore, JsonAnchorStore, MemoryAnchorStore};
pub use build::{build_batches, build_from_csv};
pub use cancel::CancelFlag;
pub use config::PipelineConfig;
pub use verify::{check_bundle, find_bundle, verify_row, verify_row_against_anchor, RowVerification};

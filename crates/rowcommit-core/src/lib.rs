//! rowcommit-core: digests, wire types, errors and artifact I/O.
//!
//! This crate defines the **stable boundary** used across rowcommit crates:
//! - [`Digest`], the 32-byte hash with its `0x`-hex boundary encoding,
//! - proof and batch wire types ([`ProofStep`], [`BatchMeta`], [`ProofBundle`],
//!   [`DatasetIndex`], [`AnchorRecord`]),
//! - the typed error taxonomy ([`CommitError`], [`ErrorKind`]), and
//! - JSON/CBOR I/O with extension auto-detection.
//!
//! ```
//! use rowcommit_core::{Digest, ProofStep};
//!
//! let sib = Digest::new([7u8; 32]);
//! let step = ProofStep::from_parts(sib, true);
//! assert!(step.is_left_sibling());
//! assert_eq!(step.sibling().to_hex().len(), 66);
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// 32-byte digest type and hex encoding.
pub mod digest;
/// Typed error taxonomy.
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// Proof, batch, bundle, index and anchor wire types.
pub mod types;

pub use digest::Digest;
pub use error::{CommitError, CommitResult, ErrorKind};
pub use io::ArtifactFormat;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use rowcommit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        digest::Digest,
        error::{CommitError, CommitResult, ErrorKind},
        types::*,
    };
}

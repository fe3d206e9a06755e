//! Typed error taxonomy shared by the pure rowcommit components.
//!
//! Two families matter to callers:
//! - **validation** errors: the input can never produce a commitment or a
//!   proof (empty leaf set, wrong leaf width, bad batch size, index out of range);
//! - **input** errors: something the caller referenced does not exist or is
//!   malformed (missing proof entry, missing anchor, unparsable digest).
//!
//! A failed inclusion check is *not* an error: verifiers return `false`.

use thiserror::Error;

/// Result alias for the typed rowcommit error.
pub type CommitResult<T> = std::result::Result<T, CommitError>;

/// Errors raised by canonicalization, partitioning, tree building and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// A Merkle tree was requested over zero leaves.
    #[error("empty leaf set")]
    EmptyInput,

    /// A leaf was not exactly 32 bytes.
    #[error("leaf {index} must be 32 bytes, got {len}")]
    InvalidLeafSize {
        /// Position of the offending leaf.
        index: usize,
        /// Observed byte length.
        len: usize,
    },

    /// `proof(index)` was called past the end of the leaf level.
    #[error("leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },

    /// Batch size below 1.
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// Partitioning was asked to cover zero rows.
    #[error("dataset has no rows")]
    EmptyDataset,

    /// A digest string was not `0x` followed by 64 hex characters.
    #[error("malformed digest {input:?}: {reason}")]
    MalformedDigest {
        /// The rejected text (truncated by the caller if huge).
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A proof bundle has no entry for the requested in-batch row offset.
    #[error("row offset {offset} not found in proof bundle for batch {batch_id}")]
    ProofEntryNotFound {
        /// Batch the bundle belongs to.
        batch_id: usize,
        /// Requested row offset inside the batch.
        offset: usize,
    },

    /// The anchor store holds no record for this batch.
    #[error("no anchor recorded for batch {0}")]
    AnchorNotFound(usize),

    /// A multi-batch build observed its cancellation flag.
    #[error("build cancelled before batch {0}")]
    Cancelled(usize),
}

/// Coarse classification of a [`CommitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input can never yield a commitment or proof.
    Validation,
    /// A referenced entry is missing or malformed.
    Input,
    /// The run was stopped at a batch boundary.
    Cancelled,
}

impl CommitError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput
            | Self::InvalidLeafSize { .. }
            | Self::IndexOutOfRange { .. }
            | Self::InvalidBatchSize(_)
            | Self::EmptyDataset => ErrorKind::Validation,
            Self::MalformedDigest { .. }
            | Self::ProofEntryNotFound { .. }
            | Self::AnchorNotFound(_) => ErrorKind::Input,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(CommitError::EmptyInput.kind(), ErrorKind::Validation);
        assert_eq!(CommitError::InvalidBatchSize(0).kind(), ErrorKind::Validation);
        assert_eq!(
            CommitError::ProofEntryNotFound { batch_id: 0, offset: 9 }.kind(),
            ErrorKind::Input
        );
        assert_eq!(CommitError::Cancelled(3).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn messages_name_the_offender() {
        let e = CommitError::IndexOutOfRange { index: 7, leaf_count: 5 };
        assert_eq!(e.to_string(), "leaf index 7 out of range (leaf count 5)");
    }
}

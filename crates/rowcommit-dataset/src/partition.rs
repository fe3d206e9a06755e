//! Partition an ordered row sequence into contiguous, sequentially numbered
//! batches.
//!
//! A **batch** is the half-open range `[start_row, end_row)`; ids start at 0
//! and increase by one. Every batch holds `batch_size` rows except possibly
//! the last, which holds the remainder. The ranges exactly cover
//! `[0, total_rows)`.

use rowcommit_core::{BatchRange, CommitError, CommitResult};

/// Number of batches `total_rows` rows split into.
#[inline]
#[must_use]
pub const fn batch_count(total_rows: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        0
    } else {
        total_rows.div_ceil(batch_size)
    }
}

/// Slice `[0, total_rows)` into batches of `batch_size` (last may be shorter).
///
/// # Errors
/// [`CommitError::InvalidBatchSize`] if `batch_size == 0`;
/// [`CommitError::EmptyDataset`] if `total_rows == 0`.
pub fn partition_rows(total_rows: usize, batch_size: usize) -> CommitResult<Vec<BatchRange>> {
    if batch_size == 0 {
        return Err(CommitError::InvalidBatchSize(batch_size));
    }
    if total_rows == 0 {
        return Err(CommitError::EmptyDataset);
    }

    Ok((0..total_rows)
        .step_by(batch_size)
        .enumerate()
        .map(|(batch_id, start_row)| BatchRange {
            batch_id,
            start_row,
            end_row: start_row.saturating_add(batch_size).min(total_rows),
        })
        .collect())
}

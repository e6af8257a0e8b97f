//! Splits the ordered review sequence into bounded contiguous batches.

use crate::types::Review;

/// Split reviews into contiguous batches of `batch_size`. The last batch may
/// be shorter. No reordering, no filtering; empty-content reviews were
/// already dropped at import. Empty input yields zero batches.
pub fn create_batches(reviews: &[Review], batch_size: usize) -> Vec<&[Review]> {
    if reviews.is_empty() || batch_size == 0 {
        return Vec::new();
    }
    reviews.chunks(batch_size).collect()
}

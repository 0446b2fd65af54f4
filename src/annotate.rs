//! # Novelty annotation
//!
//! Flags a printed candidate junction as novel (no matching row in the
//! intron/exon boundary table) or previously known.
use crate::model::{BoundaryRecord, CandidateJunction};

/// `candidate` is known (not novel) if some boundary row on the same
/// chromosome has the same splice length and both endpoints fall within
/// `tolerance` of the candidate's observed support range.
pub fn is_novel(candidate: &CandidateJunction, boundaries: &[BoundaryRecord], tolerance: i64) -> bool {
    !boundaries.iter().any(|b| {
        b.chromosome == candidate.chromosome
            && b.length == candidate.position_larger - candidate.position_smaller
            && (b.position1 - candidate.min_small_support).abs() <= tolerance
            && (b.position2 - candidate.max_large_support).abs() <= tolerance
    })
}

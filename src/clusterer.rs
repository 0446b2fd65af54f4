//! # Support Clusterer
//!
//! Groups candidate splice junctions that describe the same splice site
//! (within a position tolerance) and counts distinct supporting reads,
//! including "orphan" half-alignments whose other half never matched but
//! which land on the same splice boundary. Junctions with enough total
//! support are marked for printing; everything else they absorb is marked
//! `already_reported` so it is skipped on a later pass.
use std::collections::HashSet;

use crate::{
    interner::Sym,
    model::{CandidateJunction, HalfAlignment},
};

enum HalfEnd {
    Small,
    Large,
}

enum CheckResult {
    /// Chromosome advanced past the candidate's; stop scanning this side.
    Break,
    NoMatch,
    Match,
}

/// Does half-alignment `halves[i]` orphan-support `candidate`'s small or
/// large end?
///
/// A half only counts as orphan support if its direction agrees with the
/// candidate and its other half (by `other_half_key`) either never appeared
/// or never stretched long enough to account for the whole read - otherwise
/// it's already accounted for as a matched pair.
fn check_half(
    candidate: &CandidateJunction,
    halves: &[HalfAlignment],
    half_stats: &std::collections::HashMap<Sym, crate::model::HalfStats>,
    i: usize,
    end: &HalfEnd,
) -> CheckResult {
    let h = &halves[i];
    if h.chromosome != candidate.chromosome {
        return CheckResult::Break;
    }

    let target = match end {
        HalfEnd::Small => candidate.position_smaller,
        HalfEnd::Large => candidate.position_larger,
    };
    if h.split_pos > target {
        return CheckResult::Break;
    }
    if h.split_pos < target {
        return CheckResult::NoMatch;
    }

    if h.direction == candidate.direction {
        let accounted_for = half_stats
            .get(&h.other_half_key)
            .is_some_and(|stats| stats.max_length >= h.total_read_length - h.length);
        if !accounted_for {
            return CheckResult::Match;
        }
    }
    CheckResult::NoMatch
}

/// Cluster `candidates` (sorted by `(chromosome, position_smaller)`) against
/// `halves` (sorted by `(chromosome, split_pos)`), accumulating support
/// counts in place.
pub fn cluster_support(
    candidates: &mut [CandidateJunction],
    halves_by_small: &[HalfAlignment],
    halves_by_large: &[HalfAlignment],
    half_stats: &std::collections::HashMap<Sym, crate::model::HalfStats>,
    support_pos_tolerance: i64,
    min_supporting_reads: usize,
) {
    let mut i_small = 0usize;
    let mut i_large = 0usize;

    for sp1 in 0..candidates.len() {
        if candidates[sp1].already_reported {
            continue;
        }

        let chromosome = candidates[sp1].chromosome;
        let position_smaller = candidates[sp1].position_smaller;
        let id = candidates[sp1].id;
        let splice_length = candidates[sp1].splice_length();

        let mut supported_reads: HashSet<Sym> = HashSet::new();
        supported_reads.insert(id);
        let mut supported_splices: Vec<usize> = vec![sp1];
        let mut min_small_support = candidates[sp1].position_smaller;
        let mut max_large_support = candidates[sp1].position_larger;

        for sp2 in sp1..candidates.len() {
            let other = &candidates[sp2];
            if other.chromosome != chromosome {
                break;
            }
            if other.position_smaller > position_smaller + support_pos_tolerance {
                break;
            }
            if other.splice_length() != splice_length {
                continue;
            }
            if other.id == id {
                supported_splices.push(sp2);
                continue;
            }
            supported_reads.insert(other.id);
            supported_splices.push(sp2);
            min_small_support = min_small_support.min(other.position_smaller);
            max_large_support = max_large_support.max(other.position_larger);
        }

        let mut supported_halves: HashSet<Sym> = HashSet::new();

        while i_small < halves_by_small.len() && halves_by_small[i_small].split_pos < position_smaller {
            i_small += 1;
        }
        let mut j = i_small;
        loop {
            if j >= halves_by_small.len() {
                break;
            }
            match check_half(&candidates[sp1], halves_by_small, half_stats, j, &HalfEnd::Small) {
                CheckResult::Break => break,
                CheckResult::NoMatch => {
                    j += 1;
                }
                CheckResult::Match => {
                    supported_halves.insert(halves_by_small[j].id);
                    j += 1;
                }
            }
        }

        let position_larger = candidates[sp1].position_larger;
        while i_large < halves_by_large.len() && halves_by_large[i_large].split_pos < position_larger {
            i_large += 1;
        }
        let mut k = i_large;
        loop {
            if k >= halves_by_large.len() {
                break;
            }
            match check_half(&candidates[sp1], halves_by_large, half_stats, k, &HalfEnd::Large) {
                CheckResult::Break => break,
                CheckResult::NoMatch => {
                    k += 1;
                }
                CheckResult::Match => {
                    supported_halves.insert(halves_by_large[k].id);
                    k += 1;
                }
            }
        }

        let num_support = supported_reads.len();
        let num_support_halves = supported_halves.len();
        let num_support_total = num_support + num_support_halves;

        candidates[sp1].min_small_support = min_small_support;
        candidates[sp1].max_large_support = max_large_support;
        candidates[sp1].num_support = num_support;
        candidates[sp1].num_support_halves = num_support_halves;
        candidates[sp1].num_support_total = num_support_total;

        if num_support_total >= min_supporting_reads {
            candidates[sp1].print = true;
            for &idx in &supported_splices {
                candidates[idx].already_reported = true;
            }
            candidates[sp1].already_reported = true;
        }
    }
}

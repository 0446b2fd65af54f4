//! # Pair Matcher
//!
//! Scans half-alignments sorted by `(id, direction, chromosome, position)`
//! and, for every pair of halves from the same read that reconstruct it end
//! to end, emits a candidate splice junction. Annotates each candidate with
//! its containing gene (if any) by a linear scan of the sorted gene table.
use std::collections::HashSet;

use crate::{
    interner::Sym,
    model::{CandidateJunction, HalfAlignment, KnownGeneRecord, UNFOUND_GENE},
};

/// Sort key for the matcher's input: groups halves of the same read
/// together, then by direction and chromosome, then by position so the
/// inner scan can break out as soon as it runs past `max_distance`.
pub fn sort_key(h: &HalfAlignment) -> (u32, bool, u32, i64) {
    (h.id.0, h.direction == crate::model::Direction::Minus, h.chromosome.0, h.position)
}

/// Find every pair of half-alignments that jointly reconstruct a read and
/// emit a [`CandidateJunction`] for each, deduplicated on
/// `(id, chromosome, position_smaller, position_larger)`.
pub fn match_pairs(
    halves: &[HalfAlignment],
    genes: &[KnownGeneRecord],
    max_distance: i64,
    min_splice_length: i64,
    unfound_gene_sym: Sym,
) -> Vec<CandidateJunction> {
    let mut candidates = Vec::new();
    let mut seen: HashSet<(Sym, Sym, i64, i64)> = HashSet::new();

    for left in 0..halves.len() {
        let l = &halves[left];
        for right in (left + 1)..halves.len() {
            let r = &halves[right];

            if r.id != l.id || r.direction != l.direction || r.chromosome != l.chromosome {
                break;
            }
            if r.position - l.position > max_distance {
                break;
            }
            if r.side == l.side {
                continue;
            }
            if l.length + r.length != l.total_read_length {
                continue;
            }

            let (first, second) = if (l.side == crate::model::Side::L && l.direction == crate::model::Direction::Plus)
                || (l.side == crate::model::Side::R && l.direction == crate::model::Direction::Minus)
            {
                (l, r)
            } else {
                (r, l)
            };

            let end_smaller = first.position + first.length;
            let end_larger = second.position;
            let splice_length = end_larger - end_smaller;
            if splice_length > max_distance || splice_length < min_splice_length {
                continue;
            }

            let key = (l.id, l.chromosome, end_smaller, end_larger);
            if !seen.insert(key) {
                continue;
            }

            let (gene_name, gene_unknown) = find_containing_gene(genes, l.chromosome, l.position, r.position, unfound_gene_sym);

            candidates.push(CandidateJunction {
                id: l.id,
                chromosome: l.chromosome,
                direction: l.direction,
                position_smaller: end_smaller,
                position_larger: end_larger,
                min_small_support: end_smaller,
                max_large_support: end_larger,
                num_support: 0,
                num_support_halves: 0,
                num_support_total: 0,
                gene_name,
                gene_unknown,
                novel: false,
                already_reported: false,
                print: false,
                left_length: l.length,
            });
        }
    }

    candidates
}

/// Find the first gene table row on `chromosome` whose span contains both
/// raw half-alignment positions. Compares the half-alignments' own
/// `position` fields, not the splice endpoints derived from them.
fn find_containing_gene(
    genes: &[KnownGeneRecord],
    chromosome: Sym,
    position_left: i64,
    position_right: i64,
    unfound_gene_sym: Sym,
) -> (Sym, bool) {
    let lo = genes.partition_point(|g| (g.chromosome.0, g.position1) < (chromosome.0, i64::MIN));
    for gene in &genes[lo..] {
        if gene.chromosome != chromosome {
            break;
        }
        if gene.position1 <= position_left
            && position_left <= gene.position2
            && gene.position1 <= position_right
            && position_right <= gene.position2
        {
            return (gene.gene, false);
        }
    }
    let _ = UNFOUND_GENE;
    (unfound_gene_sym, true)
}

//! # Result emission
//!
//! Writes the three result files:
//!
//! - `<base>.results` / `<base>.results.unknown`: one row per printed
//!   candidate junction, split by whether a containing gene was found.
//! - `<base>.results.splitPairs`: a merge of printed candidates and orphan
//!   half-alignments, in chromosome/position order.
use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::{Context, Result};

use crate::{
    interner::Interner,
    model::{CandidateJunction, HalfAlignment, ORPHAN_GENE_PLACEHOLDER},
};

const RESULTS_HEADER: &str = "GeneName\tChromosome\t# supporting reads\t# supporting halves\t# supporting total\tsplice length\trange of supporting reads\tNovel or not (*)";
const SPLITPAIRS_HEADER: &str = "Id\tGene\tChr\t# Supporting reads\t# Supporting halves\t# Supporting total\tLength\tSplice region\tSupporting splice range\tLeft side length";

/// Write `<base>.results` and `<base>.results.unknown`, splitting printed
/// candidates by whether a containing gene was found.
pub fn write_results(base_name: &str, candidates: &[CandidateJunction], interner: &Interner) -> Result<()> {
    let known_path = format!("{base_name}.results");
    let unknown_path = format!("{base_name}.results.unknown");

    let mut known = BufWriter::new(
        File::create(&known_path).with_context(|| format!("Error creating file {known_path}"))?,
    );
    let mut unknown = BufWriter::new(
        File::create(&unknown_path).with_context(|| format!("Error creating file {unknown_path}"))?,
    );

    writeln!(known, "{RESULTS_HEADER}")?;
    writeln!(unknown, "{RESULTS_HEADER}")?;

    for candidate in candidates.iter().filter(|c| c.print) {
        let line = format_result_row(candidate, interner);
        if candidate.gene_unknown {
            writeln!(unknown, "{line}")?;
        } else {
            writeln!(known, "{line}")?;
        }
    }

    known.flush()?;
    unknown.flush()?;
    Ok(())
}

fn format_result_row(c: &CandidateJunction, interner: &Interner) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}--{}\t{}",
        interner.resolve(c.gene_name),
        interner.resolve(c.chromosome),
        c.num_support,
        c.num_support_halves,
        c.num_support_total,
        c.splice_length(),
        c.min_small_support,
        c.max_large_support,
        if c.novel { "Novel" } else { "*" },
    )
}

/// Write `<base>.results.splitPairs`: a chromosome/position merge of printed
/// candidates (sorted by `(chromosome, position_smaller)`) and orphan
/// half-alignments (sorted by `(chromosome, split_pos)`) - a half is orphan
/// if its other half was never observed long enough to complete the read.
/// Stops as soon as either side is exhausted: trailing printed candidates
/// beyond the last half-alignment are not emitted here (they still appear
/// in `.results`/`.results.unknown`).
pub fn write_split_pairs(
    base_name: &str,
    printed_by_position: &[&CandidateJunction],
    halves_by_position: &[HalfAlignment],
    half_stats: &std::collections::HashMap<crate::interner::Sym, crate::model::HalfStats>,
    interner: &Interner,
) -> Result<()> {
    let path = format!("{base_name}.results.splitPairs");
    let mut out =
        BufWriter::new(File::create(&path).with_context(|| format!("Error creating file {path}"))?);
    writeln!(out, "{SPLITPAIRS_HEADER}")?;

    let mut k = 0usize;
    let mut i_half = 0usize;

    while k < printed_by_position.len() && i_half < halves_by_position.len() {
        let candidate = printed_by_position[k];
        let half = &halves_by_position[i_half];

        let candidate_first = candidate.chromosome.0 < half.chromosome.0
            || (candidate.chromosome == half.chromosome && candidate.position_smaller < half.split_pos);

        if candidate_first {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}-{}\t{}-{}\t{}",
                interner.resolve(candidate.id),
                interner.resolve(candidate.gene_name),
                interner.resolve(candidate.chromosome),
                candidate.num_support,
                candidate.num_support_halves,
                candidate.num_support_total,
                candidate.splice_length(),
                candidate.position_smaller,
                candidate.position_larger,
                candidate.min_small_support,
                candidate.max_large_support,
                candidate.left_length,
            )?;
            k += 1;
        } else {
            let orphan = half_stats
                .get(&half.other_half_key)
                .is_none_or(|stats| stats.max_length < half.total_read_length - half.length);
            if orphan {
                writeln!(
                    out,
                    "{}\t{}\t{}\t0\t0\t0\t0\t{}-{}\t0-0\t{} {} {}",
                    interner.resolve(half.id),
                    ORPHAN_GENE_PLACEHOLDER,
                    interner.resolve(half.chromosome),
                    half.position,
                    half.split_pos,
                    half.length,
                    half.side.as_char(),
                    half.direction.as_char(),
                )?;
            }
            i_half += 1;
        }
    }

    out.flush()?;
    Ok(())
}

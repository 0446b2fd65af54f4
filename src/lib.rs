//! # splitpairs
//!
//! Identifies candidate RNA splice junctions from aligned halves of split
//! reads: reads that could not be aligned as a single contiguous block and
//! were instead submitted to the aligner as two separate pieces. Pairs of
//! halves from the same read that reconstruct it end to end become
//! candidate junctions; candidates clustered around the same splice site
//! across enough distinct reads are reported as supported splice junctions,
//! annotated with their containing gene (if any) and whether the boundary
//! table already knows about them.
pub mod annotate;
pub mod cli;
pub mod clusterer;
pub mod emit;
pub mod interner;
pub mod io;
pub mod matcher;
pub mod model;
pub mod options;
pub mod stats;

use anyhow::{Context, Result};
use log::info;

use crate::{
    interner::Interner,
    model::UNFOUND_GENE,
    options::Options,
    stats::{RunStats, Timer},
};

/// Run the pipeline end to end: read inputs, match split-read halves into
/// candidate junctions, cluster support for each splice site, annotate
/// novelty, and write the three result files plus a stdout report.
///
/// Lowers the process's scheduling priority first, so a long batch run
/// doesn't starve interactive work on the same machine.
pub fn run(options: &Options) -> Result<RunStats> {
    lower_priority();

    let total_timer = Timer::start();
    let mut interner = Interner::new();
    let unfound_gene_sym = interner.intern(UNFOUND_GENE);

    let read_timer = Timer::start();
    let genes = io::read_genes(&options.gene_table, &mut interner)
        .with_context(|| format!("Error reading gene table {}", options.gene_table.display()))?;
    let boundaries = io::read_boundaries(&options.boundary_table, &mut interner)
        .with_context(|| format!("Error reading boundary table {}", options.boundary_table.display()))?;
    let mut half_read = io::read_halves(&options.sample_data_file, &mut interner)
        .with_context(|| format!("Error reading sample data {}", options.sample_data_file.display()))?;
    let read_secs = read_timer.elapsed_secs();

    info!(
        "read {} halves, {} genes, {} boundaries in {:.3}s",
        half_read.halves.len(),
        genes.len(),
        boundaries.len(),
        read_secs
    );

    half_read.halves.sort_by_key(matcher::sort_key);

    let match_timer = Timer::start();
    let mut candidates = matcher::match_pairs(
        &half_read.halves,
        &genes,
        options.max_distance,
        options.min_splice_length,
        unfound_gene_sym,
    );
    let match_secs = match_timer.elapsed_secs();
    info!("matched {} candidate junctions in {:.3}s", candidates.len(), match_secs);

    let mut halves_by_small = half_read.halves.clone();
    halves_by_small.sort_by_key(|h| (h.chromosome.0, h.split_pos));
    let halves_by_large = halves_by_small.clone();

    candidates.sort_by_key(|c| (c.chromosome.0, c.position_smaller));

    let cluster_timer = Timer::start();
    clusterer::cluster_support(
        &mut candidates,
        &halves_by_small,
        &halves_by_large,
        &half_read.half_stats,
        options.support_pos_tolerance,
        options.min_supporting_reads,
    );
    let cluster_secs = cluster_timer.elapsed_secs();
    info!("clustered support in {:.3}s", cluster_secs);

    for candidate in candidates.iter_mut().filter(|c| c.print) {
        candidate.novel = annotate::is_novel(candidate, &boundaries, options.support_pos_tolerance);
    }

    emit::write_results(&options.results_base_name, &candidates, &interner)?;

    let printed_by_position: Vec<&crate::model::CandidateJunction> = {
        let mut printed: Vec<&crate::model::CandidateJunction> =
            candidates.iter().filter(|c| c.print).collect();
        printed.sort_by_key(|c| (c.chromosome.0, c.position_smaller));
        printed
    };
    emit::write_split_pairs(
        &options.results_base_name,
        &printed_by_position,
        &halves_by_small,
        &half_read.half_stats,
        &interner,
    )?;

    let num_printed = candidates.iter().filter(|c| c.print).count();
    let num_novel = candidates.iter().filter(|c| c.print && c.novel).count();

    let run_stats = RunStats {
        num_halves: half_read.halves.len(),
        num_genes: genes.len(),
        num_boundaries: boundaries.len(),
        num_candidates: candidates.len(),
        num_printed,
        num_novel,
        read_secs,
        match_secs,
        cluster_secs,
        total_secs: total_timer.elapsed_secs(),
    };
    stats::print_stats(&run_stats, &half_read.half_stats);

    Ok(run_stats)
}

/// Lower this process's scheduling priority to the lowest normal-range
/// niceness, so a long batch run doesn't compete with interactive work on
/// the same host. Best-effort: failure is logged, not fatal.
#[cfg(unix)]
fn lower_priority() {
    let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, 20) };
    if result != 0 {
        log::warn!("failed to lower process priority: {}", std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn lower_priority() {}

//! # Run statistics
//!
//! Timing, memory, and half-length summaries reported at the end of a run,
//! both to the log (ambient, structured) and to stdout (the documented
//! external contract other tools parse).
use std::{collections::HashMap, time::Instant};

use log::{debug, info};

use crate::{interner::Sym, model::HalfStats};

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub num_halves: usize,
    pub num_genes: usize,
    pub num_boundaries: usize,
    pub num_candidates: usize,
    pub num_printed: usize,
    pub num_novel: usize,
    pub read_secs: f64,
    pub match_secs: f64,
    pub cluster_secs: f64,
    pub total_secs: f64,
}

/// `VmRSS` of the current process in kilobytes, read from `/proc/self/status`
/// on Linux. `None` on platforms without a `/proc` filesystem.
#[cfg(target_os = "linux")]
pub fn current_vm_rss_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        rest.split_whitespace().next()?.parse().ok()
    })
}

#[cfg(not(target_os = "linux"))]
pub fn current_vm_rss_kb() -> Option<u64> {
    None
}

/// Summarize the min/max piece lengths observed per half-key.
pub fn half_stats_summary(half_stats: &HashMap<Sym, HalfStats>) -> (i64, i64) {
    let min = half_stats.values().map(|s| s.min_length).min().unwrap_or(0);
    let max = half_stats.values().map(|s| s.max_length).max().unwrap_or(0);
    (min, max)
}

/// Emit the end-of-run report: `println!` for the documented stdout
/// contract, plus structured log lines for operators tailing logs.
pub fn print_stats(stats: &RunStats, half_stats: &HashMap<Sym, HalfStats>) {
    let (min_len, max_len) = half_stats_summary(half_stats);

    println!("--- run statistics ---");
    println!("half-alignments read:   {}", stats.num_halves);
    println!("known genes read:       {}", stats.num_genes);
    println!("known boundaries read:  {}", stats.num_boundaries);
    println!("candidate junctions:    {}", stats.num_candidates);
    println!("junctions printed:      {}", stats.num_printed);
    println!("novel junctions:        {}", stats.num_novel);
    println!("half-alignment lengths: min={min_len} max={max_len}");
    if let Some(rss) = current_vm_rss_kb() {
        println!("peak resident memory:   {rss} kB");
    }
    println!(
        "timing (s): read={:.3} match={:.3} cluster={:.3} total={:.3}",
        stats.read_secs, stats.match_secs, stats.cluster_secs, stats.total_secs
    );

    info!(
        "run complete: {} halves, {} candidates, {} printed, {} novel in {:.3}s",
        stats.num_halves, stats.num_candidates, stats.num_printed, stats.num_novel, stats.total_secs
    );
    debug!(
        "stage timings: read={:.3}s match={:.3}s cluster={:.3}s",
        stats.read_secs, stats.match_secs, stats.cluster_secs
    );
}

//! # Half-alignment reader
//!
//! Parses the tab-delimited sample data file (one row per half-alignment of
//! a split read) into [`HalfAlignment`] records, interning the id and
//! chromosome fields and accumulating per-`id‖side` length statistics along
//! the way.
use std::{collections::HashMap, io::BufRead, path::Path};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::warn;

use crate::{
    interner::{Interner, Sym},
    io::decompress,
    model::{Direction, HalfAlignment, HalfStats, Side},
};

/// Rows with a field wider than this are logged and skipped rather than
/// treated as a hard parse failure, tolerating truncated/corrupt trailing
/// lines in very large sample files.
const MAX_LINE_LEN: usize = 1 << 20;

/// Minimum number of tab-delimited columns a half-alignment row must carry.
/// Rows short of this are treated as end-of-file, not a parse error: large
/// sample files are routinely truncated mid-write by upstream pipelines.
const MIN_FIELDS: usize = 10;

pub struct HalfReadResult {
    pub halves: Vec<HalfAlignment>,
    pub half_stats: HashMap<Sym, HalfStats>,
}

/// Read all half-alignments from `path`, interning ids and chromosomes into
/// `interner`.
pub fn read_halves(path: &Path, interner: &mut Interner) -> Result<HalfReadResult> {
    let reader = decompress::open_input(path)
        .with_context(|| format!("Error reading from file {}", path.display()))?;
    let mut csv = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(LineLengthGuard::new(reader));

    let mut halves = Vec::new();
    let mut half_stats: HashMap<Sym, HalfStats> = HashMap::new();

    for result in csv.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("stopping read of {}: {err}", path.display());
                break;
            }
        };
        if record.len() < MIN_FIELDS {
            break;
        }

        let id_str = &record[0];
        let side = Side::from_char(first_char(&record[1])?)?;
        let length: i64 = record[2]
            .trim()
            .parse()
            .with_context(|| format!("bad length field in {}", path.display()))?;
        let total_read_length: i64 = record[3]
            .trim()
            .parse()
            .with_context(|| format!("bad total read length field in {}", path.display()))?;
        let direction = Direction::from_char(first_char(&record[4])?)?;
        let chromosome_str = &record[5];
        let position: i64 = record[6]
            .trim()
            .parse()
            .with_context(|| format!("bad position field in {}", path.display()))?;

        let id = interner.intern(id_str);
        let chromosome = interner.intern(chromosome_str);
        let half_key = interner.intern_concat(id_str, side.as_char());
        let other_half_key = interner.intern_concat(id_str, side.opposite().as_char());
        let split_pos = HalfAlignment::compute_split_pos(side, direction, position, length);

        half_stats
            .entry(half_key)
            .and_modify(|stats| stats.observe(length))
            .or_insert_with(|| HalfStats::new(length));

        halves.push(HalfAlignment {
            id,
            side,
            length,
            total_read_length,
            direction,
            chromosome,
            position,
            split_pos,
            half_key,
            other_half_key,
        });
    }

    Ok(HalfReadResult { halves, half_stats })
}

fn first_char(field: &str) -> Result<char> {
    field
        .trim()
        .chars()
        .next()
        .with_context(|| "expected a single-character field, found an empty one".to_string())
}

/// Wraps a [`BufRead`] and refuses to hand back lines longer than
/// [`MAX_LINE_LEN`], logging and signalling end-of-stream instead. Tracks the
/// number of bytes seen since the last `\n`, across however many underlying
/// buffer fills that line spans.
struct LineLengthGuard<R> {
    inner: R,
    stopped: bool,
    current_line_len: usize,
}

impl<R: BufRead> LineLengthGuard<R> {
    fn new(inner: R) -> Self {
        Self { inner, stopped: false, current_line_len: 0 }
    }
}

impl<R: BufRead> std::io::Read for LineLengthGuard<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.stopped {
            return Ok(0);
        }
        let available = self.inner.fill_buf()?;
        if available.is_empty() {
            return Ok(0);
        }
        let n = available.len().min(buf.len());
        let chunk = &available[..n];

        match chunk.iter().position(|&b| b == b'\n') {
            Some(nl) => self.current_line_len = chunk.len() - nl - 1,
            None => self.current_line_len += chunk.len(),
        }
        if self.current_line_len > MAX_LINE_LEN {
            warn!("line exceeds {MAX_LINE_LEN} bytes, stopping read");
            self.stopped = true;
            return Ok(0);
        }

        buf[..n].copy_from_slice(chunk);
        self.inner.consume(n);
        Ok(n)
    }
}

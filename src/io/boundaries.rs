//! # Intron/exon boundary table reader
//!
//! Parses the known-splice-boundary table used by the annotator to flag
//! candidate junctions as novel or already-known.
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::{
    interner::Interner,
    io::decompress,
    model::{BoundaryRecord, Direction},
};

const MIN_FIELDS: usize = 13;
/// Literal separator between the two positions packed into field 12, e.g.
/// `"1000--2400"`.
const POSITION_SEPARATOR: &str = "--";

/// Read the boundary table at `path`. Rows are kept in file order (no
/// post-read sort): the annotator scans them linearly.
pub fn read_boundaries(path: &Path, interner: &mut Interner) -> Result<Vec<BoundaryRecord>> {
    let reader = decompress::open_input(path)
        .with_context(|| format!("Error reading from file {}", path.display()))?;
    let mut csv = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut boundaries = Vec::new();
    for result in csv.records() {
        let record = match result {
            Ok(record) => record,
            Err(_) => break,
        };
        if record.len() < MIN_FIELDS {
            break;
        }

        let id1 = interner.intern(&record[0]);
        let id2 = interner.intern(&record[1]);
        let chromosome = interner.intern(&record[2]);
        let strand = Direction::from_char(
            record[3]
                .trim()
                .chars()
                .next()
                .with_context(|| format!("empty strand field in {}", path.display()))?,
        )?;
        let length: i64 = record[11]
            .trim()
            .parse()
            .with_context(|| format!("bad length field in {}", path.display()))?;

        let (position1, position2) = match record[12].split_once(POSITION_SEPARATOR) {
            Some((a, b)) => (
                a.trim().parse().unwrap_or(0),
                b.trim().parse().unwrap_or(0),
            ),
            None => (0, 0),
        };

        boundaries.push(BoundaryRecord {
            id1,
            id2,
            chromosome,
            strand,
            length,
            position1,
            position2,
        });
    }

    Ok(boundaries)
}

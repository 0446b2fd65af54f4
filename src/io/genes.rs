//! # Gene table reader
//!
//! Parses a refFlat-style table of known transcripts into [`KnownGeneRecord`]
//! rows, used by the matcher to annotate candidate junctions with a
//! containing gene.
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::{
    interner::Interner,
    io::decompress,
    model::{Direction, KnownGeneRecord},
};

const MIN_FIELDS: usize = 11;

/// Read the gene table at `path`, sorted by `(chromosome, position1)` so
/// that the matcher's first-match gene lookup is deterministic.
pub fn read_genes(path: &Path, interner: &mut Interner) -> Result<Vec<KnownGeneRecord>> {
    let reader = decompress::open_input(path)
        .with_context(|| format!("Error reading from file {}", path.display()))?;
    let mut csv = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut genes = Vec::new();
    for result in csv.records() {
        let record = match result {
            Ok(record) => record,
            Err(_) => break,
        };
        if record.len() < MIN_FIELDS {
            break;
        }

        let gene = interner.intern(&record[0]);
        let transcript = interner.intern(&record[1]);
        let chromosome = interner.intern(&record[2]);
        let strand = Direction::from_char(
            record[3]
                .trim()
                .chars()
                .next()
                .with_context(|| format!("empty strand field in {}", path.display()))?,
        )?;
        let mut position1: i64 = record[4]
            .trim()
            .parse()
            .with_context(|| format!("bad position1 field in {}", path.display()))?;
        let mut position2: i64 = record[5]
            .trim()
            .parse()
            .with_context(|| format!("bad position2 field in {}", path.display()))?;
        if position1 > position2 {
            std::mem::swap(&mut position1, &mut position2);
        }

        genes.push(KnownGeneRecord {
            gene,
            transcript,
            chromosome,
            strand,
            position1,
            position2,
        });
    }

    genes.sort_by_key(|g| (g.chromosome.0, g.position1));
    Ok(genes)
}

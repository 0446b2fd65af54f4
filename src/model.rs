//! # Data model
//!
//! Record types shared across readers, matcher, clusterer, and annotator.
//! All interned strings are owned by the [`crate::interner::Interner`] and
//! outlive every record that carries a [`Sym`] handle to them.
use anyhow::{bail, Result};

use crate::interner::Sym;

/// Which half of a split read a [`HalfAlignment`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    L,
    R,
}

impl Side {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'L' => Ok(Side::L),
            'R' => Ok(Side::R),
            other => bail!("unrecognized half-alignment side '{other}'"),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::L => Side::R,
            Side::R => Side::L,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Side::L => 'L',
            Side::R => 'R',
        }
    }
}

/// Strand/alignment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Plus,
    Minus,
}

impl Direction {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '+' => Ok(Direction::Plus),
            '-' => Ok(Direction::Minus),
            other => bail!("unrecognized strand direction '{other}'"),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Direction::Plus => '+',
            Direction::Minus => '-',
        }
    }
}

/// One half-alignment record: an alignment of one contiguous prefix or
/// suffix of an unaligned read against the reference.
#[derive(Debug, Clone)]
pub struct HalfAlignment {
    pub id: Sym,
    pub side: Side,
    pub length: i64,
    pub total_read_length: i64,
    pub direction: Direction,
    pub chromosome: Sym,
    pub position: i64,
    /// Position of the piece's end nearest the (putative) splice.
    pub split_pos: i64,
    pub half_key: Sym,
    pub other_half_key: Sym,
}

impl HalfAlignment {
    /// Position the side that touches the splice would fall at.
    ///
    /// (L,+) and (R,-) put the matched end *after* the aligned piece;
    /// (R,+) and (L,-) put it at the piece's start position as given.
    pub fn compute_split_pos(side: Side, direction: Direction, position: i64, length: i64) -> i64 {
        if (side == Side::L && direction == Direction::Plus)
            || (side == Side::R && direction == Direction::Minus)
        {
            position + length
        } else {
            position
        }
    }
}

/// Min/max observed piece length for a given `id‖side` half-key, accumulated
/// as halves are read. Immutable once ingest completes.
#[derive(Debug, Clone, Copy)]
pub struct HalfStats {
    pub min_length: i64,
    pub max_length: i64,
}

impl HalfStats {
    pub fn new(length: i64) -> Self {
        Self {
            min_length: length,
            max_length: length,
        }
    }

    pub fn observe(&mut self, length: i64) {
        if length < self.min_length {
            self.min_length = length;
        }
        if length > self.max_length {
            self.max_length = length;
        }
    }
}

/// A row from the gene table (refFlat-style). `position1 <= position2` is
/// enforced at read time.
#[derive(Debug, Clone)]
pub struct KnownGeneRecord {
    pub gene: Sym,
    pub transcript: Sym,
    pub chromosome: Sym,
    pub strand: Direction,
    pub position1: i64,
    pub position2: i64,
}

/// A row from the intron/exon boundary table.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub id1: Sym,
    pub id2: Sym,
    pub chromosome: Sym,
    pub strand: Direction,
    pub length: i64,
    pub position1: i64,
    pub position2: i64,
}

/// A candidate splice junction emitted by the matcher and then mutated in
/// place by the clusterer (support counts, endpoints, report flags).
#[derive(Debug, Clone)]
pub struct CandidateJunction {
    pub id: Sym,
    pub chromosome: Sym,
    pub direction: Direction,
    pub position_smaller: i64,
    pub position_larger: i64,
    pub min_small_support: i64,
    pub max_large_support: i64,
    pub num_support: usize,
    pub num_support_halves: usize,
    pub num_support_total: usize,
    pub gene_name: Sym,
    pub gene_unknown: bool,
    pub novel: bool,
    pub already_reported: bool,
    pub print: bool,
    pub left_length: i64,
}

impl CandidateJunction {
    pub fn splice_length(&self) -> i64 {
        self.position_larger - self.position_smaller
    }
}

/// Sentinel gene name used when no containing gene was found.
pub const UNFOUND_GENE: &str = "UNFOUND_";

/// Unresolved-placeholder name used in the `.results.splitPairs` dump for
/// orphan halves (they have no associated gene lookup).
pub const ORPHAN_GENE_PLACEHOLDER: &str = "???";

//! # Option Loader
//!
//! Parses the newline-per-field options file into a typed [`Options`]
//! configuration. Nine lines, in a fixed order; a legacy sample-read-length
//! field on line 3 is unused since read lengths are auto-detected upstream,
//! but is still consumed (and discarded) for backward compatibility with
//! existing options files.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

const EXPECTED_LINES: usize = 9;

#[derive(Debug, Clone)]
pub struct Options {
    pub sample_data_file: PathBuf,
    pub max_distance: i64,
    pub gene_table: PathBuf,
    pub boundary_table: PathBuf,
    pub min_splice_length: i64,
    pub support_pos_tolerance: i64,
    pub results_base_name: String,
    pub min_supporting_reads: usize,
}

impl Options {
    /// Built-in configuration used for smoke testing when no options file is
    /// given on the command line.
    pub fn defaults() -> Self {
        Options {
            sample_data_file: PathBuf::from("RSW_test.txt"),
            max_distance: 40_000,
            gene_table: PathBuf::from("refFlat.txt"),
            boundary_table: PathBuf::from("refFlat.txt.intronBoundary.exonsgaps"),
            min_splice_length: 2,
            support_pos_tolerance: 5,
            results_base_name: String::from("RSW_tst"),
            min_supporting_reads: 2,
        }
    }

    /// Load options from a file with exactly nine (or more, trailing lines
    /// ignored) newline-delimited fields, in a fixed order. Missing file or
    /// fewer than nine lines is fatal.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Could not open options file {}", path.display()))?;
        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("Error reading options file {}", path.display()))?;

        if lines.len() < EXPECTED_LINES {
            bail!(
                "Options file {} has {} line(s), expected at least {EXPECTED_LINES}",
                path.display(),
                lines.len()
            );
        }

        let parse_i64 = |field: &str, line_no: usize| -> Result<i64> {
            field
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Options file line {}: expected an integer, found {field:?}", line_no + 1))
        };

        Ok(Options {
            sample_data_file: PathBuf::from(&lines[0]),
            max_distance: parse_i64(&lines[1], 1)?,
            // lines[2] is the legacy sample-length field; read and discarded.
            gene_table: PathBuf::from(&lines[3]),
            boundary_table: PathBuf::from(&lines[4]),
            min_splice_length: parse_i64(&lines[5], 5)?,
            support_pos_tolerance: parse_i64(&lines[6], 6)?,
            results_base_name: lines[7].clone(),
            min_supporting_reads: parse_i64(&lines[8], 8)?.max(0) as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_smoke_test_values() {
        let opts = Options::defaults();
        assert_eq!(opts.max_distance, 40_000);
        assert_eq!(opts.min_splice_length, 2);
        assert_eq!(opts.support_pos_tolerance, 5);
        assert_eq!(opts.min_supporting_reads, 2);
    }

    #[test]
    fn loads_nine_line_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data.txt").unwrap();
        writeln!(file, "10000").unwrap();
        writeln!(file, "0").unwrap();
        writeln!(file, "genes.txt").unwrap();
        writeln!(file, "boundaries.txt").unwrap();
        writeln!(file, "3").unwrap();
        writeln!(file, "4").unwrap();
        writeln!(file, "base").unwrap();
        writeln!(file, "2").unwrap();

        let opts = Options::load_from_file(file.path()).unwrap();
        assert_eq!(opts.sample_data_file, PathBuf::from("data.txt"));
        assert_eq!(opts.max_distance, 10_000);
        assert_eq!(opts.gene_table, PathBuf::from("genes.txt"));
        assert_eq!(opts.boundary_table, PathBuf::from("boundaries.txt"));
        assert_eq!(opts.min_splice_length, 3);
        assert_eq!(opts.support_pos_tolerance, 4);
        assert_eq!(opts.results_base_name, "base");
        assert_eq!(opts.min_supporting_reads, 2);
    }

    #[test]
    fn too_few_lines_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data.txt").unwrap();
        writeln!(file, "10000").unwrap();

        assert!(Options::load_from_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Options::load_from_file("/nonexistent/path/options.txt").is_err());
    }
}

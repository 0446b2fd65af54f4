use std::{fs, io::Write, path::PathBuf};

use splitpairs::{options::Options, run};

fn write_lines(path: &PathBuf, lines: &[String]) {
    let mut file = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

fn half_row(id: &str, side: char, length: i64, total_len: i64, dir: char, chrom: &str, pos: i64) -> String {
    format!("{id}\t{side}\t{length}\t{total_len}\t{dir}\t{chrom}\t{pos}\t0\t0\t1")
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn base(&self, name: &str) -> String {
        self.path(name).to_str().unwrap().to_string()
    }
}

/// Two reads whose halves reconstruct the same 50bp splice at chr1:150-200
/// should cluster into a single printed junction with two supporting reads.
#[test]
fn two_supporting_reads_produce_one_printed_junction() {
    let fixture = Fixture::new();

    let halves_path = fixture.path("halves.txt");
    write_lines(
        &halves_path,
        &[
            half_row("r1", 'L', 50, 100, '+', "chr1", 100),
            half_row("r1", 'R', 50, 100, '+', "chr1", 200),
            half_row("r2", 'L', 50, 100, '+', "chr1", 100),
            half_row("r2", 'R', 50, 100, '+', "chr1", 200),
        ],
    );

    let genes_path = fixture.path("genes.txt");
    write_lines(&genes_path, &[]);
    let boundaries_path = fixture.path("boundaries.txt");
    write_lines(&boundaries_path, &[]);

    let options = Options {
        sample_data_file: halves_path,
        max_distance: 40_000,
        gene_table: genes_path,
        boundary_table: boundaries_path,
        min_splice_length: 2,
        support_pos_tolerance: 5,
        results_base_name: fixture.base("out"),
        min_supporting_reads: 2,
    };

    let stats = run(&options).unwrap();
    assert_eq!(stats.num_halves, 4);
    assert_eq!(stats.num_printed, 1);

    let results = fs::read_to_string(format!("{}.results.unknown", options.results_base_name)).unwrap();
    let mut lines = results.lines();
    assert!(lines.next().unwrap().starts_with("GeneName\t"));
    let row = lines.next().unwrap();
    let fields: Vec<&str> = row.split('\t').collect();
    assert_eq!(fields[0], "UNFOUND_");
    assert_eq!(fields[1], "chr1");
    assert_eq!(fields[2], "2"); // numSupport
    assert_eq!(fields[5], "50"); // splice length
    assert_eq!(fields[6], "150--200"); // range of supporting reads
    assert!(lines.next().is_none());
}

/// A single unmatched read never reaches the minimum supporting-read count
/// and is not printed.
#[test]
fn single_read_is_not_printed() {
    let fixture = Fixture::new();

    let halves_path = fixture.path("halves.txt");
    write_lines(
        &halves_path,
        &[
            half_row("r1", 'L', 50, 100, '+', "chr1", 100),
            half_row("r1", 'R', 50, 100, '+', "chr1", 200),
        ],
    );
    let genes_path = fixture.path("genes.txt");
    write_lines(&genes_path, &[]);
    let boundaries_path = fixture.path("boundaries.txt");
    write_lines(&boundaries_path, &[]);

    let options = Options {
        sample_data_file: halves_path,
        max_distance: 40_000,
        gene_table: genes_path,
        boundary_table: boundaries_path,
        min_splice_length: 2,
        support_pos_tolerance: 5,
        results_base_name: fixture.base("out"),
        min_supporting_reads: 2,
    };

    let stats = run(&options).unwrap();
    assert_eq!(stats.num_candidates, 1);
    assert_eq!(stats.num_printed, 0);
}

/// Halves whose combined length doesn't match the read's total length are
/// never paired into a candidate junction.
#[test]
fn length_mismatch_is_skipped() {
    let fixture = Fixture::new();

    let halves_path = fixture.path("halves.txt");
    write_lines(
        &halves_path,
        &[
            half_row("r1", 'L', 40, 100, '+', "chr1", 100),
            half_row("r1", 'R', 50, 100, '+', "chr1", 200),
        ],
    );
    let genes_path = fixture.path("genes.txt");
    write_lines(&genes_path, &[]);
    let boundaries_path = fixture.path("boundaries.txt");
    write_lines(&boundaries_path, &[]);

    let options = Options {
        sample_data_file: halves_path,
        max_distance: 40_000,
        gene_table: genes_path,
        boundary_table: boundaries_path,
        min_splice_length: 2,
        support_pos_tolerance: 5,
        results_base_name: fixture.base("out"),
        min_supporting_reads: 2,
    };

    let stats = run(&options).unwrap();
    assert_eq!(stats.num_candidates, 0);
}

/// A junction annotated with a containing gene lands in `.results`, not
/// `.results.unknown`, and is not flagged novel when the boundary table
/// already documents it.
#[test]
fn gene_annotated_known_junction() {
    let fixture = Fixture::new();

    let halves_path = fixture.path("halves.txt");
    write_lines(
        &halves_path,
        &[
            half_row("r1", 'L', 50, 100, '+', "chr1", 100),
            half_row("r1", 'R', 50, 100, '+', "chr1", 200),
            half_row("r2", 'L', 50, 100, '+', "chr1", 100),
            half_row("r2", 'R', 50, 100, '+', "chr1", 200),
        ],
    );
    let genes_path = fixture.path("genes.txt");
    write_lines(
        &genes_path,
        &[
            "MYGENE\tMYGENE-001\tchr1\t+\t0\t1000\tx\tx\tx\tx\tx".to_string(),
        ],
    );
    let boundaries_path = fixture.path("boundaries.txt");
    write_lines(
        &boundaries_path,
        &[
            "b1\tb1\tchr1\t+\tx\tx\tx\tx\tx\tx\tx\t50\t150--200".to_string(),
        ],
    );

    let options = Options {
        sample_data_file: halves_path,
        max_distance: 40_000,
        gene_table: genes_path,
        boundary_table: boundaries_path,
        min_splice_length: 2,
        support_pos_tolerance: 5,
        results_base_name: fixture.base("out"),
        min_supporting_reads: 2,
    };

    run(&options).unwrap();

    let known = fs::read_to_string(format!("{}.results", options.results_base_name)).unwrap();
    let row = known.lines().nth(1).unwrap();
    assert!(row.starts_with("MYGENE\t"));
    assert!(row.ends_with("*"), "expected known junction not flagged novel: {row}");

    let unknown = fs::read_to_string(format!("{}.results.unknown", options.results_base_name)).unwrap();
    assert_eq!(unknown.lines().count(), 1);
}

/// `.results.splitPairs` carries both a printed junction row and an orphan
/// half-alignment row, each in the spec's literal 10-column format.
#[test]
fn split_pairs_emits_junction_and_orphan_rows() {
    let fixture = Fixture::new();

    let halves_path = fixture.path("halves.txt");
    write_lines(
        &halves_path,
        &[
            half_row("r1", 'L', 50, 100, '+', "chr1", 100),
            half_row("r1", 'R', 50, 100, '+', "chr1", 200),
            half_row("r2", 'L', 50, 100, '+', "chr1", 100),
            half_row("r2", 'R', 50, 100, '+', "chr1", 200),
            half_row("r3", 'L', 20, 100, '+', "chr1", 50),
        ],
    );
    let genes_path = fixture.path("genes.txt");
    write_lines(&genes_path, &[]);
    let boundaries_path = fixture.path("boundaries.txt");
    write_lines(&boundaries_path, &[]);

    let options = Options {
        sample_data_file: halves_path,
        max_distance: 40_000,
        gene_table: genes_path,
        boundary_table: boundaries_path,
        min_splice_length: 2,
        support_pos_tolerance: 5,
        results_base_name: fixture.base("out"),
        min_supporting_reads: 2,
    };

    run(&options).unwrap();

    let split_pairs = fs::read_to_string(format!("{}.results.splitPairs", options.results_base_name)).unwrap();
    let mut lines = split_pairs.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Id\tGene\tChr\t# Supporting reads\t# Supporting halves\t# Supporting total\tLength\tSplice region\tSupporting splice range\tLeft side length"
    );

    let orphan_row = lines.next().unwrap();
    let fields: Vec<&str> = orphan_row.split('\t').collect();
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[0], "r3");
    assert_eq!(fields[1], "???");
    assert_eq!(fields[3], "0");
    assert_eq!(fields[4], "0");
    assert_eq!(fields[5], "0");
    assert_eq!(fields[6], "0");
    assert_eq!(fields[7], "50-70");
    assert_eq!(fields[8], "0-0");
    assert_eq!(fields[9], "20 L +");

    let junction_row = lines.next().unwrap();
    let fields: Vec<&str> = junction_row.split('\t').collect();
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[2], "chr1");
    assert_eq!(fields[3], "2"); // numSupport
    assert_eq!(fields[6], "50"); // splice length
    assert_eq!(fields[7], "150-200"); // splice region, single dash
    assert_eq!(fields[8], "150-200"); // supporting splice range, single dash

    assert!(lines.next().is_none());
}

#[test]
fn cli_runs_with_default_options_against_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("splitpairs").unwrap();
    cmd.current_dir(tmp.path());
    cmd.assert().failure();
}

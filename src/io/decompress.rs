//! # Transparent decompression
//!
//! Readers accept `.gz` and `.lrz` inputs transparently by piping them
//! through an external decompressor process: `gunzip -c` for `.gz`,
//! `./lrunzip` for `.lrz`. Kept as an external-process pipeline (not
//! `flate2`) since `.lrz` has no Rust-native decoder in this ecosystem and
//! both formats are handled the same way for consistency.
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{Child, ChildStdout, Command, Stdio},
};

use anyhow::{Context, Result};

/// Name of the external binary used to decompress `.lrz` inputs. Relative
/// to the current working directory.
const LRUNZIP_BIN: &str = "./lrunzip";
const GUNZIP_BIN: &str = "gunzip";

/// A `BufRead` that owns the child process producing its bytes, so the pipe
/// stays open for the lifetime of the reader and the process is reaped on
/// drop rather than left as a zombie.
struct PipedReader {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl Read for PipedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for PipedReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.reader.fill_buf()
    }
    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

impl Drop for PipedReader {
    fn drop(&mut self) {
        let _ = self.child.wait();
    }
}

/// Open `path` for reading, decompressing on the fly if its extension
/// indicates a `.gz` or `.lrz` file. Missing file or decompressor spawn
/// failure surfaces as a read error.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let name = path.to_string_lossy();
    if name.ends_with(".gz") {
        return spawn_piped(Command::new(GUNZIP_BIN).arg("-c").arg(path), path);
    }
    if name.ends_with(".lrz") {
        let file = File::open(path)
            .with_context(|| format!("Could not open {} for decompression", path.display()))?;
        let mut cmd = Command::new(LRUNZIP_BIN);
        cmd.stdin(Stdio::from(file));
        return spawn_piped(&mut cmd, path);
    }

    let file = File::open(path).with_context(|| format!("Error reading from file {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn spawn_piped(cmd: &mut Command, path: &Path) -> Result<Box<dyn BufRead>> {
    let child = cmd
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn decompressor for {}", path.display()))?;
    let mut child = child;
    let stdout = child
        .stdout
        .take()
        .with_context(|| format!("Decompressor for {} produced no stdout pipe", path.display()))?;
    Ok(Box::new(PipedReader {
        child,
        reader: BufReader::new(stdout),
    }))
}

//! Bounded buffered file streams.
//!
//! Each input/output stream gets one `BufReader`/`BufWriter` with an explicit
//! capacity so the bytes in flight per stream stay fixed regardless of frame
//! sizes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Open `path` for reading behind a buffer of `cap` bytes.
pub fn bounded_from_path<P: AsRef<Path>>(path: P, cap: usize) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(cap, file))
}

/// Create (or truncate) `path` for writing behind a buffer of `cap` bytes.
pub fn bounded_to_path<P: AsRef<Path>>(path: P, cap: usize) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::with_capacity(cap, file))
}

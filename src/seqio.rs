//! Sequence I/O Module
//!
//! Buffered access to genome FASTA files, including gzip-compressed ones.
//! Readers are line-oriented because plasmid filtering needs the complete
//! header line, not just the record identifier.
//!
//! # Examples
//! ```no_run
//! use std::io::BufRead;
//! use taxsig::seqio::GenomeFile;
//!
//! // Read genome file (auto-detects gzip)
//! let mut reader = GenomeFile::open("GCF_000005845.2_ASM584v2_genomic.fna.gz").unwrap();
//! let mut line = String::new();
//! while reader.read_line(&mut line).unwrap() > 0 {
//!     // header or sequence line, trailing newline included
//!     line.clear();
//! }
//! ```

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Genome FASTA reader with automatic compression detection.
///
/// Files with a `.gz` extension are opened with gzip decompression;
/// all other files are opened as plain text.
pub enum GenomeFile {
    /// Plain text FASTA file.
    Plain(BufReader<File>),
    /// Gzip-compressed FASTA file.
    Gzipped(BufReader<MultiGzDecoder<File>>),
}

impl GenomeFile {
    /// Opens a genome file, selecting the reader by extension.
    ///
    /// # Arguments
    /// * `path` - Path to the FASTA file (plain or .gz)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open genome file: {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if ext == "gz" {
            let decoder = MultiGzDecoder::new(file);
            Ok(GenomeFile::Gzipped(BufReader::with_capacity(1024 * 1024, decoder)))
        } else {
            Ok(GenomeFile::Plain(BufReader::with_capacity(1024 * 1024, file)))
        }
    }
}

impl Read for GenomeFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            GenomeFile::Plain(r) => r.read(buf),
            GenomeFile::Gzipped(r) => r.read(buf),
        }
    }
}

impl BufRead for GenomeFile {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            GenomeFile::Plain(r) => r.fill_buf(),
            GenomeFile::Gzipped(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            GenomeFile::Plain(r) => r.consume(amt),
            GenomeFile::Gzipped(r) => r.consume(amt),
        }
    }
}

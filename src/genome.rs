//! Genome sequence assembly.
//!
//! A genome FASTA file holds one or more records: chromosomes, plasmids,
//! scaffolds. Plasmid records are excluded because their composition
//! reflects the mobile element rather than the host genome. The remaining
//! records are concatenated in file order and encoded as base-4 digits.

use crate::encode::{AmbiguousPolicy, base_to_digit};
use anyhow::Result;
use std::io::BufRead;

/// A genome reduced to base-4 digit segments.
///
/// Under `AmbiguousPolicy::Merge` there is at most one segment. Under
/// `AmbiguousPolicy::Break` each maximal run of unambiguous bases is its
/// own segment, and no k-mer window crosses a segment boundary.
#[derive(Debug, Default)]
pub struct EncodedGenome {
    pub segments: Vec<Vec<u8>>,
}

impl EncodedGenome {
    /// Total number of encoded bases across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Case-insensitive check for "plasmid" anywhere in a header line.
/// The match is intentionally loose; "megaplasmid" headers count too.
fn is_plasmid_header(line: &str) -> bool {
    line.to_ascii_lowercase().contains("plasmid")
}

/// Reads FASTA records, drops plasmid records and encodes the rest into
/// digit segments.
///
/// Sequence lines before any header are kept. Record boundaries do not
/// split segments; only ambiguous characters do, and only under
/// `AmbiguousPolicy::Break`. An empty result means the genome has no
/// usable sequence, which callers treat as a skip, not an error.
pub fn assemble<R: BufRead>(mut reader: R, policy: AmbiguousPolicy) -> Result<EncodedGenome> {
    let mut segments: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut in_plasmid = false;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        if line.starts_with('>') {
            in_plasmid = is_plasmid_header(&line);
            continue;
        }
        if in_plasmid {
            continue;
        }

        for &b in line.trim_end().as_bytes() {
            match base_to_digit(b) {
                Some(d) => current.push(d),
                None => {
                    if policy == AmbiguousPolicy::Break && !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    Ok(EncodedGenome { segments })
}

//! Signature Scoring Module
//!
//! Turns one genome's count tables into its signature: one score per
//! possible k-mer, ordered by index. A score is the negative log of the
//! conditional frequency of the k-mer's last base given its (k-1)-prefix,
//! so larger values mean rarer transitions. K-mers without evidence get a
//! sentinel instead of a computed value.
//!
//! # Output Format
//! One tab-separated row per genome, no header:
//! ```text
//! taxid<TAB>score_0<TAB>...<TAB>score_{4^k-1}
//! ```
//! Computed scores carry 4 decimal digits; the sentinel is written as the
//! bare literal `10`, which the 4-decimal format can never produce.

use crate::kmer::CountTables;
use anyhow::Result;
use std::fmt;
use std::io::Write;

/// Written when either the k-mer or its prefix was never observed. A
/// magic constant standing in for "maximally unlikely", well above any
/// score the data produces; not derived from the counts.
pub const UNOBSERVED_SENTINEL: &str = "10";

/// One cell of a signature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// -ln(kmer_count / prefix_count), both counts nonzero.
    LogOdds(f64),
    /// No evidence for this k-mer in the genome.
    Unobserved,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::LogOdds(v) => write!(f, "{:.4}", v),
            Score::Unobserved => f.write_str(UNOBSERVED_SENTINEL),
        }
    }
}

/// Scores every k-mer cell of `tables`, in index order.
pub fn score_vector(tables: &CountTables) -> Vec<Score> {
    (0..tables.kmer_cells())
        .map(|j| {
            let kmer = tables.kmer_count(j);
            let prefix = tables.parent_count(j);
            if kmer > 0 && prefix > 0 {
                Score::LogOdds(-((kmer as f64 / prefix as f64).ln()))
            } else {
                Score::Unobserved
            }
        })
        .collect()
}

/// Writes one database row: taxid, then every score, tab-separated and
/// newline-terminated. No trailing tab.
pub fn write_row<W: Write>(out: &mut W, taxid: u64, scores: &[Score]) -> Result<()> {
    write!(out, "{}", taxid)?;
    for score in scores {
        write!(out, "\t{}", score)?;
    }
    writeln!(out)?;
    Ok(())
}

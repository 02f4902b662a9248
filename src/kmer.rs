//! K-mer Counting Module
//!
//! Counts k-mers and their (k-1)-prefixes over both strands of an encoded
//! genome. Counts live in a pair of fixed-size tables indexed by the
//! base-4 value of the window, first digit most significant, so the table
//! layout is the emission order of the signature vector.
//!
//! # Tables
//! - k-mer table: 4^k cells, one per possible k-mer
//! - prefix table: 4^(k-1) cells; the parent of k-mer `j` is `j >> 2`
//!
//! Every window increments exactly one cell in each table, so the prefix
//! table totals the window count, not the (k-1)-mer occurrences.

use crate::encode::reverse_complement;
use crate::genome::EncodedGenome;

/// Largest supported k-mer size. The paired tables hold 4^k + 4^(k-1)
/// u64 cells, about 160 MB at k=12; in-memory tables stop being the
/// right tool beyond that.
pub const MAX_K: usize = 12;

/// Reusable pair of count tables for one k-mer size.
///
/// Allocated once and cleared between genomes, so peak memory stays at
/// O(4^k) no matter how many genomes a run processes.
pub struct CountTables {
    k: usize,
    mask: u64,
    kmers: Vec<u64>,
    prefixes: Vec<u64>,
}

impl CountTables {
    /// Allocates zeroed tables for k-mer size `k`.
    ///
    /// `k` must be in `1..=MAX_K`.
    pub fn new(k: usize) -> Self {
        assert!((1..=MAX_K).contains(&k), "k-mer size out of range: {}", k);
        Self {
            k,
            mask: (1u64 << (2 * k)) - 1,
            kmers: vec![0; 4usize.pow(k as u32)],
            prefixes: vec![0; 4usize.pow(k as u32 - 1)],
        }
    }

    /// Number of k-mer cells (4^k), which is also the signature length.
    pub fn kmer_cells(&self) -> usize {
        self.kmers.len()
    }

    /// Zeroes both tables so the allocation can be reused for the next
    /// genome.
    pub fn clear(&mut self) {
        self.kmers.fill(0);
        self.prefixes.fill(0);
    }

    /// Count of the k-mer with base-4 value `idx`.
    pub fn kmer_count(&self, idx: usize) -> u64 {
        self.kmers[idx]
    }

    /// Count of the (k-1)-prefix that is the parent of k-mer `idx`.
    pub fn parent_count(&self, idx: usize) -> u64 {
        self.prefixes[idx >> 2]
    }

    /// Accumulates counts from both strands of `genome`. Segments are
    /// tabulated independently; no window spans a segment boundary.
    pub fn tabulate_genome(&mut self, genome: &EncodedGenome) {
        for segment in &genome.segments {
            self.tabulate_segment(segment);
            self.tabulate_segment(&reverse_complement(segment));
        }
    }

    /// Counts every k-length window of one digit segment.
    ///
    /// The window index is a rolling base-4 value: shift in the next
    /// digit, mask back to k digits. Dropping the last digit (`idx >> 2`)
    /// leaves the value of the window's first k-1 digits, so both tables
    /// are updated from the same index.
    fn tabulate_segment(&mut self, segment: &[u8]) {
        if segment.len() < self.k {
            return;
        }

        let mut idx = 0u64;
        for (i, &d) in segment.iter().enumerate() {
            idx = ((idx << 2) | u64::from(d)) & self.mask;
            if i + 1 >= self.k {
                self.kmers[idx as usize] += 1;
                self.prefixes[(idx >> 2) as usize] += 1;
            }
        }
    }
}

//! Nucleotide encoding.
//!
//! Sequences are handled as dense base-4 digit streams: A=0, T=1, C=2, G=3,
//! case-insensitive. Characters outside the four standard bases have no
//! digit; what happens to them is the caller's `AmbiguousPolicy`.

/// How to treat characters that have no base-4 digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousPolicy {
    /// Drop the character; its neighbours become adjacent, so k-mer
    /// windows may span the dropped position.
    Merge,
    /// Drop the character and split the stream; no window crosses the
    /// dropped position.
    Break,
}

impl AmbiguousPolicy {
    /// Policy name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            AmbiguousPolicy::Merge => "merge",
            AmbiguousPolicy::Break => "break",
        }
    }
}

/// Returns the base-4 digit for a nucleotide, or None for anything else.
#[inline]
pub fn base_to_digit(b: u8) -> Option<u8> {
    match b {
        b'A' | b'a' => Some(0),
        b'T' | b't' => Some(1),
        b'C' | b'c' => Some(2),
        b'G' | b'g' => Some(3),
        _ => None,
    }
}

/// Watson-Crick complement on digits: A<->T is 0<->1, C<->G is 2<->3.
#[inline]
pub fn complement(digit: u8) -> u8 {
    digit ^ 1
}

/// Reverse complement of a digit sequence.
pub fn reverse_complement(digits: &[u8]) -> Vec<u8> {
    digits.iter().rev().map(|&d| complement(d)).collect()
}

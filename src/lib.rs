//! taxsig - K-mer Composition Signature Databases
//!
//! Builds reference signature databases for composition-based metagenomic
//! classification. Every reference genome is reduced to one fixed-length
//! vector of Markov-normalized k-mer scores computed over both strands,
//! keyed by taxonomy ID.
//!
//! # Modules
//! - `seqio`: Genome FASTA I/O with gzip support
//! - `encode`: Base-4 nucleotide encoding and reverse complement
//! - `genome`: Sequence assembly with plasmid filtering
//! - `kmer`: K-mer and prefix count tables
//! - `signature`: Log-odds scoring and row output
//! - `mapping`: Accession-to-taxid map loading
//! - `db`: Database build driver

pub mod seqio;
pub mod encode;
pub mod genome;
pub mod kmer;
pub mod signature;
pub mod mapping;
pub mod db;

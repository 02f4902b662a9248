//! Database Build Driver
//!
//! Walks the accession-to-taxid mapping in load order, locates each
//! genome's FASTA file, assembles and encodes the sequence, counts k-mers
//! over both strands, scores the signature and streams one row per genome
//! to the output file.
//!
//! # Pipeline
//! 1. Locate genome file under `{fasta_dir}/{accession}/`
//! 2. Assemble non-plasmid records into an encoded genome
//! 3. Tabulate both strands into the reused count tables
//! 4. Score and write the row
//!
//! Missing genome files and empty sequences warn and skip; the row order
//! always matches the mapping order. With more than one thread, genomes
//! are processed in chunks with per-worker count tables and rows are
//! written in order after each chunk.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::encode::AmbiguousPolicy;
use crate::genome::{self, EncodedGenome};
use crate::kmer::CountTables;
use crate::mapping::TaxidMapping;
use crate::seqio::GenomeFile;
use crate::signature::{score_vector, write_row};

/// Genome file suffixes recognized under an accession directory.
const GENOME_SUFFIXES: &[&str] = &["_genomic.fna", "_genomic.fna.gz"];

/// Settings for one database build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub kmer_size: usize,
    pub policy: AmbiguousPolicy,
    pub threads: usize,
    pub verbose: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            kmer_size: 6,
            policy: AmbiguousPolicy::Merge,
            threads: 1,
            verbose: false,
        }
    }
}

/// Totals reported after a build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Finds the genome FASTA for an accession.
///
/// Files live at `{fasta_dir}/{accession}/` and end in `_genomic.fna` or
/// `_genomic.fna.gz`. When several match, the lexicographically first is
/// taken so reruns pick the same file.
pub fn find_genome_fasta(fasta_dir: &Path, accession: &str) -> Option<PathBuf> {
    let dir = fasta_dir.join(accession);
    let entries = std::fs::read_dir(&dir).ok()?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| GENOME_SUFFIXES.iter().any(|s| n.ends_with(s)))
                .unwrap_or(false)
        })
        .collect();

    candidates.sort();
    candidates.into_iter().next()
}

/// Locates and assembles one genome. `Ok(None)` means skip: either no
/// genome file was found or nothing survived plasmid filtering and
/// encoding. Both cases warn on stderr. Read failures on a located file
/// are fatal.
fn load_encoded_genome(
    fasta_dir: &Path,
    accession: &str,
    policy: AmbiguousPolicy,
) -> Result<Option<EncodedGenome>> {
    let path = match find_genome_fasta(fasta_dir, accession) {
        Some(p) => p,
        None => {
            eprintln!("Warning: no FASTA file found for {}", accession);
            return Ok(None);
        }
    };

    let reader = GenomeFile::open(&path)?;
    let genome = genome::assemble(reader, policy)
        .with_context(|| format!("Failed to read genome file: {}", path.display()))?;

    if genome.is_empty() {
        eprintln!("Warning: empty sequence for {}", accession);
        return Ok(None);
    }

    Ok(Some(genome))
}

/// Builds the signature database: one row per mapped genome, in mapping
/// order, written to `output_path`.
pub fn build(
    mappings: &[TaxidMapping],
    fasta_dir: &Path,
    output_path: &Path,
    config: &BuildConfig,
) -> Result<BuildSummary> {
    let start = Instant::now();

    eprintln!("Building signature database...");
    eprintln!("  Genomes: {}", mappings.len());
    eprintln!(
        "  K-mer size: {} ({} scores per row)",
        config.kmer_size,
        4usize.pow(config.kmer_size as u32)
    );
    eprintln!("  Ambiguous bases: {}", config.policy.name());
    eprintln!("  Threads: {}", config.threads);
    eprintln!("  Output: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let mut output = BufWriter::with_capacity(4 * 1024 * 1024, file);

    let summary = if config.threads > 1 {
        build_parallel(mappings, fasta_dir, &mut output, config)?
    } else {
        build_sequential(mappings, fasta_dir, &mut output, config)?
    };

    output
        .flush()
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    eprintln!("\n=== Signature Database Complete ===");
    eprintln!("  Rows written: {}", summary.written);
    eprintln!("  Genomes skipped: {}", summary.skipped);
    eprintln!("  Time: {:.1}s", start.elapsed().as_secs_f64());

    Ok(summary)
}

fn build_sequential<W: Write>(
    mappings: &[TaxidMapping],
    fasta_dir: &Path,
    output: &mut W,
    config: &BuildConfig,
) -> Result<BuildSummary> {
    let mut tables = CountTables::new(config.kmer_size);
    let mut summary = BuildSummary::default();

    for (i, mapping) in mappings.iter().enumerate() {
        match load_encoded_genome(fasta_dir, &mapping.accession, config.policy)? {
            Some(genome) => {
                if config.verbose {
                    eprintln!(
                        "  [{}/{}] {} ({} bases)",
                        i + 1,
                        mappings.len(),
                        mapping.accession,
                        genome.len()
                    );
                }
                tables.clear();
                tables.tabulate_genome(&genome);
                let scores = score_vector(&tables);
                write_row(output, mapping.taxid, &scores).context("Failed to write output row")?;
                summary.written += 1;
            }
            None => summary.skipped += 1,
        }
    }

    Ok(summary)
}

fn build_parallel<W: Write>(
    mappings: &[TaxidMapping],
    fasta_dir: &Path,
    output: &mut W,
    config: &BuildConfig,
) -> Result<BuildSummary> {
    // Set rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()
        .ok(); // Ignore if already set

    let mut summary = BuildSummary::default();
    let mut done = 0usize;

    // At most chunk_size finished rows are held before the writer drains
    // them, so buffering stays proportional to the worker count.
    let chunk_size = config.threads * 4;

    for chunk in mappings.chunks(chunk_size) {
        let rows: Vec<Result<Option<Vec<u8>>>> = chunk
            .par_iter()
            .map_init(
                || CountTables::new(config.kmer_size),
                |tables, mapping| -> Result<Option<Vec<u8>>> {
                    let genome =
                        match load_encoded_genome(fasta_dir, &mapping.accession, config.policy)? {
                            Some(g) => g,
                            None => return Ok(None),
                        };
                    tables.clear();
                    tables.tabulate_genome(&genome);
                    let scores = score_vector(tables);
                    let mut row = Vec::with_capacity(scores.len() * 8);
                    write_row(&mut row, mapping.taxid, &scores)?;
                    Ok(Some(row))
                },
            )
            .collect();

        for row in rows {
            match row? {
                Some(row) => {
                    output.write_all(&row).context("Failed to write output row")?;
                    summary.written += 1;
                }
                None => summary.skipped += 1,
            }
        }

        done += chunk.len();
        if config.verbose {
            eprintln!("  {} / {} genomes processed", done, mappings.len());
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_genome(root: &Path, accession: &str, name: &str, fasta: &str) {
        let dir = root.join(accession);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), fasta).unwrap();
    }

    fn mapping(accession: &str, taxid: u64) -> TaxidMapping {
        TaxidMapping { accession: accession.to_string(), taxid }
    }

    #[test]
    fn test_find_genome_fasta() {
        let dir = tempfile::tempdir().unwrap();
        write_genome(dir.path(), "GCF_1", "GCF_1_ASM1_genomic.fna", ">c\nACGT\n");
        let found = find_genome_fasta(dir.path(), "GCF_1").unwrap();
        assert!(found.ends_with("GCF_1/GCF_1_ASM1_genomic.fna"));
        assert!(find_genome_fasta(dir.path(), "GCF_MISSING").is_none());
    }

    #[test]
    fn test_find_genome_fasta_takes_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_genome(dir.path(), "GCF_1", "b_genomic.fna", ">c\nAAAA\n");
        write_genome(dir.path(), "GCF_1", "a_genomic.fna", ">c\nCCCC\n");
        let found = find_genome_fasta(dir.path(), "GCF_1").unwrap();
        assert!(found.ends_with("GCF_1/a_genomic.fna"));
    }

    #[test]
    fn test_find_genome_fasta_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_genome(dir.path(), "GCF_1", "assembly_report.txt", "not fasta");
        write_genome(dir.path(), "GCF_1", "GCF_1_genomic.fna.gz", "");
        let found = find_genome_fasta(dir.path(), "GCF_1").unwrap();
        assert!(found.to_str().unwrap().ends_with("_genomic.fna.gz"));
    }

    #[test]
    fn test_build_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("genomes");
        write_genome(&root, "GCF_1", "GCF_1_v1_genomic.fna", ">chr\nATCG\n");
        write_genome(&root, "GCF_2", "GCF_2_v1_genomic.fna", ">p plasmid only\nATCG\n");
        let out = dir.path().join("db.tsv");

        let mappings = vec![
            mapping("GCF_1", 562),
            mapping("GCF_MISSING", 100),
            mapping("GCF_2", 200),
        ];

        let config = BuildConfig { kmer_size: 2, ..Default::default() };
        let summary = build(&mappings, &root, &out, &config).unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 2);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);

        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 17); // taxid + 16 scores
        assert_eq!(fields[0], "562");
        // ATCG over both strands: computed cells at indices 1, 6, 11, 12
        for (j, field) in fields[1..].iter().enumerate() {
            match j {
                1 | 6 | 11 | 12 => assert_eq!(*field, "-0.0000"),
                _ => assert_eq!(*field, "10"),
            }
        }
        assert!(!lines[0].ends_with('\t'));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_build_reads_gzipped_genomes() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write as _;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("genomes");
        let gdir = root.join("GCF_1");
        fs::create_dir_all(&gdir).unwrap();
        let file = fs::File::create(gdir.join("GCF_1_genomic.fna.gz")).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(b">chr\nATCG\n").unwrap();
        enc.finish().unwrap();

        let out = dir.path().join("db.tsv");
        let config = BuildConfig { kmer_size: 2, ..Default::default() };
        let summary = build(&[mapping("GCF_1", 9)], &root, &out, &config).unwrap();
        assert_eq!(summary.written, 1);
        assert!(fs::read_to_string(&out).unwrap().starts_with("9\t"));
    }

    #[test]
    fn test_reruns_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("genomes");
        write_genome(&root, "GCF_1", "GCF_1_genomic.fna", ">c\nATTACGGCAT\n");
        write_genome(&root, "GCF_2", "GCF_2_genomic.fna", ">c\nGGCATTACAA\n");

        let mappings = vec![mapping("GCF_1", 1), mapping("GCF_2", 2)];
        let config = BuildConfig { kmer_size: 3, ..Default::default() };

        let out1 = dir.path().join("run1.tsv");
        let out2 = dir.path().join("run2.tsv");
        build(&mappings, &root, &out1, &config).unwrap();
        build(&mappings, &root, &out2, &config).unwrap();
        assert_eq!(fs::read(&out1).unwrap(), fs::read(&out2).unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("genomes");
        for i in 0..6 {
            let fasta = format!(">chr{}\n{}\n", i, "ACGTTGCA".repeat(i + 1));
            write_genome(
                &root,
                &format!("GCF_{}", i),
                &format!("GCF_{}_genomic.fna", i),
                &fasta,
            );
        }
        let mappings: Vec<TaxidMapping> =
            (0..6).map(|i| mapping(&format!("GCF_{}", i), 1000 + i as u64)).collect();

        let seq_out = dir.path().join("seq.tsv");
        let par_out = dir.path().join("par.tsv");
        let mut config = BuildConfig { kmer_size: 2, ..Default::default() };
        build(&mappings, &root, &seq_out, &config).unwrap();
        config.threads = 3;
        build(&mappings, &root, &par_out, &config).unwrap();
        assert_eq!(fs::read(&seq_out).unwrap(), fs::read(&par_out).unwrap());
    }

    #[test]
    fn test_empty_mapping_builds_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("db.tsv");
        let config = BuildConfig::default();
        let summary = build(&[], dir.path(), &out, &config).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }
}

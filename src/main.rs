mod db;
mod encode;
mod genome;
mod kmer;
mod mapping;
mod seqio;
mod signature;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use db::BuildConfig;
use encode::AmbiguousPolicy;
use kmer::MAX_K;

fn parse_kmer_size(s: &str) -> Result<usize, String> {
    let val: usize = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(1..=MAX_K).contains(&val) {
        Err(format!("K-mer size must be between 1 and {}, got {}", MAX_K, val))
    } else {
        Ok(val)
    }
}

fn parse_ambiguous_policy(s: &str) -> Result<AmbiguousPolicy, String> {
    match s {
        "merge" => Ok(AmbiguousPolicy::Merge),
        "break" => Ok(AmbiguousPolicy::Break),
        _ => Err(format!("Ambiguous-base policy must be 'merge' or 'break', got '{}'", s)),
    }
}

#[derive(Parser)]
#[command(name = "taxsig")]
#[command(version)]
#[command(about = "Build k-mer composition signature databases for metagenomic classification")]
#[command(long_about = r#"
taxsig - k-mer composition signature database builder

Reduces each reference genome to a fixed-length vector of Markov-normalized
k-mer scores computed over both strands, and writes one TSV row per genome:
the taxonomy ID followed by 4^k scores.

WORKFLOW:
  taxid map (JSON) + genome FASTA directory → signature vectors (TSV)

Genomes are processed in taxid-map order, so reruns produce identical
output. Plasmid records are excluded; a k-mer without evidence in a
genome scores the fixed sentinel 10.

INPUT LAYOUT:
  Genome files are expected at {fasta-dir}/{accession}/*_genomic.fna
  (plain or gzip-compressed).

EXAMPLES:
  # Default k=6 database
  taxsig -m assemblies.json -f genomes/ -o db_vectors.tsv

  # Smaller vectors, 8 worker threads
  taxsig -m assemblies.json -f genomes/ -k 4 -t 8 -o db_k4.tsv
"#)]
struct Args {
    #[arg(short = 'm', long = "taxid-map", value_name = "FILE", help_heading = "Input")]
    taxid_map: PathBuf,

    #[arg(short = 'f', long = "fasta-dir", value_name = "DIR", help_heading = "Input")]
    fasta_dir: PathBuf,

    #[arg(short = 'o', long, value_name = "FILE", default_value = "db_vectors.tsv", help_heading = "Output")]
    output: PathBuf,

    #[arg(short = 'k', long = "kmer-size", value_name = "SIZE",
          default_value = "6", value_parser = parse_kmer_size, help_heading = "Signature")]
    kmer_size: usize,

    #[arg(long = "ambiguous-bases", value_name = "POLICY",
          default_value = "merge", value_parser = parse_ambiguous_policy, help_heading = "Signature")]
    ambiguous_bases: AmbiguousPolicy,

    #[arg(short = 't', long, value_name = "NUM", default_value = "1", help_heading = "Runtime")]
    threads: usize,

    #[arg(short = 'v', long, help_heading = "Runtime")]
    verbose: bool,
}

fn main() -> Result<()> {
    let mut args = Args::parse();

    if args.threads == 0 {
        args.threads = num_cpus::get();
    }

    let mappings = mapping::load_taxid_map(&args.taxid_map)?;
    if mappings.is_empty() {
        eprintln!("Warning: no usable entries in {}", args.taxid_map.display());
    } else if args.verbose {
        eprintln!("Loaded {} genome mappings from {}", mappings.len(), args.taxid_map.display());
    }

    let config = BuildConfig {
        kmer_size: args.kmer_size,
        policy: args.ambiguous_bases,
        threads: args.threads,
        verbose: args.verbose,
    };

    db::build(&mappings, &args.fasta_dir, &args.output, &config)?;

    Ok(())
}

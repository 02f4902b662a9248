//! Accession-to-Taxid Mapping Module
//!
//! Loads the JSON document that pairs assembly accessions with taxonomy
//! IDs. Exports of these summaries disagree on field names, so each field
//! has a prioritized list of accepted keys. Load order is preserved and
//! defines the processing order of the database build.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Accepted accession field names, highest priority first.
const ACCESSION_KEYS: &[&str] = &["accession", "Assembly Accession", "assembly_accession"];

/// Accepted taxid field names, highest priority first.
const TAXID_KEYS: &[&str] = &["taxId", "Taxonomy id", "Taxonomy ID", "taxid"];

/// One genome to process: assembly accession and its taxonomy ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxidMapping {
    pub accession: String,
    pub taxid: u64,
}

/// Loads the accession-to-taxid mapping, preserving first-seen order.
///
/// A duplicate accession keeps its original position but takes the later
/// entry's taxid. Entries without a usable accession or taxid are dropped
/// silently. A document that does not parse as a JSON array is fatal.
pub fn load_taxid_map(path: &Path) -> Result<Vec<TaxidMapping>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read taxid map: {}", path.display()))?;
    let doc: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse taxid map JSON: {}", path.display()))?;

    let entries = match doc.as_array() {
        Some(arr) => arr,
        None => anyhow::bail!("Taxid map must be a JSON array: {}", path.display()),
    };

    let mut mappings: Vec<TaxidMapping> = Vec::with_capacity(entries.len());
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for entry in entries {
        let accession = match first_string(entry, ACCESSION_KEYS) {
            Some(a) => a,
            None => continue,
        };
        let taxid = match first_taxid(entry, TAXID_KEYS) {
            Some(t) => t,
            None => continue,
        };

        match index.get(&accession) {
            Some(&pos) => mappings[pos].taxid = taxid,
            None => {
                index.insert(accession.clone(), mappings.len());
                mappings.push(TaxidMapping { accession, taxid });
            }
        }
    }

    Ok(mappings)
}

/// First value under `keys` that is a nonempty string.
fn first_string(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        entry
            .get(k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First value under `keys` that holds an integer, either as a JSON
/// number or as a numeric string.
fn first_taxid(entry: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| parse_taxid(entry.get(k)?))
}

fn parse_taxid(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

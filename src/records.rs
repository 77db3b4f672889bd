//! Row-level entities reconstructed from the peptide and protein-group exports.
//!
//! Multi-valued columns are split on `;` once, at parse time. Within one record
//! the protein name, description and gene name sequences line up positionally,
//! and blank slots are kept as empty strings.

use serde::Serialize;

/// One row of the peptide table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeptideRecord {
    /// Peptide sequence, unique within one search
    pub sequence: String,
    pub protein_names: Vec<String>,
    pub descriptions: Vec<String>,
    pub gene_names: Vec<String>,
    /// Number of PSMs supporting this peptide
    pub match_count: u64,
    /// Peptide-level q-value, lower is more confident
    pub quality_score: f64,
    pub best_filename: String,
    pub best_scan_id: String,
}

/// A protein merged from every peptide row that names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProteinRecord {
    pub name: String,
    pub description: String,
    pub gene_name: String,
    pub match_count: u64,
    /// Supporting peptides in encounter order. Not deduplicated.
    pub peptide_sequences: Vec<String>,
}

/// One row of the protein-group table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinGroupRecord {
    pub protein_names: Vec<String>,
    pub descriptions: Vec<String>,
    pub gene_names: Vec<String>,
    pub match_count: u64,
    pub peptide_sequences: Vec<String>,
    /// Protein-level q-value
    pub quality_score: f64,
}

impl ProteinGroupRecord {
    /// The member names joined the way the export writes them.
    pub fn label(&self) -> String {
        self.protein_names.join(";")
    }

    pub fn contains_protein(&self, name: &str) -> bool {
        !name.is_empty() && self.protein_names.iter().any(|member| member == name)
    }
}

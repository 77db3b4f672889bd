//! Collapse per-peptide protein mentions into one record per protein.

use crate::records::{PeptideRecord, ProteinRecord};

/// One (protein, peptide) pair as it appears in the peptide table, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinPeptideAssociation<'a> {
    pub protein_name: &'a str,
    pub description: &'a str,
    pub gene_name: &'a str,
    pub match_count: u64,
    pub peptide_sequence: &'a str,
}

/// Every (protein, description, gene name) triple of every peptide, paired
/// with that peptide. The protein name column decides the count: a missing or
/// blank annotation slot yields an empty description or gene name, and a blank
/// name slot yields nothing.
pub fn associations(
    peptides: &[PeptideRecord],
) -> impl Iterator<Item = ProteinPeptideAssociation<'_>> {
    peptides.iter().flat_map(|peptide| {
        // Rows carry a single sequence; anything after a separator is dropped.
        let sequence = peptide
            .sequence
            .split(crate::parser::MULTI_VALUE_SEPARATOR)
            .next()
            .unwrap_or_default()
            .trim();
        peptide
            .protein_names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(move |(slot, protein_name)| ProteinPeptideAssociation {
                protein_name,
                description: slot_or_blank(&peptide.descriptions, slot),
                gene_name: slot_or_blank(&peptide.gene_names, slot),
                match_count: peptide.match_count,
                peptide_sequence: sequence,
            })
    })
}

fn slot_or_blank(values: &[String], slot: usize) -> &str {
    values.get(slot).map(String::as_str).unwrap_or_default()
}

/// Merge all associations sharing a protein name. Output is sorted by name
/// (ordinal, case-sensitive). Description and gene name come from the first
/// association of each run.
pub fn merge_proteins(peptides: &[PeptideRecord]) -> Vec<ProteinRecord> {
    let mut pending = associations(peptides).collect::<Vec<_>>();
    pending.sort_by(|a, b| a.protein_name.cmp(b.protein_name));

    let mut merged: Vec<ProteinRecord> = Vec::new();
    for association in pending {
        match merged.last_mut() {
            Some(current) if current.name == association.protein_name => {
                current.match_count += association.match_count;
                current
                    .peptide_sequences
                    .push(association.peptide_sequence.to_string());
            }
            _ => merged.push(ProteinRecord {
                name: association.protein_name.to_string(),
                description: association.description.to_string(),
                gene_name: association.gene_name.to_string(),
                match_count: association.match_count,
                peptide_sequences: vec![association.peptide_sequence.to_string()],
            }),
        }
    }
    merged
}

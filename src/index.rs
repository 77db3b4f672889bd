//! Bidirectional group/protein/peptide mappings for one search.
//!
//! Entities are addressed by their position in the collections the index was
//! built from. Each forward map is derived from the records, and each reverse
//! map is its transpose, so the pairs stay mutually consistent. Neighbour sets
//! keep insertion order, which makes traversal deterministic.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::error::ChaparralError;
use crate::records::{PeptideRecord, ProteinGroupRecord, ProteinRecord};

pub type Neighbours = IndexSet<usize>;

#[derive(Debug, Clone, Default)]
pub struct RelationalIndex {
    group_to_proteins: Vec<Neighbours>,
    protein_to_groups: Vec<Neighbours>,
    group_to_peptides: Vec<Neighbours>,
    peptide_to_groups: Vec<Neighbours>,
    protein_to_peptides: Vec<Neighbours>,
    peptide_to_proteins: Vec<Neighbours>,
    protein_by_name: HashMap<String, usize>,
    peptide_by_sequence: HashMap<String, usize>,
}

impl RelationalIndex {
    /// Fails on the first name or sequence that does not resolve. Blank
    /// references are skipped.
    pub fn build(
        groups: &[ProteinGroupRecord],
        proteins: &[ProteinRecord],
        peptides: &[PeptideRecord],
    ) -> Result<Self, ChaparralError> {
        let protein_by_name = key_positions(proteins.iter().map(|p| p.name.as_str()), "protein");
        let peptide_by_sequence =
            key_positions(peptides.iter().map(|p| p.sequence.as_str()), "peptide");

        let mut group_to_proteins = Vec::with_capacity(groups.len());
        let mut group_to_peptides = Vec::with_capacity(groups.len());
        for group in groups {
            let members = group
                .protein_names
                .iter()
                .filter(|name| !name.is_empty())
                .map(|name| {
                    protein_by_name.get(name).copied().ok_or_else(|| {
                        ChaparralError::UnresolvedProtein {
                            name: name.clone(),
                            referenced_by: format!("protein group {}", group.label()),
                        }
                    })
                })
                .collect::<Result<Neighbours, _>>()?;
            let evidence = group
                .peptide_sequences
                .iter()
                .filter(|sequence| !sequence.is_empty())
                .map(|sequence| {
                    peptide_by_sequence.get(sequence).copied().ok_or_else(|| {
                        ChaparralError::UnresolvedPeptide {
                            sequence: sequence.clone(),
                            referenced_by: format!("protein group {}", group.label()),
                        }
                    })
                })
                .collect::<Result<Neighbours, _>>()?;
            group_to_proteins.push(members);
            group_to_peptides.push(evidence);
        }

        let peptide_to_proteins = peptides
            .iter()
            .map(|peptide| {
                peptide
                    .protein_names
                    .iter()
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        protein_by_name.get(name).copied().ok_or_else(|| {
                            ChaparralError::UnresolvedProtein {
                                name: name.clone(),
                                referenced_by: format!("peptide {}", peptide.sequence),
                            }
                        })
                    })
                    .collect::<Result<Neighbours, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let protein_to_groups = transpose(&group_to_proteins, proteins.len());
        let peptide_to_groups = transpose(&group_to_peptides, peptides.len());
        let protein_to_peptides = transpose(&peptide_to_proteins, proteins.len());

        debug!(
            groups = groups.len(),
            proteins = proteins.len(),
            peptides = peptides.len(),
            "built relational index"
        );

        Ok(Self {
            group_to_proteins,
            protein_to_groups,
            group_to_peptides,
            peptide_to_groups,
            protein_to_peptides,
            peptide_to_proteins,
            protein_by_name,
            peptide_by_sequence,
        })
    }

    pub(crate) fn proteins_of_group(&self, group: usize) -> &Neighbours {
        &self.group_to_proteins[group]
    }

    pub(crate) fn groups_of_protein(&self, protein: usize) -> &Neighbours {
        &self.protein_to_groups[protein]
    }

    pub(crate) fn peptides_of_group(&self, group: usize) -> &Neighbours {
        &self.group_to_peptides[group]
    }

    pub(crate) fn groups_of_peptide(&self, peptide: usize) -> &Neighbours {
        &self.peptide_to_groups[peptide]
    }

    pub(crate) fn peptides_of_protein(&self, protein: usize) -> &Neighbours {
        &self.protein_to_peptides[protein]
    }

    pub(crate) fn proteins_of_peptide(&self, peptide: usize) -> &Neighbours {
        &self.peptide_to_proteins[peptide]
    }

    pub fn protein_position(&self, name: &str) -> Option<usize> {
        self.protein_by_name.get(name).copied()
    }

    pub fn peptide_position(&self, sequence: &str) -> Option<usize> {
        self.peptide_by_sequence.get(sequence).copied()
    }

    /// Whether every reverse map is exactly the transpose of its forward map.
    pub fn is_consistent(&self) -> bool {
        is_transpose(&self.group_to_proteins, &self.protein_to_groups)
            && is_transpose(&self.group_to_peptides, &self.peptide_to_groups)
            && is_transpose(&self.peptide_to_proteins, &self.protein_to_peptides)
    }
}

fn key_positions<'a>(keys: impl Iterator<Item = &'a str>, kind: &str) -> HashMap<String, usize> {
    let mut positions = HashMap::new();
    for (position, key) in keys.enumerate() {
        match positions.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(position);
            }
            Entry::Occupied(first) => {
                warn!(
                    key,
                    kind,
                    first = *first.get(),
                    duplicate = position,
                    "duplicate key, keeping first occurrence"
                );
            }
        }
    }
    positions
}

fn transpose(forward: &[Neighbours], targets: usize) -> Vec<Neighbours> {
    let mut reverse = vec![Neighbours::new(); targets];
    for (source, neighbours) in forward.iter().enumerate() {
        for &target in neighbours {
            reverse[target].insert(source);
        }
    }
    reverse
}

fn is_transpose(forward: &[Neighbours], reverse: &[Neighbours]) -> bool {
    let forward_ok = forward.iter().enumerate().all(|(source, neighbours)| {
        neighbours
            .iter()
            .all(|&target| reverse.get(target).is_some_and(|back| back.contains(&source)))
    });
    let reverse_ok = reverse.iter().enumerate().all(|(target, neighbours)| {
        neighbours
            .iter()
            .all(|&source| forward.get(source).is_some_and(|fwd| fwd.contains(&target)))
    });
    forward_ok && reverse_ok
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::merge::merge_proteins;

    fn peptide(sequence: &str, proteins: &[&str]) -> PeptideRecord {
        PeptideRecord {
            sequence: sequence.to_string(),
            protein_names: proteins.iter().map(|v| v.to_string()).collect(),
            descriptions: proteins.iter().map(|v| format!("{v} desc")).collect(),
            gene_names: proteins.iter().map(|v| format!("{v} gene")).collect(),
            match_count: 1,
            quality_score: 0.01,
            best_filename: "file".to_string(),
            best_scan_id: "scan".to_string(),
        }
    }

    fn group(proteins: &[&str], peptides: &[&str]) -> ProteinGroupRecord {
        ProteinGroupRecord {
            protein_names: proteins.iter().map(|v| v.to_string()).collect(),
            descriptions: Vec::new(),
            gene_names: Vec::new(),
            match_count: 1,
            peptide_sequences: peptides.iter().map(|v| v.to_string()).collect(),
            quality_score: 0.001,
        }
    }

    #[test]
    fn maps_are_mutual_transposes() {
        let peptides = vec![
            peptide("AAA", &["P1", "P2"]),
            peptide("CCC", &["P2"]),
            peptide("DDD", &["P3"]),
        ];
        let proteins = merge_proteins(&peptides);
        let groups = vec![
            group(&["P1", "P2"], &["AAA", "CCC"]),
            group(&["P2", "P3"], &["CCC", "DDD"]),
        ];
        let index = RelationalIndex::build(&groups, &proteins, &peptides).unwrap();
        assert!(index.is_consistent());

        for g in 0..groups.len() {
            for p in 0..proteins.len() {
                assert_eq!(
                    index.proteins_of_group(g).contains(&p),
                    index.groups_of_protein(p).contains(&g)
                );
            }
            for q in 0..peptides.len() {
                assert_eq!(
                    index.peptides_of_group(g).contains(&q),
                    index.groups_of_peptide(q).contains(&g)
                );
            }
        }
        for q in 0..peptides.len() {
            for p in 0..proteins.len() {
                assert_eq!(
                    index.proteins_of_peptide(q).contains(&p),
                    index.peptides_of_protein(p).contains(&q)
                );
            }
        }

        let p2 = index.protein_position("P2").unwrap();
        assert_eq!(index.groups_of_protein(p2).len(), 2);
    }

    #[test]
    fn unknown_group_member_is_fatal() {
        let peptides = vec![peptide("AAA", &["P1"])];
        let proteins = merge_proteins(&peptides);
        let groups = vec![group(&["P1", "MISSING"], &["AAA"])];
        let err = RelationalIndex::build(&groups, &proteins, &peptides).unwrap_err();
        assert_matches!(
            err,
            ChaparralError::UnresolvedProtein { name, .. } if name == "MISSING"
        );
    }

    #[test]
    fn unknown_group_peptide_is_fatal() {
        let peptides = vec![peptide("AAA", &["P1"])];
        let proteins = merge_proteins(&peptides);
        let groups = vec![group(&["P1"], &["AAA", "ZZZ"])];
        let err = RelationalIndex::build(&groups, &proteins, &peptides).unwrap_err();
        assert_matches!(
            err,
            ChaparralError::UnresolvedPeptide { sequence, .. } if sequence == "ZZZ"
        );
    }

    #[test]
    fn lookups_are_exact() {
        let peptides = vec![peptide("AAA", &["P1"])];
        let proteins = merge_proteins(&peptides);
        let index = RelationalIndex::build(&[], &proteins, &peptides).unwrap();
        assert_eq!(index.protein_position("P1"), Some(0));
        assert_eq!(index.protein_position("p1"), None);
        assert_eq!(index.peptide_position("AAA"), Some(0));
        assert_eq!(index.peptide_position("AAA "), None);
    }

    #[test]
    fn blank_references_are_skipped() {
        let peptides = vec![peptide("AAA", &["P1", ""])];
        let proteins = merge_proteins(&peptides);
        let groups = vec![group(&["P1", ""], &["AAA", ""])];
        let index = RelationalIndex::build(&groups, &proteins, &peptides).unwrap();
        assert_eq!(index.proteins_of_group(0).len(), 1);
        assert_eq!(index.peptides_of_group(0).len(), 1);
        assert_eq!(index.proteins_of_peptide(0).len(), 1);
        assert!(index.is_consistent());
    }

    #[test]
    fn duplicate_sequences_resolve_to_first() {
        let peptides = vec![peptide("AAA", &["P1"]), peptide("AAA", &["P2"])];
        let proteins = merge_proteins(&peptides);
        let index = RelationalIndex::build(&[], &proteins, &peptides).unwrap();
        assert_eq!(index.peptide_position("AAA"), Some(0));
        assert!(index.is_consistent());
    }
}

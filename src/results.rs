//! The result graph of one finished search.

use std::cell::OnceCell;

use tracing::{debug, info};

use crate::client::SearchClient;
use crate::domain::SearchId;
use crate::error::ChaparralError;
use crate::index::RelationalIndex;
use crate::merge::merge_proteins;
use crate::models::SearchResultMetadata;
use crate::parser::{parse_peptides, parse_protein_groups};
use crate::records::{PeptideRecord, ProteinGroupRecord, ProteinRecord};
use crate::views::{PeptideView, ProteinGroupView, ProteinView};

/// Protein groups, proteins and peptides of one search, with the relations
/// between them. Built once, read-only afterwards. PSM-level detail stays
/// remote and is fetched through the client on demand.
pub struct SearchResults<C: SearchClient> {
    client: C,
    search_id: SearchId,
    groups: Vec<ProteinGroupRecord>,
    proteins: Vec<ProteinRecord>,
    peptides: Vec<PeptideRecord>,
    index: RelationalIndex,
    info: OnceCell<SearchResultMetadata>,
}

impl<C: SearchClient> SearchResults<C> {
    /// Download both tables of `search_id` and build the graph.
    pub fn new(client: C, search_id: SearchId) -> Result<Self, ChaparralError> {
        debug!(%search_id, "fetching peptide table");
        let peptide_csv = decode_table(client.fetch_peptide_csv(&search_id)?, "peptide")?;
        debug!(%search_id, "fetching protein group table");
        let proteins_csv = decode_table(client.fetch_proteins_csv(&search_id)?, "protein group")?;
        Self::from_tables(client, search_id, &peptide_csv, &proteins_csv)
    }

    /// Build the graph from table text already in hand.
    pub fn from_tables(
        client: C,
        search_id: SearchId,
        peptide_csv: &str,
        proteins_csv: &str,
    ) -> Result<Self, ChaparralError> {
        let peptides = parse_peptides(strip_bom(peptide_csv)).collect::<Result<Vec<_>, _>>()?;
        let groups =
            parse_protein_groups(strip_bom(proteins_csv)).collect::<Result<Vec<_>, _>>()?;
        let proteins = merge_proteins(&peptides);
        let index = RelationalIndex::build(&groups, &proteins, &peptides)?;

        info!(
            %search_id,
            groups = groups.len(),
            proteins = proteins.len(),
            peptides = peptides.len(),
            "search results loaded"
        );

        Ok(Self {
            client,
            search_id,
            groups,
            proteins,
            peptides,
            index,
            info: OnceCell::new(),
        })
    }

    pub fn search_id(&self) -> &SearchId {
        &self.search_id
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn index(&self) -> &RelationalIndex {
        &self.index
    }

    pub fn group_records(&self) -> &[ProteinGroupRecord] {
        &self.groups
    }

    pub fn protein_records(&self) -> &[ProteinRecord] {
        &self.proteins
    }

    pub fn peptide_records(&self) -> &[PeptideRecord] {
        &self.peptides
    }

    /// Search metadata, fetched on first use and kept for the lifetime of `self`.
    pub fn info(&self) -> Result<&SearchResultMetadata, ChaparralError> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }
        let fetched = self.client.get_search_result(&self.search_id)?;
        Ok(self.info.get_or_init(|| fetched))
    }

    pub fn protein_groups(&self) -> impl Iterator<Item = ProteinGroupView<'_, C>> {
        (0..self.groups.len()).map(move |position| ProteinGroupView::new(self, position))
    }

    pub fn proteins(&self) -> impl Iterator<Item = ProteinView<'_, C>> {
        (0..self.proteins.len()).map(move |position| ProteinView::new(self, position))
    }

    pub fn peptides(&self) -> impl Iterator<Item = PeptideView<'_, C>> {
        (0..self.peptides.len()).map(move |position| PeptideView::new(self, position))
    }

    pub fn protein(&self, name: &str) -> Result<ProteinView<'_, C>, ChaparralError> {
        self.index
            .protein_position(name)
            .map(|position| ProteinView::new(self, position))
            .ok_or_else(|| ChaparralError::ProteinNotFound(name.to_string()))
    }

    /// The first group, in table order, listing `member` among its proteins.
    pub fn protein_group(&self, member: &str) -> Result<ProteinGroupView<'_, C>, ChaparralError> {
        self.groups
            .iter()
            .position(|group| group.contains_protein(member))
            .map(|position| ProteinGroupView::new(self, position))
            .ok_or_else(|| ChaparralError::GroupNotFound(member.to_string()))
    }

    pub fn peptide(&self, sequence: &str) -> Result<PeptideView<'_, C>, ChaparralError> {
        self.index
            .peptide_position(sequence)
            .map(|position| PeptideView::new(self, position))
            .ok_or_else(|| ChaparralError::PeptideNotFound(sequence.to_string()))
    }
}

fn decode_table(bytes: Vec<u8>, table: &str) -> Result<String, ChaparralError> {
    String::from_utf8(bytes)
        .map_err(|err| ChaparralError::Decode(format!("{table} table is not UTF-8: {err}")))
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

use std::io::{self, Write};

use serde::Serialize;

use crate::client::SearchClient;
use crate::domain::QueryType;
use crate::models::{PsmRecord, SearchResultMetadata};
use crate::records::{PeptideRecord, ProteinGroupRecord, ProteinRecord};
use crate::results::SearchResults;
use crate::views::{PeptideView, ProteinGroupView, ProteinView};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub search_id: String,
    pub protein_groups: usize,
    pub proteins: usize,
    pub peptides: usize,
    pub total_psms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<SearchResultMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProteinReport {
    pub protein: ProteinRecord,
    pub protein_groups: Vec<String>,
    pub peptides: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: ProteinGroupRecord,
    pub proteins: Vec<String>,
    pub peptides: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeptideReport {
    pub peptide: PeptideRecord,
    pub protein_groups: Vec<String>,
    pub proteins: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PsmReport {
    pub query: String,
    pub query_type: QueryType,
    pub psms: Vec<PsmRecord>,
}

impl SummaryReport {
    pub fn new<C: SearchClient>(
        results: &SearchResults<C>,
        info: Option<SearchResultMetadata>,
    ) -> Self {
        Self {
            search_id: results.search_id().to_string(),
            protein_groups: results.group_records().len(),
            proteins: results.protein_records().len(),
            peptides: results.peptide_records().len(),
            total_psms: results.peptide_records().iter().map(|p| p.match_count).sum(),
            info,
        }
    }
}

impl ProteinReport {
    pub fn new<C: SearchClient>(view: ProteinView<'_, C>) -> Self {
        Self {
            protein: view.record().clone(),
            protein_groups: view.protein_groups().map(|g| g.record().label()).collect(),
            peptides: view
                .peptides()
                .map(|p| p.record().sequence.clone())
                .collect(),
        }
    }
}

impl GroupReport {
    pub fn new<C: SearchClient>(view: ProteinGroupView<'_, C>) -> Self {
        Self {
            group: view.record().clone(),
            proteins: view.proteins().map(|p| p.record().name.clone()).collect(),
            peptides: view
                .peptides()
                .map(|p| p.record().sequence.clone())
                .collect(),
        }
    }
}

impl PeptideReport {
    pub fn new<C: SearchClient>(view: PeptideView<'_, C>) -> Self {
        Self {
            peptide: view.record().clone(),
            protein_groups: view.protein_groups().map(|g| g.record().label()).collect(),
            proteins: view.proteins().map(|p| p.record().name.clone()).collect(),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_summary(report: &SummaryReport) {
        println!("search {}", report.search_id);
        if let Some(info) = &report.info {
            println!("  project: {} ({})", info.project_name, info.project_id);
            println!("  status:  {:?}", info.status);
            println!("  created: {}", info.created_at.to_rfc3339());
        }
        println!("  protein groups: {}", report.protein_groups);
        println!("  proteins:       {}", report.proteins);
        println!("  peptides:       {}", report.peptides);
        println!("  psms:           {}", report.total_psms);
    }

    pub fn print_protein(report: &ProteinReport) {
        let protein = &report.protein;
        println!(
            "{} {} [{}] psms={}",
            protein.name, protein.gene_name, protein.description, protein.match_count
        );
        print_list("protein groups", &report.protein_groups);
        print_list("peptides", &report.peptides);
    }

    pub fn print_group(report: &GroupReport) {
        let group = &report.group;
        println!(
            "{} psms={} q={}",
            group.label(),
            group.match_count,
            group.quality_score
        );
        print_list("proteins", &report.proteins);
        print_list("peptides", &report.peptides);
    }

    pub fn print_peptide(report: &PeptideReport) {
        let peptide = &report.peptide;
        println!(
            "{} psms={} q={} best={}#{}",
            peptide.sequence,
            peptide.match_count,
            peptide.quality_score,
            peptide.best_filename,
            peptide.best_scan_id
        );
        print_list("protein groups", &report.protein_groups);
        print_list("proteins", &report.proteins);
    }

    pub fn print_psms(report: &PsmReport) {
        println!(
            "{} {}: {} psms",
            report.query_type,
            report.query,
            report.psms.len()
        );
        for psm in &report.psms {
            println!(
                "  #{} {} {}:{} z={} exp={:.4} calc={:.4}",
                psm.psm_id,
                psm.peptide,
                psm.filename,
                psm.scannr,
                psm.charge,
                psm.expmass,
                psm.calcmass
            );
        }
    }
}

fn print_list(title: &str, values: &[String]) {
    println!("  {title} ({}):", values.len());
    for value in values {
        println!("    {value}");
    }
}

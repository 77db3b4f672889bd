//! Parse the peptide and protein-group CSV exports of a search
//!
//! Both tables are header-then-rows, comma separated, with positional columns.
//! Parsing is lazy: each call returns a fresh iterator over the same text, and
//! collecting into `Result<Vec<_>, _>` stops at the first malformed row.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::ChaparralError;
use crate::records::{PeptideRecord, ProteinGroupRecord};

pub const PEPTIDE_TABLE: &str = "peptide";
pub const PROTEIN_GROUP_TABLE: &str = "protein group";

/// `peptide, proteins, descriptions, gene_names, psms, peptide_q, best_filename, best_scannr`
pub const PEPTIDE_COLUMNS: usize = 8;
/// `proteins, descriptions, gene_names, psms, peptides, protein_q`
pub const PROTEIN_GROUP_COLUMNS: usize = 6;

/// Separator of multi-valued sub-fields inside one column.
pub const MULTI_VALUE_SEPARATOR: char = ';';

pub struct PeptideRows<'a> {
    rows: StringRecordsIntoIter<&'a [u8]>,
}

pub struct ProteinGroupRows<'a> {
    rows: StringRecordsIntoIter<&'a [u8]>,
}

pub fn parse_peptides(text: &str) -> PeptideRows<'_> {
    PeptideRows {
        rows: records(text),
    }
}

pub fn parse_protein_groups(text: &str) -> ProteinGroupRows<'_> {
    ProteinGroupRows {
        rows: records(text),
    }
}

impl Iterator for PeptideRows<'_> {
    type Item = Result<PeptideRecord, ChaparralError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            row.map_err(|err| csv_error(PEPTIDE_TABLE, err))
                .and_then(|row| peptide_from_row(&row)),
        )
    }
}

impl Iterator for ProteinGroupRows<'_> {
    type Item = Result<ProteinGroupRecord, ChaparralError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            row.map_err(|err| csv_error(PROTEIN_GROUP_TABLE, err))
                .and_then(|row| protein_group_from_row(&row)),
        )
    }
}

/// Split a `;`-joined column into trimmed sub-values.
///
/// Blank slots are kept: protein, description and gene name columns line up
/// by position, so `P1;P2` with genes `;G2` must leave `P1` without a gene.
/// Consumers skip empty keys when resolving names and sequences.
pub fn split_multi(value: &str) -> Vec<String> {
    value
        .split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .map(str::to_string)
        .collect()
}

fn records(text: &str) -> StringRecordsIntoIter<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        // Column counts are checked per row so the error names the table.
        .flexible(true)
        .from_reader(text.as_bytes())
        .into_records()
}

fn peptide_from_row(row: &StringRecord) -> Result<PeptideRecord, ChaparralError> {
    let row = Row::new(PEPTIDE_TABLE, row, PEPTIDE_COLUMNS)?;
    Ok(PeptideRecord {
        sequence: row.text(0).to_string(),
        protein_names: split_multi(row.text(1)),
        descriptions: split_multi(row.text(2)),
        gene_names: split_multi(row.text(3)),
        match_count: row.count(4, "psms")?,
        quality_score: row.score(5, "peptide_q")?,
        best_filename: row.text(6).to_string(),
        best_scan_id: row.text(7).to_string(),
    })
}

fn protein_group_from_row(row: &StringRecord) -> Result<ProteinGroupRecord, ChaparralError> {
    let row = Row::new(PROTEIN_GROUP_TABLE, row, PROTEIN_GROUP_COLUMNS)?;
    Ok(ProteinGroupRecord {
        protein_names: split_multi(row.text(0)),
        descriptions: split_multi(row.text(1)),
        gene_names: split_multi(row.text(2)),
        match_count: row.count(3, "psms")?,
        peptide_sequences: split_multi(row.text(4)),
        quality_score: row.score(5, "protein_q")?,
    })
}

struct Row<'r> {
    table: &'static str,
    line: u64,
    record: &'r StringRecord,
}

impl<'r> Row<'r> {
    fn new(
        table: &'static str,
        record: &'r StringRecord,
        expected: usize,
    ) -> Result<Self, ChaparralError> {
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        if record.len() != expected {
            return Err(ChaparralError::MalformedRow {
                table,
                line,
                message: format!("expected {expected} columns, found {}", record.len()),
            });
        }
        Ok(Self {
            table,
            line,
            record,
        })
    }

    fn text(&self, index: usize) -> &'r str {
        self.record.get(index).unwrap_or_default().trim()
    }

    fn count(&self, index: usize, column: &str) -> Result<u64, ChaparralError> {
        let value = self.text(index);
        value.parse::<u64>().map_err(|_| self.malformed(column, value))
    }

    fn score(&self, index: usize, column: &str) -> Result<f64, ChaparralError> {
        let value = self.text(index);
        value.parse::<f64>().map_err(|_| self.malformed(column, value))
    }

    fn malformed(&self, column: &str, value: &str) -> ChaparralError {
        ChaparralError::MalformedRow {
            table: self.table,
            line: self.line,
            message: format!("column {column} is not numeric: {value:?}"),
        }
    }
}

fn csv_error(table: &'static str, err: csv::Error) -> ChaparralError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    ChaparralError::MalformedRow {
        table,
        line,
        message: err.to_string(),
    }
}

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ChaparralError {
    #[error("invalid search id: {0}")]
    InvalidSearchId(String),

    #[error("invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("malformed {table} table at line {line}: {message}")]
    #[diagnostic(help("the exported table does not match the expected column layout"))]
    MalformedRow {
        table: &'static str,
        line: u64,
        message: String,
    },

    #[error("protein {name} referenced by {referenced_by} is missing from the protein table")]
    #[diagnostic(help("the peptide and protein-group exports are inconsistent"))]
    UnresolvedProtein { name: String, referenced_by: String },

    #[error("peptide {sequence} referenced by {referenced_by} is missing from the peptide table")]
    #[diagnostic(help("the peptide and protein-group exports are inconsistent"))]
    UnresolvedPeptide {
        sequence: String,
        referenced_by: String,
    },

    #[error("protein not found: {0}")]
    ProteinNotFound(String),

    #[error("no protein group contains protein: {0}")]
    GroupNotFound(String),

    #[error("peptide not found: {0}")]
    PeptideNotFound(String),

    #[error("search results request failed: {0}")]
    Http(String),

    #[error("search results service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no API token configured (set CHAPARRAL_TOKEN or add \"token\" to chaparral.json)")]
    MissingToken,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("remote lookups are unavailable: {0}")]
    Offline(String),
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchStatus {
    Failed,
    Succeeded,
    Submitted,
    Running,
    Runnable,
    Pending,
    Starting,
}

/// Metadata of one search job, as returned by `search_results/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultMetadata {
    pub id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub passing_psms: Option<u64>,
    #[serde(default)]
    pub passing_peptides: Option<u64>,
    #[serde(default)]
    pub passing_proteins: Option<u64>,
    #[serde(default)]
    pub input_files: Vec<String>,
    /// Search engine configuration, kept verbatim.
    #[serde(default)]
    pub params: Value,
    pub project_id: String,
    pub project_name: String,
    pub organization_id: String,
    pub job_id: String,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: SearchStatus,
    pub cpu: u32,
    pub memory: u64,
}

/// Signed download links for the artifacts of a finished search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultDownload {
    #[serde(rename = "config.json")]
    pub config_json: String,
    #[serde(rename = "matched_fragments.sage.parquet")]
    pub matched_fragments_parquet: String,
    #[serde(rename = "peptide.csv")]
    pub peptide_csv: String,
    #[serde(rename = "proteins.csv")]
    pub proteins_csv: String,
    #[serde(rename = "results.json")]
    pub results_json: String,
    #[serde(rename = "results.sage.parquet")]
    pub results_parquet: String,
}

/// One peptide-spectrum match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsmRecord {
    pub calcmass: f64,
    pub charge: i32,
    pub expmass: f64,
    pub filename: String,
    pub peptide: String,
    pub psm_id: i64,
    pub scannr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecord {
    pub intensity: f64,
    pub isolation_lower: f64,
    pub isolation_upper: f64,
    pub level: u8,
    pub mz: f64,
    pub precursor_charge: i32,
    pub precursor_mz: f64,
    pub precursor_scan: i64,
    pub rt: f64,
    pub scan: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub fragment_charge: i32,
    pub fragment_intensity: f64,
    pub fragment_mz_calculated: f64,
    pub fragment_mz_experimental: f64,
    pub fragment_ordinals: i32,
    pub fragment_type: String,
    pub psm_id: i64,
}

/// RFC 3339, or an ISO 8601 local time without offset, read as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|time| time.and_utc())
        })
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

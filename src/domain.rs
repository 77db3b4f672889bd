use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ChaparralError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchId(String);

impl SearchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SearchId {
    type Err = ChaparralError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        // Ids are interpolated into URL paths.
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(ChaparralError::InvalidSearchId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

/// Which kind of key a PSM query is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Protein,
    Peptide,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Protein => "protein",
            QueryType::Peptide => "peptide",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = ChaparralError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "protein" => Ok(QueryType::Protein),
            "peptide" => Ok(QueryType::Peptide),
            _ => Err(ChaparralError::InvalidQueryType(value.to_string())),
        }
    }
}

//! Typed access to Chaparral proteomics search results.
//!
//! [`SearchResults`] downloads the peptide and protein-group tables of a
//! finished search and rebuilds the relations between protein groups, merged
//! proteins and peptides. The views it hands out navigate those relations
//! locally and reach back to the service only for PSM, spectrum and fragment
//! detail.
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod merge;
pub mod models;
pub mod output;
pub mod parser;
pub mod records;
pub mod results;
pub mod views;

pub use client::{ChaparralHttpClient, SearchClient};
pub use error::ChaparralError;
pub use results::SearchResults;
pub use views::{PeptideView, ProteinGroupView, ProteinView, PsmView};

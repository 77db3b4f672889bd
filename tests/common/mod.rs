#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chaparral_results::client::SearchClient;
use chaparral_results::domain::{QueryType, SearchId};
use chaparral_results::error::ChaparralError;
use chaparral_results::models::{
    FragmentRecord, PsmRecord, SearchResultMetadata, SpectrumRecord,
};

pub const PEPTIDES: &str = "\
peptide,proteins,descriptions,gene_names,psms,peptide_q,best_filename,best_scannr
PEPA,PROT1;PROT2,DescA;DescB,GeneA;GeneB,5,0.01,file1,scan1
PEPB,PROT1,DescA,GeneA,3,0.02,file2,scan2
";

pub const PROTEIN_GROUPS: &str = "\
proteins,descriptions,gene_names,psms,peptides,protein_q
PROT1;PROT2,DescA;DescB,GeneA;GeneB,8,PEPA;PEPB,0.005
";

pub fn search_id() -> SearchId {
    "search-1".parse().unwrap()
}

pub fn psm(peptide: &str, psm_id: i64) -> PsmRecord {
    PsmRecord {
        calcmass: 1000.5,
        charge: 2,
        expmass: 1000.6,
        filename: format!("{peptide}.mzML"),
        peptide: peptide.to_string(),
        psm_id,
        scannr: format!("scan={psm_id}"),
    }
}

pub fn metadata() -> SearchResultMetadata {
    serde_json::from_value(serde_json::json!({
        "id": "search-1",
        "notes": null,
        "passing_psms": 8,
        "passing_peptides": 2,
        "passing_proteins": 2,
        "input_files": ["file1.mzML", "file2.mzML"],
        "params": {},
        "project_id": "project-1",
        "project_name": "Project",
        "organization_id": "org-1",
        "job_id": "job-1",
        "created_at": "2024-05-15T12:00:00Z",
        "started_at": "2024-05-15T12:01:00Z",
        "finished_at": "2024-05-15T12:30:00Z",
        "status": "SUCCEEDED",
        "cpu": 4,
        "memory": 8192
    }))
    .unwrap()
}

/// In-memory service that counts the requests it receives.
pub struct MockClient {
    pub peptide_csv: Vec<u8>,
    pub proteins_csv: Vec<u8>,
    pub psms: HashMap<String, Vec<PsmRecord>>,
    pub failing_peptides: Vec<String>,
    pub info_calls: AtomicUsize,
    pub psm_calls: AtomicUsize,
    pub spectra_requests: Mutex<Vec<(String, String)>>,
    pub annotation_requests: Mutex<Vec<i64>>,
}

impl MockClient {
    pub fn new(peptide_csv: &str, proteins_csv: &str) -> Self {
        Self {
            peptide_csv: peptide_csv.as_bytes().to_vec(),
            proteins_csv: proteins_csv.as_bytes().to_vec(),
            psms: HashMap::new(),
            failing_peptides: Vec::new(),
            info_calls: AtomicUsize::new(0),
            psm_calls: AtomicUsize::new(0),
            spectra_requests: Mutex::new(Vec::new()),
            annotation_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn example() -> Self {
        let mut client = Self::new(PEPTIDES, PROTEIN_GROUPS);
        client
            .psms
            .insert("PEPA".to_string(), vec![psm("PEPA", 1), psm("PEPA", 2)]);
        client.psms.insert("PEPB".to_string(), vec![psm("PEPB", 3)]);
        client
    }

    pub fn psm_calls(&self) -> usize {
        self.psm_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }
}

impl SearchClient for MockClient {
    fn fetch_peptide_csv(&self, _search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        Ok(self.peptide_csv.clone())
    }

    fn fetch_proteins_csv(&self, _search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        Ok(self.proteins_csv.clone())
    }

    fn get_search_result(
        &self,
        _search_id: &SearchId,
    ) -> Result<SearchResultMetadata, ChaparralError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(metadata())
    }

    fn get_peptide_results(
        &self,
        _search_id: &SearchId,
        query_id: &str,
        query_type: QueryType,
    ) -> Result<Vec<PsmRecord>, ChaparralError> {
        assert_eq!(query_type, QueryType::Peptide);
        self.psm_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_peptides.iter().any(|p| p == query_id) {
            return Err(ChaparralError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.psms.get(query_id).cloned().unwrap_or_default())
    }

    fn get_spectra(
        &self,
        _search_id: &SearchId,
        filename: &str,
        scan_id: &str,
    ) -> Result<Vec<SpectrumRecord>, ChaparralError> {
        self.spectra_requests
            .lock()
            .unwrap()
            .push((filename.to_string(), scan_id.to_string()));
        Ok(Vec::new())
    }

    fn get_psm_annotations(
        &self,
        _search_id: &SearchId,
        psm_id: i64,
    ) -> Result<Vec<FragmentRecord>, ChaparralError> {
        self.annotation_requests.lock().unwrap().push(psm_id);
        Ok(vec![FragmentRecord {
            fragment_charge: 1,
            fragment_intensity: 250.0,
            fragment_mz_calculated: 175.119,
            fragment_mz_experimental: 175.12,
            fragment_ordinals: 1,
            fragment_type: "y".to_string(),
            psm_id,
        }])
    }
}

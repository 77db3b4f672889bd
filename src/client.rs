use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientSettings;
use crate::domain::{QueryType, SearchId};
use crate::error::ChaparralError;
use crate::models::{
    FragmentRecord, PsmRecord, SearchResultDownload, SearchResultMetadata, SpectrumRecord,
};

const SEARCH_RESULTS_ENDPOINT: &str = "search_results";

/// Remote operations the result graph relies on.
pub trait SearchClient: Send + Sync {
    fn fetch_peptide_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError>;
    fn fetch_proteins_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError>;
    fn get_search_result(&self, search_id: &SearchId)
    -> Result<SearchResultMetadata, ChaparralError>;
    fn get_peptide_results(
        &self,
        search_id: &SearchId,
        query_id: &str,
        query_type: QueryType,
    ) -> Result<Vec<PsmRecord>, ChaparralError>;
    fn get_spectra(
        &self,
        search_id: &SearchId,
        filename: &str,
        scan_id: &str,
    ) -> Result<Vec<SpectrumRecord>, ChaparralError>;
    fn get_psm_annotations(
        &self,
        search_id: &SearchId,
        psm_id: i64,
    ) -> Result<Vec<FragmentRecord>, ChaparralError>;
}

impl<C: SearchClient + ?Sized> SearchClient for &C {
    fn fetch_peptide_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        (**self).fetch_peptide_csv(search_id)
    }

    fn fetch_proteins_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        (**self).fetch_proteins_csv(search_id)
    }

    fn get_search_result(
        &self,
        search_id: &SearchId,
    ) -> Result<SearchResultMetadata, ChaparralError> {
        (**self).get_search_result(search_id)
    }

    fn get_peptide_results(
        &self,
        search_id: &SearchId,
        query_id: &str,
        query_type: QueryType,
    ) -> Result<Vec<PsmRecord>, ChaparralError> {
        (**self).get_peptide_results(search_id, query_id, query_type)
    }

    fn get_spectra(
        &self,
        search_id: &SearchId,
        filename: &str,
        scan_id: &str,
    ) -> Result<Vec<SpectrumRecord>, ChaparralError> {
        (**self).get_spectra(search_id, filename, scan_id)
    }

    fn get_psm_annotations(
        &self,
        search_id: &SearchId,
        psm_id: i64,
    ) -> Result<Vec<FragmentRecord>, ChaparralError> {
        (**self).get_psm_annotations(search_id, psm_id)
    }
}

#[derive(Clone)]
pub struct ChaparralHttpClient {
    client: Client,
    /// Signed download links carry their own credentials.
    files: Client,
    base_url: Url,
}

impl ChaparralHttpClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ChaparralError> {
        let user_agent =
            HeaderValue::from_str(&format!("chaparral-results/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ChaparralError::Http(err.to_string()))?;
        let timeout = Duration::from_secs(settings.timeout_secs);
        let base_url = Url::parse(&settings.base_url).map_err(|err| {
            ChaparralError::Http(format!("invalid base url {}: {err}", settings.base_url))
        })?;

        let files = Client::builder()
            .user_agent(user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|err| ChaparralError::Http(err.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|err| ChaparralError::Http(err.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ChaparralError::Http(err.to_string()))?;
        Ok(Self {
            client,
            files,
            base_url,
        })
    }

    /// `{base}/search_results/{id}/{segments..}`, each segment percent-encoded.
    pub fn search_result_url(
        &self,
        search_id: &SearchId,
        segments: &[&str],
    ) -> Result<Url, ChaparralError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ChaparralError::Http(format!("base url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(SEARCH_RESULTS_ENDPOINT)
            .push(search_id.as_str())
            .extend(segments);
        Ok(url)
    }

    pub fn get_search_result_download(
        &self,
        search_id: &SearchId,
    ) -> Result<SearchResultDownload, ChaparralError> {
        self.get_json(self.search_result_url(search_id, &["download"])?)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ChaparralError> {
        debug!(%url, "GET");
        let response = Self::send(self.client.get(url))?;
        response
            .json()
            .map_err(|err| ChaparralError::Decode(err.to_string()))
    }

    fn fetch_file(&self, url: &str) -> Result<Vec<u8>, ChaparralError> {
        debug!(url, "GET file");
        let response = Self::send(self.files.get(url))?;
        let bytes = response
            .bytes()
            .map_err(|err| ChaparralError::Http(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn send(request: RequestBuilder) -> Result<Response, ChaparralError> {
        let response = request
            .send()
            .map_err(|err| ChaparralError::Http(err.to_string()))?;
        Self::handle_status(response)
    }

    fn handle_status(response: Response) -> Result<Response, ChaparralError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "search results request failed".to_string());
        Err(ChaparralError::Status { status, message })
    }
}

impl SearchClient for ChaparralHttpClient {
    fn fetch_peptide_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        let links = self.get_search_result_download(search_id)?;
        self.fetch_file(&links.peptide_csv)
    }

    fn fetch_proteins_csv(&self, search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        let links = self.get_search_result_download(search_id)?;
        self.fetch_file(&links.proteins_csv)
    }

    fn get_search_result(
        &self,
        search_id: &SearchId,
    ) -> Result<SearchResultMetadata, ChaparralError> {
        self.get_json(self.search_result_url(search_id, &[])?)
    }

    fn get_peptide_results(
        &self,
        search_id: &SearchId,
        query_id: &str,
        query_type: QueryType,
    ) -> Result<Vec<PsmRecord>, ChaparralError> {
        let url = self.search_result_url(search_id, &[query_type.as_str(), query_id])?;
        self.get_json(url)
    }

    fn get_spectra(
        &self,
        search_id: &SearchId,
        filename: &str,
        scan_id: &str,
    ) -> Result<Vec<SpectrumRecord>, ChaparralError> {
        let url = self.search_result_url(search_id, &[filename, scan_id, "mzparquet"])?;
        self.get_json(url)
    }

    fn get_psm_annotations(
        &self,
        search_id: &SearchId,
        psm_id: i64,
    ) -> Result<Vec<FragmentRecord>, ChaparralError> {
        let psm_id = psm_id.to_string();
        let url = self.search_result_url(search_id, &["psm_annotation", psm_id.as_str()])?;
        self.get_json(url)
    }
}

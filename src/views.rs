//! Navigable views over the result graph.
//!
//! A view is a record position plus a reference to the owning
//! [`SearchResults`]. Every traversal method returns a fresh iterator; nothing
//! is cached, so repeating a remote traversal repeats the requests.
//!
//! `psms()` on a group or protein issues one request per underlying peptide,
//! sequentially, as the iterator advances. Dropping the iterator stops it.

use std::fmt;

use crate::client::SearchClient;
use crate::domain::QueryType;
use crate::error::ChaparralError;
use crate::models::{FragmentRecord, PsmRecord, SpectrumRecord};
use crate::records::{PeptideRecord, ProteinGroupRecord, ProteinRecord};
use crate::results::SearchResults;

macro_rules! positional_view {
    ($view:ident, $record:ty, $records:ident, $label:literal, $key:expr) => {
        pub struct $view<'r, C: SearchClient> {
            results: &'r SearchResults<C>,
            position: usize,
        }

        impl<'r, C: SearchClient> $view<'r, C> {
            pub(crate) fn new(results: &'r SearchResults<C>, position: usize) -> Self {
                Self { results, position }
            }

            pub fn record(&self) -> &'r $record {
                &self.results.$records()[self.position]
            }

            /// Position of the record in its table.
            pub fn position(&self) -> usize {
                self.position
            }

            pub fn results(&self) -> &'r SearchResults<C> {
                self.results
            }
        }

        impl<C: SearchClient> Clone for $view<'_, C> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<C: SearchClient> Copy for $view<'_, C> {}

        impl<C: SearchClient> PartialEq for $view<'_, C> {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::eq(self.results, other.results) && self.position == other.position
            }
        }

        impl<C: SearchClient> Eq for $view<'_, C> {}

        impl<C: SearchClient> fmt::Display for $view<'_, C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let key: fn(&$record) -> String = $key;
                write!(f, "{}(\"{}\")", $label, key(self.record()))
            }
        }

        impl<C: SearchClient> fmt::Debug for $view<'_, C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

positional_view!(
    ProteinGroupView,
    ProteinGroupRecord,
    group_records,
    "ProteinGroup",
    |record| record.label()
);
positional_view!(
    ProteinView,
    ProteinRecord,
    protein_records,
    "Protein",
    |record| record.name.clone()
);
positional_view!(
    PeptideView,
    PeptideRecord,
    peptide_records,
    "Peptide",
    |record| record.sequence.clone()
);

impl<'r, C: SearchClient> ProteinGroupView<'r, C> {
    pub fn proteins(self) -> impl Iterator<Item = ProteinView<'r, C>> {
        let results = self.results;
        results
            .index()
            .proteins_of_group(self.position)
            .iter()
            .map(move |&position| ProteinView::new(results, position))
    }

    pub fn peptides(self) -> impl Iterator<Item = PeptideView<'r, C>> {
        let results = self.results;
        results
            .index()
            .peptides_of_group(self.position)
            .iter()
            .map(move |&position| PeptideView::new(results, position))
    }

    /// PSMs of every peptide in the group. One remote call per peptide.
    pub fn psms(self) -> impl Iterator<Item = Result<PsmView<'r, C>, ChaparralError>> {
        Psms::new(self.results, self.peptides())
    }
}

impl<'r, C: SearchClient> ProteinView<'r, C> {
    pub fn protein_groups(self) -> impl Iterator<Item = ProteinGroupView<'r, C>> {
        let results = self.results;
        results
            .index()
            .groups_of_protein(self.position)
            .iter()
            .map(move |&position| ProteinGroupView::new(results, position))
    }

    pub fn peptides(self) -> impl Iterator<Item = PeptideView<'r, C>> {
        let results = self.results;
        results
            .index()
            .peptides_of_protein(self.position)
            .iter()
            .map(move |&position| PeptideView::new(results, position))
    }

    /// PSMs of every peptide of the protein. One remote call per peptide.
    pub fn psms(self) -> impl Iterator<Item = Result<PsmView<'r, C>, ChaparralError>> {
        Psms::new(self.results, self.peptides())
    }
}

impl<'r, C: SearchClient> PeptideView<'r, C> {
    pub fn protein_groups(self) -> impl Iterator<Item = ProteinGroupView<'r, C>> {
        let results = self.results;
        results
            .index()
            .groups_of_peptide(self.position)
            .iter()
            .map(move |&position| ProteinGroupView::new(results, position))
    }

    pub fn proteins(self) -> impl Iterator<Item = ProteinView<'r, C>> {
        let results = self.results;
        results
            .index()
            .proteins_of_peptide(self.position)
            .iter()
            .map(move |&position| ProteinView::new(results, position))
    }

    /// Every PSM of this peptide sequence. The request is made on the first
    /// call to `next`.
    pub fn psms(self) -> impl Iterator<Item = Result<PsmView<'r, C>, ChaparralError>> {
        Psms::new(self.results, std::iter::once(self))
    }

    fn fetch_psms(&self) -> Result<Vec<PsmRecord>, ChaparralError> {
        self.results.client().get_peptide_results(
            self.results.search_id(),
            &self.record().sequence,
            QueryType::Peptide,
        )
    }
}

/// One peptide-spectrum match, as returned by the service.
pub struct PsmView<'r, C: SearchClient> {
    results: &'r SearchResults<C>,
    psm: PsmRecord,
}

impl<'r, C: SearchClient> PsmView<'r, C> {
    pub fn record(&self) -> &PsmRecord {
        &self.psm
    }

    pub fn into_record(self) -> PsmRecord {
        self.psm
    }

    pub fn peptide(&self) -> Result<PeptideView<'r, C>, ChaparralError> {
        self.results.peptide(&self.psm.peptide)
    }

    pub fn protein_groups(
        &self,
    ) -> Result<impl Iterator<Item = ProteinGroupView<'r, C>> + use<'r, C>, ChaparralError> {
        Ok(self.peptide()?.protein_groups())
    }

    pub fn proteins(
        &self,
    ) -> Result<impl Iterator<Item = ProteinView<'r, C>> + use<'r, C>, ChaparralError> {
        Ok(self.peptide()?.proteins())
    }

    pub fn spectra(&self) -> Result<Vec<SpectrumRecord>, ChaparralError> {
        self.results.client().get_spectra(
            self.results.search_id(),
            &self.psm.filename,
            &self.psm.scannr,
        )
    }

    pub fn annotations(&self) -> Result<Vec<FragmentRecord>, ChaparralError> {
        self.results
            .client()
            .get_psm_annotations(self.results.search_id(), self.psm.psm_id)
    }
}

impl<C: SearchClient> Clone for PsmView<'_, C> {
    fn clone(&self) -> Self {
        Self {
            results: self.results,
            psm: self.psm.clone(),
        }
    }
}

impl<C: SearchClient> fmt::Display for PsmView<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Psm(\"{}\", {})", self.psm.peptide, self.psm.psm_id)
    }
}

impl<C: SearchClient> fmt::Debug for PsmView<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Flattens the remote PSM lists of a sequence of peptides. Stops after the
/// first failed request.
struct Psms<'r, C: SearchClient, I> {
    results: &'r SearchResults<C>,
    peptides: I,
    pending: std::vec::IntoIter<PsmRecord>,
    failed: bool,
}

impl<'r, C: SearchClient, I> Psms<'r, C, I> {
    fn new(results: &'r SearchResults<C>, peptides: I) -> Self {
        Self {
            results,
            peptides,
            pending: Vec::new().into_iter(),
            failed: false,
        }
    }
}

impl<'r, C, I> Iterator for Psms<'r, C, I>
where
    C: SearchClient,
    I: Iterator<Item = PeptideView<'r, C>>,
{
    type Item = Result<PsmView<'r, C>, ChaparralError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(psm) = self.pending.next() {
                return Some(Ok(PsmView {
                    results: self.results,
                    psm,
                }));
            }
            if self.failed {
                return None;
            }
            let peptide = self.peptides.next()?;
            match peptide.fetch_psms() {
                Ok(psms) => self.pending = psms.into_iter(),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

mod common;

use chaparral_results::output::{GroupReport, PeptideReport, ProteinReport, SummaryReport};
use chaparral_results::results::SearchResults;

use common::{MockClient, search_id};

#[test]
fn summary_counts_entities_and_psms() {
    let results = SearchResults::new(MockClient::example(), search_id()).unwrap();
    let report = SummaryReport::new(&results, None);
    assert_eq!(report.protein_groups, 1);
    assert_eq!(report.proteins, 2);
    assert_eq!(report.peptides, 2);
    assert_eq!(report.total_psms, 8);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("info").is_none());
}

#[test]
fn entity_reports_list_neighbours() {
    let results = SearchResults::new(MockClient::example(), search_id()).unwrap();

    let protein = ProteinReport::new(results.protein("PROT2").unwrap());
    assert_eq!(protein.protein_groups, vec!["PROT1;PROT2"]);
    assert_eq!(protein.peptides, vec!["PEPA"]);

    let group = GroupReport::new(results.protein_group("PROT1").unwrap());
    assert_eq!(group.proteins, vec!["PROT1", "PROT2"]);
    assert_eq!(group.peptides, vec!["PEPA", "PEPB"]);

    let peptide = PeptideReport::new(results.peptide("PEPB").unwrap());
    assert_eq!(peptide.proteins, vec!["PROT1"]);

    let json = serde_json::to_value(&peptide).unwrap();
    assert_eq!(json["peptide"]["sequence"], "PEPB");
    assert_eq!(json["peptide"]["match_count"], 3);
}

use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use chaparral_results::client::{ChaparralHttpClient, SearchClient};
use chaparral_results::config::ConfigLoader;
use chaparral_results::domain::{QueryType, SearchId};
use chaparral_results::error::ChaparralError;
use chaparral_results::models::{FragmentRecord, PsmRecord, SearchResultMetadata, SpectrumRecord};
use chaparral_results::output::{
    GroupReport, JsonOutput, OutputMode, PeptideReport, ProteinReport, PsmReport, SummaryReport,
    TextOutput,
};
use chaparral_results::results::SearchResults;

#[derive(Parser)]
#[command(name = "chaparral-results")]
#[command(about = "Explore protein groups, proteins, peptides and PSMs of a Chaparral search")]
#[command(version)]
struct Cli {
    /// Path to chaparral.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Show entity counts and search metadata")]
    Summary(SearchArgs),
    #[command(about = "Show a protein and its neighbours")]
    Protein(KeyArgs),
    #[command(about = "Show the first protein group containing a protein")]
    Group(KeyArgs),
    #[command(about = "Show a peptide and its neighbours")]
    Peptide(KeyArgs),
    #[command(about = "List the PSMs of a peptide or protein")]
    Psms(PsmArgs),
    #[command(about = "Build the result graph from local CSV exports")]
    Inspect(InspectArgs),
}

#[derive(Args)]
struct SearchArgs {
    search_id: String,
}

#[derive(Args)]
struct KeyArgs {
    search_id: String,
    /// Protein name or peptide sequence
    key: String,
}

#[derive(Args)]
struct PsmArgs {
    search_id: String,
    key: String,

    /// Whether the key is a peptide sequence or a protein name
    #[arg(long, value_enum, default_value_t = QueryType::Peptide)]
    by: QueryType,
}

#[derive(Args)]
struct InspectArgs {
    #[arg(long)]
    peptides: Utf8PathBuf,

    #[arg(long)]
    proteins: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ChaparralError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ChaparralError) -> u8 {
    match error {
        ChaparralError::ProteinNotFound(_)
        | ChaparralError::GroupNotFound(_)
        | ChaparralError::PeptideNotFound(_)
        | ChaparralError::MissingToken
        | ChaparralError::ConfigRead(_) => 2,
        ChaparralError::Http(_)
        | ChaparralError::Status { .. }
        | ChaparralError::Decode(_)
        | ChaparralError::Offline(_) => 3,
        ChaparralError::MalformedRow { .. }
        | ChaparralError::UnresolvedProtein { .. }
        | ChaparralError::UnresolvedPeptide { .. } => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Command::Inspect(args) => run_inspect(args, mode),
        command => {
            let settings = ConfigLoader::resolve(cli.config.as_deref())?;
            let client = ChaparralHttpClient::new(&settings)?;
            run_remote(command, client, mode)
        }
    }
}

fn run_remote(
    command: Command,
    client: ChaparralHttpClient,
    mode: OutputMode,
) -> miette::Result<()> {
    match command {
        Command::Summary(args) => {
            let results = SearchResults::new(client, args.search_id.parse()?)?;
            let info = results.info()?.clone();
            print_summary(&SummaryReport::new(&results, Some(info)), mode)
        }
        Command::Protein(args) => {
            let results = SearchResults::new(client, args.search_id.parse()?)?;
            let report = ProteinReport::new(results.protein(&args.key)?);
            match mode {
                OutputMode::Json => JsonOutput::print(&report).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print_protein(&report);
                    Ok(())
                }
            }
        }
        Command::Group(args) => {
            let results = SearchResults::new(client, args.search_id.parse()?)?;
            let report = GroupReport::new(results.protein_group(&args.key)?);
            match mode {
                OutputMode::Json => JsonOutput::print(&report).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print_group(&report);
                    Ok(())
                }
            }
        }
        Command::Peptide(args) => {
            let results = SearchResults::new(client, args.search_id.parse()?)?;
            let report = PeptideReport::new(results.peptide(&args.key)?);
            match mode {
                OutputMode::Json => JsonOutput::print(&report).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print_peptide(&report);
                    Ok(())
                }
            }
        }
        Command::Psms(args) => {
            // A direct query needs no table download.
            let search_id: SearchId = args.search_id.parse()?;
            let psms = client.get_peptide_results(&search_id, &args.key, args.by)?;
            let report = PsmReport {
                query: args.key,
                query_type: args.by,
                psms,
            };
            match mode {
                OutputMode::Json => JsonOutput::print(&report).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print_psms(&report);
                    Ok(())
                }
            }
        }
        Command::Inspect(args) => run_inspect(args, mode),
    }
}

fn run_inspect(args: InspectArgs, mode: OutputMode) -> miette::Result<()> {
    let peptide_csv = std::fs::read_to_string(&args.peptides)
        .map_err(|err| ChaparralError::Filesystem(format!("read {}: {err}", args.peptides)))?;
    let proteins_csv = std::fs::read_to_string(&args.proteins)
        .map_err(|err| ChaparralError::Filesystem(format!("read {}: {err}", args.proteins)))?;
    let search_id: SearchId = "local".parse()?;
    let results =
        SearchResults::from_tables(OfflineClient, search_id, &peptide_csv, &proteins_csv)?;
    print_summary(&SummaryReport::new(&results, None), mode)
}

fn print_summary(report: &SummaryReport, mode: OutputMode) -> miette::Result<()> {
    match mode {
        OutputMode::Json => JsonOutput::print(report).into_diagnostic(),
        OutputMode::Text => {
            TextOutput::print_summary(report);
            Ok(())
        }
    }
}

struct OfflineClient;

impl OfflineClient {
    fn unavailable<T>(&self) -> Result<T, ChaparralError> {
        Err(ChaparralError::Offline(
            "tables were loaded from local files".to_string(),
        ))
    }
}

impl SearchClient for OfflineClient {
    fn fetch_peptide_csv(&self, _search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        self.unavailable()
    }

    fn fetch_proteins_csv(&self, _search_id: &SearchId) -> Result<Vec<u8>, ChaparralError> {
        self.unavailable()
    }

    fn get_search_result(
        &self,
        _search_id: &SearchId,
    ) -> Result<SearchResultMetadata, ChaparralError> {
        self.unavailable()
    }

    fn get_peptide_results(
        &self,
        _search_id: &SearchId,
        _query_id: &str,
        _query_type: QueryType,
    ) -> Result<Vec<PsmRecord>, ChaparralError> {
        self.unavailable()
    }

    fn get_spectra(
        &self,
        _search_id: &SearchId,
        _filename: &str,
        _scan_id: &str,
    ) -> Result<Vec<SpectrumRecord>, ChaparralError> {
        self.unavailable()
    }

    fn get_psm_annotations(
        &self,
        _search_id: &SearchId,
        _psm_id: i64,
    ) -> Result<Vec<FragmentRecord>, ChaparralError> {
        self.unavailable()
    }
}

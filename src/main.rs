//! CLI for refm - collect papers by DOI and export formatted citations.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use refm::{
    builtin_style_names, default_store_path, export, fetch::DEFAULT_BASE_URL, CitationKind,
    CrossrefClient, ExportError, MetadataProvider, Store, StoreError,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Personal reference manager: collect papers by DOI, export citations
#[derive(Parser)]
#[command(name = "refm")]
#[command(version)]
#[command(after_help = "\
Examples:
  refm create-repository phd
  refm add-paper 10.1038/nature14539 phd
  refm export phd apa references.txt
  refm export-short phd ieee citations.txt
  refm styles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store file (default: $XDG_DATA_HOME/refm/refm_db.json)
    #[arg(long, global = true, env = "REFM_STORE")]
    store: Option<PathBuf>,

    /// Base URL of the Crossref API
    #[arg(long, global = true, env = "REFM_CROSSREF_URL", default_value = DEFAULT_BASE_URL)]
    crossref_url: String,

    /// Increase log verbosity (-v, -vv, -vvv); REFM_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    #[command(visible_alias = "makr")]
    CreateRepository {
        /// Repository name
        repo: String,
    },

    /// Look up a DOI and append the paper to a repository
    #[command(visible_alias = "add")]
    AddPaper {
        /// DOI of the paper (e.g. 10.1038/nature14539)
        doi: String,

        /// Repository name
        repo: String,
    },

    /// Write the repository as a formatted reference list
    #[command(after_help = "Styles: harvard, apa, mla, chicago, vancouver, ieee")]
    Export {
        /// Repository name
        repo: String,

        /// Citation style
        style: String,

        /// Output file (overwritten)
        out: PathBuf,
    },

    /// Write short in-text citations for the repository
    #[command(visible_alias = "shortc")]
    #[command(after_help = "Styles: harvard, apa, mla, chicago, vancouver, ieee")]
    ExportShort {
        /// Repository name
        repo: String,

        /// Citation style
        style: String,

        /// Output file (overwritten)
        out: PathBuf,
    },

    /// List repositories and their paper counts
    List,

    /// List supported citation styles
    Styles,
}

// ---------------------------------------------------------------------------
// AppError - semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 - store unreadable, corrupt, or not writable
    Store(String),
    /// Exit 11 - cannot write export file
    OutputFile(String),
    /// Exit 12 - template references an unknown field
    Render(String),
    /// Exit 13 - HTTP client could not be initialized
    Network(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Store(_) => 10,
            AppError::OutputFile(_) => 11,
            AppError::Render(_) => 12,
            AppError::Network(_) => 13,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(msg) => {
                write!(
                    f,
                    "{}\n  hint: fix or move the store file, or pass --store to use another one",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::Render(msg) => write!(f, "{}", msg),
            AppError::Network(msg) => {
                write!(f, "{}\n  hint: check TLS and proxy settings", msg)
            }
        }
    }
}

fn store_error(e: StoreError) -> AppError {
    AppError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Styles = cli.command {
        styles_command();
        return Ok(());
    }

    let store_path = match cli.store {
        Some(path) => path,
        None => default_store_path().map_err(store_error)?,
    };
    debug!("using store {}", store_path.display());
    let mut store = Store::load(store_path).map_err(store_error)?;

    match cli.command {
        Commands::CreateRepository { repo } => create_repository_command(&mut store, &repo)?,
        Commands::AddPaper { doi, repo } => {
            let client = CrossrefClient::with_base_url(cli.crossref_url)
                .map_err(|e| AppError::Network(e.to_string()))?;
            add_paper_command(&mut store, &client, &doi, &repo)?;
        }
        Commands::Export { repo, style, out } => {
            export_command(&store, &repo, &style, &out, CitationKind::Reference)?
        }
        Commands::ExportShort { repo, style, out } => {
            export_command(&store, &repo, &style, &out, CitationKind::InText)?
        }
        Commands::List => list_command(&store),
        Commands::Styles => styles_command(),
    }

    Ok(())
}

/// Sends diagnostics to stderr; stdout is reserved for user messages.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("REFM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("refm={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Prints the outcome of a store mutation; user errors are not fatal.
fn report_store(result: Result<(), StoreError>, success: String) -> Result<(), AppError> {
    match result {
        Ok(()) => {
            println!("{}", success);
            Ok(())
        }
        Err(e) if e.is_user_error() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(store_error(e)),
    }
}

fn create_repository_command(store: &mut Store, repo: &str) -> Result<(), AppError> {
    report_store(
        store.create_repository(repo),
        format!("Repository '{}' created.", repo),
    )
}

/// Fetch metadata for a DOI and append it to a repository.
fn add_paper_command(
    store: &mut Store,
    provider: &dyn MetadataProvider,
    doi: &str,
    repo: &str,
) -> Result<(), AppError> {
    // Checked first so a missing repository costs no network call
    if !store.contains(repo) {
        println!("{}", StoreError::RepositoryNotFound(repo.to_string()));
        return Ok(());
    }

    let record = match provider.fetch(doi) {
        Ok(record) => record,
        Err(e) => {
            println!("Error: {}", e);
            return Ok(());
        }
    };

    report_store(
        store.append_record(repo, record),
        format!("Paper added to '{}'.", repo),
    )
}

fn export_command(
    store: &Store,
    repo: &str,
    style: &str,
    out: &Path,
    kind: CitationKind,
) -> Result<(), AppError> {
    match export(store, repo, style, kind, out) {
        Ok(summary) => println!("{}", summary),
        Err(e) if e.is_user_error() => println!("{}", e),
        Err(ExportError::Render(e)) => return Err(AppError::Render(e.to_string())),
        Err(e) => return Err(AppError::OutputFile(e.to_string())),
    }
    Ok(())
}

fn list_command(store: &Store) {
    let mut empty = true;
    for (name, records) in store.repositories() {
        empty = false;
        println!("{} ({} papers)", name, records.len());
    }
    if empty {
        println!("No repositories.");
    }
}

/// List supported citation styles.
fn styles_command() {
    for name in builtin_style_names() {
        println!("{}", name);
    }
}

//! Vitrina - fuzzy product search for the storefront
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vitrina::catalog::Catalog;
use vitrina::config::{crash_log_path, Config};
use vitrina::error::{exit_codes, VitrinaError};
use vitrina::search::{Dictionary, SearchEngine, SearchHistory, TermExpander};
use vitrina::storage::FileHistoryStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Vitrina - fuzzy product search with synonyms, typo correction and history
#[derive(Parser)]
#[command(name = "vitrina")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Search query (empty lists the whole catalog)
        query: String,
        /// JSON catalog file (defaults to catalog.path from config)
        #[arg(long, short)]
        catalog: Option<PathBuf>,
        /// Maximum number of results
        #[arg(long, short)]
        limit: Option<usize>,
        /// Do not record the query in history
        #[arg(long)]
        no_history: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Autocomplete a partial query
    Suggest {
        /// Partial query
        partial: String,
        /// JSON catalog file (defaults to catalog.path from config)
        #[arg(long, short)]
        catalog: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show how a query expands through synonyms and corrections
    Expand {
        /// Query to expand
        query: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show or clear search history
    History {
        #[command(subcommand)]
        action: HistoryCmd,
    },
}

#[derive(Subcommand)]
enum HistoryCmd {
    /// List recent searches, most recent first
    List {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
    /// Delete all recorded searches
    Clear {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("vitrina error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `VITRINA_LOG` (default `warn`).
fn setup_logging() {
    let filter = EnvFilter::try_from_env("VITRINA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Set up the global panic handler.
///
/// On panic, appends to `~/.vitrina/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("vitrina panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = Config::load_from_cwd(&cwd);

    match cli.command {
        Commands::Search {
            query,
            catalog,
            limit,
            no_history,
            json,
            quiet,
        } => run_search(&query, catalog, limit, no_history, json, quiet, &config, &cwd),
        Commands::Suggest {
            partial,
            catalog,
            json,
            quiet,
        } => run_suggest(&partial, catalog, json, quiet, &config, &cwd),
        Commands::Expand { query, json, quiet } => run_expand(&query, json, quiet, &config),
        Commands::History { action } => run_history(action, &config),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Resolve the catalog from the flag or config and load it.
fn load_catalog(flag: Option<PathBuf>, config: &Config, cwd: &Path) -> Result<Catalog, VitrinaError> {
    let path = flag.or_else(|| config.catalog.path.clone()).ok_or_else(|| {
        VitrinaError::config("no catalog given: pass --catalog or set catalog.path in config")
    })?;
    let path = if path.is_relative() { cwd.join(path) } else { path };
    Catalog::load(&path)
}

fn build_engine(
    catalog: Catalog,
    config: &Config,
) -> Result<SearchEngine<FileHistoryStore>, VitrinaError> {
    let store = FileHistoryStore::new(&config.history.storage_key)?;
    Ok(SearchEngine::new(
        catalog,
        Dictionary::from_config(&config.dictionary),
        config,
        store,
    ))
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    query: &str,
    catalog: Option<PathBuf>,
    limit: Option<usize>,
    no_history: bool,
    json: bool,
    quiet: bool,
    config: &Config,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use vitrina::cli::search::{SearchCommand, SearchOptions};

    let options = SearchOptions {
        json,
        quiet,
        limit,
        no_history,
    };

    let engine = match load_catalog(catalog, config, cwd).and_then(|c| build_engine(c, config)) {
        Ok(engine) => engine,
        Err(e) => {
            let output = vitrina::cli::search::SearchOutput::failure(query.trim(), e.to_string());
            if json && !quiet {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !quiet {
                eprintln!("vitrina error: {}", e);
            }
            return Ok(ExitCode::from(exit_codes::ERROR as u8));
        }
    };

    let mut cmd = SearchCommand::new(engine);
    let output = cmd.run(query, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_suggest(
    partial: &str,
    catalog: Option<PathBuf>,
    json: bool,
    quiet: bool,
    config: &Config,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use vitrina::cli::suggest::{SuggestCommand, SuggestOptions};

    let engine = build_engine(load_catalog(catalog, config, cwd)?, config)?;
    let cmd = SuggestCommand::new(engine);
    let options = SuggestOptions { json, quiet };

    let output = cmd.run(partial);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}

fn run_expand(
    query: &str,
    json: bool,
    quiet: bool,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use vitrina::cli::expand::{ExpandCommand, ExpandOptions};

    let cmd = ExpandCommand::new(TermExpander::new(Dictionary::from_config(&config.dictionary)));
    let options = ExpandOptions { json, quiet };

    let output = cmd.run(query);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}

fn run_history(action: HistoryCmd, config: &Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use vitrina::cli::history::{HistoryAction, HistoryCommand, HistoryOptions};

    let (action, options) = match action {
        HistoryCmd::List { json, quiet } => (HistoryAction::List, HistoryOptions { json, quiet }),
        HistoryCmd::Clear { json, quiet } => (HistoryAction::Clear, HistoryOptions { json, quiet }),
    };

    let store = FileHistoryStore::new(&config.history.storage_key)?;
    let mut cmd = HistoryCommand::new(SearchHistory::load(store, config.history.max_entries));

    let output = cmd.run(action);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

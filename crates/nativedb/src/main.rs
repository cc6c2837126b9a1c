//! nativedb - Browse native function and catalog dumps
//!
//! nativedb loads nested JSON native dumps, flat JSON catalogs and C-style
//! native headers into one index, then lists groups, filters records and
//! shows record details from the command line or an interactive loop.

use eyre::{Result, WrapErr};
use figue as args;
use nativedb::browse::Browser;
use nativedb::output::{self, OutputFormat};
use nativedb::{
    DEFAULT_CONFIG_PATH, InputSelection, load_config, load_config_or_default, parse_kind,
    query_for, suggest_group,
};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Subcommand to run (default: groups)
    #[facet(args::subcommand)]
    command: Option<Command>,

    /// Path to config file (default: .config/nativedb/config.yaml)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Source file to load; repeat to merge several files
    #[facet(args::named, args::short = 'i', default)]
    input: Vec<PathBuf>,

    /// Force the adapter: map, array or header
    #[facet(args::named, args::short = 'k', default)]
    kind: Option<String>,

    /// Named source from the config file
    #[facet(args::named, args::short = 's', default)]
    source: Option<String>,

    /// Output format: text, json
    #[facet(args::named, args::short = 'f', default)]
    format: Option<String>,

    /// Show signatures in listings and debug logs
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

/// Subcommands
#[derive(Debug, facet::Facet)]
#[repr(u8)]
enum Command {
    /// List groups with at least one matching record
    Groups {
        #[facet(args::positional, default)]
        filter: Option<String>,
    },

    /// List the matching records of one group
    List {
        #[facet(args::positional)]
        group: String,

        #[facet(args::positional, default)]
        filter: Option<String>,
    },

    /// List matching records across all groups
    Search {
        #[facet(args::positional, default)]
        filter: Option<String>,
    },

    /// Show one record by key
    Show {
        #[facet(args::positional)]
        key: String,
    },

    /// Read browse commands from stdin
    Browse,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("NATIVEDB_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status for failures other than a missing key
const EXIT_ERROR: i32 = 2;

fn main() {
    if let Err(report) = run() {
        eprintln!("Error: {:?}", report);
        std::process::exit(EXIT_ERROR);
    }
}

fn run() -> Result<()> {
    let args: Args =
        figue::from_std_args().wrap_err("Failed to parse command line arguments")?;
    init_tracing(args.verbose);

    let format = match args.format.as_deref() {
        Some(f) => OutputFormat::from_str(f).ok_or_else(|| {
            eyre::eyre!("Unknown output format '{}' (expected text or json)", f)
        })?,
        None => OutputFormat::default(),
    };

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    };

    let selection = InputSelection {
        inputs: args.input,
        source: args.source,
        kind: args.kind.as_deref().map(parse_kind).transpose()?,
    };
    let sources = selection.resolve(&config)?;

    let mut browser = Browser::new(sources, config.clone(), format, args.verbose);
    let stats = browser.load()?;
    if args.verbose {
        eprintln!(
            "{} Loaded {} records in {} groups ({} skipped) in {:.2?}",
            "->".blue().bold(),
            stats.records.to_string().green(),
            stats.groups,
            stats.skipped,
            stats.elapsed
        );
    }
    if let Some(catalog) = &stats.catalog
        && format == OutputFormat::Text
    {
        eprintln!("{} Catalog {}", "->".blue().bold(), catalog.to_string().cyan());
    }

    let Some(index) = browser.session().snapshot() else {
        eyre::bail!("No index loaded");
    };

    let rendered = match args.command.unwrap_or(Command::Groups { filter: None }) {
        Command::Browse => {
            let stdin = std::io::stdin();
            return browser.run(stdin.lock(), std::io::stdout().lock());
        }
        Command::Groups { filter } => {
            let query = query_for(&config, filter.as_deref().unwrap_or(""));
            output::render_groups(&index.group_summaries(&query), format)?
        }
        Command::List { group, filter } => {
            if !index.has_group(&group) {
                match suggest_group(&index, &group) {
                    Some(close) => eprintln!(
                        "{} No group '{}', did you mean '{}'?",
                        "!".yellow().bold(),
                        group,
                        close.cyan()
                    ),
                    None => eprintln!("{} No group '{}'", "!".yellow().bold(), group),
                }
            }
            let query = query_for(&config, filter.as_deref().unwrap_or(""));
            let records = index.list_records_in_group(&group, &query);
            output::render_group(&group, &records, format, args.verbose)?
        }
        Command::Search { filter } => {
            let query = query_for(&config, filter.as_deref().unwrap_or(""));
            output::render_matches(&index.list_all_records(&query), format, args.verbose)?
        }
        Command::Show { key } => match index.get_by_key(&key) {
            Some(record) => output::render_record(record, format)?,
            None => {
                eprintln!("{} {} not found", "!".red().bold(), key);
                std::process::exit(1);
            }
        },
    };

    print!("{}", rendered);
    Ok(())
}

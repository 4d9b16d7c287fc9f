//! Kigu Directory CLI
//!
//! Local entry point for the site build steps.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use kigu_directory::{
    error::{AppError, Result},
    listing::{self, Searchable, SortConfig, SortDirection, Sortable},
    models::{Config, Hadatai, Maker},
    pipeline,
    utils::http,
};
use serde::de::DeserializeOwned;

/// kigu - Maker directory build tool
#[derive(Parser, Debug)]
#[command(
    name = "kigu",
    version,
    about = "Build tooling for the kigurumi maker directory"
)]
struct Cli {
    /// Path to the site configuration file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, convert and publish maker and hadatai data
    Data,

    /// Resolve embeds and render content documents
    Content,

    /// Write llms.txt and llms-full.txt
    Export,

    /// Run the full build: Data → Content → Export
    Build {
        /// Skip embed resolution and rendering
        #[arg(long)]
        skip_content: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Search a generated collection
    Search {
        /// Collection to search
        #[arg(value_enum)]
        kind: Kind,

        /// Free-text query (empty matches everything)
        #[arg(default_value = "")]
        query: String,

        /// Field to sort by, e.g. name or priceRange
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show which exchange-rate table a build would use
    Rates,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Makers,
    Hadatai,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    if !matches!(cli.command, Command::Validate) {
        config.validate()?;
    }
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Validate => {
            if let Err(e) = pipeline::run_validate(&cli.config) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
        }

        Command::Data => {
            pipeline::run_data(&config).await?;
        }

        Command::Content => {
            pipeline::run_content(&config).await?;
        }

        Command::Export => {
            pipeline::run_export(&config).await?;
        }

        Command::Build { skip_content } => {
            pipeline::run_build(&config, skip_content).await?;
        }

        Command::Search {
            kind,
            query,
            sort,
            desc,
        } => {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let sort = sort.map(|field| SortConfig::new(field, direction));

            let names = match kind {
                Kind::Makers => {
                    let makers: Vec<Maker> = load_artifact(&config, "makers").await?;
                    query_names(&makers, &query, sort.as_ref(), |m| m.name.as_str())
                }
                Kind::Hadatai => {
                    let vendors: Vec<Hadatai> = load_artifact(&config, "hadatai").await?;
                    query_names(&vendors, &query, sort.as_ref(), |h| h.name.as_str())
                }
            };

            for name in &names {
                println!("{name}");
            }
            log::info!("{} match(es)", names.len());
        }

        Command::Rates => {
            let client = http::create_client(&config.http)?;
            let (table, source) =
                pipeline::data::load_rates(&config, &client, Utc::now().date_naive()).await;
            log::info!(
                "Exchange rates: {:?} table dated {}, base {}, {} currencies",
                source,
                table.date,
                table.base.to_uppercase(),
                table.rates.len()
            );
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Read a generated JSON artifact from the data output directory.
async fn load_artifact<T: DeserializeOwned>(config: &Config, name: &str) -> Result<Vec<T>> {
    let path = config.paths.data_output_dir.join(format!("{name}.json"));
    if !path.exists() {
        return Err(AppError::config(format!(
            "{} not found. Run 'data' first.",
            path.display()
        )));
    }
    let text = tokio::fs::read_to_string(&path).await?;
    Ok(serde_json::from_str(&text)?)
}

fn query_names<T: Searchable + Sortable>(
    records: &[T],
    query: &str,
    sort: Option<&SortConfig>,
    name: impl Fn(&T) -> &str,
) -> Vec<String> {
    let found: Vec<&T> = listing::search(records, query);
    let ordered: Vec<&T> = match sort {
        Some(sort) => listing::sort_records(&found, sort).into_iter().copied().collect(),
        None => found,
    };
    ordered.into_iter().map(|record| name(record).to_string()).collect()
}

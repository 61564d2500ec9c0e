use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use venue_facets::app::ports::SnapshotSourcePort;
use venue_facets::config::Config;
use venue_facets::constants::DEFAULT_CONFIG_PATH;
use venue_facets::dates::{self, DateFormat};
use venue_facets::infra::{FileSnapshotSource, RestSnapshotSource};
use venue_facets::logging;
use venue_facets::{Facet, FacetEngine, FilterState};

#[derive(Parser)]
#[command(name = "venue_facets")]
#[command(about = "Faceted venue filtering over a snapshot of the events view")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the venues that survive the filters
    Filter {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the selectable values per facet under the current filters
    Options {
        #[command(flatten)]
        filters: FilterArgs,
        /// Only compute this facet (area, vibe, date, genre)
        #[arg(long)]
        facet: Option<Facet>,
    },
    /// Print vibe or genre options grouped by primary with display colors
    Groups {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        facet: Facet,
    },
    /// Print today's date as a filter literal
    Today {
        /// Use DD/Month/YYYY instead of D Mon YY
        #[arg(long)]
        long: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Snapshot JSON file or http(s) URL; defaults to the configured source
    #[arg(long)]
    source: Option<String>,
    /// Comma-separated areas ("All Dubai" when omitted)
    #[arg(long)]
    areas: Option<String>,
    /// Comma-separated vibes, all of which must match
    #[arg(long)]
    vibes: Option<String>,
    /// Comma-separated date literals, any of which may match
    #[arg(long)]
    dates: Option<String>,
    /// Comma-separated genres, all of which must match
    #[arg(long)]
    genres: Option<String>,
    /// Free-text search over venue name and category
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    fn state(&self) -> FilterState {
        let pairs = [
            ("areas", &self.areas),
            ("vibes", &self.vibes),
            ("dates", &self.dates),
            ("genres", &self.genres),
            ("search", &self.search),
        ];
        let mut state = FilterState::from_query(
            pairs
                .iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v))),
        );
        if state.selected_areas.is_empty() {
            state.selected_areas = FilterState::all_areas().selected_areas;
        }
        state
    }
}

/// Response envelope matching what the venues API returns.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn resolve_source(
    config: &Config,
    source: Option<&str>,
) -> anyhow::Result<Box<dyn SnapshotSourcePort>> {
    let timeout = Duration::from_secs(config.source.timeout_seconds);
    match source {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(Box::new(
            RestSnapshotSource::new(url, config.source.api_key.as_deref(), timeout)?
                .with_postgrest(config.source.postgrest),
        )),
        Some(path) => Ok(Box::new(FileSnapshotSource::new(path))),
        None if config.source.url.is_some() => {
            Ok(Box::new(RestSnapshotSource::from_config(&config.source)?))
        }
        None => {
            let path = config
                .source
                .path
                .as_deref()
                .context("no snapshot source: pass --source or set source.url / source.path")?;
            Ok(Box::new(FileSnapshotSource::new(path)))
        }
    }
}

/// Build an engine and try to load a snapshot. A failed load leaves the
/// engine empty and is reported through the returned error message.
async fn load_engine(config: &Config, filters: &FilterArgs) -> anyhow::Result<(FacetEngine, Option<String>)> {
    let engine = FacetEngine::from_config(&config.filters);
    let source = resolve_source(config, filters.source.as_deref())?;
    match engine.refresh(source.as_ref()).await {
        Ok(count) => {
            if let Some(snapshot) = engine.snapshot() {
                info!(
                    "Snapshot ready with {} records, loaded at {}",
                    count,
                    snapshot.loaded_at().to_rfc3339()
                );
            }
            Ok((engine, None))
        }
        Err(e) => {
            error!("Snapshot unavailable: {}", e);
            Ok((engine, Some(e.to_string())))
        }
    }
}

fn print_response<T: Serialize>(data: T, message: Option<String>, error: Option<String>) -> anyhow::Result<()> {
    let response = ApiResponse {
        success: error.is_none(),
        data,
        message,
        error,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    logging::init_logging(&config.logging);

    match cli.command {
        Commands::Filter { filters } => {
            let (engine, failure) = load_engine(&config, &filters).await?;
            let venues = engine.filter(&filters.state());
            let message = format!("Retrieved {} venues", venues.len());
            print_response(venues, Some(message), failure)?;
        }
        Commands::Options { filters, facet } => {
            let (engine, failure) = load_engine(&config, &filters).await?;
            let state = filters.state();
            match facet {
                Some(facet) => {
                    let values = engine.options_for(facet, &state);
                    let message = format!("Retrieved {} {}", values.len(), facet);
                    print_response(values, Some(message), failure)?;
                }
                None => {
                    let options = engine.options(&state);
                    let message = format!(
                        "Retrieved {} areas, {} vibes, {} dates, {} genres",
                        options.areas.len(),
                        options.vibes.len(),
                        options.dates.len(),
                        options.genres.len()
                    );
                    print_response(options, Some(message), failure)?;
                }
            }
        }
        Commands::Groups { filters, facet } => {
            let (engine, failure) = load_engine(&config, &filters).await?;
            let groups = engine.tag_groups(facet, &filters.state());
            print_response(groups, None, failure)?;
        }
        Commands::Today { long } => {
            let format = if long { DateFormat::Long } else { DateFormat::Short };
            println!("{}", dates::today(format));
        }
    }
    Ok(())
}

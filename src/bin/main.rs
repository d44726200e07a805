//! geosearch CLI - Command-line interface for the geosearch SDK
//!
//! Forward search and reverse lookup against the French national address API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use geosearch::{
    error::DEFAULT_TIMEOUT_MS,
    geo_search,
    providers::{geoapifr::GeoApiFrFeature, GeoApiFrConfig, GeoApiFrProvider},
    types::{GeoProvider, ReverseOptions, SearchOptions, SearchResult},
    utils::debug,
};

#[derive(Parser)]
#[command(name = "geosearch")]
#[command(about = "Address geocoding CLI for api-adresse.data.gouv.fr")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProviderArgs {
    /// Forward search endpoint
    #[arg(long, global = true, env = "GEOSEARCH_SEARCH_URL")]
    search_url: Option<String>,

    /// Reverse lookup endpoint
    #[arg(long, global = true, env = "GEOSEARCH_REVERSE_URL")]
    reverse_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Find addresses matching a free-text query
    Search {
        /// Address text
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        /// Restrict results to a postcode
        #[arg(long)]
        postcode: Option<String>,

        /// Restrict results to a kind (housenumber, street, locality, municipality)
        #[arg(long = "type")]
        kind: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Find the nearest addresses to a point
    Reverse {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the provider configuration in use
    Info,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Show raw provider record
    #[arg(long)]
    raw: bool,

    /// Enable debug output (repeat to also log responses)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let debug_level = match &cli.command {
        Commands::Search { output, .. } | Commands::Reverse { output, .. } => output.debug,
        Commands::Info => 0,
    };
    init_logging(debug_level);

    match cli.command {
        Commands::Search {
            query,
            limit,
            postcode,
            kind,
            output,
        } => {
            let mut config = provider_config(&cli.provider);
            if let Some(limit) = limit {
                config = config.with_param("limit", limit);
            }
            if let Some(postcode) = postcode {
                config = config.with_param("postcode", postcode);
            }
            if let Some(kind) = kind {
                config = config.with_param("type", kind);
            }
            handle_search(config, query, output).await?;
        }
        Commands::Reverse {
            lat,
            lon,
            limit,
            output,
        } => {
            let mut config = provider_config(&cli.provider);
            if let Some(limit) = limit {
                config = config.with_param("limit", limit);
            }
            handle_reverse(config, lat, lon, output).await?;
        }
        Commands::Info => {
            handle_info(provider_config(&cli.provider))?;
        }
    }

    Ok(())
}

fn init_logging(debug_level: u8) {
    let default_filter = match debug_level {
        0 => "warn",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn provider_config(args: &ProviderArgs) -> GeoApiFrConfig {
    let mut config = GeoApiFrConfig::default().with_timeout(args.timeout);
    if let Some(search_url) = &args.search_url {
        config = config.with_search_url(search_url);
    }
    if let Some(reverse_url) = &args.reverse_url {
        config = config.with_reverse_url(reverse_url);
    }
    config
}

async fn handle_search(
    config: GeoApiFrConfig,
    query: String,
    output: OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = GeoApiFrProvider::with_config(config)?;

    let options = SearchOptions {
        query: query.clone(),
        debug: Some(debug::from_verbosity(output.debug)),
    };

    let results = geo_search(&provider, options).await?;

    display_results(&results, &output, &format!("\"{query}\""))?;
    Ok(())
}

async fn handle_reverse(
    config: GeoApiFrConfig,
    lat: f64,
    lon: f64,
    output: OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = GeoApiFrProvider::with_config(config)?;

    let options = ReverseOptions {
        lat,
        lon,
        debug: Some(debug::from_verbosity(output.debug)),
    };

    let results = provider.reverse(&options).await?;

    display_results(&results, &output, &format!("{lat}, {lon}"))?;
    Ok(())
}

fn handle_info(config: GeoApiFrConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = GeoApiFrProvider::with_config(config)?;

    println!("{} {}", "Provider:".bold(), provider.name().bold().blue());

    let mut entries: Vec<_> = provider.config().into_iter().collect();
    entries.sort();
    for (key, value) in entries {
        println!("  {}: {}", key, value.green());
    }

    println!();
    println!("{}", "Override endpoints with environment variables:".bold());
    println!("export GEOSEARCH_SEARCH_URL=https://your-addok-instance/search");
    println!("export GEOSEARCH_REVERSE_URL=https://your-addok-instance/reverse");

    Ok(())
}

fn display_results(
    results: &[SearchResult<GeoApiFrFeature>],
    output: &OutputArgs,
    heading: &str,
) -> Result<(), serde_json::Error> {
    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Simple => {
            for result in results {
                println!("{}\t{}\t{}", result.y, result.x, result.label);
            }
        }
        OutputFormat::Table => {
            println!("{} {}", "Results for".bold(), heading.bold().blue());
            println!("{}", "─".repeat(80).dimmed());

            for (i, result) in results.iter().enumerate() {
                let feature = &result.raw;

                println!("{}. {}", (i + 1).to_string().bold(), result.label.bold());
                println!("   📍 {:.6}, {:.6}", result.y, result.x);

                if let Some(kind) = feature.result_type() {
                    println!("   🏷  {}", kind.cyan());
                }

                if let Some(context) = feature.context() {
                    println!("   🗺  {}", context.green());
                }

                if let Some(score) = feature.score() {
                    println!("   ⭐ {}", format!("{score:.3}").yellow());
                }

                if output.raw {
                    println!("   📊 Raw: {}", serde_json::to_string_pretty(&result.raw)?);
                }

                println!();
            }

            println!("{} {}", "Total results:".bold(), results.len().to_string().bold());
        }
    }

    Ok(())
}

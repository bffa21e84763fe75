mod output;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wayfind_core::SearchOptions;
use wayfind_engine::LocationEngine;

#[derive(Debug, Parser)]
#[command(name = "wayfind")]
#[command(about = "Resolve free-text place queries to ranked, proximity-aware locations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a place query.
    Resolve(ResolveArgs),
    /// List provider adapters and their eligibility.
    Providers,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    query: String,

    /// Anchor latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Anchor longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    #[arg(long)]
    max_results: Option<usize>,

    #[arg(long)]
    radius_km: Option<f64>,

    /// Per-adapter call timeout.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Budget for the whole search.
    #[arg(long)]
    overall_timeout_ms: Option<u64>,

    /// Retry the whole search with a growing budget when it times out.
    #[arg(long)]
    retry: bool,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl ResolveArgs {
    /// Overlay the flags the user passed on the engine defaults.
    fn options(&self, defaults: SearchOptions) -> SearchOptions {
        let mut options = defaults;
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            options = options.with_anchor(lat, lon);
        }
        if let Some(max_results) = self.max_results {
            options = options.with_max_results(max_results);
        }
        if let Some(radius_km) = self.radius_km {
            options = options.with_radius_km(radius_km);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }
        if let Some(overall_timeout_ms) = self.overall_timeout_ms {
            options = options.with_overall_timeout_ms(overall_timeout_ms);
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = wayfind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = LocationEngine::from_config(&config)?;

    match cli.command {
        Commands::Resolve(args) => run_resolve(&engine, &args).await?,
        Commands::Providers => output::print_providers(&engine.providers()),
    }

    Ok(())
}

async fn run_resolve(engine: &LocationEngine, args: &ResolveArgs) -> anyhow::Result<()> {
    let options = args.options(engine.default_options());
    tracing::debug!(query = %args.query, retry = args.retry, "resolving");
    let result = if args.retry {
        engine
            .resolve_with_retry(&args.query, options, &engine.retry_policy())
            .await?
    } else {
        engine.resolve(&args.query, options).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_result(&result);
    }
    Ok(())
}

#[cfg(test)]
mod tests;

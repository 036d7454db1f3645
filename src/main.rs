//! # yyc-route CLI
//!
//! Command-line front-end for the yyc-route library.
//! Finds routes across Calgary from place names, picked points or typed coordinates.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::error;
use yyc_route::{EndpointInput, GeoPoint, RouteEngine, RouteForm, ServiceConfig};

mod cli;

/// Command-line interface for yyc-route
#[derive(Parser)]
#[command(name = "yyc-route")]
#[command(about = "Calgary route finder: resolve endpoints, request routes, summarize steps")]
#[command(long_about = "Finds a route between two points in Calgary:
  yyc-route route --from Downtown --to \"Calgary Tower\"
  yyc-route route --from-point 51.0486,-114.0708 --to \"Chinook Centre\"
  yyc-route route --from-lat 51.0486 --from-lon -114.0708 --to-lat 51.0443 --to-lon -114.0631
  yyc-route chat \"how do I get from Kensington to the Saddledome?\"

Endpoint precedence (per side):
  --from-point / --to-point        # Picked point, always wins
  --from / --to                    # Place name, geocoded within Calgary
  --from-lat/--from-lon, ...       # Raw coordinates")]
#[command(version = env!("YYC_ROUTE_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Routing backend base URL
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    backend: String,

    /// Geocoding service base URL
    #[arg(long, global = true, default_value = "https://api.geoapify.com")]
    geocoder: String,

    /// Enable dry-run mode (show what would be requested without contacting any service)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Find a route between two endpoints
    Route(RouteArgs),
    /// Ask the chat assistant for a route in plain language
    Chat {
        /// Message to send
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
struct RouteArgs {
    /// Start location name
    #[arg(long)]
    from: Option<String>,

    /// End location name
    #[arg(long)]
    to: Option<String>,

    /// Start point as "lat,lon"
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from_point: Option<GeoPoint>,

    /// End point as "lat,lon"
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to_point: Option<GeoPoint>,

    /// Start latitude
    #[arg(long, allow_hyphen_values = true)]
    from_lat: Option<String>,

    /// Start longitude
    #[arg(long, allow_hyphen_values = true)]
    from_lon: Option<String>,

    /// End latitude
    #[arg(long, allow_hyphen_values = true)]
    to_lat: Option<String>,

    /// End longitude
    #[arg(long, allow_hyphen_values = true)]
    to_lon: Option<String>,
}

impl RouteArgs {
    fn form(&self) -> RouteForm {
        RouteForm {
            start: EndpointInput {
                existing: self.from_point,
                text: self.from.clone(),
                manual_lat: self.from_lat.clone(),
                manual_lon: self.from_lon.clone(),
            },
            end: EndpointInput {
                existing: self.to_point,
                text: self.to.clone(),
                manual_lat: self.to_lat.clone(),
                manual_lon: self.to_lon.clone(),
            },
        }
    }
}

/// Parse "lat,lon"
fn parse_point(value: &str) -> std::result::Result<GeoPoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got \"{value}\""))?;
    let parse = |field: &str| {
        field
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate \"{}\"", field.trim()))
    };
    Ok(GeoPoint::new(parse(lat)?, parse(lon)?))
}

/// Short description of an endpoint for dry-run output
fn describe(input: &EndpointInput) -> String {
    if let Some(point) = input.existing {
        return format!("point {point}");
    }
    if let Some(text) = input.text.as_deref().filter(|t| !t.trim().is_empty()) {
        return format!("\"{text}\"");
    }
    match (&input.manual_lat, &input.manual_lon) {
        (Some(lat), Some(lon)) => format!("coordinates ({lat}, {lon})"),
        _ => "<unset>".to_string(),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    if cli.verbose {
        eprintln!("🧭 yyc-route v{} starting...", env!("YYC_ROUTE_VERSION"));
    }

    let config = ServiceConfig::default()
        .with_backend_url(&cli.backend)
        .with_geocoder_url(&cli.geocoder);

    match &cli.command {
        Command::Route(args) => find_route(config, args, cli.dry_run, cli.verbose).await,
        Command::Chat { message } => chat(config, &message.join(" "), cli.dry_run).await,
    }
}

async fn connect(config: ServiceConfig) -> Result<RouteEngine<yyc_route::HttpBackend, yyc_route::GeoapifyGeocoder>> {
    let backend = config.backend_url.clone();
    RouteEngine::connect(config, Arc::new(cli::SpinnerIndicator::new()))
        .await
        .with_context(|| format!("could not load configuration from {backend}"))
}

async fn find_route(config: ServiceConfig, args: &RouteArgs, dry_run: bool, verbose: bool) -> Result<()> {
    let form = args.form();

    if dry_run {
        eprintln!(
            "🔍 [DRY RUN] Would route from {} to {} via {}",
            describe(&form.start),
            describe(&form.end),
            config.find_path_url()
        );
        return Ok(());
    }

    if verbose {
        eprintln!("🌐 Routing backend: {}", config.backend_url);
    }

    let engine = connect(config).await?;
    match engine.find_path(&form).await {
        Ok(update) => {
            println!("{}", cli::render::render_update(&update));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", cli::render::render_update(&engine.render_error(&e)));
            Err(anyhow!(e))
        }
    }
}

async fn chat(config: ServiceConfig, message: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        eprintln!("🔍 [DRY RUN] Would send \"{message}\" to {}", config.chat_url());
        return Ok(());
    }

    let engine = connect(config).await?;
    let outcome = engine.chat(message).await;
    println!("💬 {}", outcome.reply);
    if let Some(update) = outcome.update {
        println!("\n{}", cli::render::render_update(&update));
    }
    Ok(())
}

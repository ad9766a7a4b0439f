use std::time::Duration;

use airmap::backend::{HttpBackend, HttpSettings};
use airmap::context::Context;
use airmap::surface::TerminalSurface;
use airmap::{MarkerFlow, Query};
use anyhow::Context as _;
use aqi::{DisplayZone, RenderSettings};
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "airmap")]
#[command(about = "Query air quality for a location and show it the way the map does")]
struct Cli {
    /// Base URL of the air-quality backend
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Timeout for each backend request, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Show times at this offset from UTC, in minutes (default: local time)
    #[arg(long, allow_negative_numbers = true)]
    utc_offset_minutes: Option<i32>,

    /// Print popups and the history table as HTML instead of text
    #[arg(long)]
    html: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a marker for a location and refresh the history
    Query {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Place name, as a geocoder would report it
        #[arg(long)]
        city: Option<String>,

        /// Repeat the query every this many seconds until interrupted
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Show the query history
    History,
}

/// Zone for displayed times: a fixed offset east of UTC, or local time.
fn display_zone(offset_minutes: Option<i32>) -> anyhow::Result<DisplayZone> {
    let Some(minutes) = offset_minutes else {
        return Ok(DisplayZone::Local);
    };
    let offset = minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("UTC offset of {minutes} minutes is out of range"))?;
    Ok(DisplayZone::Fixed(offset))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let flow = MarkerFlow::from(RenderSettings {
        zone: display_zone(cli.utc_offset_minutes)?,
        ..Default::default()
    });
    let backend = HttpBackend::new(HttpSettings {
        base_url: cli.base_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    })
    .context("could not set up the HTTP client")?;
    let mut surface = TerminalSurface::new(std::io::stdout(), cli.html);

    match cli.command {
        Commands::History => {
            flow.refresh_history(&backend, &mut surface)?;
        }
        Commands::Query {
            lat,
            lon,
            city,
            watch: None,
        } => {
            let query = Query::new(lat, lon, city);
            flow.create_marker(&backend, &mut surface, &query)?;
        }
        Commands::Query {
            lat,
            lon,
            city,
            watch: Some(secs),
        } => {
            let query = Query::new(lat, lon, city);
            let ctx = Context::new();
            {
                let ctx = ctx.clone();
                ctrlc::set_handler(move || {
                    tracing::info!("got SIGINT, closing context");
                    ctx.cancel();
                })
                .context("could not set SIGINT handler")?;
            }
            let ticks = ctx.every(Duration::from_secs(secs), || {
                if let Err(e) = flow.create_marker(&backend, &mut surface, &query) {
                    tracing::debug!("query failed, still watching: {e}");
                }
            });
            tracing::info!("shut down after {ticks} queries");
        }
    }
    Ok(())
}

//! Print pixel centres of a HEALPix grid.
//!
//! One line per pixel, in the grid's own ordering:
//!
//! ```text
//! <index> <lat> <lon>
//! ```
//!
//! Run with: cargo run --bin healpix-dump -- --grid H4

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use healpix_grid::{HealpixGrid, LatLon};

#[derive(Parser, Debug)]
#[command(name = "healpix-dump")]
#[command(about = "Print HEALPix pixel centres")]
struct Args {
    /// Grid name, e.g. H4, h8n, H16_nested
    #[arg(short, long, default_value = "H4", env = "HEALPIX_GRID")]
    grid: String,

    /// Use reference ring-centre geometry instead of evenly spaced rows
    #[arg(long)]
    exact: bool,

    /// Only print these pixel indices (repeatable)
    #[arg(short, long = "index")]
    indices: Vec<i64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "HEALPIX_LOG_JSON")]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct PixelRecord {
    index: i64,
    #[serde(flatten)]
    center: LatLon,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let grid = HealpixGrid::from_name(&args.grid)
        .with_context(|| format!("Failed to create grid '{}'", args.grid))?;

    info!(
        grid = %grid,
        size = grid.size(),
        exact = args.exact,
        "Dumping HEALPix pixel centres"
    );

    let indices: Box<dyn Iterator<Item = i64>> = if args.indices.is_empty() {
        Box::new(0..grid.size())
    } else {
        Box::new(args.indices.clone().into_iter())
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for index in indices {
        let center = if args.exact {
            grid.center(index)
        } else {
            grid.latlon(index)
        }
        .with_context(|| format!("Pixel {} of {}", index, grid))?;

        match args.format {
            OutputFormat::Text => writeln!(out, "{} {} {}", index, center.lat, center.lon)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &PixelRecord { index, center })?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

//! Command-line tool for DSS grid record metadata.
//!
//! Decodes and encodes legacy header words, builds modern metadata from
//! keyword fields, and computes cell statistics. All inputs and outputs
//! are JSON; logs go to stderr.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use gridinfo::GridInfoConfig;

#[derive(Parser, Debug)]
#[command(name = "dssgrid")]
#[command(about = "Inspect and convert DSS grid record metadata")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode legacy header words into legacy and modern metadata
    Decode {
        /// JSON array of header words
        #[arg(short, long)]
        words: PathBuf,

        /// Grid type code stored with the record (defaults to words[1])
        #[arg(short, long)]
        grid_type: Option<i32>,
    },

    /// Build metadata from keyword fields and encode its legacy header
    Encode {
        /// JSON object of metadata fields, including `grid_type`
        #[arg(short, long)]
        fields: PathBuf,

        /// Record pathname supplying the start and end times
        #[arg(short, long)]
        pathname: String,
    },

    /// Compute statistics and the range table for a cell buffer
    Stats {
        /// JSON array of cell values, row-major
        #[arg(short, long)]
        cells: PathBuf,

        /// Value marking missing cells
        #[arg(short, long)]
        nodata: Option<f32>,

        /// Comma-separated range thresholds
        #[arg(short, long, value_delimiter = ',')]
        thresholds: Option<Vec<f64>>,
    },

    /// Run the full write pipeline and print the prepared record
    Inspect {
        /// JSON object of metadata fields, including `grid_type`
        #[arg(short, long)]
        fields: PathBuf,

        /// JSON array of cell values, row-major
        #[arg(short, long)]
        cells: PathBuf,

        /// Record pathname
        #[arg(short, long)]
        pathname: String,

        /// Affine transform as six comma-separated coefficients `a,b,c,d,e,f`
        #[arg(short, long, value_delimiter = ',', num_args = 6)]
        transform: Option<Vec<f64>>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = GridInfoConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;
    debug!(?config, "Loaded configuration");

    let output = match args.command {
        Command::Decode { words, grid_type } => commands::decode(&words, grid_type)?,
        Command::Encode { fields, pathname } => commands::encode(&fields, &pathname)?,
        Command::Stats {
            cells,
            nodata,
            thresholds,
        } => commands::stats(&cells, nodata, thresholds)?,
        Command::Inspect {
            fields,
            cells,
            pathname,
            transform,
        } => commands::inspect(&fields, &cells, &pathname, transform, &config)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

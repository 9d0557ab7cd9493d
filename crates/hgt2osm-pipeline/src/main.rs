//! Thin CLI over the contour pipeline.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hgt2osm_osm::OsmXmlWriter;
use hgt2osm_pipeline::{run_files, PipelineConfig, PipelineError, RunStats};

/// Convert SRTM elevation tiles into OSM contour lines.
#[derive(Debug, Parser)]
#[command(name = "hgt2osm", version)]
struct Args {
    /// SRTM `.hgt` tiles to process.
    #[arg(required = true)]
    tiles: Vec<PathBuf>,

    /// Output OSM XML file.
    #[arg(short, long, default_value = "contours.osm")]
    output: PathBuf,

    /// YAML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(stats) => {
            info!(
                output = %args.output.display(),
                features = stats.features_written,
                "wrote contours"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunStats, PipelineError> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let file = File::create(&args.output)?;
    let mut writer = OsmXmlWriter::new(BufWriter::new(file));
    run_files(&args.tiles, &config, &mut writer)
}

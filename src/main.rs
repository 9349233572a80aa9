use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use geopoints::config::{GeopointsConfig, OutputFormat};
use geopoints::{GeopointsError, GoogleGeocoder, logging, pipeline};

/// Geocode a spreadsheet of street addresses and write GeoJSON, CSV or HTML
#[derive(Parser, Debug)]
#[command(name = "geopoints", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address spreadsheet, overriding `pipeline.input_path`
    #[arg(long)]
    input: Option<PathBuf>,

    /// Destination file, overriding `pipeline.output_path`
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output document, overriding `pipeline.format`
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<GeopointsError>() {
                Some(err) => {
                    error!("{err}");
                    eprintln!("{}", err.user_message());
                }
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = GeopointsConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;

    if let Some(input) = cli.input {
        config.pipeline.input_path = input;
    }
    if let Some(output) = cli.output {
        config.pipeline.output_path = Some(output);
    }
    if let Some(format) = cli.format {
        config.pipeline.format = format;
    }
    debug!("Using configuration: {:?}", config.pipeline);

    let geocoder = GoogleGeocoder::new(&config.geocoding)?;
    pipeline::execute(&config, &geocoder)?;
    Ok(())
}

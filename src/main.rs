//! ifc-floorplan - CLI tool to generate floor plans from building models.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ifc_floorplan_rs::{validate_only, FloorPlanConfig, FloorPlanGenerator};

/// Generate per-storey floor plans, GeoJSON exports and a manifest.
#[derive(Parser, Debug)]
#[command(name = "ifc-floorplan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input model file (overrides the configuration)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides the configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Process storeys in parallel
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel runs
    #[arg(short, long)]
    workers: Option<usize>,

    /// Also write GeoJSON files
    #[arg(long)]
    geojson: bool,

    /// Validate configuration and model only, don't generate output
    #[arg(long)]
    validate: bool,

    /// Print the resolved configuration as JSON
    #[arg(long)]
    debug: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<FloorPlanConfig> {
        let mut config = match &self.config {
            Some(path) => FloorPlanConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => FloorPlanConfig::new(PathBuf::new(), PathBuf::new()),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.parallel {
            config.performance.parallel = true;
        }
        if let Some(workers) = self.workers {
            config.performance.workers = workers;
        }
        if self.geojson {
            config.output.geometry_enabled = true;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = args.resolve_config()?;

    // Debug output
    if args.debug {
        let json = serde_json::to_string_pretty(&config)?;
        println!("{}", json);
        return Ok(());
    }

    // Validate-only mode
    if args.validate {
        let validation = validate_only(&config)
            .with_context(|| format!("Failed to check {}", config.input.display()))?;
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        for err in &validation.errors {
            error!("{}", err);
        }
        if !validation.passed {
            anyhow::bail!("Validation failed");
        }
        info!("Validation passed");
        return Ok(());
    }

    let generator = FloorPlanGenerator::new(config).context("Invalid configuration")?;
    let report = generator
        .run()
        .with_context(|| format!("Failed to process {}", generator.config().input.display()))?;

    for issue in report.issues().filter(|i| i.is_error()) {
        warn!("{}", issue);
    }

    match &report.manifest_path {
        Some(path) => info!("Manifest: {}", path.display()),
        None => warn!("Manifest could not be written"),
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxsort_classifier::AppConfig;
use voxsort_domain::{RunParameters, Threshold, DEFAULT_DEVICE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Speaker verification and classification tool", long_about = None)]
struct Cli {
    /// Path to the target speaker audio file
    #[arg(long)]
    target: PathBuf,
    /// Directory containing the audio files to classify
    #[arg(long = "input_dir")]
    input_dir: PathBuf,
    /// Score threshold between 0 and 1 for the same-speaker verdict
    #[arg(long, default_value = "0.6")]
    threshold: Threshold,
    /// Inference device handed to the scoring worker (cpu or cuda)
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,
    /// YAML configuration file (defaults to ./voxsort.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let params = RunParameters::new(cli.target, cli.input_dir, cli.threshold, cli.device);
    voxsort_classifier::classify(&params, &config)
        .with_context(|| format!("classifying {:?}", params.input_dir))?;
    Ok(())
}

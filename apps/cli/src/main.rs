use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxsort_classifier::{AppConfig, LaunchMode};
use voxsort_collector::{
    run_session, Collector, InProcessLauncher, Interrupt, InterruptibleInput, RunLauncher,
    SubprocessLauncher, TerminalPrompter,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick a reference voice and sort wav clips by speaker", long_about = None)]
struct Cli {
    /// YAML configuration file (defaults to ./voxsort.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let collector = Collector::new(&config.reference_dir);
    let mut launcher: Box<dyn RunLauncher> = match config.launch {
        LaunchMode::InProcess => Box::new(InProcessLauncher::new(config.clone())),
        LaunchMode::Subprocess => Box::new(SubprocessLauncher::sibling(cli.config.clone())),
    };

    // First Ctrl-C cancels; worker children get it from the terminal too. A second one quits.
    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        if handler.trigger() {
            process::exit(130);
        }
    })
    .context("install interrupt handler")?;

    let input = InterruptibleInput::stdin(interrupt.clone());
    let mut prompter = TerminalPrompter::new(input, io::stdout()).with_interrupt(interrupt.clone());
    let outcome = run_session(
        &collector,
        &mut prompter,
        launcher.as_mut(),
        &interrupt,
        &mut io::stdout(),
    )?;
    info!(?outcome, "session ended");
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use orthoset::io::{Chooser, ConsoleChooser, FsLister, ProcessRunner, SocetProjectIndex};
use orthoset::{Orchestrator, OrthoConfig, OrthoError};
use std::path::PathBuf;

/// Generate SOCET SET orthophoto settings files and a batch script for a
/// set of operator-selected images.
#[derive(Parser, Debug)]
#[command(name = "orthoset", version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults to the per-user config, then built-in paths)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project name; prompted for when omitted
    #[arg(long)]
    project: Option<String>,

    /// Use native file dialogs for selections
    #[cfg(feature = "dialog")]
    #[arg(long, default_value_t = false)]
    dialog: bool,

    /// Write a JSON record of the run to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[cfg(feature = "dialog")]
fn make_chooser(args: &Args) -> Box<dyn Chooser> {
    if args.dialog {
        Box::new(orthoset::io::DialogChooser::new())
    } else {
        Box::new(ConsoleChooser::stdio())
    }
}

#[cfg(not(feature = "dialog"))]
fn make_chooser(_args: &Args) -> Box<dyn Chooser> {
    Box::new(ConsoleChooser::stdio())
}

fn run(args: &Args) -> Result<()> {
    let config = OrthoConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Configuration: {:?}", config);

    let mut chooser = make_chooser(args);
    let mut runner = ProcessRunner;
    let projects = SocetProjectIndex::from_config(&config);

    let summary = Orchestrator::new(&config, chooser.as_mut(), &FsLister, &mut runner, &projects)
        .run(args.project.as_deref())?;

    if let Some(path) = &args.summary {
        std::fs::write(path, summary.to_json()?)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
        log::info!("Run summary written to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        let code = match e.downcast_ref::<OrthoError>() {
            Some(OrthoError::ValidationFailure(_)) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

//! The command line interface for the program.
use crate::input::load_model;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::pipeline;
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// Build openLCA electricity inventories from generation and upstream data
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options for the `run` command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to write lists of matched and unmatched flows
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub flow_lists: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inventory for a model and write the JSON-LD archive.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that a model's inputs load.
    Validate {
        /// Path to the model directory.
        model_dir: PathBuf,
    },
    /// Inspect program settings.
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        command.execute()?;
    } else {
        Cli::command().print_long_help()?;
    }

    Ok(())
}

impl RunOpts {
    /// Override program settings with the options given on the command line
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(flow_lists) = self.flow_lists {
            settings.write_flow_lists = flow_lists;
        }
        settings.overwrite |= self.overwrite;
    }
}

fn settings_or_load(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Build the inventory for the model in `model_path` and write its archive.
///
/// Settings are loaded from the settings file unless given.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let mut settings = settings_or_load(settings)?;
    opts.apply_to(&mut settings);

    let output_path = match &opts.output_dir {
        Some(output_dir) => output_dir.clone(),
        None => get_output_dir(model_path, settings.results_root)?,
    };
    let overwrite = create_output_directory(&output_path, settings.overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    log::init(&settings.log_level, Some(&output_path)).context("Failed to initialise logging.")?;
    info!("elci v{}", env!("CARGO_PKG_VERSION"));

    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Writing results to {}", output_path.display());
    if overwrite {
        warn!("Existing contents of the output folder were removed");
    }

    let archive_path = pipeline::run(&model, &output_path, settings.write_flow_lists)?;
    info!("Inventory complete: {}", archive_path.display());

    Ok(())
}

/// Load a model's inputs without running the pipeline. No log files are written.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = settings_or_load(settings)?;
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    load_model(model_path).context("Failed to validate model.")?;
    info!("Model inputs are valid");

    Ok(())
}

//! Initialisation and configuration of the program's logging.
//!
//! Messages are written to the console and, if an output folder is provided, to two log files: one
//! with info-level messages and above and one with everything.
use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `ELCI_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file for info-level messages and above
const LOG_INFO_FILE_NAME: &str = "elci_info.log";

/// Log file for all messages
const LOG_DEBUG_FILE_NAME: &str = "elci_debug.log";

/// Set once the logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a log level name (case-insensitive)
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    level
        .parse()
        .with_context(|| format!("Unknown log level: {level}"))
}

/// Initialise the program logger.
///
/// The `ELCI_LOG_LEVEL` environment variable takes precedence over the level from settings.
///
/// # Arguments
///
/// * `log_level_from_settings` - The log level specified in the settings file
/// * `output_path` - Folder in which to save log files, if any
pub fn init(log_level_from_settings: &str, output_path: Option<&Path>) -> Result<()> {
    let log_level = env::var("ELCI_LOG_LEVEL").unwrap_or_else(|_| log_level_from_settings.into());
    let log_level = parse_log_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour = std::io::stderr().is_terminal();

    let console = Dispatch::new()
        .format(move |out, message, record| {
            let level = if use_colour {
                colours.color(record.level()).to_string()
            } else {
                record.level().to_string()
            };
            out.finish(format_args!("[{} {level}] {message}", timestamp()));
        })
        .level(log_level)
        .chain(std::io::stderr());

    let mut dispatch = Dispatch::new().chain(console);

    if let Some(output_path) = output_path {
        let info_file = fern::log_file(output_path.join(LOG_INFO_FILE_NAME))
            .context("Could not create info log file")?;
        let debug_file = fern::log_file(output_path.join(LOG_DEBUG_FILE_NAME))
            .context("Could not create debug log file")?;
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .format(format_file_message)
                    .level(LevelFilter::Info.min(log_level))
                    .chain(info_file),
            )
            .chain(
                Dispatch::new()
                    .format(format_file_message)
                    .level(LevelFilter::Debug)
                    .chain(debug_file),
            );
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT.set(()).ok();

    Ok(())
}

/// Format a message for a log file, including the module it came from
fn format_file_message(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "[{} {} {}] {message}",
        timestamp(),
        record.level(),
        record.target()
    ));
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

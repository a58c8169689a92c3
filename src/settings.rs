//! Code for loading program settings.
use crate::get_elci_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = concat!(
    "# elci program settings (defaults for elci v",
    env!("CARGO_PKG_VERSION"),
    ").
#
# Every option is commented out with its default value. Uncomment a line to override it.
# Regenerate this file with `elci settings show-default`.
"
);

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_elci_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Log level for console output and `elci_info.log`
    pub log_level: String,
    /// Replace the contents of a non-empty output folder without asking for `--overwrite`
    pub overwrite: bool,
    /// Folder under which a results folder named after each model is created
    pub results_root: PathBuf,
    /// Whether to write lists of matched and unmatched flows for each group of upstream tables
    pub write_flow_lists: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            overwrite: false,
            results_root: PathBuf::from("elci_results"),
            write_flow_lists: false,
        }
    }
}

impl Settings {
    /// Load settings from `settings.toml`.
    ///
    /// Defaults are used when the file is absent or `ELCI_USE_DEFAULT_SETTINGS` is set.
    pub fn load() -> Result<Settings> {
        if env::var_os("ELCI_USE_DEFAULT_SETTINGS").is_some() {
            return Ok(Settings::default());
        }

        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// A settings file listing every option, commented out at its default value beneath its
    /// documentation
    pub fn default_file_contents() -> Result<String> {
        let defaults =
            toml::to_string(&Settings::default()).context("Could not serialise default settings")?;

        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for entry in defaults.lines() {
            let Some((field, _)) = entry.split_once('=') else {
                continue;
            };
            let field = field.trim();
            let docs = Settings::get_field_docs(field)
                .with_context(|| format!("Setting {field} is undocumented"))?;
            out.push('\n');
            for doc_line in docs.lines() {
                writeln!(out, "# # {}", doc_line.trim())?;
            }
            writeln!(out, "# {entry}")?;
        }

        Ok(out)
    }
}

//! `elci settings` subcommands.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::Result;
use clap::Subcommand;

/// Subcommands for inspecting program settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Print a settings file with every option at its default value.
    ShowDefault,
    /// Print where the settings file is read from.
    ShowPath,
}

impl SettingsSubcommands {
    pub fn execute(self) -> Result<()> {
        match self {
            Self::ShowDefault => print!("{}", Settings::default_file_contents()?),
            Self::ShowPath => show_path(),
        }

        Ok(())
    }
}

fn show_path() {
    let path = get_settings_file_path();
    println!("{}", path.display());
    if !path.is_file() {
        eprintln!("(file does not exist; default settings are in use)");
    }
}

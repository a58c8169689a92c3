//! Build a life-cycle inventory (LCI) of electricity generation emissions and export it as
//! openLCA unit processes.
//!
//! Per-plant emissions are combined with upstream fuel-cycle inventories, flows are mapped onto
//! the federal elementary flow list and the result is packaged as a JSON-LD archive.
use std::env;
use std::path::PathBuf;

/// Where users should report bugs
pub const ISSUES_URL: &str = "https://github.com/USEPA/ElectricityLCI/issues";

pub mod balancing_authority;
pub mod cli;
pub mod combinator;
pub mod config;
pub mod dqi;
pub mod flow_mapping;
pub mod fuel_input;
pub mod id;
pub mod input;
pub mod inventory;
pub mod key_fill;
pub mod log;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod settings;
pub mod upstream;

#[cfg(test)]
mod fixture;

/// Get the directory from which program settings are read.
///
/// This is `ELCI_CONFIG_DIR` if set, otherwise the current working directory.
pub fn get_elci_config_dir() -> PathBuf {
    env::var_os("ELCI_CONFIG_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from)
}

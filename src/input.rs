//! Common routines for handling input data.
use crate::config::ModelConfig;
use crate::model::Model;
use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use log::info;
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

pub mod balancing_authority;
use balancing_authority::read_balancing_authorities;
pub mod facility_state;
use facility_state::read_facility_states;
pub mod flow_mapping;
use flow_mapping::read_flow_mapping;
pub mod inventory;
use inventory::{read_plant_generation, read_upstream_dir};

/// Folder containing fuel-cycle upstream tables
const UPSTREAM_DIR_NAME: &str = "upstream";

/// Folder containing renewable life-cycle tables
const RENEWABLES_DIR_NAME: &str = "renewables";

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file.
///
/// Returns an empty iterator if the file doesn't exist.
pub fn read_csv_optional<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Deserialise an optional yes/no flag.
///
/// Accepts `true`/`false` in any case as well as `1`/`0`; an empty field is `None`.
pub fn deserialise_flag<'de, D>(deserialiser: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserialiser)?;
    let Some(value) = value else {
        return Ok(None);
    };

    match value.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "1.0" => Ok(Some(true)),
        "false" | "0" | "0.0" => Ok(Some(false)),
        other => Err(D::Error::custom(format!("Invalid flag value: {other}"))),
    }
}

/// List the CSV files in a folder, sorted by file name.
///
/// Returns an empty list if the folder doesn't exist.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| input_err_msg(dir))? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

/// Load all inputs for a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration and input tables
///
/// # Returns
///
/// The loaded [`Model`] or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let config = ModelConfig::from_path(model_dir)?;

    let plant_generation = read_plant_generation(model_dir)?;
    let upstream_tables = read_upstream_dir(&model_dir.join(UPSTREAM_DIR_NAME))?;
    ensure!(
        !upstream_tables.is_empty(),
        "No upstream tables found in {}",
        model_dir.join(UPSTREAM_DIR_NAME).display()
    );
    let renewable_tables = read_upstream_dir(&model_dir.join(RENEWABLES_DIR_NAME))?;
    let flow_mapping = read_flow_mapping(model_dir)?;
    let balancing_authorities = read_balancing_authorities(model_dir)?;
    let facility_states = read_facility_states(model_dir)?;

    info!(
        "Read {} plant records, {} upstream tables and {} renewable tables",
        plant_generation.len(),
        upstream_tables.len(),
        renewable_tables.len()
    );

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        config,
        plant_generation,
        upstream_tables,
        renewable_tables,
        flow_mapping,
        balancing_authorities,
        facility_states,
    })
}

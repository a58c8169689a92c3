//! Read and validate the model configuration from `model.toml`.
//!
//! The configuration fixes the data year of the run, the policy for plants without a dominant
//! fuel and the regional resolution of the generation unit processes.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_CONFIG_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_model_name, String, "ELCI_1".to_string());
define_param_default!(default_min_percent_generation, f64, 90.0);
define_param_default!(
    default_excluded_balancing_authorities,
    Vec<String>,
    vec!["New Brunswick System Operator".to_string()]
);

/// The regional resolution at which generation unit processes are aggregated
#[derive(PartialEq, Eq, Default, Debug, Clone, Copy, Hash, DeserializeLabeledStringEnum)]
pub enum RegionLevel {
    /// One process per balancing authority
    #[default]
    #[string = "BA"]
    BalancingAuthority,
    /// One process per NERC region
    #[string = "NERC"]
    Nerc,
    /// One process per FERC region
    #[string = "FERC"]
    Ferc,
    /// A single national process per fuel
    #[string = "US"]
    National,
}

/// Model configuration as defined in the `model.toml` file
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Name of the model, used when naming output archives
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Year of the generation data. Attached to upstream records.
    pub eia_gen_year: u32,
    /// Year the inventory is intended to represent.
    ///
    /// Defaults to `eia_gen_year`.
    #[serde(default)]
    pub electricity_lci_target_year: Option<u32>,
    /// Whether plants below the primary fuel threshold are kept as a mixed fuel category
    #[serde(default)]
    pub keep_mixed_plant_category: bool,
    /// Minimum share (%) of a plant's generation that must come from its primary fuel category
    #[serde(default = "default_min_percent_generation")]
    pub min_plant_percent_generation_from_primary_fuel_category: f64,
    /// Regional resolution of generation unit processes
    #[serde(default)]
    pub region_level: RegionLevel,
    /// Names of balancing authorities whose fuel inputs are excluded from the inventory
    #[serde(default = "default_excluded_balancing_authorities")]
    pub excluded_balancing_authorities: Vec<String>,
}

/// Check that the `min_plant_percent_generation_from_primary_fuel_category` parameter is valid
fn check_min_percent_generation(value: f64) -> Result<()> {
    ensure!(
        (0.0..=100.0).contains(&value),
        "min_plant_percent_generation_from_primary_fuel_category must be between 0 and 100"
    );

    Ok(())
}

/// Check that the target year is not before the generation data year
fn check_target_year(eia_gen_year: u32, target_year: u32) -> Result<()> {
    ensure!(
        target_year >= eia_gen_year,
        "electricity_lci_target_year ({target_year}) cannot be before eia_gen_year \
        ({eia_gen_year})"
    );

    Ok(())
}

impl ModelConfig {
    /// Read the model configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model configuration as a [`ModelConfig`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelConfig> {
        let file_path = model_dir.as_ref().join(MODEL_CONFIG_FILE_NAME);
        let config: ModelConfig = read_toml(&file_path)?;
        config
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(config)
    }

    /// The year the inventory represents
    pub fn target_year(&self) -> u32 {
        self.electricity_lci_target_year
            .unwrap_or(self.eia_gen_year)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        ensure!(!self.model_name.trim().is_empty(), "model_name cannot be empty");
        check_min_percent_generation(
            self.min_plant_percent_generation_from_primary_fuel_category,
        )?;
        check_target_year(self.eia_gen_year, self.target_year())?;

        if self.keep_mixed_plant_category {
            warn!(
                "Plants generating less than {}% from their primary fuel will be kept as mixed \
                fuel plants",
                self.min_plant_percent_generation_from_primary_fuel_category
            );
        }

        Ok(())
    }
}

//! The module responsible for writing output data to disk.
use crate::inventory::InventoryTable;
use crate::upstream::FlowMappingLists;
use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

pub mod jsonld;
pub mod metadata;

/// Output file for the generation inventory including fuel inputs
pub const COMBINED_INVENTORY_FILE_NAME: &str = "combined_inventory.csv";

/// Output file for the flow-mapped upstream inventory
pub const UPSTREAM_INVENTORY_FILE_NAME: &str = "upstream_inventory.csv";

/// The default results folder for a model: `results_root/<model folder name>`
pub fn get_output_dir(model_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Canonicalised so that "." resolves to a named folder
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok(results_root.join(model_name))
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Write an inventory table to a CSV file.
///
/// Only the columns provided by the table are written, in the table's column order.
pub fn write_inventory_csv(table: &InventoryTable, file_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    writer.write_record(table.columns().iter().map(|column| column.header()))?;
    for record in table {
        writer.write_record(table.columns().iter().map(|&column| {
            record
                .get(column)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write lists of matched and unmatched flows to `flowmapping_lists_<group>.txt`.
///
/// # Returns
///
/// The path to the file written.
pub fn write_flow_mapping_lists(output_dir: &Path, lists: &FlowMappingLists) -> Result<PathBuf> {
    let file_path = output_dir.join(format!("flowmapping_lists_{}.txt", lists.group));
    fs::write(&file_path, lists.to_string())
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(file_path)
}

/// The file name of the JSON-LD archive for a run started at `datetime`
pub fn archive_file_name(model_name: &str, datetime: DateTime<Local>) -> String {
    format!(
        "{model_name}_jsonld_{}.zip",
        datetime.format("%Y%m%d_%H%M%S")
    )
}

//! Code for reading plant generation and upstream inventory tables.
use super::{input_err_msg, list_csv_files};
use crate::inventory::{Column, InventoryTable};
use crate::upstream::{UpstreamRecord, UpstreamTable};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::path::Path;

const PLANT_GENERATION_FILE_NAME: &str = "plant_generation.csv";

/// Stage code given to plant records whose file has no `stage_code` column
pub const POWER_PLANT_STAGE: &str = "Power plant";

/// Read a CSV file along with its header row
fn read_csv_with_headers<T: DeserializeOwned>(file_path: &Path) -> Result<(Vec<String>, Vec<T>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;
    let headers = reader
        .headers()
        .with_context(|| input_err_msg(file_path))?
        .iter()
        .map(String::from)
        .collect();
    let records = reader
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok((headers, records))
}

/// Read an inventory table from a CSV file.
///
/// Only columns with recognised headers become part of the table's schema.
pub fn read_inventory_csv(file_path: &Path) -> Result<InventoryTable> {
    let (headers, records) = read_csv_with_headers(file_path)?;
    let columns = headers
        .iter()
        .filter_map(|header| {
            let column = Column::from_header(header);
            if column.is_none() {
                debug!("Ignoring column {header} in {}", file_path.display());
            }
            column
        })
        .collect_vec();

    Ok(InventoryTable::from_records(columns, records))
}

/// Read the per-plant generation and emissions table.
///
/// Plant records belong to the power plant stage, so if the file has no `stage_code` column
/// every record is given one.
pub fn read_plant_generation(model_dir: &Path) -> Result<InventoryTable> {
    let file_path = model_dir.join(PLANT_GENERATION_FILE_NAME);
    let mut table = read_inventory_csv(&file_path)?;
    ensure!(
        !table.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    if !table.has_column(Column::StageCode) {
        table.add_column(Column::StageCode);
        for record in table.records_mut() {
            record.stage_code = Some(POWER_PLANT_STAGE.to_string());
        }
    }

    Ok(table)
}

/// Read a single upstream table
fn read_upstream_table(file_path: &Path) -> Result<UpstreamTable> {
    let (headers, records) = read_csv_with_headers::<UpstreamRecord>(file_path)?;
    let name = file_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(UpstreamTable {
        name,
        has_input: headers.iter().any(|h| h == Column::Input.header()),
        has_electricity: headers.iter().any(|h| h == Column::Electricity.header()),
        records,
    })
}

/// Read every upstream table in a folder, in file name order.
///
/// Returns an empty list if the folder doesn't exist.
pub fn read_upstream_dir(dir: &Path) -> Result<Vec<UpstreamTable>> {
    let tables: Vec<_> = list_csv_files(dir)?
        .iter()
        .map(|path| read_upstream_table(path))
        .try_collect()?;
    for table in &tables {
        info!("Read upstream table {} ({} rows)", table.name, table.records.len());
    }

    Ok(tables)
}

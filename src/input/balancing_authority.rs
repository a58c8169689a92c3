//! Code for reading the balancing authority reference table.
//!
//! The table is read from the `US` and `Canada` sheets of `BA_Codes_930.xlsx` or, if the workbook
//! is absent, from an equivalent pair of CSV files.
use super::{input_err_msg, read_csv};
use crate::balancing_authority::{BalancingAuthority, BalancingAuthorityMap};
use anyhow::{Context, Result, bail, ensure};
use calamine::{Data, Range, Reader, open_workbook_auto};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const BA_WORKBOOK_FILE_NAME: &str = "BA_Codes_930.xlsx";
const BA_US_FILE_NAME: &str = "ba_codes_us.csv";
const BA_CANADA_FILE_NAME: &str = "ba_codes_canada.csv";

/// Sheets to read, in priority order
const BA_SHEET_NAMES: [&str; 2] = ["US", "Canada"];

/// Number of rows preceding the header row in each sheet
const BA_SHEET_HEADER_OFFSET: usize = 4;

const CODE_HEADER: &str = "etag ID";
const NAME_HEADER: &str = "Entity Name";
const FERC_HEADER: &str = "FERC_Region";
const EIA_HEADER: &str = "EIA_Region";

#[derive(Debug, PartialEq, Deserialize)]
struct BalancingAuthorityRaw {
    #[serde(rename = "etag ID")]
    code: String,
    #[serde(rename = "Entity Name")]
    name: String,
    #[serde(rename = "FERC_Region", default)]
    ferc_region: Option<String>,
    #[serde(rename = "EIA_Region", default)]
    eia_region: Option<String>,
}

/// Read the balancing authority reference table from the model directory.
///
/// Entries from the US sheet take precedence over entries with the same code from the Canada
/// sheet.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of balancing authorities keyed by code or an error.
pub fn read_balancing_authorities(model_dir: &Path) -> Result<BalancingAuthorityMap> {
    let workbook_path = model_dir.join(BA_WORKBOOK_FILE_NAME);
    let raw = if workbook_path.is_file() {
        read_ba_workbook(&workbook_path)?
    } else {
        let mut raw = Vec::new();
        for file_name in [BA_US_FILE_NAME, BA_CANADA_FILE_NAME] {
            let file_path = model_dir.join(file_name);
            ensure!(
                file_path.is_file(),
                "Missing balancing authority table: expected {BA_WORKBOOK_FILE_NAME} or \
                {file_name} in {}",
                model_dir.display()
            );
            raw.extend(read_csv::<BalancingAuthorityRaw>(&file_path)?);
        }
        raw
    };

    Ok(build_balancing_authority_map(raw))
}

fn build_balancing_authority_map<I>(iter: I) -> BalancingAuthorityMap
where
    I: IntoIterator<Item = BalancingAuthorityRaw>,
{
    let mut map = BalancingAuthorityMap::new();
    for raw in iter {
        if raw.code.is_empty() {
            continue;
        }

        if map.contains_key(&raw.code) {
            warn!(
                "Duplicate balancing authority code {}; keeping first entry",
                raw.code
            );
            continue;
        }

        map.insert(
            raw.code.clone(),
            BalancingAuthority {
                code: raw.code,
                name: raw.name,
                ferc_region: raw.ferc_region.filter(|s| !s.is_empty()),
                eia_region: raw.eia_region.filter(|s| !s.is_empty()),
            },
        );
    }

    map
}

fn read_ba_workbook(file_path: &Path) -> Result<Vec<BalancingAuthorityRaw>> {
    let mut workbook = open_workbook_auto(file_path).with_context(|| input_err_msg(file_path))?;

    let mut raw = Vec::new();
    for sheet_name in BA_SHEET_NAMES {
        let range = workbook
            .worksheet_range(sheet_name)
            .with_context(|| format!("Could not read sheet {sheet_name}"))
            .with_context(|| input_err_msg(file_path))?;
        raw.extend(
            read_ba_sheet(&range)
                .with_context(|| format!("Invalid sheet {sheet_name}"))
                .with_context(|| input_err_msg(file_path))?,
        );
    }

    Ok(raw)
}

fn read_ba_sheet(range: &Range<Data>) -> Result<Vec<BalancingAuthorityRaw>> {
    let mut rows = range.rows().skip(BA_SHEET_HEADER_OFFSET);
    let Some(header) = rows.next() else {
        bail!("Sheet has no header row");
    };
    let headers: Vec<_> = header.iter().map(cell_to_string).collect();
    let find_column = |name: &str| headers.iter().position(|h| h.as_deref() == Some(name));

    let Some(code_idx) = find_column(CODE_HEADER) else {
        bail!("Missing column: {CODE_HEADER}");
    };
    let Some(name_idx) = find_column(NAME_HEADER) else {
        bail!("Missing column: {NAME_HEADER}");
    };
    let ferc_idx = find_column(FERC_HEADER);
    let eia_idx = find_column(EIA_HEADER);

    let get = |row: &[Data], idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(cell_to_string);
    Ok(rows
        .filter_map(|row| {
            Some(BalancingAuthorityRaw {
                code: get(row, Some(code_idx))?,
                name: get(row, Some(name_idx)).unwrap_or_default(),
                ferc_region: get(row, ferc_idx),
                eia_region: get(row, eia_idx),
            })
        })
        .collect())
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => Some(other.to_string()),
    }
}

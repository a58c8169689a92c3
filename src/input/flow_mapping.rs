//! Code for reading the canonical flow mapping table.
use super::{input_err_msg, read_csv};
use crate::flow_mapping::{FlowMapping, FlowMappingEntry};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const FLOW_MAPPING_FILE_NAME: &str = "flow_mapping.csv";

#[derive(Debug, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlowMappingRaw {
    source_flow_name: String,
    source_flow_context: String,
    target_flow_name: String,
    #[serde(rename = "TargetFlowUUID")]
    target_flow_uuid: String,
    target_flow_context: String,
    target_unit: String,
    conversion_factor: f64,
}

/// Read the canonical flow mapping from the model directory.
///
/// If a source pair appears more than once, the first entry is used.
pub fn read_flow_mapping(model_dir: &Path) -> Result<FlowMapping> {
    let file_path = model_dir.join(FLOW_MAPPING_FILE_NAME);
    let iter = read_csv::<FlowMappingRaw>(&file_path)?;
    read_flow_mapping_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_flow_mapping_from_iter<I>(iter: I) -> Result<FlowMapping>
where
    I: Iterator<Item = FlowMappingRaw>,
{
    let mut mapping = FlowMapping::new();
    for raw in iter {
        ensure!(
            raw.conversion_factor.is_finite(),
            "Invalid conversion factor for flow {} ({})",
            raw.source_flow_name,
            raw.source_flow_context
        );

        let entry = FlowMappingEntry {
            target_name: raw.target_flow_name,
            target_uuid: raw.target_flow_uuid,
            target_context: raw.target_flow_context,
            target_unit: raw.target_unit,
            conversion_factor: raw.conversion_factor,
        };
        if !mapping.insert(&raw.source_flow_name, &raw.source_flow_context, entry) {
            warn!(
                "Duplicate flow mapping for {} ({}); keeping first entry",
                raw.source_flow_name, raw.source_flow_context
            );
        }
    }

    Ok(mapping)
}

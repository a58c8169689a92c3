//! Code for reading the facility to state reference table.
use super::read_csv_optional;
use crate::key_fill::FacilityStateMap;
use anyhow::Result;
use log::warn;
use serde::Deserialize;
use std::path::Path;

const FACILITY_STATES_FILE_NAME: &str = "facility_states.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct FacilityStateRaw {
    #[serde(rename = "Plant Id")]
    plant_id: u32,
    #[serde(rename = "State")]
    state: String,
}

/// Read the facility to state reference table from the model directory.
///
/// The file is optional; if absent, no fallback state values are available.
pub fn read_facility_states(model_dir: &Path) -> Result<FacilityStateMap> {
    let file_path = model_dir.join(FACILITY_STATES_FILE_NAME);
    if !file_path.is_file() {
        warn!(
            "No {FACILITY_STATES_FILE_NAME} found; plant records without a State value will be \
            dropped"
        );
    }

    read_facility_states_from_iter(read_csv_optional(&file_path)?)
}

fn read_facility_states_from_iter<I>(iter: I) -> Result<FacilityStateMap>
where
    I: Iterator<Item = FacilityStateRaw>,
{
    let mut map = FacilityStateMap::new();
    for raw in iter {
        if raw.state.is_empty() {
            continue;
        }

        if map.contains_key(&raw.plant_id) {
            warn!("Duplicate state entry for plant {}; keeping first", raw.plant_id);
            continue;
        }
        map.insert(raw.plant_id, raw.state);
    }

    Ok(map)
}

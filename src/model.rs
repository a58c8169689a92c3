//! The model represents the static input data provided by the user.
use crate::balancing_authority::BalancingAuthorityMap;
use crate::config::ModelConfig;
use crate::flow_mapping::FlowMapping;
use crate::inventory::InventoryTable;
use crate::key_fill::FacilityStateMap;
use crate::upstream::UpstreamTable;
use std::path::PathBuf;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Configuration from the model TOML file
    pub config: ModelConfig,
    /// Per-plant emissions and generation
    pub plant_generation: InventoryTable,
    /// Fuel-cycle upstream tables, in file name order
    pub upstream_tables: Vec<UpstreamTable>,
    /// Renewable life-cycle tables, in file name order
    pub renewable_tables: Vec<UpstreamTable>,
    /// Canonical flow mapping
    pub flow_mapping: FlowMapping,
    /// Balancing authority reference table
    pub balancing_authorities: BalancingAuthorityMap,
    /// Fallback states of facilities
    pub facility_states: FacilityStateMap,
}

impl Model {
    /// Whether any renewable life-cycle tables were provided
    pub fn has_renewables(&self) -> bool {
        !self.renewable_tables.is_empty()
    }
}

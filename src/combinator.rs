//! Combine per-plant inventories with flow-mapped upstream inventories.
use crate::balancing_authority::BalancingAuthorityMap;
use crate::input::inventory::POWER_PLANT_STAGE;
use crate::inventory::{Column, InventoryRecord, InventoryTable};
use crate::key_fill::{FacilityStateMap, KeyFiller};
use anyhow::Result;
use log::info;
use std::collections::HashMap;

/// Fuel category given to plants with no dominant fuel
pub const MIXED_FUEL_CATEGORY: &str = "MIXED";

/// Primary fuel given to plants with no dominant fuel
pub const MIXED_PRIMARY_FUEL: &str = "Mixed Fuel Type";

/// Fuel category used by construction inventories
const CONSTRUCTION_FUEL_CATEGORY: &str = "CONSTRUCTION";

/// How to treat plants generating too little from their primary fuel category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixedFuelPolicy {
    /// Minimum share (%) of generation from the primary fuel category
    pub min_percent_generation: f64,
    /// Whether plants below the minimum are relabelled as mixed fuel rather than dropped
    pub keep_mixed: bool,
}

/// Region attributes copied from plant records onto upstream records
#[derive(Debug, Clone)]
struct PlantRegion {
    nerc: Option<String>,
    ba_code: Option<String>,
    ba_name: Option<String>,
    subregion: Option<String>,
}

/// Merges plant and upstream inventories into a single table
pub struct Combiner<'a> {
    balancing_authorities: &'a BalancingAuthorityMap,
    filler: KeyFiller<'a>,
    policy: MixedFuelPolicy,
}

impl<'a> Combiner<'a> {
    /// Create a combiner.
    ///
    /// # Arguments
    ///
    /// * `balancing_authorities` - Reference table used to derive BA names and regions
    /// * `facility_states` - Fallback table of plant states
    /// * `policy` - Treatment of mixed fuel plants
    pub fn new(
        balancing_authorities: &'a BalancingAuthorityMap,
        facility_states: &'a FacilityStateMap,
        policy: MixedFuelPolicy,
    ) -> Self {
        Self {
            balancing_authorities,
            filler: KeyFiller::new(facility_states),
            policy,
        }
    }

    /// Combine plant and upstream inventories.
    ///
    /// Upstream records take their region from the plant they supply. Fuel categories are only
    /// kept for the power plant stage, missing attributes are filled per facility and the
    /// mixed fuel policy is applied.
    pub fn concat_clean_upstream_and_plant(
        &self,
        plants: InventoryTable,
        mut upstream: InventoryTable,
    ) -> Result<InventoryTable> {
        attach_plant_regions(&plants, &mut upstream);

        let mut combined = InventoryTable::concat([plants, upstream]);
        self.derive_ba_attributes(&mut combined);

        combined.drop_column(Column::PlantID);
        combined.add_column(Column::FacilityID);
        combined.add_column(Column::FuelCategory);
        for record in combined.records_mut() {
            record.facility_id = record.egrid_id;

            let is_power_plant = record.stage_code.as_deref() == Some(POWER_PLANT_STAGE);
            let is_construction =
                record.fuel_category.as_deref() == Some(CONSTRUCTION_FUEL_CATEGORY);
            if !is_power_plant || is_construction {
                record.fuel_category = None;
            }
        }

        self.filler
            .fill_nans(&mut combined, Column::FacilityID, &[], true)?;
        self.apply_mixed_fuel_policy(&mut combined);

        info!("Combined inventory has {} records", combined.len());
        Ok(combined)
    }

    /// Set BA name and FERC/EIA regions from the BA code
    fn derive_ba_attributes(&self, table: &mut InventoryTable) {
        for column in [
            Column::BalancingAuthorityName,
            Column::FercRegion,
            Column::EiaRegion,
        ] {
            table.add_column(column);
        }

        for record in table.records_mut() {
            let ba = record
                .ba_code
                .as_ref()
                .and_then(|code| self.balancing_authorities.get(code));
            record.ba_name = ba.map(|ba| ba.name.clone());
            record.ferc_region = ba.and_then(|ba| ba.ferc_region.clone());
            record.eia_region = ba.and_then(|ba| ba.eia_region.clone());
        }
    }

    fn apply_mixed_fuel_policy(&self, table: &mut InventoryTable) {
        let threshold = self.policy.min_percent_generation / 100.0;
        let is_mixed = |record: &InventoryRecord| {
            record
                .percent_generation
                .is_some_and(|percent| percent < threshold)
        };

        if self.policy.keep_mixed {
            table.add_column(Column::PrimaryFuel);
            for record in table.records_mut() {
                if is_mixed(record) {
                    record.fuel_category = Some(MIXED_FUEL_CATEGORY.to_string());
                    record.primary_fuel = Some(MIXED_PRIMARY_FUEL.to_string());
                }
            }
        } else {
            let len_before = table.len();
            table.retain(|record| !is_mixed(record));
            info!(
                "Dropped {} records for plants below the primary fuel threshold",
                len_before - table.len()
            );
        }
    }
}

/// Copy region attributes onto upstream records from the plant each one supplies.
///
/// Upstream records for plants absent from the plant table get no eGRID ID.
fn attach_plant_regions(plants: &InventoryTable, upstream: &mut InventoryTable) {
    let mut regions = HashMap::new();
    for record in plants {
        if let Some(egrid_id) = record.egrid_id {
            regions.entry(egrid_id).or_insert_with(|| PlantRegion {
                nerc: record.nerc.clone(),
                ba_code: record.ba_code.clone(),
                ba_name: record.ba_name.clone(),
                subregion: record.subregion.clone(),
            });
        }
    }

    for column in [
        Column::EgridID,
        Column::Nerc,
        Column::BalancingAuthorityCode,
        Column::BalancingAuthorityName,
        Column::Subregion,
    ] {
        upstream.add_column(column);
    }

    for record in upstream.records_mut() {
        let region = record.plant_id.and_then(|id| regions.get(&id));
        record.egrid_id = region.and(record.plant_id);
        record.nerc = region.and_then(|r| r.nerc.clone());
        record.ba_code = region.and_then(|r| r.ba_code.clone());
        record.ba_name = region.and_then(|r| r.ba_name.clone());
        record.subregion = region.and_then(|r| r.subregion.clone());
    }
}

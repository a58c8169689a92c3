//! Convert upstream fuel deliveries into fuel input records for generating plants.
use crate::dqi::{MODELLED_DATA_SCORES, TemporalCorrelationScorer};
use crate::inventory::{Column, InventoryRecord, InventoryTable};
use crate::key_fill::{FacilityStateMap, KeyFiller};
use crate::process::UpstreamReferenceMap;
use anyhow::Result;
use indexmap::IndexSet;
use log::{info, warn};
use std::collections::{HashMap, HashSet};

/// Compartment and prime context of fuel input records
const INPUT_CONTEXT: &str = "input";

/// Source tag for fuel input records
const FUEL_INPUT_SOURCE: &str = "eia";

/// Columns populated for synthesised fuel input records
const FUEL_INPUT_COLUMNS: [Column; 22] = [
    Column::FacilityID,
    Column::EgridID,
    Column::FuelCategory,
    Column::StageCode,
    Column::FlowName,
    Column::Compartment,
    Column::FlowUuid,
    Column::Unit,
    Column::PrimeContext,
    Column::FlowAmount,
    Column::Electricity,
    Column::Source,
    Column::Year,
    Column::BalancingAuthorityCode,
    Column::BalancingAuthorityName,
    Column::Nerc,
    Column::Subregion,
    Column::TechnologicalCorrelation,
    Column::TemporalCorrelation,
    Column::GeographicalCorrelation,
    Column::ReliabilityScore,
    Column::DataCollection,
];

/// Plant attributes copied onto fuel input records
struct PlantAttributes {
    age: Option<f64>,
    ba_code: Option<String>,
    ba_name: Option<String>,
    electricity: Option<f64>,
    nerc: Option<String>,
    subregion: Option<String>,
}

/// Adds fuel input records to a generation inventory
pub struct FuelInputSynthesizer<'a> {
    filler: KeyFiller<'a>,
    scorer: &'a dyn TemporalCorrelationScorer,
    excluded_balancing_authorities: &'a [String],
}

impl<'a> FuelInputSynthesizer<'a> {
    /// Create a synthesizer.
    ///
    /// # Arguments
    ///
    /// * `facility_states` - Fallback table of plant states
    /// * `scorer` - Temporal correlation scorer for fuel input records
    /// * `excluded_balancing_authorities` - Names of BAs whose records are removed from the result
    pub fn new(
        facility_states: &'a FacilityStateMap,
        scorer: &'a dyn TemporalCorrelationScorer,
        excluded_balancing_authorities: &'a [String],
    ) -> Self {
        Self {
            filler: KeyFiller::new(facility_states),
            scorer,
            excluded_balancing_authorities,
        }
    }

    /// Add a fuel input record for each fuel delivery in `upstream` to the generation table.
    ///
    /// One record is created per distinct (plant, stage, quantity). Each takes its flow from the
    /// reference product of the upstream unit process for its stage. Deliveries to plants without
    /// electricity output are dropped.
    ///
    /// # Arguments
    ///
    /// * `generation` - Generation inventory
    /// * `upstream` - Flow-mapped upstream inventory
    /// * `references` - Reference products of upstream unit processes, keyed by stage code
    pub fn add_fuel_inputs(
        &self,
        generation: InventoryTable,
        upstream: &InventoryTable,
        references: &UpstreamReferenceMap,
    ) -> Result<InventoryTable> {
        let mut plants = HashMap::new();
        let mut fuel_categories = HashMap::new();
        for record in &generation {
            if let Some(egrid_id) = record.egrid_id {
                plants.entry(egrid_id).or_insert_with(|| PlantAttributes {
                    age: record.age,
                    ba_code: record.ba_code.clone(),
                    ba_name: record.ba_name.clone(),
                    electricity: record.electricity,
                    nerc: record.nerc.clone(),
                    subregion: record.subregion.clone(),
                });
            }
            if let Some(facility_id) = record.facility_id {
                fuel_categories
                    .entry(facility_id)
                    .or_insert_with(|| record.fuel_category.clone());
            }
        }

        let mut columns = FUEL_INPUT_COLUMNS.to_vec();
        if generation.has_column(Column::Age) {
            columns.push(Column::Age);
        }
        let mut fuel = InventoryTable::new(columns);

        let mut seen = HashSet::new();
        let mut missing_stages = IndexSet::new();
        for record in upstream {
            let (Some(plant_id), Some(stage_code)) = (record.plant_id, &record.stage_code) else {
                continue;
            };
            if !seen.insert((plant_id, stage_code, record.quantity.map(f64::to_bits))) {
                continue;
            }

            let Some(reference) = references.get(stage_code) else {
                missing_stages.insert(stage_code.as_str());
                continue;
            };
            let Some(plant) = plants.get(&plant_id) else {
                continue;
            };
            if plant.electricity.is_none() {
                continue;
            }

            fuel.push(InventoryRecord {
                facility_id: Some(plant_id),
                egrid_id: Some(plant_id),
                fuel_category: fuel_categories.get(&plant_id).cloned().flatten(),
                stage_code: Some(stage_code.clone()),
                flow_name: Some(reference.name.clone()),
                compartment: Some(INPUT_CONTEXT.to_string()),
                flow_uuid: Some(reference.flow_id.clone()),
                unit: Some(reference.unit.clone()),
                prime_context: Some(INPUT_CONTEXT.to_string()),
                flow_amount: record.quantity,
                electricity: plant.electricity,
                source: Some(FUEL_INPUT_SOURCE.to_string()),
                year: record.year,
                age: plant.age,
                ba_code: plant.ba_code.clone(),
                ba_name: plant.ba_name.clone(),
                nerc: plant.nerc.clone(),
                subregion: plant.subregion.clone(),
                technological_correlation: Some(MODELLED_DATA_SCORES.technological_correlation),
                temporal_correlation: record.year.map(|year| self.scorer.score(year)),
                geographical_correlation: Some(MODELLED_DATA_SCORES.geographical_correlation),
                reliability_score: Some(MODELLED_DATA_SCORES.reliability),
                data_collection: Some(MODELLED_DATA_SCORES.data_collection),
                ..Default::default()
            });
        }

        for stage_code in missing_stages {
            warn!("No upstream unit process for stage {stage_code}; fuel inputs skipped");
        }
        info!("Synthesised {} fuel input records", fuel.len());

        let mut combined = InventoryTable::concat([generation, fuel]);
        self.filler
            .fill_nans(&mut combined, Column::FacilityID, &[], true)?;
        combined.retain(|record| {
            !record
                .ba_name
                .as_ref()
                .is_some_and(|name| self.excluded_balancing_authorities.contains(name))
        });

        Ok(combined)
    }
}

//! The batch run which turns a loaded model into an inventory archive.
use crate::combinator::{Combiner, MixedFuelPolicy};
use crate::dqi::{AgeBandScorer, MODELLED_DATA_SCORES};
use crate::fuel_input::FuelInputSynthesizer;
use crate::inventory::InventoryTable;
use crate::model::Model;
use crate::output::jsonld::write_processes;
use crate::output::metadata::write_metadata;
use crate::output::{
    COMBINED_INVENTORY_FILE_NAME, UPSTREAM_INVENTORY_FILE_NAME, archive_file_name,
    write_flow_mapping_lists, write_inventory_csv,
};
use crate::process::{build_generation_processes, build_upstream_processes};
use crate::upstream::{FlowMappingLists, UpstreamFlowMapper};
use anyhow::{Context, Result, ensure};
use chrono::Local;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Flow-list group for renewable life-cycle tables
const RENEWABLES_GROUP: &str = "renewables";

/// Flow-list group for fuel-cycle upstream tables
const UPSTREAM_GROUP: &str = "upstream";

/// Run the inventory pipeline for a model, writing results to `output_path`.
///
/// # Arguments
///
/// * `model` - The loaded model
/// * `output_path` - Existing folder to write results into
/// * `write_flow_lists` - Whether to write lists of matched and unmatched flows
///
/// # Returns
///
/// The path to the JSON-LD archive.
pub fn run(model: &Model, output_path: &Path, write_flow_lists: bool) -> Result<PathBuf> {
    let started = Local::now();
    let config = &model.config;
    let group = |name| write_flow_lists.then_some(name);

    let mapper = UpstreamFlowMapper::new(&model.flow_mapping, config.eia_gen_year);
    let combiner = Combiner::new(
        &model.balancing_authorities,
        &model.facility_states,
        MixedFuelPolicy {
            min_percent_generation: config
                .min_plant_percent_generation_from_primary_fuel_category,
            keep_mixed: config.keep_mixed_plant_category,
        },
    );

    // Renewable life-cycle records are merged with plant records to form the generation table
    let renewables = if model.has_renewables() {
        let mapped = mapper.map_tables(&model.renewable_tables, group(RENEWABLES_GROUP));
        write_lists(output_path, mapped.flow_lists.as_ref())?;
        let mut table = mapped.table;
        MODELLED_DATA_SCORES.apply(&mut table);
        table
    } else {
        info!("No renewable tables provided");
        InventoryTable::default()
    };
    let generation = combiner
        .concat_clean_upstream_and_plant(model.plant_generation.clone(), renewables)
        .context("Failed to combine plant and renewable inventories")?;
    ensure!(
        !generation.is_empty(),
        "No plant records remain after combining inventories. Every plant needs a state (from \
        plant_generation.csv or facility_states.csv) and a known balancing authority."
    );

    let upstream = mapper.map_tables(&model.upstream_tables, group(UPSTREAM_GROUP));
    write_lists(output_path, upstream.flow_lists.as_ref())?;
    if upstream.table.is_empty() {
        warn!("No upstream flows could be mapped");
    }

    let (mut processes, references) = build_upstream_processes(&upstream.table);
    let scorer = AgeBandScorer::new(config.target_year());
    let synthesizer = FuelInputSynthesizer::new(
        &model.facility_states,
        &scorer,
        &config.excluded_balancing_authorities,
    );
    let combined = synthesizer
        .add_fuel_inputs(generation, &upstream.table, &references)
        .context("Failed to add fuel inputs")?;

    for (name, process) in build_generation_processes(&combined, config.region_level) {
        if processes.insert(name, process).is_some() {
            warn!("A generation process has the same name as an upstream stage; keeping the former");
        }
    }

    let archive_name = archive_file_name(&config.model_name, started);
    let archive_path = output_path.join(&archive_name);
    let summary = write_processes(&processes, &archive_path)?;
    info!(
        "Wrote {} unit processes and {} categories to {}",
        summary.processes,
        summary.categories,
        archive_path.display()
    );

    write_inventory_csv(&combined, &output_path.join(COMBINED_INVENTORY_FILE_NAME))?;
    write_inventory_csv(&upstream.table, &output_path.join(UPSTREAM_INVENTORY_FILE_NAME))?;
    write_metadata(output_path, model, started, &archive_name, summary)?;

    Ok(archive_path)
}

fn write_lists(output_path: &Path, lists: Option<&FlowMappingLists>) -> Result<()> {
    if let Some(lists) = lists {
        let file_path = write_flow_mapping_lists(output_path, lists)?;
        info!("Flow mapping lists written to {}", file_path.display());
    }

    Ok(())
}

//! Build electricity generation unit processes by region and fuel.
use super::{Exchange, FlowRef, FlowType, Process, ProcessMap, Unit};
use crate::config::RegionLevel;
use crate::id::product_flow_id;
use crate::inventory::{InventoryRecord, InventoryTable};
use indexmap::IndexMap;
use log::{info, warn};
use std::collections::HashSet;

const GENERATION_CATEGORY: &str =
    "22: Utilities/2211: Electric Power Generation, Transmission and Distribution";

/// Region name used when aggregating nationally
const NATIONAL_REGION: &str = "US";

/// The region a record belongs to at the given level
fn region_of(record: &InventoryRecord, level: RegionLevel) -> Option<&str> {
    match level {
        RegionLevel::BalancingAuthority => record.ba_name.as_deref(),
        RegionLevel::Nerc => record.nerc.as_deref(),
        RegionLevel::Ferc => record.ferc_region.as_deref(),
        RegionLevel::National => Some(NATIONAL_REGION),
    }
}

/// Exchange direction and flow type for a record
fn exchange_kind(record: &InventoryRecord) -> (bool, FlowType) {
    match record.prime_context.as_deref() {
        Some("input") => (true, FlowType::Product),
        Some("resource") => (true, FlowType::Elementary),
        _ => (record.input.unwrap_or(false), FlowType::Elementary),
    }
}

/// Build one generation unit process for each region and fuel category.
///
/// Each process produces 1 MWh of electricity. Exchange amounts are the group's total amount of
/// each flow divided by the group's total generation, with each facility's generation counted
/// once.
pub fn build_generation_processes(table: &InventoryTable, level: RegionLevel) -> ProcessMap {
    let mut groups: IndexMap<(&str, &str), Vec<&InventoryRecord>> = IndexMap::new();
    for record in table {
        if let (Some(region), Some(fuel)) = (region_of(record, level), record.fuel_category.as_deref())
        {
            groups.entry((region, fuel)).or_default().push(record);
        }
    }

    let processes: ProcessMap = groups
        .into_iter()
        .filter_map(|((region, fuel), records)| build_group_process(region, fuel, &records))
        .map(|process| (process.name.clone(), process))
        .collect();
    info!("Built {} generation unit processes", processes.len());

    processes
}

fn build_group_process(region: &str, fuel: &str, records: &[&InventoryRecord]) -> Option<Process> {
    let name = format!("Electricity - {fuel} - {region}");

    let mut facilities = HashSet::new();
    let mut total_generation = 0.0;
    for record in records {
        if let (Some(facility_id), Some(electricity)) = (record.facility_id, record.electricity) {
            if facilities.insert(facility_id) {
                total_generation += electricity;
            }
        }
    }
    if total_generation <= 0.0 {
        warn!("No generation for {name}; no unit process created");
        return None;
    }

    let mut flows: IndexMap<(String, String, String, bool), (FlowRef, f64)> = IndexMap::new();
    for record in records {
        let (Some(flow_name), Some(amount)) = (&record.flow_name, record.flow_amount) else {
            continue;
        };
        let (is_input, flow_type) = exchange_kind(record);
        let id = record.flow_uuid.clone().unwrap_or_default();
        let unit = record.unit.clone().unwrap_or_default();
        let (_, total) = flows
            .entry((id.clone(), flow_name.clone(), unit, is_input))
            .or_insert_with(|| {
                (
                    FlowRef {
                        id,
                        name: flow_name.clone(),
                        flow_type,
                    },
                    0.0,
                )
            });
        *total += amount;
    }

    let mut exchanges = vec![Some(Exchange {
        flow: Some(FlowRef {
            id: product_flow_id(&name),
            name: "Electricity".to_string(),
            flow_type: FlowType::Product,
        }),
        unit: Unit::MegawattHour,
        amount: Some(1.0),
        input: Some(false),
        quantitative_reference: Some(true),
        avoided_product: None,
    })];
    exchanges.extend(
        flows
            .into_iter()
            .map(|((_, _, unit, is_input), (flow, total))| {
                Some(Exchange {
                    flow: Some(flow),
                    unit: Unit::from_name(&unit),
                    amount: Some(total / total_generation),
                    input: Some(is_input),
                    quantitative_reference: None,
                    avoided_product: None,
                })
            }),
    );

    Some(Process {
        name,
        category: Some(format!("{GENERATION_CATEGORY}/{fuel}")),
        description: Some(format!(
            "Electricity from {fuel} plants in {region}, aggregated from {} facilities",
            facilities.len()
        )),
        exchanges,
    })
}

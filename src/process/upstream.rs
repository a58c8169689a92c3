//! Build unit processes for upstream fuel-cycle stages.
use super::{Exchange, FlowRef, FlowType, Process, ProcessMap, Unit, UpstreamReferenceMap};
use crate::id::product_flow_id;
use crate::inventory::{InventoryRecord, InventoryTable};
use indexmap::IndexMap;
use log::warn;
use std::collections::HashSet;

/// The product delivered by an upstream fuel cycle
struct FuelProduct {
    name: String,
    unit: Unit,
    category: String,
}

/// Look up the product delivered by the fuel cycle for a fuel category
fn fuel_product(fuel_category: &str) -> FuelProduct {
    const MINING: &str = "21: Mining, Quarrying, and Oil and Gas Extraction";
    let (name, unit, category) = match fuel_category {
        "COAL" => (
            "coal, processed, at mine",
            Unit::Kilogram,
            format!("{MINING}/2121: Coal Mining"),
        ),
        "GAS" => (
            "natural gas, through transmission",
            Unit::Megajoule,
            format!("{MINING}/2111: Oil and Gas Extraction"),
        ),
        "OIL" => (
            "petroleum fuel, through transportation",
            Unit::Kilogram,
            format!("{MINING}/2111: Oil and Gas Extraction"),
        ),
        "NUCLEAR" => (
            "nuclear fuel, through transportation",
            Unit::Kilogram,
            format!("{MINING}/2122: Metal Ore Mining"),
        ),
        other => {
            return FuelProduct {
                name: format!("{} upstream", other.to_lowercase()),
                unit: Unit::Megajoule,
                category: format!("Upstream/{other}"),
            };
        }
    };

    FuelProduct {
        name: name.to_string(),
        unit,
        category,
    }
}

/// Build one unit process for each upstream stage.
///
/// Each process delivers one unit of its fuel product. Emission and resource amounts are totals
/// for the stage divided by the total quantity of fuel the stage delivered.
///
/// # Returns
///
/// The processes, keyed by name, and the reference product of each, keyed by stage code.
pub fn build_upstream_processes(upstream: &InventoryTable) -> (ProcessMap, UpstreamReferenceMap) {
    let mut stages: IndexMap<&str, Vec<&InventoryRecord>> = IndexMap::new();
    for record in upstream {
        if let Some(stage_code) = record.stage_code.as_deref() {
            stages.entry(stage_code).or_default().push(record);
        }
    }

    let mut processes = ProcessMap::new();
    let mut references = UpstreamReferenceMap::new();
    for (stage_code, records) in stages {
        let Some(process) = build_stage_process(stage_code, &records) else {
            continue;
        };
        if let Some(reference) = process.reference_descriptor() {
            references.insert(stage_code.to_string(), reference);
        }
        processes.insert(process.name.clone(), process);
    }

    (processes, references)
}

fn build_stage_process(stage_code: &str, records: &[&InventoryRecord]) -> Option<Process> {
    let fuel_category = records
        .iter()
        .find_map(|record| record.fuel_category.as_deref())
        .unwrap_or_default();
    let product = fuel_product(fuel_category);

    // Each plant's delivery appears once per flow, so count it once
    let mut deliveries = HashSet::new();
    let mut total_quantity = 0.0;
    for record in records {
        if let (Some(plant_id), Some(quantity)) = (record.plant_id, record.quantity) {
            if deliveries.insert((plant_id, quantity.to_bits())) {
                total_quantity += quantity;
            }
        }
    }
    if total_quantity <= 0.0 {
        warn!("Upstream stage {stage_code} delivered no fuel; no unit process created");
        return None;
    }

    let mut flows: IndexMap<(String, String, String, bool), (FlowRef, f64)> = IndexMap::new();
    for record in records {
        let (Some(name), Some(amount)) = (&record.flow_name, record.flow_amount) else {
            continue;
        };
        let id = record.flow_uuid.clone().unwrap_or_default();
        let unit = record.unit.clone().unwrap_or_default();
        let is_input = record.prime_context.as_deref() == Some("resource");
        let (_, total) = flows
            .entry((id.clone(), name.clone(), unit, is_input))
            .or_insert_with(|| {
                (
                    FlowRef {
                        id,
                        name: name.clone(),
                        flow_type: FlowType::Elementary,
                    },
                    0.0,
                )
            });
        *total += amount;
    }

    let mut exchanges = vec![Some(Exchange {
        flow: Some(FlowRef {
            id: product_flow_id(stage_code),
            name: product.name,
            flow_type: FlowType::Product,
        }),
        unit: product.unit,
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
                    amount: Some(total / total_quantity),
                    input: Some(is_input),
                    quantitative_reference: None,
                    avoided_product: None,
                })
            }),
    );

    Some(Process {
        name: stage_code.to_string(),
        category: Some(product.category),
        description: Some(format!(
            "Upstream {stage_code} for {fuel_category} power plants, per unit of fuel delivered"
        )),
        exchanges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::upstream_table;
    use crate::process::UpstreamReference;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case("COAL", "coal, processed, at mine", Unit::Kilogram)]
    #[case("GAS", "natural gas, through transmission", Unit::Megajoule)]
    #[case("GEOTHERMAL", "geothermal upstream", Unit::Megajoule)]
    fn fuel_product_works(#[case] fuel: &str, #[case] name: &str, #[case] unit: Unit) {
        let product = fuel_product(fuel);
        assert_eq!(product.name, name);
        assert_eq!(product.unit, unit);
    }

    #[rstest]
    fn build_upstream_processes_works(mut upstream_table: InventoryTable) {
        // Same delivery, second flow
        let mut methane = upstream_table.records()[0].clone();
        methane.flow_name = Some("Methane".into());
        methane.flow_uuid = Some("aab83476-ee5c-3b8c-a2a4-b3c6c7d0a5a1".into());
        methane.flow_amount = Some(1.0);
        upstream_table.push(methane);

        // Second plant
        let mut other = upstream_table.records()[0].clone();
        other.plant_id = Some(10);
        other.quantity = Some(1500.0);
        other.flow_amount = Some(30.0);
        upstream_table.push(other);

        let (processes, references) = build_upstream_processes(&upstream_table);
        assert_eq!(processes.len(), 1);
        let process = &processes["Coal mining"];
        assert_eq!(
            process.category.as_deref(),
            Some("21: Mining, Quarrying, and Oil and Gas Extraction/2121: Coal Mining")
        );
        assert_eq!(process.exchanges.len(), 3);

        // CO2: (10 + 30) / (500 + 1500)
        let co2 = process.exchanges[1].as_ref().unwrap();
        assert_eq!(co2.flow.as_ref().unwrap().name, "Carbon dioxide");
        assert_approx_eq!(f64, co2.amount.unwrap(), 0.02);
        let methane = process.exchanges[2].as_ref().unwrap();
        assert_approx_eq!(f64, methane.amount.unwrap(), 0.0005);

        assert_eq!(
            references["Coal mining"],
            UpstreamReference {
                name: "coal, processed, at mine".into(),
                flow_id: product_flow_id("Coal mining"),
                unit: "kg".into(),
            }
        );
    }

    #[rstest]
    fn build_upstream_processes_no_quantity(mut upstream_table: InventoryTable) {
        for record in upstream_table.records_mut() {
            record.quantity = None;
        }
        let (processes, references) = build_upstream_processes(&upstream_table);
        assert!(processes.is_empty());
        assert!(references.is_empty());
    }
}

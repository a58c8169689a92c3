//! Upstream fuel-cycle inventories and their mapping onto canonical elementary flows.
//!
//! Upstream tables come from fuel-cycle models (coal mining, gas extraction, renewable
//! construction, etc.) that each use their own flow vocabulary. [`UpstreamFlowMapper`] merges
//! them, collapses duplicate rows and maps every flow onto the canonical flow list with unit
//! conversion.
use crate::flow_mapping::{FlowMapping, normalise_flow_key};
use crate::input::deserialise_flag;
use crate::inventory::{Column, InventoryRecord, InventoryTable};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Placeholder used for missing units when grouping
const BLANK_UNIT: &str = "<blank>";

/// Source tag for mapped upstream records
const UPSTREAM_SOURCE: &str = "netl";

/// Columns of the mapped upstream table, before optional columns
const MAPPED_COLUMNS: [Column; 13] = [
    Column::PlantID,
    Column::FuelCategory,
    Column::StageCode,
    Column::FlowName,
    Column::Compartment,
    Column::CompartmentPath,
    Column::FlowUuid,
    Column::Unit,
    Column::PrimeContext,
    Column::FlowAmount,
    Column::Quantity,
    Column::Source,
    Column::Year,
];

/// One row of an upstream fuel-cycle table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamRecord {
    /// Plant the fuel or product was delivered to
    pub plant_id: u32,
    /// Fuel type (e.g. "coal", "solar")
    pub fuel_type: String,
    /// Upstream stage (e.g. "Coal mining")
    pub stage_code: String,
    #[serde(rename = "FlowName")]
    pub flow_name: String,
    #[serde(rename = "Compartment")]
    pub compartment: String,
    #[serde(rename = "Compartment_path", default)]
    pub compartment_path: Option<String>,
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
    /// Amount of fuel or product delivered to the plant
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(rename = "FlowAmount")]
    pub flow_amount: f64,
    #[serde(default, deserialize_with = "deserialise_flag")]
    pub input: Option<bool>,
    #[serde(rename = "Electricity", default)]
    pub electricity: Option<f64>,
}

/// A single upstream source table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamTable {
    /// Name of the table (taken from its file name)
    pub name: String,
    /// The table's rows
    pub records: Vec<UpstreamRecord>,
    /// Whether the table has an `input` column
    pub has_input: bool,
    /// Whether the table has an `Electricity` column
    pub has_electricity: bool,
}

/// Derive a compartment path from a compartment name.
///
/// Returns `None` for compartments with no known path.
pub fn derive_compartment_path(compartment: &str) -> Option<&'static str> {
    match compartment.trim().to_lowercase().as_str() {
        "air" => Some("emission/air"),
        "water" => Some("emission/water"),
        "ground" | "soil" => Some("emission/ground"),
        "resource" => Some("resource"),
        "netl database/emissions" => Some("NETL database/emissions"),
        "netl database/resources" => Some("NETL database/resources"),
        _ => None,
    }
}

/// A source flow that has no canonical mapping
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnmatchedFlow {
    /// Flow name as given in the source table
    pub name: String,
    /// Compartment path as given in (or derived for) the source table
    pub compartment_path: String,
}

/// A source flow together with the canonical flow it maps onto
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedFlow {
    /// Flow name as given in the source table
    pub name: String,
    /// Compartment path as given in (or derived for) the source table
    pub compartment_path: String,
    /// Unit as given in the source table
    pub unit: String,
    /// Canonical flow name
    pub target_name: String,
    /// Canonical compartment
    pub target_context: String,
    /// Unit of the canonical flow
    pub target_unit: String,
}

/// Lists of matched and unmatched flows for a group of upstream tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowMappingLists {
    /// Name of the group of tables
    pub group: String,
    /// Source flows with no mapping, sorted
    pub unmatched: Vec<UnmatchedFlow>,
    /// Mapped source flows, sorted
    pub matched: Vec<MatchedFlow>,
}

impl fmt::Display for FlowMappingLists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unmatched flows")?;
        writeln!(f, "From the group: {}", self.group)?;
        for flow in &self.unmatched {
            writeln!(f, "({:?}, {:?})", flow.name, flow.compartment_path)?;
        }

        writeln!(f)?;
        writeln!(f, "Matched flows")?;
        for flow in &self.matched {
            writeln!(
                f,
                "({:?}, {:?}, {:?}, {:?}, {:?}, {:?})",
                flow.name,
                flow.compartment_path,
                flow.unit,
                flow.target_name,
                flow.target_context,
                flow.target_unit
            )?;
        }

        Ok(())
    }
}

/// The result of mapping a group of upstream tables
#[derive(Debug, Clone, PartialEq)]
pub struct MappedUpstream {
    /// The flow-mapped inventory
    pub table: InventoryTable,
    /// Matched and unmatched flow lists, if requested
    pub flow_lists: Option<FlowMappingLists>,
}

/// Key on which duplicate upstream rows are collapsed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    fuel_type: String,
    stage_code: String,
    flow_name: String,
    compartment: String,
    input: Option<bool>,
    plant_id: u32,
    compartment_path: String,
    unit: String,
}

/// Aggregated values for one [`GroupKey`]
#[derive(Debug, Default)]
struct Group {
    orig_name: String,
    orig_path: String,
    flow_amount: f64,
    quantity: Mean,
    electricity: Mean,
}

/// Running mean over the values present
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Maps upstream tables onto the canonical flow list
pub struct UpstreamFlowMapper<'a> {
    mapping: &'a FlowMapping,
    year: u32,
}

impl<'a> UpstreamFlowMapper<'a> {
    /// Create a mapper using the given flow mapping.
    ///
    /// # Arguments
    ///
    /// * `mapping` - Canonical flow mapping
    /// * `year` - Data year attached to mapped records
    pub fn new(mapping: &'a FlowMapping, year: u32) -> Self {
        Self { mapping, year }
    }

    /// Merge and flow-map a group of upstream tables.
    ///
    /// Rows describing the same flow for the same plant and stage are collapsed (amounts summed,
    /// quantities averaged) before mapping. Flows with no canonical mapping are excluded.
    ///
    /// # Arguments
    ///
    /// * `tables` - Upstream tables to merge
    /// * `group_name` - If given, lists of matched and unmatched flows are also produced
    pub fn map_tables(&self, tables: &[UpstreamTable], group_name: Option<&str>) -> MappedUpstream {
        info!(
            "Concatenating and flow-mapping {} upstream tables",
            tables.len()
        );

        let mut groups: IndexMap<GroupKey, Group> = IndexMap::new();
        let mut orig_flows = BTreeSet::new();
        let mut matched_flows = BTreeSet::new();
        let mut num_without_path = 0;
        for record in tables.iter().flat_map(|table| &table.records) {
            let Some(orig_path) = record
                .compartment_path
                .clone()
                .filter(|path| !path.is_empty())
                .or_else(|| derive_compartment_path(&record.compartment).map(String::from))
            else {
                num_without_path += 1;
                continue;
            };

            let key = GroupKey {
                fuel_type: record.fuel_type.clone(),
                stage_code: record.stage_code.clone(),
                flow_name: normalise_flow_key(&record.flow_name),
                compartment: normalise_flow_key(&record.compartment),
                input: record.input,
                plant_id: record.plant_id,
                compartment_path: normalise_flow_key(&orig_path),
                unit: record.unit.clone().unwrap_or_else(|| BLANK_UNIT.to_string()),
            };

            if group_name.is_some() {
                let mapped = self.mapping.get(&key.flow_name, &key.compartment_path);
                if let Some(entry) = mapped {
                    matched_flows.insert(MatchedFlow {
                        name: record.flow_name.clone(),
                        compartment_path: orig_path.clone(),
                        unit: record.unit.clone().unwrap_or_default(),
                        target_name: entry.target_name.clone(),
                        target_context: entry.target_context.clone(),
                        target_unit: entry.target_unit.clone(),
                    });
                } else {
                    orig_flows.insert(UnmatchedFlow {
                        name: record.flow_name.clone(),
                        compartment_path: orig_path.clone(),
                    });
                }
            }

            let group = groups.entry(key).or_insert_with(|| Group {
                orig_name: record.flow_name.clone(),
                orig_path: orig_path.clone(),
                ..Default::default()
            });
            group.flow_amount += record.flow_amount;
            group.quantity.add(record.quantity);
            group.electricity.add(record.electricity);
        }

        if num_without_path > 0 {
            warn!("Dropped {num_without_path} upstream rows with an unknown compartment");
        }

        let table = self.map_groups(tables, groups);
        let flow_lists = group_name.map(|group| FlowMappingLists {
            group: group.to_string(),
            unmatched: orig_flows.into_iter().collect(),
            matched: matched_flows.into_iter().collect(),
        });

        MappedUpstream { table, flow_lists }
    }

    /// Map grouped rows onto canonical flows
    fn map_groups(
        &self,
        tables: &[UpstreamTable],
        groups: IndexMap<GroupKey, Group>,
    ) -> InventoryTable {
        let mut columns = MAPPED_COLUMNS.to_vec();
        if tables.iter().any(|table| table.has_electricity) {
            columns.push(Column::Electricity);
        }
        if tables.iter().any(|table| table.has_input) {
            columns.push(Column::Input);
        }
        let mut out = InventoryTable::new(columns);

        let num_groups = groups.len();
        let mut seen = HashSet::new();
        for (key, group) in groups {
            let Some(entry) = self.mapping.get(&key.flow_name, &key.compartment_path) else {
                debug!(
                    "No mapping for flow {} ({})",
                    group.orig_name, group.orig_path
                );
                continue;
            };

            if !seen.insert((
                key.plant_id,
                entry.target_name.clone(),
                key.compartment_path.clone(),
                group.flow_amount.to_bits(),
            )) {
                continue;
            }

            let prime_context = if entry.target_context.contains("resource") {
                "resource"
            } else {
                "emission"
            };
            out.push(InventoryRecord {
                plant_id: Some(key.plant_id),
                fuel_category: Some(key.fuel_type.to_uppercase()),
                stage_code: Some(key.stage_code),
                flow_name: Some(entry.target_name.clone()),
                compartment: Some(entry.target_context.clone()),
                compartment_path: Some(key.compartment_path),
                flow_uuid: Some(entry.target_uuid.clone()),
                unit: Some(entry.target_unit.clone()),
                prime_context: Some(prime_context.to_string()),
                flow_amount: Some(group.flow_amount * entry.conversion_factor),
                quantity: group.quantity.value(),
                source: Some(UPSTREAM_SOURCE.to_string()),
                year: Some(self.year),
                electricity: group.electricity.value(),
                input: key.input,
                ..Default::default()
            });
        }

        info!(
            "Mapped {} of {num_groups} grouped upstream flows",
            out.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{flow_mapping, upstream_record};
    use crate::flow_mapping::FlowMappingEntry;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn table(records: Vec<UpstreamRecord>) -> UpstreamTable {
        UpstreamTable {
            name: "test".into(),
            records,
            has_input: true,
            has_electricity: false,
        }
    }

    #[rstest]
    #[case("air", Some("emission/air"))]
    #[case("Air ", Some("emission/air"))]
    #[case("soil", Some("emission/ground"))]
    #[case("NETL database/emissions", Some("NETL database/emissions"))]
    #[case("space", None)]
    fn derive_compartment_path_works(#[case] compartment: &str, #[case] expected: Option<&str>) {
        assert_eq!(derive_compartment_path(compartment), expected);
    }

    #[rstest]
    fn map_tables_collapses_normalised_duplicates(flow_mapping: FlowMapping) {
        let a = upstream_record("CO2", "air", 10.0);
        let b = upstream_record("co2 ", "Air", 5.0);
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(vec![a]), table(vec![b])], None);

        assert_eq!(mapped.table.len(), 1);
        let record = &mapped.table.records()[0];
        assert_eq!(record.flow_name.as_deref(), Some("Carbon dioxide"));
        assert_approx_eq!(f64, record.flow_amount.unwrap(), 15.0);
        assert_approx_eq!(f64, record.quantity.unwrap(), 100.0);
        assert_eq!(record.fuel_category.as_deref(), Some("COAL"));
        assert_eq!(record.prime_context.as_deref(), Some("emission"));
        assert_eq!(record.source.as_deref(), Some("netl"));
        assert_eq!(record.year, Some(2016));
        assert!(mapped.flow_lists.is_none());
    }

    #[rstest]
    fn map_tables_leading_whitespace_is_unmapped(flow_mapping: FlowMapping) {
        let records = vec![
            upstream_record(" CO2", "air", 10.0),
            upstream_record("CO2", "air", 5.0),
        ];
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(records)], Some("upstream"));

        assert_eq!(mapped.table.len(), 1);
        assert_approx_eq!(f64, mapped.table.records()[0].flow_amount.unwrap(), 5.0);
        let lists = mapped.flow_lists.unwrap();
        assert_eq!(lists.unmatched.len(), 1);
        assert_eq!(lists.unmatched[0].name, " CO2");
    }

    #[rstest]
    fn map_tables_dedupes_identical_mapped_rows(mut flow_mapping: FlowMapping) {
        let co2 = flow_mapping.get("co2", "emission/air").unwrap().clone();
        flow_mapping.insert("carbon dioxide", "emission/air", co2);
        let records = vec![
            upstream_record("CO2", "air", 10.0),
            upstream_record("Carbon dioxide", "air", 10.0),
            upstream_record("Carbon dioxide", "water", 10.0),
        ];
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(records)], None);

        // Two source names land on the same canonical flow with the same amount
        assert_eq!(mapped.table.len(), 1);
        let record = &mapped.table.records()[0];
        assert_eq!(record.flow_name.as_deref(), Some("Carbon dioxide"));
        assert_approx_eq!(f64, record.flow_amount.unwrap(), 10.0);
    }

    #[rstest]
    fn map_tables_keeps_distinct_amounts(flow_mapping: FlowMapping) {
        let records = vec![
            upstream_record("CO2", "air", 10.0),
            UpstreamRecord {
                stage_code: "Coal transport".into(),
                ..upstream_record("CO2", "air", 4.0)
            },
        ];
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(records)], None);
        assert_eq!(mapped.table.len(), 2);
    }

    #[rstest]
    fn map_tables_applies_conversion_factor(mut flow_mapping: FlowMapping) {
        flow_mapping.insert(
            "sulfur dioxide",
            "emission/air",
            FlowMappingEntry {
                target_name: "Sulfur dioxide".into(),
                target_uuid: "f4973035-59e5-3bcf-a9d2-1e45b6e6a6c4".into(),
                target_context: "emission/air".into(),
                target_unit: "kg".into(),
                conversion_factor: 0.453592,
            },
        );
        let records = vec![
            upstream_record("Sulfur dioxide", "air", 2.0),
            upstream_record("Sulfur dioxide", "air", 3.0),
        ];
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(records)], None);

        assert_eq!(mapped.table.len(), 1);
        assert_eq!(
            mapped.table.records()[0].flow_amount,
            Some((2.0 + 3.0) * 0.453592)
        );
    }

    #[rstest]
    fn map_tables_drops_unmapped_flows(flow_mapping: FlowMapping) {
        let records = vec![
            upstream_record("CO2", "air", 1.0),
            upstream_record("Unobtainium", "air", 1.0),
            upstream_record("CO2", "outer space", 1.0),
        ];
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[table(records)], Some("upstream"));

        assert_eq!(mapped.table.len(), 1);
        assert!(mapped.table.iter().all(|r| r.flow_name.is_some()));

        let lists = mapped.flow_lists.unwrap();
        assert_eq!(lists.group, "upstream");
        assert_eq!(
            lists.unmatched,
            [UnmatchedFlow {
                name: "Unobtainium".into(),
                compartment_path: "emission/air".into(),
            }]
        );
        assert_eq!(lists.matched.len(), 1);
        assert_eq!(lists.matched[0].target_name, "Carbon dioxide");
    }

    #[rstest]
    fn map_tables_resource_prime_context(mut flow_mapping: FlowMapping) {
        flow_mapping.insert(
            "water, fresh",
            "resource",
            FlowMappingEntry {
                target_name: "Water, fresh".into(),
                target_uuid: "8ba1e6bd-2c3b-3b6c-8a9a-1c3f8f7d1a2b".into(),
                target_context: "resource/water".into(),
                target_unit: "kg".into(),
                conversion_factor: 1.0,
            },
        );
        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(
            &[table(vec![upstream_record("Water, fresh", "resource", 4.0)])],
            None,
        );
        assert_eq!(
            mapped.table.records()[0].prime_context.as_deref(),
            Some("resource")
        );
    }

    #[rstest]
    fn map_tables_optional_columns(flow_mapping: FlowMapping) {
        let mut t = table(vec![UpstreamRecord {
            electricity: Some(1000.0),
            ..upstream_record("CO2", "air", 1.0)
        }]);
        t.has_electricity = true;
        t.has_input = false;

        let mapper = UpstreamFlowMapper::new(&flow_mapping, 2016);
        let mapped = mapper.map_tables(&[t], None);
        assert!(mapped.table.has_column(Column::Electricity));
        assert!(!mapped.table.has_column(Column::Input));
        assert_eq!(mapped.table.records()[0].electricity, Some(1000.0));
    }

    #[test]
    fn flow_mapping_lists_report() {
        let lists = FlowMappingLists {
            group: "renewables".into(),
            unmatched: vec![UnmatchedFlow {
                name: "x".into(),
                compartment_path: "emission/air".into(),
            }],
            matched: vec![],
        };
        assert_eq!(
            lists.to_string(),
            "Unmatched flows\nFrom the group: renewables\n(\"x\", \"emission/air\")\n\nMatched flows\n"
        );
    }
}

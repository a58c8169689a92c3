//! Fixtures for tests

use crate::balancing_authority::{BalancingAuthority, BalancingAuthorityMap};
use crate::flow_mapping::{FlowMapping, FlowMappingEntry};
use crate::inventory::{Column, InventoryRecord, InventoryTable};
use crate::process::{
    Exchange, FlowRef, FlowType, Process, ProcessMap, Unit, UpstreamReference,
    UpstreamReferenceMap,
};
use crate::upstream::UpstreamRecord;
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

pub const CO2_UUID: &str = "b6f010fb-a764-3063-af2d-bcb8309a97b7";
pub const SO2_UUID: &str = "f4973035-59e5-3bcf-a9d2-1e45b6e6a6c4";

const SOCO_NAME: &str = "Southern Company Services, Inc. - Trans";
const CISO_NAME: &str = "California Independent System Operator";

/// An upstream coal mining record for plant 3
pub fn upstream_record(flow_name: &str, compartment: &str, flow_amount: f64) -> UpstreamRecord {
    UpstreamRecord {
        plant_id: 3,
        fuel_type: "coal".into(),
        stage_code: "Coal mining".into(),
        flow_name: flow_name.into(),
        compartment: compartment.into(),
        compartment_path: None,
        unit: Some("kg".into()),
        quantity: Some(100.0),
        flow_amount,
        input: Some(false),
        electricity: None,
    }
}

#[fixture]
pub fn flow_mapping() -> FlowMapping {
    let mut mapping = FlowMapping::new();
    mapping.insert(
        "co2",
        "emission/air",
        FlowMappingEntry {
            target_name: "Carbon dioxide".into(),
            target_uuid: CO2_UUID.into(),
            target_context: "emission/air".into(),
            target_unit: "kg".into(),
            conversion_factor: 1.0,
        },
    );
    mapping
}

#[fixture]
pub fn balancing_authorities() -> BalancingAuthorityMap {
    indexmap! {
        "SOCO".to_string() => BalancingAuthority {
            code: "SOCO".into(),
            name: SOCO_NAME.into(),
            ferc_region: Some("Southeast".into()),
            eia_region: Some("Southeast".into()),
        },
        "CISO".to_string() => BalancingAuthority {
            code: "CISO".into(),
            name: CISO_NAME.into(),
            ferc_region: Some("CAISO".into()),
            eia_region: Some("California".into()),
        },
    }
}

/// A power plant emission record
fn plant_record(
    facility_id: u32,
    fuel: &str,
    ba_code: &str,
    flow: (&str, &str, f64),
) -> InventoryRecord {
    let (nerc, subregion, state, electricity) = match ba_code {
        "SOCO" => ("SERC", "SRSO", "AL", 1000.0),
        _ => ("WECC", "CAMX", "CA", 2000.0),
    };
    InventoryRecord {
        facility_id: Some(facility_id),
        egrid_id: Some(facility_id),
        fuel_category: Some(fuel.into()),
        primary_fuel: Some(fuel.into()),
        stage_code: Some("Power plant".into()),
        flow_name: Some(flow.0.into()),
        compartment: Some("emission/air".into()),
        flow_uuid: Some(flow.1.into()),
        unit: Some("kg".into()),
        prime_context: Some("emission".into()),
        flow_amount: Some(flow.2),
        electricity: Some(electricity),
        source: Some("egrid".into()),
        year: Some(2016),
        ba_code: Some(ba_code.into()),
        nerc: Some(nerc.into()),
        subregion: Some(subregion.into()),
        state: Some(state.into()),
        percent_generation: Some(if fuel == "COAL" { 0.95 } else { 0.99 }),
        ..Default::default()
    }
}

/// Columns of the plant table
const PLANT_COLUMNS: [Column; 19] = [
    Column::FacilityID,
    Column::EgridID,
    Column::FuelCategory,
    Column::PrimaryFuel,
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
    Column::Nerc,
    Column::Subregion,
    Column::State,
    Column::PercentGeneration,
];

/// Plant emissions for a coal plant (3) and a gas plant (10)
#[fixture]
pub fn plant_table() -> InventoryTable {
    InventoryTable::from_records(
        PLANT_COLUMNS,
        vec![
            plant_record(3, "COAL", "SOCO", ("Carbon dioxide", CO2_UUID, 1000.0)),
            plant_record(3, "COAL", "SOCO", ("Sulfur dioxide", SO2_UUID, 5.0)),
            plant_record(10, "GAS", "CISO", ("Carbon dioxide", CO2_UUID, 1000.0)),
        ],
    )
}

/// The plant table after combination, with BA names and regions attached
#[fixture]
pub fn generation_table(
    plant_table: InventoryTable,
    balancing_authorities: BalancingAuthorityMap,
) -> InventoryTable {
    let mut table = plant_table;
    for column in [
        Column::BalancingAuthorityName,
        Column::FercRegion,
        Column::EiaRegion,
    ] {
        table.add_column(column);
    }
    for record in table.records_mut() {
        let ba = &balancing_authorities[record.ba_code.as_deref().unwrap()];
        record.ba_name = Some(ba.name.clone());
        record.ferc_region = ba.ferc_region.clone();
        record.eia_region = ba.eia_region.clone();
    }

    table
}

/// A flow-mapped upstream table with one coal mining record for plant 3
#[fixture]
pub fn upstream_table() -> InventoryTable {
    InventoryTable::from_records(
        [
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
            Column::Input,
        ],
        vec![InventoryRecord {
            plant_id: Some(3),
            fuel_category: Some("COAL".into()),
            stage_code: Some("Coal mining".into()),
            flow_name: Some("Carbon dioxide".into()),
            compartment: Some("emission/air".into()),
            compartment_path: Some("emission/air".into()),
            flow_uuid: Some(CO2_UUID.into()),
            unit: Some("kg".into()),
            prime_context: Some("emission".into()),
            flow_amount: Some(10.0),
            quantity: Some(500.0),
            source: Some("netl".into()),
            year: Some(2016),
            input: Some(false),
            ..Default::default()
        }],
    )
}

#[fixture]
pub fn upstream_references() -> UpstreamReferenceMap {
    indexmap! {
        "Coal mining".to_string() => UpstreamReference {
            name: "coal, processed, at mine".into(),
            flow_id: "3f6a4b53-34ae-3d6e-a9b2-44e0a4ab7c52".into(),
            unit: "kg".into(),
        },
    }
}

/// Two processes sharing part of their category path
#[fixture]
pub fn processes() -> ProcessMap {
    let exchange = |unit: Unit, amount: f64, reference: bool| Exchange {
        flow: Some(FlowRef {
            id: CO2_UUID.into(),
            name: "Carbon dioxide".into(),
            flow_type: FlowType::Elementary,
        }),
        unit,
        amount: Some(amount),
        input: None,
        quantitative_reference: reference.then_some(true),
        avoided_product: None,
    };

    indexmap! {
        "Electricity - COAL - SERC".to_string() => Process {
            name: "Electricity - COAL - SERC".into(),
            category: Some("22: Utilities/2211: Electric Power Generation/COAL".into()),
            description: None,
            exchanges: vec![
                Some(exchange(Unit::MegawattHour, 1.0, true)),
                None,
                Some(exchange(Unit::Kilogram, 0.9, false)),
            ],
        },
        "Electricity - GAS - SERC".to_string() => Process {
            name: "Electricity - GAS - SERC".into(),
            category: Some("22: Utilities/2211: Electric Power Generation/GAS".into()),
            description: Some("Gas".into()),
            exchanges: vec![Some(exchange(Unit::Unknown("short tons".into()), 2.0, false))],
        },
    }
}

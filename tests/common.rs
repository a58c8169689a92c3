use assert_cmd::cargo_bin_cmd;
use std::fs;
use std::path::Path;

/// Name given to the model in `model.toml`
#[allow(dead_code)]
pub const MODEL_NAME: &str = "test_model";

const MODEL_TOML: &str = r#"model_name = "test_model"
eia_gen_year = 2016
electricity_lci_target_year = 2020
"#;

const PLANT_GENERATION_CSV: &str = "\
eGRID_ID,FuelCategory,PrimaryFuel,FlowName,Compartment,FlowUUID,Unit,ElementaryFlowPrimeContext,FlowAmount,Electricity,Source,Year,Balancing Authority Code,NERC,Subregion,State,PercentGenerationfromDesignatedFuelCategory
3,COAL,BIT,Carbon dioxide,emission/air,b6f010fb-a764-3063-af2d-bcb8309a97b7,kg,emission,1000000,1000,egrid,2016,SOCO,SERC,SRSO,AL,0.95
3,COAL,BIT,Sulfur dioxide,emission/air,f4973035-59e5-3bcf-a9d2-1e45b6e6a6c4,kg,emission,5000,1000,egrid,2016,SOCO,SERC,SRSO,AL,0.95
20,SOLAR,SUN,Carbon dioxide,emission/air,b6f010fb-a764-3063-af2d-bcb8309a97b7,kg,emission,0,500,egrid,2016,CISO,WECC,CAMX,CA,1.0
";

const COAL_UPSTREAM_CSV: &str = "\
plant_id,fuel_type,stage_code,FlowName,Compartment,Unit,quantity,FlowAmount,input
3,coal,Coal mining,co2,air,kg,500,10,False
3,coal,Coal mining,unobtainium,air,kg,500,1,False
";

const SOLAR_RENEWABLES_CSV: &str = "\
plant_id,fuel_type,stage_code,FlowName,Compartment,Unit,FlowAmount,Electricity
20,solar,Solar PV construction,co2,air,kg,50,500
";

const FLOW_MAPPING_CSV: &str = "\
SourceFlowName,SourceFlowContext,TargetFlowName,TargetFlowUUID,TargetFlowContext,TargetUnit,ConversionFactor
co2,emission/air,Carbon dioxide,b6f010fb-a764-3063-af2d-bcb8309a97b7,emission/air,kg,1.0
";

const BA_CODES_US_CSV: &str = "\
etag ID,Entity Name,FERC_Region,EIA_Region
SOCO,\"Southern Company Services, Inc. - Trans\",Southeast,Southeast
CISO,California Independent System Operator,CAISO,California
";

const BA_CODES_CANADA_CSV: &str = "\
etag ID,Entity Name,FERC_Region,EIA_Region
NBSO,New Brunswick System Operator,Canada,Canada
";

const FACILITY_STATES_CSV: &str = "\
Plant Id,State
3,AL
20,CA
";

/// Write a small model with one coal plant and one solar plant to `model_dir`
#[allow(dead_code)]
pub fn write_model(model_dir: &Path) {
    fs::create_dir_all(model_dir.join("upstream")).unwrap();
    fs::create_dir_all(model_dir.join("renewables")).unwrap();
    for (file_name, contents) in [
        ("model.toml", MODEL_TOML),
        ("plant_generation.csv", PLANT_GENERATION_CSV),
        ("upstream/coal.csv", COAL_UPSTREAM_CSV),
        ("renewables/solar.csv", SOLAR_RENEWABLES_CSV),
        ("flow_mapping.csv", FLOW_MAPPING_CSV),
        ("ba_codes_us.csv", BA_CODES_US_CSV),
        ("ba_codes_canada.csv", BA_CODES_CANADA_CSV),
        ("facility_states.csv", FACILITY_STATES_CSV),
    ] {
        fs::write(model_dir.join(file_name), contents).unwrap();
    }
}

#[allow(dead_code)]
pub fn assert_elci_runs(args: &[&str]) {
    cargo_bin_cmd!("elci")
        .env("ELCI_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .success();
}

#[allow(dead_code)]
pub fn assert_elci_fails(args: &[&str]) {
    cargo_bin_cmd!("elci")
        .env("ELCI_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .failure();
}

#[allow(dead_code)]
pub fn get_elci_stdout(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("elci")
        .env("ELCI_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8(output.stdout).unwrap()
}

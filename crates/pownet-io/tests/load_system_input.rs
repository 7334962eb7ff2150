//! Exercises `pownet_io::load_system_input` end-to-end against a small,
//! hand-written model folder covering one thermal unit, one nondispatch
//! (solar) unit, and one storage unit on a single node.

use pownet_core::SimConfig;
use std::fs;
use std::path::Path;

fn write_csv(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents.trim_start()).unwrap();
}

fn build_model_folder() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let model_dir = tmp.path().join("test_model");
    fs::create_dir_all(&model_dir).unwrap();

    write_csv(
        &model_dir,
        "thermal_unit.csv",
        "name,node,fuel_type,fuel_contract,min_capacity,max_capacity,min_downtime,min_uptime,ramp_rate,fixed_cost,operation_cost,startup_cost,heat_rate,must_take
g1,bus1,gas,gas_contract,50,100,1,1,40,10,20,100,1,0
",
    );

    write_csv(
        &model_dir,
        "nondispatch_unit.csv",
        "name,contract,contracted_capacity,must_take
solar1,solar_contract,-1,1
",
    );

    write_csv(
        &model_dir,
        "energy_storage.csv",
        "name,attach_to,max_charge,max_discharge,min_capacity,max_capacity,charge_efficiency,discharge_efficiency,self_discharge_rate,cost_contract
ess1,bus1,50,50,0,200,0.9,0.9,0,ess_contract
",
    );

    write_csv(
        &model_dir,
        "solar.csv",
        "solar1\nbus1\n0\n0\n100\n0\n",
    );

    write_csv(
        &model_dir,
        "demand_export.csv",
        "bus1\n75\n75\n75\n75\n",
    );

    write_csv(
        &model_dir,
        "contract_cost.csv",
        "gas_contract,solar_contract,ess_contract\n50,0,5\n50,0,5\n50,0,5\n50,0,5\n",
    );

    tmp
}

#[test]
fn loads_thermal_nondispatch_and_storage_units() {
    let tmp = build_model_folder();
    let config = SimConfig { sim_horizon: 24, num_sim_days: 1, ..SimConfig::default() };

    let system = pownet_io::load_system_input(tmp.path(), "test_model", config).unwrap();

    assert_eq!(system.thermal_units.len(), 1);
    assert_eq!(system.thermal_units[0].name, "g1");
    // Python sets SU = SD = min_capacity unconditionally; the loader pins
    // that explicitly rather than falling back to ThermalUnit's default.
    assert_eq!(system.thermal_units[0].startup_rate.unwrap().value(), 50.0);
    assert_eq!(system.thermal_units[0].shutdown_rate.unwrap().value(), 50.0);

    assert_eq!(system.nondispatch_units.len(), 1);
    assert_eq!(system.nondispatch_units[0].name, "solar1");

    assert_eq!(system.storage_units.len(), 1);
    assert_eq!(system.storage_units[0].name, "ess1");

    assert_eq!(system.demand.total_at(1).unwrap(), 75.0);
}

#[test]
fn missing_model_folder_files_default_to_empty_tables() {
    let tmp = tempfile::tempdir().unwrap();
    let model_dir = tmp.path().join("empty_model");
    fs::create_dir_all(&model_dir).unwrap();

    let config = SimConfig::default();
    let system = pownet_io::load_system_input(tmp.path(), "empty_model", config).unwrap();

    assert!(system.thermal_units.is_empty());
    assert!(system.hydro_units.is_empty());
    assert!(system.nondispatch_units.is_empty());
    assert!(system.storage_units.is_empty());
}

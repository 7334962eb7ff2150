//! Exercises the `pownet run` subcommand end-to-end: a tiny one-unit,
//! one-day model folder plus a TOML config should run to completion and
//! leave `variables.csv`/`lmp.csv` in the output folder.

use assert_cmd::Command;
use std::fs;

fn write_csv(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents.trim_start()).unwrap();
}

#[test]
fn runs_a_single_day_single_unit_model() {
    let tmp = tempfile::tempdir().unwrap();
    let model_dir = tmp.path().join("input").join("tiny");
    fs::create_dir_all(&model_dir).unwrap();

    write_csv(
        &model_dir,
        "thermal_unit.csv",
        "name,node,fuel_type,fuel_contract,min_capacity,max_capacity,min_downtime,min_uptime,ramp_rate,fixed_cost,operation_cost,startup_cost,heat_rate,must_take
g1,bus1,gas,gas_contract,50,100,1,1,40,10,20,100,1,0
",
    );
    write_csv(&model_dir, "demand_export.csv", &format!("bus1\n{}", "75\n".repeat(24)));
    write_csv(&model_dir, "contract_cost.csv", &format!("gas_contract\n{}", "50\n".repeat(24)));

    let config_path = tmp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
sim_horizon = 24
num_sim_days = 1
spin_reserve_mw = 0.0
load_shortfall_penalty_factor = 10000.0
load_curtail_penalty_factor = 5000.0
spin_shortfall_penalty_factor = 2000.0
"#,
    )
    .unwrap();

    let output_dir = tmp.path().join("output");

    let mut cmd = Command::cargo_bin("pownet").unwrap();
    cmd.arg("run")
        .arg("--input-folder")
        .arg(tmp.path().join("input"))
        .arg("--model-name")
        .arg("tiny")
        .arg("--config")
        .arg(&config_path)
        .arg("--output-folder")
        .arg(&output_dir)
        .arg("--steps")
        .arg("1");

    cmd.assert().success();

    assert!(output_dir.join("variables.csv").exists());
    assert!(output_dir.join("lmp.csv").exists());
}

#[test]
fn rejects_config_with_both_spin_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
sim_horizon = 24
num_sim_days = 1
spin_reserve_factor = 0.15
spin_reserve_mw = 100.0
load_shortfall_penalty_factor = 10000.0
load_curtail_penalty_factor = 5000.0
spin_shortfall_penalty_factor = 2000.0
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("pownet").unwrap();
    cmd.arg("run")
        .arg("--input-folder")
        .arg(tmp.path())
        .arg("--model-name")
        .arg("missing")
        .arg("--config")
        .arg(&config_path)
        .arg("--output-folder")
        .arg(tmp.path().join("out"));

    cmd.assert().failure();
}

//! Multi-window rolling-horizon runs against a tiny single-node system,
//! checking that `Simulator` advances windows, accumulates a `SystemRecord`,
//! and carries initial conditions forward correctly.

use pownet_core::{
    ContractTable, Demand, DcOpfFormulation, HydroUnit, Megawatts, Network, NonDispatchUnit,
    Resolution, SimConfig, SpinRequirement, StorageUnit, SystemInput, ThermalUnit, TimeSeriesTable,
};
use pownet_solve::SolveOptions;
use std::time::Duration;

fn two_window_system() -> SystemInput {
    let mut network = Network::new();
    network.add_node("bus1").unwrap();

    let thermal = ThermalUnit {
        name: "g1".to_string(),
        node: "bus1".to_string(),
        fuel_type: "gas".to_string(),
        fuel_contract: "gas_contract".to_string(),
        rated_capacity: Megawatts::new(100.0),
        min_capacity: Megawatts::new(50.0),
        derated_capacity_column: "g1".to_string(),
        min_up_time: 1,
        min_down_time: 1,
        ramp_up: Megawatts::new(40.0),
        ramp_down: Megawatts::new(40.0),
        startup_rate: None,
        shutdown_rate: None,
        fixed_cost: 10.0,
        operation_cost: 20.0,
        startup_cost: 100.0,
        heat_rate: 1.0,
        must_take: false,
    };

    let hours = 48;
    let mut demand_table = TimeSeriesTable::new(Resolution::Hourly, vec!["bus1".to_string()], hours);
    for t in 1..=hours {
        demand_table.set(t, "bus1", 75.0).unwrap();
    }

    let mut thermal_derated = TimeSeriesTable::new(Resolution::Hourly, vec!["g1".to_string()], hours);
    for t in 1..=hours {
        thermal_derated.set(t, "g1", 100.0).unwrap();
    }

    let mut contracts_table = TimeSeriesTable::new(Resolution::Hourly, vec!["gas_contract".to_string()], hours);
    for t in 1..=hours {
        contracts_table.set(t, "gas_contract", 50.0).unwrap();
    }

    let config = SimConfig {
        sim_horizon: 24,
        num_sim_days: 2,
        spin_requirement: SpinRequirement::AbsoluteMw(0.0),
        use_spin_var: true,
        use_nondispatch_status_var: false,
        dc_opf: DcOpfFormulation::Kirchhoff,
        gen_loss_factor: 0.0,
        line_loss_factor: 0.0,
        line_capacity_factor: 1.0,
        load_shortfall_penalty_factor: 10_000.0,
        load_curtail_penalty_factor: 5_000.0,
        spin_shortfall_penalty_factor: 2_000.0,
        curtailment_penalty_scale: 1.0,
    };

    SystemInput::new(
        config,
        network,
        vec![thermal],
        Vec::<HydroUnit>::new(),
        Vec::<NonDispatchUnit>::new(),
        Vec::<StorageUnit>::new(),
        Demand::new(demand_table),
        ContractTable::new(contracts_table),
        thermal_derated,
        TimeSeriesTable::new(Resolution::Hourly, vec![], hours),
        TimeSeriesTable::new(Resolution::Hourly, vec![], hours),
        TimeSeriesTable::new(Resolution::Daily, vec![], 2),
        TimeSeriesTable::new(Resolution::Weekly, vec![], 1),
        TimeSeriesTable::new(Resolution::Weekly, vec![], 1),
        TimeSeriesTable::new(Resolution::Hourly, vec![], hours),
        TimeSeriesTable::new(Resolution::Hourly, vec![], hours),
        TimeSeriesTable::new(Resolution::Hourly, vec![], hours),
    )
}

#[test]
fn two_windows_accumulate_48_hours_of_node_rows() {
    let system = two_window_system();
    let simulator = pownet_sim::Simulator::new(&system, "two-window-test");
    let options = SolveOptions { timelimit: Duration::from_secs(30), ..SolveOptions::default() };

    let tmp = tempfile::tempdir().unwrap();
    let (record, coupler_report) = simulator.run(2, &options, None, tmp.path()).unwrap();

    assert!(coupler_report.is_none());

    let max_hour = record
        .node_rows()
        .iter()
        .filter(|r| r.var_name == "pthermal")
        .map(|r| r.hour)
        .max()
        .unwrap();
    assert_eq!(max_hour, 48, "the second window's hours must be offset by absolute_hour, not restart at 1");

    let hour_1_dispatch = record
        .node_rows()
        .iter()
        .find(|r| r.var_name == "pthermal" && r.hour == 1)
        .unwrap()
        .value;
    assert!((hour_1_dispatch - 75.0).abs() < 1e-3);
}

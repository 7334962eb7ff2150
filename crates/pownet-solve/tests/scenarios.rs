//! End-to-end scenarios against a single assembled window, grounded on the
//! worked examples for the thermal/ramp/min-up-down constraints.

use pownet_core::{
    ContractTable, Demand, DcOpfFormulation, HydroAvailability, HydroUnit, Megawatts, Network,
    NonDispatchUnit, Resolution, SimConfig, SpinRequirement, StorageUnit, SystemInput, ThermalUnit,
    TimeSeriesTable,
};
use pownet_solve::{InitialConditions, ModelBuilder, PowerSystemModel, SolveOptions};
use std::time::Duration;

fn base_config() -> SimConfig {
    SimConfig {
        sim_horizon: 24,
        num_sim_days: 1,
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
    }
}

/// Scenario S1: one thermal unit, one node, constant demand.
fn single_thermal_single_node() -> SystemInput {
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

    let mut demand_table = TimeSeriesTable::new(Resolution::Hourly, vec!["bus1".to_string()], 24);
    for t in 1..=24 {
        demand_table.set(t, "bus1", 75.0).unwrap();
    }

    let mut thermal_derated = TimeSeriesTable::new(Resolution::Hourly, vec!["g1".to_string()], 24);
    for t in 1..=24 {
        thermal_derated.set(t, "g1", 100.0).unwrap();
    }

    let mut contracts_table = TimeSeriesTable::new(Resolution::Hourly, vec!["gas_contract".to_string()], 24);
    for t in 1..=24 {
        contracts_table.set(t, "gas_contract", 50.0).unwrap();
    }

    let storage_derated = TimeSeriesTable::new(Resolution::Hourly, vec![], 24);
    let hydro_hourly = TimeSeriesTable::new(Resolution::Hourly, vec![], 24);
    let hydro_daily = TimeSeriesTable::new(Resolution::Daily, vec![], 1);
    let hydro_weekly = TimeSeriesTable::new(Resolution::Weekly, vec![], 1);
    let hydro_weekly_min = TimeSeriesTable::new(Resolution::Weekly, vec![], 1);
    let nondispatch_capacity = TimeSeriesTable::new(Resolution::Hourly, vec![], 24);
    let transmission_capacity = TimeSeriesTable::new(Resolution::Hourly, vec![], 24);
    let transmission_susceptance = TimeSeriesTable::new(Resolution::Hourly, vec![], 24);

    SystemInput::new(
        base_config(),
        network,
        vec![thermal],
        Vec::<HydroUnit>::new(),
        Vec::<NonDispatchUnit>::new(),
        Vec::<StorageUnit>::new(),
        Demand::new(demand_table),
        ContractTable::new(contracts_table),
        thermal_derated,
        storage_derated,
        hydro_hourly,
        hydro_daily,
        hydro_weekly,
        hydro_weekly_min,
        nondispatch_capacity,
        transmission_capacity,
        transmission_susceptance,
    )
}

/// A thermal unit with cheap dispatch alongside a weekly-resolution hydro
/// unit whose contract is deliberately expensive, so the only reason it
/// gets dispatched at all is the weekly lower bound (spec section 4.3).
fn thermal_and_weekly_hydro() -> SystemInput {
    let hours = 168;
    let mut network = Network::new();
    network.add_node("bus1").unwrap();

    let thermal = ThermalUnit {
        name: "g1".to_string(),
        node: "bus1".to_string(),
        fuel_type: "gas".to_string(),
        fuel_contract: "gas_contract".to_string(),
        rated_capacity: Megawatts::new(200.0),
        min_capacity: Megawatts::new(0.0),
        derated_capacity_column: "g1".to_string(),
        min_up_time: 1,
        min_down_time: 1,
        ramp_up: Megawatts::new(200.0),
        ramp_down: Megawatts::new(200.0),
        startup_rate: None,
        shutdown_rate: None,
        fixed_cost: 0.0,
        operation_cost: 1.0,
        startup_cost: 0.0,
        heat_rate: 1.0,
        must_take: false,
    };

    let hydro = HydroUnit {
        name: "h1".to_string(),
        node: "bus1".to_string(),
        contract: "hydro_contract".to_string(),
        contracted_capacity: Megawatts::new(50.0),
        availability: HydroAvailability::Weekly {
            column: "h1".to_string(),
            min_column: Some("h1".to_string()),
        },
        must_take: false,
    };

    let mut demand_table = TimeSeriesTable::new(Resolution::Hourly, vec!["bus1".to_string()], hours);
    for t in 1..=hours {
        demand_table.set(t, "bus1", 100.0).unwrap();
    }

    let mut thermal_derated = TimeSeriesTable::new(Resolution::Hourly, vec!["g1".to_string()], hours);
    for t in 1..=hours {
        thermal_derated.set(t, "g1", 200.0).unwrap();
    }

    let mut contracts_table = TimeSeriesTable::new(
        Resolution::Hourly,
        vec!["gas_contract".to_string(), "hydro_contract".to_string()],
        hours,
    );
    for t in 1..=hours {
        contracts_table.set(t, "gas_contract", 10.0).unwrap();
        contracts_table.set(t, "hydro_contract", 1_000.0).unwrap();
    }

    let storage_derated = TimeSeriesTable::new(Resolution::Hourly, vec![], hours);
    let hydro_hourly = TimeSeriesTable::new(Resolution::Hourly, vec![], hours);
    let hydro_daily = TimeSeriesTable::new(Resolution::Daily, vec![], 7);
    let mut hydro_weekly = TimeSeriesTable::new(Resolution::Weekly, vec!["h1".to_string()], 1);
    hydro_weekly.set(1, "h1", 1_000.0).unwrap();
    let mut hydro_weekly_min = TimeSeriesTable::new(Resolution::Weekly, vec!["h1".to_string()], 1);
    hydro_weekly_min.set(1, "h1", 500.0).unwrap();
    let nondispatch_capacity = TimeSeriesTable::new(Resolution::Hourly, vec![], hours);
    let transmission_capacity = TimeSeriesTable::new(Resolution::Hourly, vec![], hours);
    let transmission_susceptance = TimeSeriesTable::new(Resolution::Hourly, vec![], hours);

    let config = SimConfig { sim_horizon: hours, num_sim_days: 1, ..base_config() };

    SystemInput::new(
        config,
        network,
        vec![thermal],
        vec![hydro],
        Vec::<NonDispatchUnit>::new(),
        Vec::<StorageUnit>::new(),
        Demand::new(demand_table),
        ContractTable::new(contracts_table),
        thermal_derated,
        storage_derated,
        hydro_hourly,
        hydro_daily,
        hydro_weekly,
        hydro_weekly_min,
        nondispatch_capacity,
        transmission_capacity,
        transmission_susceptance,
    )
}

/// The weekly hydro lower bound binds even though the hydro contract is
/// priced well above the thermal alternative: the solver has no economic
/// reason to dispatch it past zero, so any nonzero weekly total is the
/// lower-bound constraint at work, not cost-minimization (spec section 4.3).
#[test]
fn weekly_hydro_lower_bound_forces_minimum_dispatch() {
    let system = thermal_and_weekly_hydro();
    let mut builder = ModelBuilder::new(&system);
    let init = InitialConditions::cold_start(
        system.thermal_units.iter().map(|u| u.name.clone()),
        std::iter::empty(),
    );

    let assembled = builder.build(1, &init, &system).unwrap();
    let mut model = PowerSystemModel::from_assembled(assembled);
    let options = SolveOptions { timelimit: Duration::from_secs(30), ..SolveOptions::default() };
    model.optimize(&options).unwrap();
    assert!(model.check_feasible());

    let solution = model.get_solution();
    let weekly_total: f64 = (1..=168)
        .map(|t| solution.get(&format!("hydro.phydro[h1@{t}]")).copied().unwrap_or(0.0))
        .sum();

    assert!(weekly_total >= 500.0 - 1e-3, "weekly lower bound of 500 MWh must be met, got {weekly_total}");
    assert!(weekly_total <= 1_000.0 + 1e-3, "weekly upper bound of 1000 MWh must not be exceeded, got {weekly_total}");
    assert!(weekly_total <= 500.0 + 1.0, "an expensive contract should be dispatched only to the lower bound, got {weekly_total}");
}

#[test]
fn s1_single_thermal_unit_meets_constant_demand() {
    let system = single_thermal_single_node();
    let mut builder = ModelBuilder::new(&system);
    let init = InitialConditions::cold_start(
        system.thermal_units.iter().map(|u| u.name.clone()),
        std::iter::empty(),
    );

    let assembled = builder.build(1, &init, &system).unwrap();
    let mut model = PowerSystemModel::from_assembled(assembled);
    let options = SolveOptions { timelimit: Duration::from_secs(30), ..SolveOptions::default() };
    model.optimize(&options).unwrap();

    assert!(model.check_feasible());

    let solution = model.get_solution();
    let status_t1 = solution.get("thermal.status[g1@1]").copied().unwrap_or(0.0);
    assert!((status_t1 - 1.0).abs() < 1e-4, "unit should be committed at t=1");

    let p_thermal_t1 = solution.get("thermal.pthermal[g1@1]").copied().unwrap_or(0.0);
    assert!((p_thermal_t1 - 75.0).abs() < 1e-3, "dispatch should meet the 75 MW demand");

    let startup_t1 = solution.get("thermal.startup[g1@1]").copied().unwrap_or(0.0);
    assert!((startup_t1 - 1.0).abs() < 1e-4, "cold start implies a startup event at t=1");
}

/// Scenario S3: a unit forced off by `initial_min_off` stays off until its
/// carried-over down time elapses, even though demand could use it earlier.
#[test]
fn s3_cold_start_min_down_respected() {
    let system = single_thermal_single_node();
    let mut builder = ModelBuilder::new(&system);

    let mut init = InitialConditions::cold_start(
        system.thermal_units.iter().map(|u| u.name.clone()),
        std::iter::empty(),
    );
    init.thermal.insert(
        "g1".to_string(),
        pownet_solve::ThermalInitialState {
            initial_p: 0.0,
            initial_u: 0.0,
            initial_v: 0.0,
            initial_w: 0.0,
            initial_min_on: 0,
            initial_min_off: 5,
        },
    );

    let assembled = builder.build(1, &init, &system).unwrap();
    let mut model = PowerSystemModel::from_assembled(assembled);
    let options = SolveOptions { timelimit: Duration::from_secs(30), ..SolveOptions::default() };
    model.optimize(&options).unwrap();
    assert!(model.check_feasible());

    let solution = model.get_solution();
    for t in 1..=5 {
        let status = solution.get(&format!("thermal.status[g1@{t}]")).copied().unwrap_or(0.0);
        assert!(status < 0.5, "unit must stay off through its carried-over down time at t={t}");
    }
}

/// Scenario S6: the rounding heuristic converges on a feasible integer
/// solution rather than needing a full MILP fallback.
#[test]
fn s6_rounding_heuristic_converges() {
    let system = single_thermal_single_node();
    let mut builder = ModelBuilder::new(&system);
    let init = InitialConditions::cold_start(
        system.thermal_units.iter().map(|u| u.name.clone()),
        std::iter::empty(),
    );

    let assembled = builder.build(1, &init, &system).unwrap();
    let mut model = PowerSystemModel::from_assembled(assembled);
    let options = SolveOptions { timelimit: Duration::from_secs(30), ..SolveOptions::default() };

    let (_runtime, iterations) = model.optimize_with_rounding("fast", 0.5, 20, &options).unwrap();
    assert!(model.check_feasible());
    assert!(iterations.is_some(), "the heuristic should converge without a MILP fallback on this easy instance");
}

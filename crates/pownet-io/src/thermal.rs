//! `thermal_unit.csv` loader (spec section 6), grounded on
//! `examples/original_source/src/pownet/input.py`'s `load_thermal_unit_params`.

use crate::csv_util::read_records;
use crate::error::IoResult;
use pownet_core::units::Megawatts;
use pownet_core::ThermalUnit;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ThermalRow {
    name: String,
    node: String,
    fuel_type: String,
    fuel_contract: String,
    min_capacity: f64,
    max_capacity: f64,
    min_downtime: usize,
    min_uptime: usize,
    ramp_rate: f64,
    fixed_cost: f64,
    operation_cost: f64,
    startup_cost: f64,
    heat_rate: f64,
    must_take: u8,
}

/// Loads `thermal_unit.csv`. The startup/shutdown ramp rates are not a
/// separate column in this file; the original sets `SU = SD = min_capacity`
/// rather than deriving them from the general ramp rate, so this loader
/// pins [`ThermalUnit::startup_rate`]/[`ThermalUnit::shutdown_rate`]
/// explicitly instead of leaving them `None` (which would fall back to
/// `ThermalUnit`'s own `min_capacity + ramp` default).
pub fn load_thermal_units(dir: &Path) -> IoResult<Vec<ThermalUnit>> {
    let rows: Vec<ThermalRow> = read_records(dir, "thermal_unit.csv")?;
    Ok(rows
        .into_iter()
        .map(|r| ThermalUnit {
            name: r.name.clone(),
            node: r.node,
            fuel_type: r.fuel_type,
            fuel_contract: r.fuel_contract,
            rated_capacity: Megawatts::new(r.max_capacity),
            min_capacity: Megawatts::new(r.min_capacity),
            derated_capacity_column: r.name,
            min_up_time: r.min_uptime,
            min_down_time: r.min_downtime,
            ramp_up: Megawatts::new(r.ramp_rate),
            ramp_down: Megawatts::new(r.ramp_rate),
            startup_rate: Some(Megawatts::new(r.min_capacity)),
            shutdown_rate: Some(Megawatts::new(r.min_capacity)),
            fixed_cost: r.fixed_cost,
            operation_cost: r.operation_cost,
            startup_cost: r.startup_cost,
            heat_rate: r.heat_rate,
            must_take: r.must_take == 1,
        })
        .collect())
}

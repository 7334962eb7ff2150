//! `energy_storage.csv` loader (spec section 6), grounded on
//! `examples/original_source/src/pownet/input.py`'s `load_ess_params`.

use crate::csv_util::read_records;
use crate::error::IoResult;
use pownet_core::units::Megawatts;
use pownet_core::{AttachTarget, StorageUnit};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct StorageRow {
    name: String,
    attach_to: String,
    max_charge: f64,
    max_discharge: f64,
    min_capacity: f64,
    max_capacity: f64,
    charge_efficiency: f64,
    discharge_efficiency: f64,
    self_discharge_rate: f64,
    cost_contract: String,
}

/// Loads `energy_storage.csv`. `attach_to` names either a node or a
/// generator; `generator_names` disambiguates the two the same way the
/// original classifies ESS units by membership in each generator-type
/// dictionary, collapsed here to one combined name set since
/// [`AttachTarget`] only distinguishes node vs. generator. Every unit cold
/// starts at zero state of charge, matching `SystemRecord`'s cold-start
/// convention.
pub fn load_storage(dir: &Path, generator_names: &HashSet<String>) -> IoResult<Vec<StorageUnit>> {
    let rows: Vec<StorageRow> = read_records(dir, "energy_storage.csv")?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let attach_target = if generator_names.contains(&r.attach_to) {
                AttachTarget::Generator(r.attach_to)
            } else {
                AttachTarget::Node(r.attach_to)
            };
            StorageUnit {
                name: r.name.clone(),
                attach_target,
                max_charge: Megawatts::new(r.max_charge),
                max_discharge: Megawatts::new(r.max_discharge),
                min_capacity: Megawatts::new(r.min_capacity),
                max_capacity: Megawatts::new(r.max_capacity),
                charge_efficiency: r.charge_efficiency,
                discharge_efficiency: r.discharge_efficiency,
                self_discharge_rate: r.self_discharge_rate,
                derated_capacity_column: r.name,
                cost_contract: r.cost_contract,
                initial_state_of_charge: Megawatts::new(0.0),
            }
        })
        .collect())
}

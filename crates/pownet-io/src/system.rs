//! Top-level model-folder loader (spec section 6): reads
//! `<input_folder>/<model_name>/` and assembles a validated
//! [`pownet_core::SystemInput`].

use crate::contracts::load_contracts;
use crate::csv_util::{model_dir, read_plain_timeseries};
use crate::demand::load_demand;
use crate::error::IoResult;
use crate::hydro::load_hydro;
use crate::network::load_network;
use crate::nondispatch::load_nondispatch;
use crate::nondispatch_registry::NonDispatchRegistry;
use crate::storage::load_storage;
use crate::thermal::load_thermal_units;
use pownet_core::{Resolution, SimConfig, SystemInput};
use std::collections::HashSet;
use std::path::Path;

/// Reads every CSV/JSON file spec section 6 names out of
/// `<input_folder>/<model_name>/` and assembles a `SystemInput`. Load order
/// mirrors the original's `load_data`: thermal, then hydro, then the
/// remaining non-dispatch kinds, then storage (which needs every
/// generator's name to resolve `attach_to`), then contracts last.
pub fn load_system_input(input_folder: &Path, model_name: &str, config: SimConfig) -> IoResult<SystemInput> {
    let dir = model_dir(input_folder, model_name);
    let sim_hours = Resolution::Hourly.expected_rows();

    let thermal_units = load_thermal_units(&dir)?;
    let registry = NonDispatchRegistry::load(&dir)?;
    let hydro = load_hydro(&dir, &registry)?;
    let nondispatch = load_nondispatch(&dir, &registry)?;

    let mut generator_names: HashSet<String> = HashSet::new();
    generator_names.extend(thermal_units.iter().map(|u| u.name.clone()));
    generator_names.extend(hydro.units.iter().map(|u| u.name.clone()));
    generator_names.extend(nondispatch.units.iter().map(|u| u.name.clone()));
    let storage_units = load_storage(&dir, &generator_names)?;

    let demand = load_demand(&dir)?;
    let contracts = load_contracts(&dir)?;
    let network = load_network(&dir, sim_hours)?;

    let thermal_derated_capacity = read_plain_timeseries(&dir, "pownet_thermal_derated_capacity.csv", Resolution::Hourly)?;
    let storage_derated_capacity = read_plain_timeseries(&dir, "pownet_ess_derated_capacity.csv", Resolution::Hourly)?;

    Ok(SystemInput::new(
        config,
        network.network,
        thermal_units,
        hydro.units,
        nondispatch.units,
        storage_units,
        demand,
        contracts,
        thermal_derated_capacity,
        storage_derated_capacity,
        hydro.hourly,
        hydro.daily,
        hydro.weekly,
        hydro.weekly_min,
        nondispatch.capacity,
        network.capacity,
        network.susceptance,
    ))
}

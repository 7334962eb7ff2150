//! Hydropower loaders (spec section 6), grounded on
//! `examples/original_source/src/pownet/input.py`'s `_load_hydropower` /
//! `_load_capacity_and_update_fuelmap_and_get_unit_node`: hourly, daily and
//! weekly availability live in three mutually exclusive files, each a
//! dual-header (unit, node) capacity table.

use crate::csv_util::read_dual_header_capacity;
use crate::error::IoResult;
use crate::nondispatch_registry::NonDispatchRegistry;
use pownet_core::units::Megawatts;
use pownet_core::{HydroAvailability, HydroUnit, Resolution, TimeSeriesTable};
use std::path::Path;

pub struct HydroTables {
    pub hourly: TimeSeriesTable,
    pub daily: TimeSeriesTable,
    pub weekly: TimeSeriesTable,
    /// Weekly lower-bound companion to `weekly` (spec section 4.3's "both
    /// lower and upper bounds per week"). Empty when `hydropower_weekly_min.csv`
    /// is absent, in which case no unit gets a `min_column`.
    pub weekly_min: TimeSeriesTable,
    pub units: Vec<HydroUnit>,
}

pub fn load_hydro(dir: &Path, registry: &NonDispatchRegistry) -> IoResult<HydroTables> {
    let (hourly, hourly_nodes) = read_dual_header_capacity(dir, "hydropower.csv", Resolution::Hourly)?;
    let (daily, daily_nodes) = read_dual_header_capacity(dir, "hydropower_daily.csv", Resolution::Daily)?;
    let (weekly, weekly_nodes) = read_dual_header_capacity(dir, "hydropower_weekly.csv", Resolution::Weekly)?;
    let (weekly_min, weekly_min_nodes) = read_dual_header_capacity(dir, "hydropower_weekly_min.csv", Resolution::Weekly)?;

    let mut units = Vec::new();
    for (name, node) in &hourly_nodes {
        units.push(build_unit(name, node, HydroAvailability::Hourly { column: name.clone() }, registry));
    }
    for (name, node) in &daily_nodes {
        units.push(build_unit(name, node, HydroAvailability::Daily { column: name.clone() }, registry));
    }
    for (name, node) in &weekly_nodes {
        let min_column = weekly_min_nodes.contains_key(name).then(|| name.clone());
        units.push(build_unit(name, node, HydroAvailability::Weekly { column: name.clone(), min_column }, registry));
    }

    Ok(HydroTables { hourly, daily, weekly, weekly_min, units })
}

fn build_unit(name: &str, node: &str, availability: HydroAvailability, registry: &NonDispatchRegistry) -> HydroUnit {
    let entry = registry.entry_for(name);
    HydroUnit {
        name: name.to_string(),
        node: node.to_string(),
        contract: registry.contract_for(name),
        contracted_capacity: Megawatts::new(entry.contracted_capacity.unwrap_or(f64::MAX)),
        availability,
        must_take: entry.must_take,
    }
}

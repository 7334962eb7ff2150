//! Solar, wind and import loaders (spec section 6), grounded on
//! `examples/original_source/src/pownet/input.py`'s
//! `_load_capacity_and_update_fuelmap_and_get_unit_node` calls for
//! `solar.csv` / `wind.csv` / `import.csv`.

use crate::csv_util::{merge_tables, read_dual_header_capacity};
use crate::error::IoResult;
use crate::nondispatch_registry::NonDispatchRegistry;
use pownet_core::units::Megawatts;
use pownet_core::{NonDispatchKind, NonDispatchUnit, Resolution, TimeSeriesTable};
use std::path::Path;

/// The merged `nondispatch_capacity` table `pownet-solve`'s
/// `NonDispatchBuilder` indexes by unit name, plus every unit parsed from
/// the three capacity files.
pub struct NonDispatchTables {
    pub capacity: TimeSeriesTable,
    pub units: Vec<NonDispatchUnit>,
}

pub fn load_nondispatch(dir: &Path, registry: &NonDispatchRegistry) -> IoResult<NonDispatchTables> {
    let (solar, solar_nodes) = read_dual_header_capacity(dir, "solar.csv", Resolution::Hourly)?;
    let (wind, wind_nodes) = read_dual_header_capacity(dir, "wind.csv", Resolution::Hourly)?;
    let (import, import_nodes) = read_dual_header_capacity(dir, "import.csv", Resolution::Hourly)?;

    let mut units = Vec::new();
    for (kind, nodes) in [
        (NonDispatchKind::Solar, &solar_nodes),
        (NonDispatchKind::Wind, &wind_nodes),
        (NonDispatchKind::Import, &import_nodes),
    ] {
        for (name, node) in nodes {
            let entry = registry.entry_for(name);
            units.push(NonDispatchUnit {
                name: name.clone(),
                node: node.clone(),
                contract: registry.contract_for(name),
                kind,
                capacity_column: name.clone(),
                contracted_capacity: entry.contracted_capacity.map(Megawatts::new),
                must_take: entry.must_take,
            });
        }
    }

    let capacity = merge_tables(Resolution::Hourly, vec![solar, wind, import])?;
    Ok(NonDispatchTables { capacity, units })
}

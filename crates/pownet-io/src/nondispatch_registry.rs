//! `nondispatch_unit.csv` (spec section 6): one shared contract /
//! contracted-capacity / must-take lookup keyed by unit name, consumed by
//! every non-dispatch generator category (hydro, solar, wind, import) —
//! grounded on `examples/original_source/src/pownet/input.py`'s
//! `_load_contract_costs`, `_load_contracted_capacity` and
//! `_load_nondispatchable_must_take_units`, which all read this one file
//! regardless of which generator type a row belongs to.

use crate::csv_util::read_records;
use crate::error::IoResult;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NonDispatchRow {
    name: String,
    contract: String,
    contracted_capacity: f64,
    must_take: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct NonDispatchEntry {
    /// `None` when the CSV value is `-1` ("unbounded", spec section 6).
    pub contracted_capacity: Option<f64>,
    pub must_take: bool,
}

pub struct NonDispatchRegistry {
    contracts: HashMap<String, String>,
    entries: HashMap<String, NonDispatchEntry>,
}

impl NonDispatchRegistry {
    pub fn load(dir: &Path) -> IoResult<Self> {
        let rows: Vec<NonDispatchRow> = read_records(dir, "nondispatch_unit.csv")?;
        let mut contracts = HashMap::new();
        let mut entries = HashMap::new();
        for row in rows {
            let cap = if row.contracted_capacity == -1.0 { None } else { Some(row.contracted_capacity) };
            entries.insert(row.name.clone(), NonDispatchEntry { contracted_capacity: cap, must_take: row.must_take == 1 });
            contracts.insert(row.name, row.contract);
        }
        Ok(Self { contracts, entries })
    }

    pub fn contract_for(&self, unit: &str) -> String {
        self.contracts.get(unit).cloned().unwrap_or_else(|| unit.to_string())
    }

    pub fn entry_for(&self, unit: &str) -> NonDispatchEntry {
        self.entries
            .get(unit)
            .copied()
            .unwrap_or(NonDispatchEntry { contracted_capacity: None, must_take: false })
    }
}

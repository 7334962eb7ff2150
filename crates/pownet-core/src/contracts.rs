//! Contract cost lookups (spec section 3).
//!
//! `unit -> contract_id` associations live on the unit structs themselves
//! (`ThermalUnit::fuel_contract`, `NonDispatchUnit::contract`,
//! `StorageUnit::cost_contract`); this module only holds the
//! `contract_id -> $/MWh` timeseries every one of those names into.

use crate::error::PownetResult;
use crate::timeseries::TimeSeriesTable;
use crate::units::DollarsPerMwh;

/// `contract_costs(contract_id, absolute_hour) -> $/MWh` (spec section 3).
#[derive(Debug, Clone)]
pub struct ContractTable {
    table: TimeSeriesTable,
}

impl ContractTable {
    pub fn new(table: TimeSeriesTable) -> Self {
        Self { table }
    }

    pub fn cost_at(&self, contract_id: &str, absolute_hour: usize) -> PownetResult<DollarsPerMwh> {
        self.table
            .get(absolute_hour, contract_id)
            .map(DollarsPerMwh::new)
    }

    pub fn has_contract(&self, contract_id: &str) -> bool {
        self.table.has_column(contract_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::Resolution;

    #[test]
    fn looks_up_cost_by_contract_and_hour() {
        let mut table = TimeSeriesTable::new(Resolution::Hourly, vec!["c1".into()], 8760);
        table.set(1, "c1", 42.5).unwrap();
        let contracts = ContractTable::new(table);
        assert_eq!(contracts.cost_at("c1", 1).unwrap(), DollarsPerMwh::new(42.5));
    }

    #[test]
    fn unknown_contract_is_absent() {
        let table = TimeSeriesTable::new(Resolution::Hourly, vec!["c1".into()], 8760);
        let contracts = ContractTable::new(table);
        assert!(!contracts.has_contract("c2"));
    }
}

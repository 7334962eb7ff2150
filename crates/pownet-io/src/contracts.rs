//! `contract_cost.csv` loader (spec section 6): one `$/MWh` column per
//! contract id, shared by fuel, non-dispatch and storage discharge
//! contracts alike.

use crate::csv_util::read_plain_timeseries;
use crate::error::IoResult;
use pownet_core::{ContractTable, Resolution};
use std::path::Path;

pub fn load_contracts(dir: &Path) -> IoResult<ContractTable> {
    let table = read_plain_timeseries(dir, "contract_cost.csv", Resolution::Hourly)?;
    Ok(ContractTable::new(table))
}

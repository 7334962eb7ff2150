//! `demand_export.csv` loader (spec section 6).

use crate::csv_util::read_plain_timeseries;
use crate::error::IoResult;
use pownet_core::{Demand, Resolution};
use std::path::Path;

pub fn load_demand(dir: &Path) -> IoResult<Demand> {
    let table = read_plain_timeseries(dir, "demand_export.csv", Resolution::Hourly)?;
    Ok(Demand::new(table))
}

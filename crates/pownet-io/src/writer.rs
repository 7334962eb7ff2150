//! Output artifact writers (spec section 6): the long-form variable CSV and
//! the hour-by-node LMP CSV. Callers hand in already-decomposed rows rather
//! than raw solver keys — `pownet-sim`'s `SystemRecord` owns the key-shape
//! parsing, so this crate stays free of a `pownet-solve`/`pownet-sim`
//! dependency.

use crate::error::{IoError, IoResult};
use std::collections::HashMap;
use std::path::Path;

/// One row of the long-form output table (spec section 6: `varname, value,
/// node, timestep, hour`).
#[derive(Debug, Clone)]
pub struct LongFormRow {
    pub varname: String,
    pub value: f64,
    pub node: String,
    pub timestep: usize,
    pub hour: usize,
}

pub fn write_long_form_csv(path: &Path, rows: impl IntoIterator<Item = LongFormRow>) -> IoResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
    writer
        .write_record(["varname", "value", "node", "timestep", "hour"])
        .map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
    for row in rows {
        writer
            .write_record([
                row.varname,
                row.value.to_string(),
                row.node,
                row.timestep.to_string(),
                row.hour.to_string(),
            ])
            .map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes an hour x node grid of dual prices (spec section 6's "LMP CSV").
/// `lmp` keys are `(node, hour)`; missing entries are left blank.
pub fn write_lmp_csv(path: &Path, lmp: &HashMap<(String, usize), f64>, nodes: &[String], hours: impl Iterator<Item = usize> + Clone) -> IoResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
    let mut header = vec!["hour".to_string()];
    header.extend(nodes.iter().cloned());
    writer.write_record(&header).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;

    for hour in hours {
        let mut record = vec![hour.to_string()];
        for node in nodes {
            let cell = lmp.get(&(node.clone(), hour)).map(|v| v.to_string()).unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
    }
    writer.flush()?;
    Ok(())
}

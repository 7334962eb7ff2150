//! Shared CSV-reading helpers (spec section 6's input file formats),
//! grounded on `examples/original_source/src/pownet/input.py`'s
//! `_load_timeseries_from_csv` / `_check_and_load_timeseries` /
//! `_check_and_load_csv`: plain-header timeseries with date columns
//! dropped and 1-based row indexing, and dual-header capacity files whose
//! second header row names the attached node.

use crate::error::{IoError, IoResult};
use pownet_core::timeseries::Resolution;
use pownet_core::TimeSeriesTable;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Column names dropped from a timeseries header (spec section 6's implicit
/// "date columns are not data"; ported from the original's `date_cols`).
const DATE_COLUMNS: &[&str] = &["year", "month", "day", "hour", "date", "datetime"];

/// Deserializes every row of `filename` under `dir` into `T` via serde, or
/// an empty `Vec` if the file does not exist (the original's
/// `_check_and_load_csv` "return an empty DataFrame" convention).
pub fn read_records<T: DeserializeOwned>(dir: &Path, filename: &str) -> IoResult<Vec<T>> {
    let path = dir.join(filename);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(&path).map_err(|source| IoError::Csv { path: path.clone(), source })?;
    let mut out = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| IoError::Csv { path: path.clone(), source })?;
        out.push(row);
    }
    Ok(out)
}

/// Deserializes `filename`, returning an error naming the file if it is
/// missing (for CSVs that must be present for a well-formed model).
pub fn read_records_required<T: DeserializeOwned>(dir: &Path, filename: &str) -> IoResult<Vec<T>> {
    let path = dir.join(filename);
    if !path.exists() {
        return Err(IoError::MissingFile(path));
    }
    read_records(dir, filename)
}

/// Reads a single-header timeseries CSV (demand, contract cost, derated
/// capacity) into a dense [`TimeSeriesTable`]. Columns named in
/// [`DATE_COLUMNS`] are dropped; every other column becomes a named series.
pub fn read_plain_timeseries(dir: &Path, filename: &str, resolution: Resolution) -> IoResult<TimeSeriesTable> {
    let path = dir.join(filename);
    if !path.exists() {
        return Ok(TimeSeriesTable::new(resolution, Vec::new(), 0));
    }
    let mut reader = csv::Reader::from_path(&path).map_err(|source| IoError::Csv { path: path.clone(), source })?;
    let header = reader.headers().map_err(|source| IoError::Csv { path: path.clone(), source })?.clone();

    let kept: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| !DATE_COLUMNS.contains(&name.to_lowercase().as_str()))
        .map(|(i, _)| i)
        .collect();
    let columns: Vec<String> = kept.iter().map(|&i| header[i].to_string()).collect();

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IoError::Csv { path: path.clone(), source })?;
        let mut row = Vec::with_capacity(kept.len());
        for &i in &kept {
            let raw = record.get(i).unwrap_or("0");
            let value: f64 = raw.parse().map_err(|_| IoError::Header {
                path: path.clone(),
                message: format!("non-numeric value '{raw}' in column '{}'", header[i]),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    let mut table = TimeSeriesTable::new(resolution, columns.clone(), rows.len());
    for (r, row) in rows.into_iter().enumerate() {
        for (c, value) in row.into_iter().enumerate() {
            table.set(r + 1, &columns[c], value).map_err(IoError::Core)?;
        }
    }
    Ok(table)
}

/// Reads a dual-header capacity CSV (`hydropower*.csv`, `solar.csv`,
/// `wind.csv`, `import.csv`): the first header row is the unit name, the
/// second is its attached node (the original's `header_levels=1` multi-index,
/// flattened to a unit-keyed table plus a companion `unit -> node` map).
pub fn read_dual_header_capacity(
    dir: &Path,
    filename: &str,
    resolution: Resolution,
) -> IoResult<(TimeSeriesTable, HashMap<String, String>)> {
    let path = dir.join(filename);
    if !path.exists() {
        return Ok((TimeSeriesTable::new(resolution, Vec::new(), 0), HashMap::new()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|source| IoError::Csv { path: path.clone(), source })?;
    let mut records = reader.records();

    let unit_row = records
        .next()
        .ok_or_else(|| IoError::Header { path: path.clone(), message: "missing unit-name header row".into() })?
        .map_err(|source| IoError::Csv { path: path.clone(), source })?;
    let node_row = records
        .next()
        .ok_or_else(|| IoError::Header { path: path.clone(), message: "missing node-name header row".into() })?
        .map_err(|source| IoError::Csv { path: path.clone(), source })?;

    let kept: Vec<usize> = unit_row
        .iter()
        .enumerate()
        .filter(|(_, name)| !DATE_COLUMNS.contains(&name.to_lowercase().as_str()))
        .map(|(i, _)| i)
        .collect();
    let columns: Vec<String> = kept.iter().map(|&i| unit_row[i].to_string()).collect();
    let mut unit_node = HashMap::new();
    for &i in &kept {
        unit_node.insert(unit_row[i].to_string(), node_row.get(i).unwrap_or_default().to_string());
    }

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in records {
        let record = record.map_err(|source| IoError::Csv { path: path.clone(), source })?;
        let mut row = Vec::with_capacity(kept.len());
        for &i in &kept {
            let raw = record.get(i).unwrap_or("0");
            let value: f64 = raw.parse().map_err(|_| IoError::Header {
                path: path.clone(),
                message: format!("non-numeric value '{raw}' in column '{}'", unit_row[i]),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    let mut table = TimeSeriesTable::new(resolution, columns.clone(), rows.len());
    for (r, row) in rows.into_iter().enumerate() {
        for (c, value) in row.into_iter().enumerate() {
            table.set(r + 1, &columns[c], value).map_err(IoError::Core)?;
        }
    }
    Ok((table, unit_node))
}

/// Merges several single-header capacity tables with identical row counts
/// into one, column-disjoint table (the combined `nondispatch_capacity`
/// series `pownet-solve` indexes solar/wind/import units against by name).
pub fn merge_tables(resolution: Resolution, tables: Vec<TimeSeriesTable>) -> IoResult<TimeSeriesTable> {
    let rows = tables.iter().map(|t| t.rows()).max().unwrap_or(0);
    let mut columns = Vec::new();
    for t in &tables {
        columns.extend(t.column_names().map(|s| s.to_string()));
    }
    let mut merged = TimeSeriesTable::new(resolution, columns, rows);
    for t in &tables {
        for col in t.column_names().map(|s| s.to_string()).collect::<Vec<_>>() {
            for row in 1..=t.rows() {
                merged.set(row, &col, t.get(row, &col).map_err(IoError::Core)?).map_err(IoError::Core)?;
            }
        }
    }
    Ok(merged)
}

pub fn model_dir(input_folder: &Path, model_name: &str) -> PathBuf {
    input_folder.join(model_name)
}

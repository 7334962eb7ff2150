//! Transmission network loader (spec section 6), grounded on
//! `examples/original_source/src/pownet/input.py`'s handling of
//! `pownet_transmission.csv` and `pownet_cycle_map.json`: the per-edge
//! scalar `line_capacity`/`susceptance` is replicated across every
//! simulated hour (`_create_timeseries_of_edges`) rather than varying
//! hour-to-hour.

use crate::error::{IoError, IoResult};
use pownet_core::{Cycle, EdgeRecord, Network, Resolution, TimeSeriesTable};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TransmissionRow {
    source: String,
    sink: String,
    line_capacity: f64,
    susceptance: f64,
}

pub struct NetworkTables {
    pub network: Network,
    pub capacity: TimeSeriesTable,
    pub susceptance: TimeSeriesTable,
}

fn edge_column(source: &str, sink: &str) -> String {
    format!("{source}->{sink}")
}

pub fn load_network(dir: &Path, sim_hours: usize) -> IoResult<NetworkTables> {
    let path = dir.join("pownet_transmission.csv");
    let mut network = Network::new();

    if !path.exists() {
        return Ok(NetworkTables {
            network,
            capacity: TimeSeriesTable::new(Resolution::Hourly, Vec::new(), sim_hours),
            susceptance: TimeSeriesTable::new(Resolution::Hourly, Vec::new(), sim_hours),
        });
    }

    let mut reader = csv::Reader::from_path(&path).map_err(|source| IoError::Csv { path: path.clone(), source })?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: TransmissionRow = record.map_err(|source| IoError::Csv { path: path.clone(), source })?;
        rows.push(row);
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        if !network.has_node(&row.source) {
            network.add_node(row.source.clone()).map_err(IoError::Core)?;
        }
        if !network.has_node(&row.sink) {
            network.add_node(row.sink.clone()).map_err(IoError::Core)?;
        }
        let column = edge_column(&row.source, &row.sink);
        network
            .add_edge(EdgeRecord {
                source: row.source.clone(),
                sink: row.sink.clone(),
                capacity_column: column.clone(),
                susceptance_column: column.clone(),
            })
            .map_err(IoError::Core)?;
        columns.push(column);
    }

    let mut capacity = TimeSeriesTable::new(Resolution::Hourly, columns.clone(), sim_hours);
    let mut susceptance = TimeSeriesTable::new(Resolution::Hourly, columns.clone(), sim_hours);
    for (row, column) in rows.iter().zip(&columns) {
        for hour in 1..=sim_hours {
            capacity.set(hour, column, row.line_capacity).map_err(IoError::Core)?;
            susceptance.set(hour, column, row.susceptance).map_err(IoError::Core)?;
        }
    }

    if let Some(cycles) = load_cycle_map(dir)? {
        network.set_cycles(cycles);
    } else {
        network.compute_cycle_basis();
    }

    Ok(NetworkTables { network, capacity, susceptance })
}

/// Reads `pownet_cycle_map.json` when present (spec section 6); `None`
/// leaves cycle-basis computation to `SystemInput::new`'s own DFS pass.
fn load_cycle_map(dir: &Path) -> IoResult<Option<Vec<Cycle>>> {
    let path = dir.join("pownet_cycle_map.json");
    if !path.exists() {
        return Ok(None);
    }
    let file = std::fs::File::open(&path)?;
    let raw: Vec<Vec<String>> =
        serde_json::from_reader(file).map_err(|source| IoError::Json { path: path.clone(), source })?;
    Ok(Some(raw.into_iter().map(|nodes| Cycle { nodes }).collect()))
}

//! Dense timeseries storage.
//!
//! Design note (spec section 9, "Dataframes as timeseries"): rather than carry
//! a dataframe through the model-assembly layer, every timeseries here is a
//! dense `[time x column]` array plus a name→column index map. A window's
//! slice is a row range; the `t + (k-1)*24` arithmetic lives in one place
//! ([`TimeSeriesTable::absolute_hour`]) instead of being repeated at every
//! call site.

use crate::error::{PownetError, PownetResult};
use std::collections::HashMap;

/// Native resolution of a timeseries, used to validate row counts and to pick
/// the indexing rule (spec section 9's daily/hourly convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hourly,
    Daily,
    Weekly,
}

impl Resolution {
    /// Expected row count for one simulation year, dropping Feb 29 on leap
    /// years (spec section 6).
    pub fn expected_rows(self) -> usize {
        match self {
            Resolution::Hourly => 8760,
            Resolution::Daily => 365,
            Resolution::Weekly => 52,
        }
    }
}

/// Absolute hour of position `t` within window `k` (spec section 3).
pub fn absolute_hour(t: usize, k: usize) -> usize {
    t + (k - 1) * 24
}

/// Absolute day index (1-based) covering a given absolute hour (spec section
/// 9's "daily-hydro row index = absolute day index" convention).
pub fn absolute_day(absolute_hour: usize) -> usize {
    (absolute_hour - 1) / 24 + 1
}

/// A dense `rows x columns` table, one column per named unit or contract.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    resolution: Resolution,
    rows: usize,
    columns: HashMap<String, usize>,
    data: Vec<f64>,
}

impl TimeSeriesTable {
    pub fn new(resolution: Resolution, columns: Vec<String>, rows: usize) -> Self {
        let col_count = columns.len();
        let index = columns
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        Self {
            resolution,
            rows,
            columns: index,
            data: vec![0.0; rows * col_count],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    /// Writes one `(row, column)` value. `row` is 1-based.
    pub fn set(&mut self, row: usize, column: &str, value: f64) -> PownetResult<()> {
        let col = self.column_index(column)?;
        self.check_row(row)?;
        self.data[(row - 1) * self.columns.len() + col] = value;
        Ok(())
    }

    /// Reads one `(row, column)` value. `row` is 1-based.
    pub fn get(&self, row: usize, column: &str) -> PownetResult<f64> {
        let col = self.column_index(column)?;
        self.check_row(row)?;
        Ok(self.data[(row - 1) * self.columns.len() + col])
    }

    /// A window's slice of one column: rows `[start, start+len)`, 1-based.
    pub fn window_slice(&self, column: &str, start: usize, len: usize) -> PownetResult<Vec<f64>> {
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(self.get(start + i, column)?);
        }
        Ok(out)
    }

    fn column_index(&self, column: &str) -> PownetResult<usize> {
        self.columns.get(column).copied().ok_or_else(|| {
            PownetError::validation("timeseries.column", format!("unknown column '{column}'"))
        })
    }

    fn check_row(&self, row: usize) -> PownetResult<()> {
        if row == 0 || row > self.rows {
            return Err(PownetError::validation(
                "timeseries.row",
                format!("row {row} out of range [1, {}]", self.rows),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_hour_matches_spec_formula() {
        assert_eq!(absolute_hour(1, 1), 1);
        assert_eq!(absolute_hour(1, 2), 25);
        assert_eq!(absolute_hour(24, 3), 72);
    }

    #[test]
    fn absolute_day_groups_24_hours() {
        assert_eq!(absolute_day(1), 1);
        assert_eq!(absolute_day(24), 1);
        assert_eq!(absolute_day(25), 2);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut table = TimeSeriesTable::new(Resolution::Hourly, vec!["unit_a".into()], 8760);
        table.set(1, "unit_a", 42.0).unwrap();
        assert_eq!(table.get(1, "unit_a").unwrap(), 42.0);
    }

    #[test]
    fn unknown_column_is_a_validation_error() {
        let table = TimeSeriesTable::new(Resolution::Hourly, vec!["unit_a".into()], 8760);
        assert!(table.get(1, "unit_b").is_err());
    }

    #[test]
    fn row_out_of_range_is_a_validation_error() {
        let table = TimeSeriesTable::new(Resolution::Daily, vec!["unit_a".into()], 365);
        assert!(table.get(366, "unit_a").is_err());
        assert!(table.get(0, "unit_a").is_err());
    }
}

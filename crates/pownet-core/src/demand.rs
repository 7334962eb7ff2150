//! Hourly demand (spec section 3).

use crate::error::PownetResult;
use crate::timeseries::TimeSeriesTable;

/// `demand(t, node)` over the full simulation year, one column per node.
#[derive(Debug, Clone)]
pub struct Demand {
    table: TimeSeriesTable,
}

impl Demand {
    pub fn new(table: TimeSeriesTable) -> Self {
        Self { table }
    }

    pub fn at(&self, absolute_hour: usize, node: &str) -> PownetResult<f64> {
        self.table.get(absolute_hour, node)
    }

    pub fn total_at(&self, absolute_hour: usize) -> PownetResult<f64> {
        let mut total = 0.0;
        for node in self.table.column_names().collect::<Vec<_>>() {
            total += self.table.get(absolute_hour, node)?;
        }
        Ok(total)
    }

    /// The node with the highest demand at any hour in the year — the
    /// deterministic reference-bus choice (spec section 3, tie-broken
    /// lexicographically as in scenario S2).
    pub fn peak_demand_node(&self) -> Option<String> {
        let mut best: Option<(String, f64)> = None;
        for node in self.table.column_names() {
            let mut peak = f64::MIN;
            for row in 1..=self.table.rows() {
                if let Ok(v) = self.table.get(row, node) {
                    peak = peak.max(v);
                }
            }
            match &best {
                Some((best_name, best_peak))
                    if *best_peak > peak || (*best_peak == peak && best_name.as_str() <= node) => {}
                _ => best = Some((node.to_string(), peak)),
            }
        }
        best.map(|(name, _)| name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.table.column_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::Resolution;

    #[test]
    fn peak_demand_node_picks_lexicographic_tie_break() {
        let mut table = TimeSeriesTable::new(Resolution::Hourly, vec!["a".into(), "b".into()], 24);
        for t in 1..=24 {
            table.set(t, "a", 100.0).unwrap();
            table.set(t, "b", 100.0).unwrap();
        }
        let demand = Demand::new(table);
        assert_eq!(demand.peak_demand_node().as_deref(), Some("a"));
    }

    #[test]
    fn total_at_sums_all_nodes() {
        let mut table = TimeSeriesTable::new(Resolution::Hourly, vec!["a".into(), "b".into()], 24);
        table.set(1, "a", 10.0).unwrap();
        table.set(1, "b", 5.0).unwrap();
        let demand = Demand::new(table);
        assert_eq!(demand.total_at(1).unwrap(), 15.0);
    }
}

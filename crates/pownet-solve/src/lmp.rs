//! Marginal-price bookkeeping for `PowerSystemModel::solve_for_lmp` (spec
//! section 4.8): since `good_lp`'s Clarabel backend exposes no shadow
//! prices, the marginal price is approximated from the marginal
//! generator's own cost coefficient instead.

/// One thermal unit's dispatch variable at one hour, carrying everything
/// `solve_for_lmp` needs to decide whether it is the marginal generator.
#[derive(Debug, Clone)]
pub struct LmpCandidate {
    /// `thermal.pthermal[unit@t]` variable key.
    pub key: String,
    /// Position within the window (1-based).
    pub hour: usize,
    pub min_capacity: f64,
    pub max_capacity: f64,
    /// `$/MWh`, this unit's `fuel_cost * heat_rate + operation_cost` at this hour.
    pub marginal_cost: f64,
}

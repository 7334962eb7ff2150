//! Generator fleets: thermal, hydro and non-dispatchable units (spec section 3).

use crate::units::Megawatts;

/// A thermal generator (spec section 3's "Thermal" category).
#[derive(Debug, Clone)]
pub struct ThermalUnit {
    pub name: String,
    pub node: String,
    pub fuel_type: String,
    pub fuel_contract: String,
    /// Rated capacity, used to scale the fixed and startup cost terms
    /// (spec section 4.2's fixed objective terms).
    pub rated_capacity: Megawatts,
    /// Minimum capacity *P*.
    pub min_capacity: Megawatts,
    /// Column name into the thermal derated-capacity table for *P̄(t)*.
    pub derated_capacity_column: String,
    pub min_up_time: usize,
    pub min_down_time: usize,
    pub ramp_up: Megawatts,
    pub ramp_down: Megawatts,
    /// Startup ramp rate *SU*; defaults to `min_capacity + ramp_up` when
    /// absent, which zeroes the `(SU - P - RU)` slack term in the ramp-up
    /// constraint (spec section 3).
    pub startup_rate: Option<Megawatts>,
    /// Shutdown ramp rate *SD*; defaults to `min_capacity + ramp_down`.
    pub shutdown_rate: Option<Megawatts>,
    /// $/MWh-of-rated-capacity fixed cost.
    pub fixed_cost: f64,
    /// $/MWh operating cost (opex), added to fuel cost in the variable
    /// objective term.
    pub operation_cost: f64,
    /// $/MWh-of-rated-capacity startup cost.
    pub startup_cost: f64,
    pub heat_rate: f64,
    /// Must-take units curtail rather than idle (spec section 3).
    pub must_take: bool,
}

impl ThermalUnit {
    pub fn effective_startup_rate(&self) -> Megawatts {
        self.startup_rate
            .unwrap_or(self.min_capacity + self.ramp_up)
    }

    pub fn effective_shutdown_rate(&self) -> Megawatts {
        self.shutdown_rate
            .unwrap_or(self.min_capacity + self.ramp_down)
    }
}

/// Which resolution a hydro unit's availability timeseries is stored at;
/// mutually exclusive per unit (spec section 3).
#[derive(Debug, Clone)]
pub enum HydroAvailability {
    Hourly { column: String },
    Daily { column: String },
    Weekly {
        column: String,
        /// Column into the weekly-minimum table; absent when the unit has
        /// no contracted lower bound (spec section 4.3's "analogous, with
        /// both lower and upper bounds per week").
        min_column: Option<String>,
    },
}

/// A hydropower generator.
#[derive(Debug, Clone)]
pub struct HydroUnit {
    pub name: String,
    pub node: String,
    pub contract: String,
    pub contracted_capacity: Megawatts,
    pub availability: HydroAvailability,
    pub must_take: bool,
}

/// The three non-dispatchable generator kinds sharing one builder
/// (spec section 4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonDispatchKind {
    Solar,
    Wind,
    Import,
}

/// A solar, wind or import unit.
#[derive(Debug, Clone)]
pub struct NonDispatchUnit {
    pub name: String,
    pub node: String,
    pub contract: String,
    pub kind: NonDispatchKind,
    /// Column into the unit's hourly capacity table.
    pub capacity_column: String,
    /// `None` when the CSV's contracted_capacity is -1 ("unbounded";
    /// spec section 6).
    pub contracted_capacity: Option<Megawatts>,
    pub must_take: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> ThermalUnit {
        ThermalUnit {
            name: "g1".into(),
            node: "n1".into(),
            fuel_type: "gas".into(),
            fuel_contract: "c1".into(),
            rated_capacity: Megawatts::new(100.0),
            min_capacity: Megawatts::new(50.0),
            derated_capacity_column: "g1".into(),
            min_up_time: 1,
            min_down_time: 1,
            ramp_up: Megawatts::new(40.0),
            ramp_down: Megawatts::new(40.0),
            startup_rate: None,
            shutdown_rate: None,
            fixed_cost: 10.0,
            operation_cost: 20.0,
            startup_cost: 100.0,
            heat_rate: 1.0,
            must_take: false,
        }
    }

    #[test]
    fn startup_rate_defaults_to_min_plus_ramp() {
        let u = unit();
        assert_eq!(u.effective_startup_rate(), Megawatts::new(90.0));
    }

    #[test]
    fn explicit_startup_rate_overrides_default() {
        let mut u = unit();
        u.startup_rate = Some(Megawatts::new(120.0));
        assert_eq!(u.effective_startup_rate(), Megawatts::new(120.0));
    }
}

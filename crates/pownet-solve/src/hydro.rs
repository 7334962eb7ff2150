//! Hydro builder (spec section 4.3).
//!
//! The daily-resolution availability limit is the one `pownet-sim`'s
//! `PowerWaterCoupler` replaces every reoperation iteration: it reads
//! observed dispatch via [`HydroBuilder::observed_daily_dispatch`] and the
//! facade rebuilds the window's hydro constraints via
//! [`HydroBuilder::non_daily_constraints`] plus
//! [`HydroBuilder::daily_capacity_constraints`] against the proposed
//! capacities instead of [`HydroBuilder::add_constraints`]'s default (the
//! stored timeseries).

use crate::component::ComponentBuilder;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::init_conditions::InitialConditions;
use crate::registry::{accumulate_cost, var_key, VariableRegistry};
use good_lp::{constraint, Constraint, Expression};
use pownet_core::timeseries::{absolute_day, absolute_hour};
use pownet_core::{HydroAvailability, HydroUnit};
use std::collections::HashMap;

const COMPONENT: &str = "hydro";

pub struct HydroBuilder {
    units: Vec<HydroUnit>,
    keys: Vec<String>,
}

impl HydroBuilder {
    pub fn new(units: Vec<HydroUnit>) -> Self {
        Self { units, keys: Vec::new() }
    }

    pub fn units(&self) -> &[HydroUnit] {
        &self.units
    }

    pub fn phydro_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "phydro", unit, t)
    }

    /// Removable/re-addable daily-limit constraints for the window, built
    /// against an explicit capacity override instead of the stored
    /// timeseries — the coupler's re-optimization hook (spec section 4.12).
    pub fn daily_capacity_constraints(
        &self,
        k: usize,
        horizon: usize,
        registry: &VariableRegistry,
        daily_caps: &HashMap<(String, usize), f64>,
    ) -> BuildResult<Vec<Constraint>> {
        let mut out = Vec::new();
        for unit in &self.units {
            if !matches!(unit.availability, HydroAvailability::Daily { .. }) {
                continue;
            }
            for day in day_range(horizon, k) {
                let cap = daily_caps
                    .get(&(unit.name.clone(), day))
                    .copied()
                    .unwrap_or(f64::MAX);
                let mut sum = Expression::from(0.0);
                for t in hours_of_day(day, horizon, k) {
                    sum += registry.get(&Self::phydro_key(&unit.name, t))?;
                }
                out.push(constraint!(sum <= cap));
            }
        }
        Ok(out)
    }

    /// The daily caps `add_constraints` would otherwise read straight off
    /// the stored timeseries, exposed so the coupler can diff its proposed
    /// capacities against the unmodified baseline.
    fn default_daily_caps(&self, k: usize, horizon: usize, ctx: &BuildContext) -> BuildResult<HashMap<(String, usize), f64>> {
        let mut caps = HashMap::new();
        for unit in &self.units {
            if let HydroAvailability::Daily { column } = &unit.availability {
                for day in day_range(horizon, k) {
                    caps.insert((unit.name.clone(), day), ctx.system.hydro_daily.get(day, column)?);
                }
            }
        }
        Ok(caps)
    }

    /// Hourly- and weekly-resolution availability constraints only; the
    /// counterpart to [`Self::daily_capacity_constraints`] so the coupler can
    /// rebuild a window's hydro constraints with an overridden daily cap
    /// instead of the one `add_constraints` would derive from the stored
    /// timeseries (spec section 4.12).
    pub fn non_daily_constraints(&self, k: usize, registry: &VariableRegistry, ctx: &BuildContext) -> BuildResult<Vec<Constraint>> {
        let mut out = Vec::new();
        let h = ctx.horizon();
        for unit in &self.units {
            match &unit.availability {
                HydroAvailability::Hourly { column } => {
                    for t in 1..=h {
                        let abs_hour = absolute_hour(t, k);
                        let cap = ctx.system.hydro_hourly.get(abs_hour, column)?;
                        let phydro_t = registry.get(&Self::phydro_key(&unit.name, t))?;
                        out.push(constraint!(phydro_t <= cap));
                    }
                }
                HydroAvailability::Weekly { column, min_column } => {
                    let first_week = (absolute_day(absolute_hour(1, k)) - 1) / 7 + 1;
                    let last_week = (absolute_day(absolute_hour(h, k)) - 1) / 7 + 1;
                    for week in first_week..=last_week {
                        let cap = ctx.system.hydro_weekly.get(week, column)?;
                        let mut sum = Expression::from(0.0);
                        for t in 1..=h {
                            let day = absolute_day(absolute_hour(t, k));
                            if (day - 1) / 7 + 1 == week {
                                sum += registry.get(&Self::phydro_key(&unit.name, t))?;
                            }
                        }
                        out.push(constraint!(sum.clone() <= cap));
                        if let Some(min_column) = min_column {
                            let min_cap = ctx.system.hydro_weekly_min.get(week, min_column)?;
                            out.push(constraint!(sum >= min_cap));
                        }
                    }
                }
                HydroAvailability::Daily { .. } => {}
            }
        }
        Ok(out)
    }

    /// Sums the solved `phydro[unit,t]` values by calendar day, for every
    /// daily-resolution hydro unit in the window — the observed dispatch the
    /// power-water coupler hands to the reservoir operator (spec section
    /// 4.12, step 1). Empty if no unit uses daily availability.
    pub fn observed_daily_dispatch(&self, solution: &HashMap<String, f64>, k: usize, horizon: usize) -> HashMap<(String, usize), f64> {
        let mut out = HashMap::new();
        for unit in &self.units {
            if !matches!(unit.availability, HydroAvailability::Daily { .. }) {
                continue;
            }
            for day in day_range(horizon, k) {
                let mut total = 0.0;
                for t in hours_of_day(day, horizon, k) {
                    total += solution.get(&Self::phydro_key(&unit.name, t)).copied().unwrap_or(0.0);
                }
                out.insert((unit.name.clone(), day), total);
            }
        }
        out
    }
}

fn day_range(horizon: usize, k: usize) -> Vec<usize> {
    let first = absolute_day(absolute_hour(1, k));
    let last = absolute_day(absolute_hour(horizon, k));
    (first..=last).collect()
}

fn hours_of_day(day: usize, horizon: usize, k: usize) -> Vec<usize> {
    (1..=horizon)
        .filter(|&t| absolute_day(absolute_hour(t, k)) == day)
        .collect()
}

impl ComponentBuilder for HydroBuilder {
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.keys.clear();
        let h = ctx.horizon();
        for unit in &self.units {
            for t in 1..=h {
                let key = Self::phydro_key(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, unit.contracted_capacity.value());
                self.keys.push(key);
            }
        }
        let _ = k;
        Ok(())
    }

    fn get_fixed_objective_terms(&self, _registry: &VariableRegistry, _costs: &mut HashMap<String, f64>) -> BuildResult<Expression> {
        Ok(Expression::from(0.0))
    }

    fn get_variable_objective_terms(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        costs: &mut HashMap<String, f64>,
    ) -> BuildResult<Expression> {
        let mut expr = Expression::from(0.0);
        let h = ctx.horizon();
        for unit in &self.units {
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let cost = ctx.system.contracts.cost_at(&unit.contract, abs_hour)?.value();
                let key = Self::phydro_key(&unit.name, t);
                accumulate_cost(costs, &key, cost);
                expr += registry.get(&key)? * cost;
            }
        }
        Ok(expr)
    }

    fn add_constraints(
        &self,
        k: usize,
        _init_conds: &InitialConditions,
        registry: &VariableRegistry,
        ctx: &BuildContext,
    ) -> BuildResult<Vec<Constraint>> {
        let h = ctx.horizon();
        let mut out = self.non_daily_constraints(k, registry, ctx)?;
        let caps = self.default_daily_caps(k, h, ctx)?;
        out.extend(self.daily_capacity_constraints(k, h, registry, &caps)?);
        Ok(out)
    }

    fn variable_keys(&self) -> &[String] {
        &self.keys
    }
}

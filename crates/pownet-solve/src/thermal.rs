//! Thermal builder (spec section 4.2): the tight unit-commitment formulation
//! (three-binary-variable logical linkage, min up/down time, ramp limits)
//! following Kneuven et al. (2019), confirmed against
//! `examples/original_source/src/pownet/optim_model/constraints/thermal_unit_constr.py`.

use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::init_conditions::InitialConditions;
use crate::lmp::LmpCandidate;
use crate::registry::{accumulate_cost, var_key, VariableRegistry};
use crate::component::ComponentBuilder;
use std::collections::HashMap;
use good_lp::{constraint, Constraint, Expression};
use pownet_core::timeseries::absolute_hour;
use pownet_core::ThermalUnit;

const COMPONENT: &str = "thermal";

pub struct ThermalBuilder {
    units: Vec<ThermalUnit>,
    keys: Vec<String>,
}

impl ThermalBuilder {
    pub fn new(units: Vec<ThermalUnit>) -> Self {
        Self { units, keys: Vec::new() }
    }

    pub fn units(&self) -> &[ThermalUnit] {
        &self.units
    }

    fn pthermal(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "pthermal", unit, t)
    }
    fn p(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "p", unit, t)
    }
    fn pbar(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "pbar", unit, t)
    }
    fn status(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "status", unit, t)
    }
    fn startup(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "startup", unit, t)
    }
    fn shutdown(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "shutdown", unit, t)
    }
    fn spin(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "spin", unit, t)
    }

    /// Every thermal unit's dispatch bounds and marginal cost for the
    /// window, the raw material `PowerSystemModel::solve_for_lmp` searches
    /// for the marginal generator (spec section 4.8).
    pub fn lmp_candidates(&self, k: usize, ctx: &BuildContext) -> BuildResult<Vec<LmpCandidate>> {
        let mut out = Vec::new();
        let h = ctx.horizon();
        for unit in &self.units {
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let p_bar = ctx
                    .system
                    .thermal_derated_capacity
                    .get(abs_hour, &unit.derated_capacity_column)?;
                let fuel_cost = ctx.system.contracts.cost_at(&unit.fuel_contract, abs_hour)?.value();
                let marginal_cost = fuel_cost * unit.heat_rate + unit.operation_cost;
                out.push(LmpCandidate {
                    key: Self::pthermal(&unit.name, t),
                    hour: t,
                    min_capacity: unit.min_capacity.value(),
                    max_capacity: p_bar,
                    marginal_cost,
                });
            }
        }
        Ok(out)
    }
}

impl ComponentBuilder for ThermalBuilder {
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.keys.clear();
        let h = ctx.horizon();
        let use_spin = ctx.system.config.use_spin_var;
        for unit in &self.units {
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let p_bar = ctx
                    .system
                    .thermal_derated_capacity
                    .get(abs_hour, &unit.derated_capacity_column)?;

                let key = Self::pthermal(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, p_bar);
                self.keys.push(key);

                let key = Self::p(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, p_bar);
                self.keys.push(key);

                let key = Self::pbar(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, p_bar);
                self.keys.push(key);

                let key = Self::status(&unit.name, t);
                registry.add_binary(key.clone());
                self.keys.push(key);

                let key = Self::startup(&unit.name, t);
                registry.add_binary(key.clone());
                self.keys.push(key);

                let key = Self::shutdown(&unit.name, t);
                registry.add_binary(key.clone());
                self.keys.push(key);

                if use_spin {
                    let key = Self::spin(&unit.name, t);
                    registry.add_continuous(key.clone(), 0.0, p_bar);
                    self.keys.push(key);
                }
            }
        }
        Ok(())
    }

    fn get_fixed_objective_terms(&self, registry: &VariableRegistry, costs: &mut HashMap<String, f64>) -> BuildResult<Expression> {
        let mut expr = Expression::from(0.0);
        for unit in &self.units {
            let rated = unit.rated_capacity.value();
            for key in self.keys.iter().filter(|k| k.starts_with(&format!("{COMPONENT}.status[{}@", unit.name))) {
                let coeff = rated * unit.fixed_cost;
                accumulate_cost(costs, key, coeff);
                expr += registry.get(key)? * coeff;
            }
            for key in self.keys.iter().filter(|k| k.starts_with(&format!("{COMPONENT}.startup[{}@", unit.name))) {
                let coeff = rated * unit.startup_cost;
                accumulate_cost(costs, key, coeff);
                expr += registry.get(key)? * coeff;
            }
        }
        Ok(expr)
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
                let fuel_cost = ctx.system.contracts.cost_at(&unit.fuel_contract, abs_hour)?.value();
                let coeff = fuel_cost * unit.heat_rate + unit.operation_cost;
                let key = Self::pthermal(&unit.name, t);
                accumulate_cost(costs, &key, coeff);
                expr += registry.get(&key)? * coeff;
            }
        }
        Ok(expr)
    }

    fn add_constraints(
        &self,
        k: usize,
        init_conds: &InitialConditions,
        registry: &VariableRegistry,
        ctx: &BuildContext,
    ) -> BuildResult<Vec<Constraint>> {
        let mut out = Vec::new();
        let h = ctx.horizon();
        let use_spin = ctx.system.config.use_spin_var;

        for unit in &self.units {
            let name = unit.name.as_str();
            let p_min = unit.min_capacity.value();
            let ru = unit.ramp_up.value();
            let rd = unit.ramp_down.value();
            let su = unit.effective_startup_rate().value();
            let sd = unit.effective_shutdown_rate().value();
            let init = init_conds.thermal_state(name);

            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let p_bar_t = ctx
                    .system
                    .thermal_derated_capacity
                    .get(abs_hour, &unit.derated_capacity_column)?;

                let status_t = registry.get(&Self::status(name, t))?;
                let startup_t = registry.get(&Self::startup(name, t))?;
                let shutdown_t = registry.get(&Self::shutdown(name, t))?;
                let pthermal_t = registry.get(&Self::pthermal(name, t))?;
                let p_t = registry.get(&Self::p(name, t))?;
                let pbar_t = registry.get(&Self::pbar(name, t))?;

                // Logical linkage.
                if t == 1 {
                    out.push(constraint!(status_t - startup_t + shutdown_t == init.initial_u));
                } else {
                    let status_prev = registry.get(&Self::status(name, t - 1))?;
                    out.push(constraint!(status_t - status_prev - startup_t + shutdown_t == 0.0));
                }

                // Dispatch decomposition.
                out.push(constraint!(pthermal_t == p_t.clone() + p_min * status_t));

                // Spin linkage.
                if use_spin {
                    let spin_t = registry.get(&Self::spin(name, t))?;
                    out.push(constraint!(pbar_t == p_t.clone() + spin_t));
                } else {
                    out.push(constraint!(pbar_t >= p_t.clone()));
                }

                // Upper bound.
                out.push(constraint!(pbar_t + p_min * status_t <= p_bar_t * status_t));

                // Ramp-up.
                if t == 1 {
                    out.push(constraint!(
                        pbar_t - init.initial_p <= (su - p_min - ru) * startup_t + ru * status_t
                    ));
                } else {
                    let p_prev = registry.get(&Self::p(name, t - 1))?;
                    out.push(constraint!(
                        pbar_t - p_prev <= (su - p_min - ru) * startup_t + ru * status_t
                    ));
                }

                // Ramp-down.
                if t == 1 {
                    out.push(constraint!(
                        init.initial_p - p_t <= (sd - p_min - rd) * shutdown_t + rd * init.initial_u
                    ));
                } else {
                    let p_prev = registry.get(&Self::p(name, t - 1))?;
                    let status_prev = registry.get(&Self::status(name, t - 1))?;
                    out.push(constraint!(
                        p_prev - p_t <= (sd - p_min - rd) * shutdown_t + rd * status_prev
                    ));
                }
            }

            // Minimum down-time initial condition.
            let min_dt = init.initial_min_off.min(h);
            if min_dt > 0 {
                let mut sum = Expression::from(0.0);
                for t in 1..=min_dt {
                    sum += registry.get(&Self::status(name, t))?;
                }
                out.push(constraint!(sum == 0.0));
            }

            // Minimum up-time initial condition.
            let min_ut = init.initial_min_on.min(h);
            if min_ut > 0 {
                let mut sum = Expression::from(0.0);
                for t in 1..=min_ut {
                    sum += registry.get(&Self::status(name, t))?;
                }
                out.push(constraint!(sum == min_ut as f64));
            }

            // Minimum down-time, rolling window.
            if unit.min_down_time <= h {
                for t in unit.min_down_time..=h {
                    let mut sum = Expression::from(0.0);
                    for i in (t - unit.min_down_time + 1)..=t {
                        sum += registry.get(&Self::shutdown(name, i))?;
                    }
                    let status_t = registry.get(&Self::status(name, t))?;
                    out.push(constraint!(sum <= 1.0 - status_t));
                }
            }

            // Minimum up-time, rolling window.
            if unit.min_up_time <= h {
                for t in unit.min_up_time..=h {
                    let mut sum = Expression::from(0.0);
                    for i in (t - unit.min_up_time + 1)..=t {
                        sum += registry.get(&Self::startup(name, i))?;
                    }
                    let status_t = registry.get(&Self::status(name, t))?;
                    out.push(constraint!(sum <= status_t));
                }
            }
        }

        Ok(out)
    }

    fn variable_keys(&self) -> &[String] {
        &self.keys
    }
}

//! Non-dispatchable builder: solar, wind, import (spec section 4.4).

use crate::component::ComponentBuilder;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::init_conditions::InitialConditions;
use crate::registry::{accumulate_cost, var_key, VariableRegistry};
use good_lp::{constraint, Constraint, Expression};
use pownet_core::timeseries::absolute_hour;
use pownet_core::NonDispatchUnit;
use std::collections::HashMap;

const COMPONENT: &str = "nondispatch";

pub struct NonDispatchBuilder {
    units: Vec<NonDispatchUnit>,
    keys: Vec<String>,
}

impl NonDispatchBuilder {
    pub fn new(units: Vec<NonDispatchUnit>) -> Self {
        Self { units, keys: Vec::new() }
    }

    pub fn units(&self) -> &[NonDispatchUnit] {
        &self.units
    }

    pub fn dispatch_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "p", unit, t)
    }

    fn status_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "u", unit, t)
    }
}

impl ComponentBuilder for NonDispatchBuilder {
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.keys.clear();
        let h = ctx.horizon();
        for unit in &self.units {
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let avail = ctx.system.nondispatch_capacity.get(abs_hour, &unit.capacity_column)?;
                let ub = match unit.contracted_capacity {
                    Some(cap) => avail.min(cap.value()),
                    None => avail,
                };
                let key = Self::dispatch_key(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, ub);
                self.keys.push(key);

                if ctx.system.config.use_nondispatch_status_var {
                    let key = Self::status_key(&unit.name, t);
                    registry.add_binary(key.clone());
                    self.keys.push(key);
                }
            }
        }
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
                let key = Self::dispatch_key(&unit.name, t);
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
        let mut out = Vec::new();
        let h = ctx.horizon();
        for unit in &self.units {
            if !ctx.system.config.use_nondispatch_status_var {
                continue;
            }
            let Some(cap) = unit.contracted_capacity else { continue };
            for t in 1..=h {
                let p_t = registry.get(&Self::dispatch_key(&unit.name, t))?;
                let u_t = registry.get(&Self::status_key(&unit.name, t))?;
                out.push(constraint!(p_t <= cap.value() * u_t));
            }
        }
        let _ = k;
        Ok(out)
    }

    fn variable_keys(&self) -> &[String] {
        &self.keys
    }
}

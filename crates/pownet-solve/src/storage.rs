//! Storage builder (spec section 4.5).

use crate::component::ComponentBuilder;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::init_conditions::InitialConditions;
use crate::registry::{accumulate_cost, var_key, VariableRegistry};
use good_lp::{constraint, Constraint, Expression};
use pownet_core::timeseries::absolute_hour;
use pownet_core::StorageUnit;
use std::collections::HashMap;

const COMPONENT: &str = "storage";

pub struct StorageBuilder {
    units: Vec<StorageUnit>,
    keys: Vec<String>,
}

impl StorageBuilder {
    pub fn new(units: Vec<StorageUnit>) -> Self {
        Self { units, keys: Vec::new() }
    }

    pub fn units(&self) -> &[StorageUnit] {
        &self.units
    }

    pub fn charge_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "pcharge", unit, t)
    }
    pub fn discharge_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "pdischarge", unit, t)
    }
    pub fn charge_state_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "charge_state", unit, t)
    }
    fn ucharge_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "ucharge", unit, t)
    }
    fn udischarge_key(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "udischarge", unit, t)
    }
}

impl ComponentBuilder for StorageBuilder {
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.keys.clear();
        let h = ctx.horizon();
        for unit in &self.units {
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let cap = ctx.system.storage_derated_capacity.get(abs_hour, &unit.derated_capacity_column)?;

                let key = Self::charge_key(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, unit.max_charge.value());
                self.keys.push(key);

                let key = Self::discharge_key(&unit.name, t);
                registry.add_continuous(key.clone(), 0.0, unit.max_discharge.value());
                self.keys.push(key);

                let key = Self::charge_state_key(&unit.name, t);
                registry.add_continuous(key.clone(), unit.min_capacity.value().min(cap), cap);
                self.keys.push(key);

                let key = Self::ucharge_key(&unit.name, t);
                registry.add_binary(key.clone());
                self.keys.push(key);

                let key = Self::udischarge_key(&unit.name, t);
                registry.add_binary(key.clone());
                self.keys.push(key);
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
                let cost = ctx.system.contracts.cost_at(&unit.cost_contract, abs_hour)?.value();
                let key = Self::discharge_key(&unit.name, t);
                accumulate_cost(costs, &key, cost);
                expr += registry.get(&key)? * cost;
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
        for unit in &self.units {
            let name = unit.name.as_str();
            let init = init_conds.storage_state(name);
            for t in 1..=h {
                let pcharge_t = registry.get(&Self::charge_key(name, t))?;
                let pdischarge_t = registry.get(&Self::discharge_key(name, t))?;
                let ucharge_t = registry.get(&Self::ucharge_key(name, t))?;
                let udischarge_t = registry.get(&Self::udischarge_key(name, t))?;
                let charge_state_t = registry.get(&Self::charge_state_key(name, t))?;

                out.push(constraint!(ucharge_t + udischarge_t <= 1.0));
                out.push(constraint!(pcharge_t <= unit.max_charge.value() * ucharge_t));
                out.push(constraint!(pdischarge_t <= unit.max_discharge.value() * udischarge_t));

                let eta_c = unit.charge_efficiency;
                let eta_d = unit.discharge_efficiency.max(1e-9);
                let retain = 1.0 - unit.self_discharge_rate;
                if t == 1 {
                    out.push(constraint!(
                        charge_state_t
                            == retain * init.initial_charge + eta_c * pcharge_t - (1.0 / eta_d) * pdischarge_t
                    ));
                } else {
                    let prev_state = registry.get(&Self::charge_state_key(name, t - 1))?;
                    out.push(constraint!(
                        charge_state_t == retain * prev_state + eta_c * pcharge_t - (1.0 / eta_d) * pdischarge_t
                    ));
                }
            }
        }
        let _ = k;
        Ok(out)
    }

    fn variable_keys(&self) -> &[String] {
        &self.keys
    }
}

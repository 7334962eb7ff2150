//! Central variable registry (spec section 9, "Shared ownership of variable
//! handles"): sub-builders and the System builder all reference variable
//! handles created by other builders. Rather than pass the handles
//! themselves around, every handle is looked up by a composite string key
//! through one registry owned by the facade, avoiding storing `Variable`
//! copies inside multiple builders.

use crate::error::{BuildError, BuildResult};
use good_lp::{variable, ProblemVariables, Variable};
use std::collections::HashMap;

/// Composite key for one decision variable: `"{component}.{name}[{index}]"`,
/// e.g. `"thermal.status[g1@3]"`. Construction is centralized in [`var_key`]
/// so every builder names its variables the same way.
pub fn var_key(component: &str, var_name: &str, entity: &str, t: usize) -> String {
    format!("{component}.{var_name}[{entity}@{t}]")
}

/// System-level keys aren't per-entity (e.g. `spin_shortfall[t]`).
pub fn var_key_scalar(component: &str, var_name: &str, t: usize) -> String {
    format!("{component}.{var_name}[@{t}]")
}

/// Files one objective term's coefficient into a builder's running cost
/// map, keyed the same way as `VariableRegistry` (spec section 4.8's
/// `write_mps` COST column). A key can receive more than one term (e.g. a
/// fixed cost and a variable cost on the same variable), so contributions
/// accumulate rather than overwrite.
pub fn accumulate_cost(costs: &mut HashMap<String, f64>, key: &str, coeff: f64) {
    *costs.entry(key.to_string()).or_insert(0.0) += coeff;
}

#[derive(Default)]
pub struct VariableRegistry {
    vars: ProblemVariables,
    index: HashMap<String, Variable>,
    /// `(min, max)` per key, recorded at creation time so `write_mps` can
    /// emit real BOUNDS rows without needing to inspect `good_lp`'s own
    /// variable storage.
    bounds: HashMap<String, (f64, f64)>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self {
            vars: ProblemVariables::new(),
            index: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    pub fn add_continuous(&mut self, key: impl Into<String>, min: f64, max: f64) -> Variable {
        let v = self.vars.add(variable().min(min).max(max));
        let key = key.into();
        self.bounds.insert(key.clone(), (min, max));
        self.index.insert(key, v);
        v
    }

    pub fn add_binary(&mut self, key: impl Into<String>) -> Variable {
        let v = self.vars.add(variable().binary());
        let key = key.into();
        self.bounds.insert(key.clone(), (0.0, 1.0));
        self.index.insert(key, v);
        v
    }

    pub fn add_free(&mut self, key: impl Into<String>, min: f64, max: f64) -> Variable {
        let v = self.vars.add(variable().min(min).max(max));
        let key = key.into();
        self.bounds.insert(key.clone(), (min, max));
        self.index.insert(key, v);
        v
    }

    pub fn get(&self, key: &str) -> BuildResult<Variable> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| BuildError::MissingVariable(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|s| s.as_str())
    }

    pub fn into_problem_variables(self) -> (ProblemVariables, HashMap<String, Variable>, HashMap<String, (f64, f64)>) {
        (self.vars, self.index, self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable_and_unique() {
        let mut reg = VariableRegistry::new();
        reg.add_continuous(var_key("thermal", "pthermal", "g1", 1), 0.0, 100.0);
        reg.add_binary(var_key("thermal", "status", "g1", 1));
        assert!(reg.contains("thermal.pthermal[g1@1]"));
        assert!(reg.contains("thermal.status[g1@1]"));
        assert!(reg.get("thermal.pbar[g1@1]").is_err());
    }
}

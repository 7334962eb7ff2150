//! `ModelBuilder` facade (spec section 4.7): owns the five concrete builders
//! directly (not as trait objects — each has methods the others call that
//! aren't on `ComponentBuilder`, e.g. `HydroBuilder::daily_capacity_constraints`)
//! and composes variables → objective → constraints in a fixed order for
//! every rolling-horizon window.

use crate::component::ComponentBuilder;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::hydro::HydroBuilder;
use crate::init_conditions::InitialConditions;
use crate::lmp::LmpCandidate;
use crate::nondispatch::NonDispatchBuilder;
use crate::registry::VariableRegistry;
use crate::storage::StorageBuilder;
use crate::system::SystemBuilder;
use crate::thermal::ThermalBuilder;
use good_lp::{Constraint, Expression, ProblemVariables, Variable};
use pownet_core::SystemInput;
use std::collections::HashMap;

/// A fully assembled window: the solver-agnostic variable set, the summed
/// objective expression, and every constraint from all six components.
pub struct AssembledModel {
    pub variables: ProblemVariables,
    pub variable_index: HashMap<String, Variable>,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    /// Fed to `PowerSystemModel::solve_for_lmp`'s marginal-generator search
    /// (spec section 4.8).
    pub lmp_candidates: Vec<LmpCandidate>,
    pub nodes: Vec<String>,
    pub horizon: usize,
    /// Per-variable-key objective coefficient, accumulated by each
    /// component's `get_*_objective_terms` (`write_mps`'s COST column).
    pub objective_coefficients: HashMap<String, f64>,
    /// `(min, max)` per variable key (`write_mps`'s BOUNDS section).
    pub variable_bounds: HashMap<String, (f64, f64)>,
    /// One label per entry of `constraints`, named `{component}_{i}`
    /// (`write_mps`'s ROWS section).
    pub constraint_labels: Vec<String>,
}

/// Appends `new` to `constraints`, labeling each with `{component}_{i}`
/// where `i` counts only within `component` (spec section 4.8's
/// `write_mps` row labeling).
fn push_labeled(constraints: &mut Vec<Constraint>, labels: &mut Vec<String>, component: &str, new: Vec<Constraint>) {
    for (i, c) in new.into_iter().enumerate() {
        labels.push(format!("{component}_{i}"));
        constraints.push(c);
    }
}

pub struct ModelBuilder {
    thermal: ThermalBuilder,
    hydro: HydroBuilder,
    nondispatch: NonDispatchBuilder,
    storage: StorageBuilder,
    system: SystemBuilder,
}

impl ModelBuilder {
    pub fn new(system: &SystemInput) -> Self {
        Self {
            thermal: ThermalBuilder::new(system.thermal_units.clone()),
            hydro: HydroBuilder::new(system.hydro_units.clone()),
            nondispatch: NonDispatchBuilder::new(system.nondispatch_units.clone()),
            storage: StorageBuilder::new(system.storage_units.clone()),
            system: SystemBuilder::new(),
        }
    }

    pub fn hydro_builder(&self) -> &HydroBuilder {
        &self.hydro
    }

    /// First window's model (spec section 4.7).
    pub fn build(&mut self, k: usize, init_conds: &InitialConditions, system: &SystemInput) -> BuildResult<AssembledModel> {
        let ctx = BuildContext::new(system);
        let mut registry = VariableRegistry::new();

        self.thermal.add_variables(k, &mut registry, &ctx)?;
        self.hydro.add_variables(k, &mut registry, &ctx)?;
        self.nondispatch.add_variables(k, &mut registry, &ctx)?;
        self.storage.add_variables(k, &mut registry, &ctx)?;
        self.system.add_variables(k, &mut registry, &ctx)?;

        let mut costs = HashMap::new();
        let objective = self.objective(k, &registry, &ctx, &mut costs)?;

        let mut constraints = Vec::new();
        let mut constraint_labels = Vec::new();
        push_labeled(&mut constraints, &mut constraint_labels, "thermal", self.thermal.add_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "hydro", self.hydro.add_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "nondispatch", self.nondispatch.add_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "storage", self.storage.add_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "system", self.system.add_constraints(k, init_conds, &registry, &ctx)?);

        let lmp_candidates = self.thermal.lmp_candidates(k, &ctx)?;
        let nodes: Vec<String> = system.network.nodes().map(str::to_string).collect();
        let horizon = ctx.horizon();
        let (variables, variable_index, variable_bounds) = registry.into_problem_variables();
        Ok(AssembledModel {
            variables,
            variable_index,
            objective,
            constraints,
            lmp_candidates,
            nodes,
            horizon,
            objective_coefficients: costs,
            variable_bounds,
            constraint_labels,
        })
    }

    /// Subsequent windows (spec section 4.7); each component rebuilds its
    /// own slice against the new window's data and initial conditions
    /// (see `ComponentBuilder`'s doc comment for why this isn't a patch).
    pub fn update(&mut self, k: usize, init_conds: &InitialConditions, system: &SystemInput) -> BuildResult<AssembledModel> {
        let ctx = BuildContext::new(system);
        let mut registry = VariableRegistry::new();

        self.thermal.update_variables(k, &mut registry, &ctx)?;
        self.hydro.update_variables(k, &mut registry, &ctx)?;
        self.nondispatch.update_variables(k, &mut registry, &ctx)?;
        self.storage.update_variables(k, &mut registry, &ctx)?;
        self.system.update_variables(k, &mut registry, &ctx)?;

        let mut costs = HashMap::new();
        let objective = self.objective(k, &registry, &ctx, &mut costs)?;

        let mut constraints = Vec::new();
        let mut constraint_labels = Vec::new();
        push_labeled(&mut constraints, &mut constraint_labels, "thermal", self.thermal.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "hydro", self.hydro.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "nondispatch", self.nondispatch.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "storage", self.storage.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "system", self.system.update_constraints(k, init_conds, &registry, &ctx)?);

        let lmp_candidates = self.thermal.lmp_candidates(k, &ctx)?;
        let nodes: Vec<String> = system.network.nodes().map(str::to_string).collect();
        let horizon = ctx.horizon();
        let (variables, variable_index, variable_bounds) = registry.into_problem_variables();
        Ok(AssembledModel {
            variables,
            variable_index,
            objective,
            constraints,
            lmp_candidates,
            nodes,
            horizon,
            objective_coefficients: costs,
            variable_bounds,
            constraint_labels,
        })
    }

    /// Rebuilds the window with the hydro daily-limit constraints replaced
    /// by `daily_caps` instead of the stored timeseries (spec section 4.12,
    /// step 4: the power-water coupler's reoperation hook). Since this
    /// workspace rebuilds a window's whole constraint set rather than
    /// patching it in place (see [`crate::component::ComponentBuilder`]'s
    /// doc comment), "replacing" a constraint subset is just building that
    /// subset from the override instead of the default.
    pub fn rebuild_with_hydro_daily_override(
        &mut self,
        k: usize,
        init_conds: &InitialConditions,
        system: &SystemInput,
        daily_caps: &HashMap<(String, usize), f64>,
    ) -> BuildResult<AssembledModel> {
        let ctx = BuildContext::new(system);
        let mut registry = VariableRegistry::new();

        self.thermal.update_variables(k, &mut registry, &ctx)?;
        self.hydro.update_variables(k, &mut registry, &ctx)?;
        self.nondispatch.update_variables(k, &mut registry, &ctx)?;
        self.storage.update_variables(k, &mut registry, &ctx)?;
        self.system.update_variables(k, &mut registry, &ctx)?;

        let mut costs = HashMap::new();
        let objective = self.objective(k, &registry, &ctx, &mut costs)?;

        let mut constraints = Vec::new();
        let mut constraint_labels = Vec::new();
        push_labeled(&mut constraints, &mut constraint_labels, "thermal", self.thermal.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "hydro", self.hydro.non_daily_constraints(k, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "hydro_daily", self.hydro.daily_capacity_constraints(k, ctx.horizon(), &registry, daily_caps)?);
        push_labeled(&mut constraints, &mut constraint_labels, "nondispatch", self.nondispatch.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "storage", self.storage.update_constraints(k, init_conds, &registry, &ctx)?);
        push_labeled(&mut constraints, &mut constraint_labels, "system", self.system.update_constraints(k, init_conds, &registry, &ctx)?);

        let lmp_candidates = self.thermal.lmp_candidates(k, &ctx)?;
        let nodes: Vec<String> = system.network.nodes().map(str::to_string).collect();
        let horizon = ctx.horizon();
        let (variables, variable_index, variable_bounds) = registry.into_problem_variables();
        Ok(AssembledModel {
            variables,
            variable_index,
            objective,
            constraints,
            lmp_candidates,
            nodes,
            horizon,
            objective_coefficients: costs,
            variable_bounds,
            constraint_labels,
        })
    }

    fn objective(&self, k: usize, registry: &VariableRegistry, ctx: &BuildContext, costs: &mut HashMap<String, f64>) -> BuildResult<Expression> {
        let mut objective = Expression::from(0.0);
        objective += self.thermal.get_fixed_objective_terms(registry, costs)?;
        objective += self.thermal.get_variable_objective_terms(k, registry, ctx, costs)?;
        objective += self.hydro.get_fixed_objective_terms(registry, costs)?;
        objective += self.hydro.get_variable_objective_terms(k, registry, ctx, costs)?;
        objective += self.nondispatch.get_fixed_objective_terms(registry, costs)?;
        objective += self.nondispatch.get_variable_objective_terms(k, registry, ctx, costs)?;
        objective += self.storage.get_fixed_objective_terms(registry, costs)?;
        objective += self.storage.get_variable_objective_terms(k, registry, ctx, costs)?;
        objective += self.system.get_fixed_objective_terms(registry, costs)?;
        objective += self.system.get_variable_objective_terms(k, registry, ctx, costs)?;
        Ok(objective)
    }
}

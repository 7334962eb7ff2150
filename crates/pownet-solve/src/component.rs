//! `ComponentBuilder` contract (spec section 4.1).
//!
//! Each builder owns a disjoint slice of decision variables, constraints and
//! objective terms. Constraints are produced as solver-agnostic
//! `good_lp::Constraint` values (the `constraint!` macro idiom) rather than
//! added directly to a live solver model, so a builder never needs to know
//! which backend `ModelBuilder` eventually attaches.
//!
//! `update_variables`/`update_constraints` are, in this implementation, the
//! same code path as `add_variables`/`add_constraints`: each window's model
//! is reassembled from the persisted unit data rather than patched in
//! place (see `DESIGN.md` for why — `good_lp` does not expose in-place
//! bound/constraint mutation the way the source's incumbent solver API
//! does). The five-method shape of this contract (spec section 4.1) is kept
//! because sibling components and the facade still only need to call
//! `add_*`/`update_*` in the prescribed order.

use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::init_conditions::InitialConditions;
use crate::registry::VariableRegistry;
use good_lp::{Constraint, Expression};
use std::collections::HashMap;

pub trait ComponentBuilder {
    /// Creates this window's variables in `registry`.
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()>;

    /// Cost terms whose coefficients do not change with `k`. Each term's
    /// coefficient is also filed into `costs` (keyed the same as
    /// `registry`), the bookkeeping `write_mps` reads back for its COST
    /// column (spec section 4.8).
    fn get_fixed_objective_terms(&self, registry: &VariableRegistry, costs: &mut HashMap<String, f64>) -> BuildResult<Expression>;

    /// Cost terms whose coefficients are looked up from timeseries at window `k`.
    fn get_variable_objective_terms(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        costs: &mut HashMap<String, f64>,
    ) -> BuildResult<Expression>;

    /// First-window constraint assembly.
    fn add_constraints(
        &self,
        k: usize,
        init_conds: &InitialConditions,
        registry: &VariableRegistry,
        ctx: &BuildContext,
    ) -> BuildResult<Vec<Constraint>>;

    /// Re-creates this window's variables for `k > 1`.
    fn update_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.add_variables(k, registry, ctx)
    }

    /// Re-creates this window's constraints for `k > 1`.
    fn update_constraints(
        &self,
        k: usize,
        init_conds: &InitialConditions,
        registry: &VariableRegistry,
        ctx: &BuildContext,
    ) -> BuildResult<Vec<Constraint>> {
        self.add_constraints(k, init_conds, registry, ctx)
    }

    /// Keys of the variables this component owns, for siblings (System) and
    /// for the long-form solution writer.
    fn variable_keys(&self) -> &[String];
}

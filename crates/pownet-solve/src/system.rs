//! System builder (spec section 4.6): the hardest single component. Owns the
//! node/system-level slack variables, the transmission flow variables, the
//! DC-OPF constraints and the curtailment balance for must-take units.
//!
//! Rather than hold references to the other builders, this component looks
//! up their variable keys directly from the same naming convention they use
//! (`pownet_solve::registry::var_key`), reading unit metadata from
//! `ctx.system` — the "central variable registry" design (spec section 9)
//! applied consistently: no builder stores another builder's handles.

use crate::component::ComponentBuilder;
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::init_conditions::InitialConditions;
use crate::registry::{accumulate_cost, var_key, var_key_scalar, VariableRegistry};
use good_lp::{constraint, Constraint, Expression};
use pownet_core::timeseries::{absolute_day, absolute_hour};
use pownet_core::{AttachTarget, DcOpfFormulation, HydroAvailability};
use std::collections::HashMap;
use std::f64::consts::PI;

const COMPONENT: &str = "system";

/// A must-take generator, tagged so the curtailment balance can dispatch to
/// the right dispatch-variable key and capacity lookup.
enum MustTakeUnit {
    Thermal(String),
    HydroHourly(String, String),
    HydroDaily(String, String),
    HydroWeekly(String, String),
    NonDispatch(String, String),
}

pub struct SystemBuilder {
    keys: Vec<String>,
    /// Penalty factors captured from `ctx.system.config` in `add_variables`,
    /// since `get_fixed_objective_terms` isn't handed `ctx`.
    load_shortfall_penalty_factor: f64,
    load_curtail_penalty_factor: f64,
    spin_shortfall_penalty_factor: f64,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            load_shortfall_penalty_factor: 0.0,
            load_curtail_penalty_factor: 0.0,
            spin_shortfall_penalty_factor: 0.0,
        }
    }

    fn pos_mismatch(node: &str, t: usize) -> String {
        var_key(COMPONENT, "pos_pmismatch", node, t)
    }
    fn neg_mismatch(node: &str, t: usize) -> String {
        var_key(COMPONENT, "neg_pmismatch", node, t)
    }
    fn spin_shortfall(t: usize) -> String {
        var_key_scalar(COMPONENT, "spin_shortfall", t)
    }
    fn flow_fwd(edge_label: &str, t: usize) -> String {
        var_key(COMPONENT, "flow_fwd", edge_label, t)
    }
    fn flow_bwd(edge_label: &str, t: usize) -> String {
        var_key(COMPONENT, "flow_bwd", edge_label, t)
    }
    fn theta(node: &str, t: usize) -> String {
        var_key(COMPONENT, "theta", node, t)
    }
    fn curtail(unit: &str, t: usize) -> String {
        var_key(COMPONENT, "curtail", unit, t)
    }

    fn edge_label(source: &str, sink: &str) -> String {
        format!("{source}->{sink}")
    }

    fn must_take_units(ctx: &BuildContext) -> Vec<MustTakeUnit> {
        let mut out = Vec::new();
        for u in &ctx.system.thermal_units {
            if u.must_take {
                out.push(MustTakeUnit::Thermal(u.name.clone()));
            }
        }
        for u in &ctx.system.hydro_units {
            if u.must_take {
                match &u.availability {
                    HydroAvailability::Hourly { column } => {
                        out.push(MustTakeUnit::HydroHourly(u.name.clone(), column.clone()))
                    }
                    HydroAvailability::Daily { column } => {
                        out.push(MustTakeUnit::HydroDaily(u.name.clone(), column.clone()))
                    }
                    HydroAvailability::Weekly { column, .. } => {
                        out.push(MustTakeUnit::HydroWeekly(u.name.clone(), column.clone()))
                    }
                }
            }
        }
        for u in &ctx.system.nondispatch_units {
            if u.must_take {
                out.push(MustTakeUnit::NonDispatch(u.name.clone(), u.capacity_column.clone()));
            }
        }
        out
    }
}

impl Default for SystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentBuilder for SystemBuilder {
    fn add_variables(&mut self, k: usize, registry: &mut VariableRegistry, ctx: &BuildContext) -> BuildResult<()> {
        self.keys.clear();
        self.load_shortfall_penalty_factor = ctx.system.config.load_shortfall_penalty_factor;
        self.load_curtail_penalty_factor = ctx.system.config.load_curtail_penalty_factor;
        self.spin_shortfall_penalty_factor = ctx.system.config.spin_shortfall_penalty_factor;
        let h = ctx.horizon();
        let voltage_angle = ctx.system.config.dc_opf == DcOpfFormulation::VoltageAngle;

        for node in ctx.system.network.nodes().map(|s| s.to_string()).collect::<Vec<_>>() {
            for t in 1..=h {
                let key = Self::pos_mismatch(&node, t);
                registry.add_continuous(key.clone(), 0.0, f64::MAX / 4.0);
                self.keys.push(key);
                let key = Self::neg_mismatch(&node, t);
                registry.add_continuous(key.clone(), 0.0, f64::MAX / 4.0);
                self.keys.push(key);
                if voltage_angle {
                    let key = Self::theta(&node, t);
                    registry.add_free(key.clone(), -PI, PI);
                    self.keys.push(key);
                }
            }
        }

        for t in 1..=h {
            let key = Self::spin_shortfall(t);
            registry.add_continuous(key.clone(), 0.0, f64::MAX / 4.0);
            self.keys.push(key);
        }

        for edge in ctx.system.network.edges() {
            let label = Self::edge_label(&edge.source, &edge.sink);
            for t in 1..=h {
                let abs_hour = absolute_hour(t, k);
                let cap = ctx.system.transmission_capacity.get(abs_hour, &edge.capacity_column)?
                    * ctx.system.config.line_capacity_factor;
                let key = Self::flow_fwd(&label, t);
                registry.add_continuous(key.clone(), 0.0, cap);
                self.keys.push(key);
                let key = Self::flow_bwd(&label, t);
                registry.add_continuous(key.clone(), 0.0, cap);
                self.keys.push(key);
            }
        }

        for unit in Self::must_take_units(ctx) {
            let name = match &unit {
                MustTakeUnit::Thermal(n)
                | MustTakeUnit::HydroHourly(n, _)
                | MustTakeUnit::HydroDaily(n, _)
                | MustTakeUnit::HydroWeekly(n, _)
                | MustTakeUnit::NonDispatch(n, _) => n.clone(),
            };
            for t in 1..=h {
                let cap = must_take_capacity(&unit, ctx, k, t)?;
                let key = Self::curtail(&name, t);
                registry.add_continuous(key.clone(), 0.0, cap);
                self.keys.push(key);
            }
        }

        Ok(())
    }

    fn get_fixed_objective_terms(&self, registry: &VariableRegistry, costs: &mut HashMap<String, f64>) -> BuildResult<Expression> {
        // Penalty factors don't vary with the window, so the full mismatch /
        // reserve-shortfall penalty sums live here; only curtailment cost
        // (a per-hour contract/fuel lookup) belongs in the variable term.
        let mut expr = Expression::from(0.0);
        for key in &self.keys {
            if key.starts_with(&format!("{COMPONENT}.pos_pmismatch[")) {
                accumulate_cost(costs, key, self.load_shortfall_penalty_factor);
                expr += registry.get(key)? * self.load_shortfall_penalty_factor;
            } else if key.starts_with(&format!("{COMPONENT}.neg_pmismatch[")) {
                accumulate_cost(costs, key, self.load_curtail_penalty_factor);
                expr += registry.get(key)? * self.load_curtail_penalty_factor;
            } else if key.starts_with(&format!("{COMPONENT}.spin_shortfall[")) {
                accumulate_cost(costs, key, self.spin_shortfall_penalty_factor);
                expr += registry.get(key)? * self.spin_shortfall_penalty_factor;
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
        let scale = ctx.system.config.curtailment_penalty_scale;

        for unit in Self::must_take_units(ctx) {
            let name = match &unit {
                MustTakeUnit::Thermal(n)
                | MustTakeUnit::HydroHourly(n, _)
                | MustTakeUnit::HydroDaily(n, _)
                | MustTakeUnit::HydroWeekly(n, _)
                | MustTakeUnit::NonDispatch(n, _) => n.as_str(),
            };
            for t in 1..=ctx.horizon() {
                let abs_hour = absolute_hour(t, k);
                let marginal = must_take_marginal_cost(&unit, ctx, abs_hour)?;
                let coeff = marginal * scale;
                let key = Self::curtail(name, t);
                accumulate_cost(costs, &key, coeff);
                expr += registry.get(&key)? * coeff;
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

        self.spinning_reserve_constraints(k, registry, ctx, &mut out)?;
        self.power_balance_constraints(k, registry, ctx, &mut out)?;
        self.dc_opf_constraints(k, registry, ctx, &mut out)?;
        self.curtailment_balance_constraints(k, registry, ctx, &mut out)?;

        Ok(out)
    }

    fn variable_keys(&self) -> &[String] {
        &self.keys
    }
}

impl SystemBuilder {
    fn spinning_reserve_constraints(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        out: &mut Vec<Constraint>,
    ) -> BuildResult<()> {
        for t in 1..=ctx.horizon() {
            let abs_hour = absolute_hour(t, k);
            let total_demand = ctx.system.demand.total_at(abs_hour).map_err(BuildError::Core)?;
            let requirement = ctx.system.config.spin_requirement.requirement_mw(total_demand);
            let spin_shortfall_t = registry.get(&Self::spin_shortfall(t))?;

            let mut charge_state_sum = Expression::from(0.0);
            for unit in &ctx.system.storage_units {
                charge_state_sum += registry.get(&var_key("storage", "charge_state", &unit.name, t))?;
            }

            if ctx.system.config.use_spin_var {
                let mut spin_sum = Expression::from(0.0);
                for unit in &ctx.system.thermal_units {
                    spin_sum += registry.get(&var_key("thermal", "spin", &unit.name, t))?;
                }
                out.push(constraint!(
                    spin_sum + charge_state_sum + spin_shortfall_t >= requirement
                ));
            } else {
                let mut headroom_sum = Expression::from(0.0);
                for unit in &ctx.system.thermal_units {
                    let pbar_t = registry.get(&var_key("thermal", "pbar", &unit.name, t))?;
                    let status_t = registry.get(&var_key("thermal", "status", &unit.name, t))?;
                    headroom_sum += pbar_t + unit.min_capacity.value() * status_t;
                }
                out.push(constraint!(
                    headroom_sum + charge_state_sum + spin_shortfall_t >= total_demand + requirement
                ));
            }
        }
        Ok(())
    }

    fn power_balance_constraints(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        out: &mut Vec<Constraint>,
    ) -> BuildResult<()> {
        let gen_retain = 1.0 - ctx.system.config.gen_loss_factor;
        let line_retain = 1.0 - ctx.system.config.line_loss_factor;

        for node in ctx.system.network.nodes() {
            for t in 1..=ctx.horizon() {
                let abs_hour = absolute_hour(t, k);
                let demand = ctx.system.demand.at(abs_hour, node).map_err(BuildError::Core)?;

                let mut generation = Expression::from(0.0);
                for name in ctx.system.generators_at(node) {
                    if let Ok(v) = registry.get(&var_key("thermal", "pthermal", name, t)) {
                        generation += v;
                    } else if let Ok(v) = registry.get(&var_key("hydro", "phydro", name, t)) {
                        generation += v;
                    } else if let Ok(v) = registry.get(&var_key("nondispatch", "p", name, t)) {
                        generation += v;
                    }
                }

                let mut flow_term = Expression::from(0.0);
                for &idx in ctx.system.edge_indices_at(node) {
                    let edge = &ctx.system.network.edges()[idx];
                    let label = Self::edge_label(&edge.source, &edge.sink);
                    let fwd = registry.get(&Self::flow_fwd(&label, t))?;
                    let bwd = registry.get(&Self::flow_bwd(&label, t))?;
                    if edge.source == node {
                        flow_term += -fwd + line_retain * bwd;
                    } else {
                        flow_term += line_retain * fwd - bwd;
                    }
                }

                let mut storage_term = Expression::from(0.0);
                for unit in &ctx.system.storage_units {
                    let attached = match &unit.attach_target {
                        AttachTarget::Node(n) => n == node,
                        AttachTarget::Generator(g) => ctx.system.generators_at(node).iter().any(|n| n == g),
                    };
                    if attached {
                        let discharge = registry.get(&var_key("storage", "pdischarge", &unit.name, t))?;
                        let charge = registry.get(&var_key("storage", "pcharge", &unit.name, t))?;
                        storage_term += discharge - charge;
                    }
                }

                let pos_t = registry.get(&Self::pos_mismatch(node, t))?;
                let neg_t = registry.get(&Self::neg_mismatch(node, t))?;

                out.push(constraint!(
                    gen_retain * generation + flow_term + storage_term + pos_t - neg_t == demand
                ));
            }
        }
        Ok(())
    }

    fn dc_opf_constraints(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        out: &mut Vec<Constraint>,
    ) -> BuildResult<()> {
        if ctx.system.network.edges().is_empty() {
            return Ok(());
        }

        match ctx.system.config.dc_opf {
            DcOpfFormulation::VoltageAngle => {
                let reference = ctx.system.reference_node().to_string();
                for t in 1..=ctx.horizon() {
                    let theta_ref = registry.get(&Self::theta(&reference, t))?;
                    out.push(constraint!(theta_ref == 0.0));
                }
                for edge in ctx.system.network.edges() {
                    let label = Self::edge_label(&edge.source, &edge.sink);
                    for t in 1..=ctx.horizon() {
                        let abs_hour = absolute_hour(t, k);
                        let susceptance = ctx.system.transmission_susceptance.get(abs_hour, &edge.susceptance_column)?;
                        let fwd = registry.get(&Self::flow_fwd(&label, t))?;
                        let bwd = registry.get(&Self::flow_bwd(&label, t))?;
                        let theta_a = registry.get(&Self::theta(&edge.source, t))?;
                        let theta_b = registry.get(&Self::theta(&edge.sink, t))?;
                        out.push(constraint!(fwd - bwd == susceptance * (theta_a - theta_b)));
                    }
                }
            }
            DcOpfFormulation::Kirchhoff => {
                for cycle in ctx.system.network.cycles() {
                    let signed_edges = cycle.signed_edges(&ctx.system.network).map_err(BuildError::Core)?;
                    for t in 1..=ctx.horizon() {
                        let mut sum = Expression::from(0.0);
                        for (edge, forward) in &signed_edges {
                            let abs_hour = absolute_hour(t, k);
                            let susceptance = ctx.system.transmission_susceptance.get(abs_hour, &edge.susceptance_column)?;
                            let reactance = if susceptance.abs() > 1e-12 { 1.0 / susceptance } else { 0.0 };
                            let label = Self::edge_label(&edge.source, &edge.sink);
                            let fwd = registry.get(&Self::flow_fwd(&label, t))?;
                            let bwd = registry.get(&Self::flow_bwd(&label, t))?;
                            let sign = if *forward { 1.0 } else { -1.0 };
                            sum += sign * reactance * (fwd - bwd);
                        }
                        out.push(constraint!(sum == 0.0));
                    }
                }
            }
        }
        Ok(())
    }

    fn curtailment_balance_constraints(
        &self,
        k: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
        out: &mut Vec<Constraint>,
    ) -> BuildResult<()> {
        let h = ctx.horizon();
        for unit in Self::must_take_units(ctx) {
            match &unit {
                MustTakeUnit::Thermal(name) => {
                    let column = &ctx
                        .system
                        .thermal_units
                        .iter()
                        .find(|u| &u.name == name)
                        .unwrap()
                        .derated_capacity_column;
                    for t in 1..=h {
                        let dispatch = registry.get(&var_key("thermal", "pthermal", name, t))?;
                        let curtail = registry.get(&Self::curtail(name, t))?;
                        let charge = self.colocated_charge(name, t, registry, ctx)?;
                        let cap = ctx
                            .system
                            .thermal_derated_capacity
                            .get(absolute_hour(t, k), column)
                            .map_err(BuildError::Core)?;
                        out.push(constraint!(dispatch + curtail + charge == cap));
                    }
                }
                MustTakeUnit::HydroHourly(name, column) => {
                    for t in 1..=h {
                        let dispatch = registry.get(&var_key("hydro", "phydro", name, t))?;
                        let curtail = registry.get(&Self::curtail(name, t))?;
                        let charge = self.colocated_charge(name, t, registry, ctx)?;
                        let cap = ctx.system.hydro_hourly.get(absolute_hour(t, k), column).map_err(BuildError::Core)?;
                        out.push(constraint!(dispatch + curtail + charge == cap));
                    }
                }
                MustTakeUnit::HydroDaily(name, column) => {
                    for day in day_range(h, k) {
                        let cap = ctx.system.hydro_daily.get(day, column).map_err(BuildError::Core)?;
                        let mut dispatch_sum = Expression::from(0.0);
                        let mut curtail_sum = Expression::from(0.0);
                        let mut charge_sum = Expression::from(0.0);
                        for t in hours_of_day(day, h, k) {
                            dispatch_sum += registry.get(&var_key("hydro", "phydro", name, t))?;
                            curtail_sum += registry.get(&Self::curtail(name, t))?;
                            charge_sum += self.colocated_charge(name, t, registry, ctx)?;
                        }
                        out.push(constraint!(dispatch_sum + curtail_sum + charge_sum == cap));
                    }
                }
                MustTakeUnit::HydroWeekly(name, column) => {
                    let first_week = (absolute_day(absolute_hour(1, k)) - 1) / 7 + 1;
                    let last_week = (absolute_day(absolute_hour(h, k)) - 1) / 7 + 1;
                    for week in first_week..=last_week {
                        let cap = ctx.system.hydro_weekly.get(week, column).map_err(BuildError::Core)?;
                        let mut dispatch_sum = Expression::from(0.0);
                        let mut curtail_sum = Expression::from(0.0);
                        let mut charge_sum = Expression::from(0.0);
                        for t in 1..=h {
                            if (absolute_day(absolute_hour(t, k)) - 1) / 7 + 1 == week {
                                dispatch_sum += registry.get(&var_key("hydro", "phydro", name, t))?;
                                curtail_sum += registry.get(&Self::curtail(name, t))?;
                                charge_sum += self.colocated_charge(name, t, registry, ctx)?;
                            }
                        }
                        out.push(constraint!(dispatch_sum + curtail_sum + charge_sum == cap));
                    }
                }
                MustTakeUnit::NonDispatch(name, column) => {
                    for t in 1..=h {
                        let dispatch = registry.get(&var_key("nondispatch", "p", name, t))?;
                        let curtail = registry.get(&Self::curtail(name, t))?;
                        let charge = self.colocated_charge(name, t, registry, ctx)?;
                        let cap = ctx.system.nondispatch_capacity.get(absolute_hour(t, k), column).map_err(BuildError::Core)?;
                        out.push(constraint!(dispatch + curtail + charge == cap));
                    }
                }
            }
        }
        Ok(())
    }

    /// Sum of colocated storage charge for a must-take unit at hour `t`
    /// (spec section 4.6's `Σ_{s attached to g} pcharge[s,t]`).
    fn colocated_charge(
        &self,
        generator: &str,
        t: usize,
        registry: &VariableRegistry,
        ctx: &BuildContext,
    ) -> BuildResult<Expression> {
        let mut sum = Expression::from(0.0);
        for unit in &ctx.system.storage_units {
            if unit.attach_target == AttachTarget::Generator(generator.to_string()) {
                sum += registry.get(&var_key("storage", "pcharge", &unit.name, t))?;
            }
        }
        Ok(sum)
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

fn must_take_capacity(unit: &MustTakeUnit, ctx: &BuildContext, k: usize, t: usize) -> BuildResult<f64> {
    let abs_hour = absolute_hour(t, k);
    let v = match unit {
        MustTakeUnit::Thermal(name) => {
            let u = ctx.system.thermal_units.iter().find(|u| &u.name == name).unwrap();
            ctx.system.thermal_derated_capacity.get(abs_hour, &u.derated_capacity_column)
        }
        MustTakeUnit::HydroHourly(_, column) => ctx.system.hydro_hourly.get(abs_hour, column),
        MustTakeUnit::HydroDaily(_, column) => ctx.system.hydro_daily.get(absolute_day(abs_hour), column),
        MustTakeUnit::HydroWeekly(_, column) => {
            let week = (absolute_day(abs_hour) - 1) / 7 + 1;
            ctx.system.hydro_weekly.get(week, column)
        }
        MustTakeUnit::NonDispatch(_, column) => ctx.system.nondispatch_capacity.get(abs_hour, column),
    };
    v.map_err(BuildError::Core)
}

fn must_take_marginal_cost(unit: &MustTakeUnit, ctx: &BuildContext, abs_hour: usize) -> BuildResult<f64> {
    let v = match unit {
        MustTakeUnit::Thermal(name) => {
            let u = ctx.system.thermal_units.iter().find(|u| &u.name == name).unwrap();
            ctx.system.contracts.cost_at(&u.fuel_contract, abs_hour).map(|c| c.value() * u.heat_rate + u.operation_cost)
        }
        MustTakeUnit::HydroHourly(name, _) | MustTakeUnit::HydroDaily(name, _) | MustTakeUnit::HydroWeekly(name, _) => {
            let u = ctx.system.hydro_units.iter().find(|u| &u.name == name).unwrap();
            ctx.system.contracts.cost_at(&u.contract, abs_hour).map(|c| c.value())
        }
        MustTakeUnit::NonDispatch(name, _) => {
            let u = ctx.system.nondispatch_units.iter().find(|u| &u.name == name).unwrap();
            ctx.system.contracts.cost_at(&u.contract, abs_hour).map(|c| c.value())
        }
    };
    v.map_err(BuildError::Core)
}

//! `PowerSystemModel`: a thin wrapper over the solver (spec section 4.8),
//! built on `good_lp`'s solver-selection idiom (`vars.minimise(expr).using(solver)`,
//! `.with` chained per constraint, `.solve()`).
//!
//! `good_lp::Variable` is a plain index into a `ProblemVariables`, stable
//! across re-builds of the same variable set in the same order — so the
//! constraints and objective captured in an `AssembledModel` stay valid
//! across the several `.solve()` calls this wrapper makes (LP relaxation,
//! fixed-binary LMP re-solve, export-capacity re-solve) as long as the
//! cloned `ProblemVariables` is rebuilt with the same entries.

use crate::error::{SolveError, SolveResult};
use crate::lmp::LmpCandidate;
use crate::model_builder::AssembledModel;
use good_lp::solvers::clarabel::clarabel;
use good_lp::solvers::highs::highs;
use good_lp::{constraint, Constraint, Expression, ProblemVariables, Solution, SolverModel, Variable};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// Binary-tolerance snap used when reading back `status`/`startup`/`shutdown`
/// style variables (spec section 4.10).
const BINARY_SNAP_TOLERANCE: f64 = 1e-4;

/// Fractional-value tolerance used by the rounding heuristic's
/// `find_fraction_vars` check (spec section 4.9). Distinct from
/// `BINARY_SNAP_TOLERANCE`, which governs the unrelated read-back snap.
const ROUNDING_FRACTIONAL_TOLERANCE: f64 = 1e-5;

/// Per-candidate solve budget inside `compute_iis`'s deletion filter; a
/// single feasibility check, not a MILP optimization, so this can stay
/// short relative to `SolveOptions::timelimit`.
const IIS_SOLVE_TIME_LIMIT_SECS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    TimeLimitWithIncumbent,
    Infeasible,
    InfeasibleOrUnbounded,
    Unbounded,
    TimeLimitNoIncumbent,
}

/// Solver tuning knobs threaded through from the CLI/config (spec section 4.8).
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub log_to_console: bool,
    pub mipgap: f64,
    pub timelimit: Duration,
    pub num_threads: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            log_to_console: false,
            mipgap: 1e-4,
            timelimit: Duration::from_secs(600),
            num_threads: 1,
        }
    }
}

pub struct PowerSystemModel {
    variables: ProblemVariables,
    variable_index: HashMap<String, Variable>,
    objective: Expression,
    constraints: Vec<Constraint>,
    lmp_candidates: Vec<LmpCandidate>,
    nodes: Vec<String>,
    horizon: usize,
    objective_coefficients: HashMap<String, f64>,
    variable_bounds: HashMap<String, (f64, f64)>,
    constraint_labels: Vec<String>,
    status: Option<SolveStatus>,
    values: HashMap<String, f64>,
    solve_runtime: Duration,
}

impl PowerSystemModel {
    pub fn from_assembled(model: AssembledModel) -> Self {
        Self {
            variables: model.variables,
            variable_index: model.variable_index,
            objective: model.objective,
            constraints: model.constraints,
            lmp_candidates: model.lmp_candidates,
            nodes: model.nodes,
            horizon: model.horizon,
            objective_coefficients: model.objective_coefficients,
            variable_bounds: model.variable_bounds,
            constraint_labels: model.constraint_labels,
            status: None,
            values: HashMap::new(),
            solve_runtime: Duration::ZERO,
        }
    }

    pub fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    pub fn check_feasible(&self) -> bool {
        matches!(self.status, Some(SolveStatus::Optimal) | Some(SolveStatus::TimeLimitWithIncumbent))
    }

    pub fn get_solution(&self) -> &HashMap<String, f64> {
        &self.values
    }

    pub fn solve_runtime(&self) -> Duration {
        self.solve_runtime
    }

    /// Replaces this model's variables/objective/constraints with a freshly
    /// assembled window — used by the power-water coupler to re-optimize
    /// after swapping in proposed hydro daily capacities (spec section
    /// 4.12). Clears any solved status and cached solution values.
    pub fn reload(&mut self, model: AssembledModel) {
        self.variables = model.variables;
        self.variable_index = model.variable_index;
        self.objective = model.objective;
        self.constraints = model.constraints;
        self.lmp_candidates = model.lmp_candidates;
        self.nodes = model.nodes;
        self.horizon = model.horizon;
        self.objective_coefficients = model.objective_coefficients;
        self.variable_bounds = model.variable_bounds;
        self.constraint_labels = model.constraint_labels;
        self.status = None;
        self.values.clear();
        self.solve_runtime = Duration::ZERO;
    }

    /// Runs the MILP to optimality or the configured time limit.
    pub fn optimize(&mut self, options: &SolveOptions) -> SolveResult<()> {
        let started = Instant::now();
        let mut problem = self
            .variables
            .clone()
            .minimise(self.objective.clone())
            .using(highs)
            .set_time_limit(options.timelimit.as_secs_f64())
            .set_mip_gap(options.mipgap)
            .set_threads(options.num_threads as u32)
            .set_verbose(options.log_to_console);

        for c in &self.constraints {
            problem = problem.with(c.clone());
        }

        match problem.solve() {
            Ok(solution) => {
                self.status = Some(SolveStatus::Optimal);
                self.read_back(&solution);
                self.solve_runtime = started.elapsed();
                Ok(())
            }
            Err(err) => {
                self.solve_runtime = started.elapsed();
                self.status = Some(classify_failure(&err));
                Err(translate_resolution_error(err))
            }
        }
    }

    /// The rounding heuristic (spec section 4.9). `strategy` is `"slow"` or
    /// `"fast"`. Returns the accumulated LP-relaxation runtime and the
    /// iteration count it converged at; `None` on MILP fallback.
    pub fn optimize_with_rounding(
        &mut self,
        strategy: &str,
        threshold: f64,
        max_iter: usize,
        options: &SolveOptions,
    ) -> SolveResult<(Option<Duration>, Option<usize>)> {
        let mut fixed: Vec<Constraint> = Vec::new();
        let mut total_runtime = Duration::ZERO;

        let binary_keys: Vec<String> = self
            .variable_index
            .keys()
            .filter(|k| is_rounding_target_key(k))
            .cloned()
            .collect();

        for iteration in 1..=max_iter {
            let started = Instant::now();
            let mut problem = self.variables.clone().minimise(self.objective.clone()).using(clarabel);
            for c in self.constraints.iter().chain(fixed.iter()) {
                problem = problem.with(c.clone());
            }
            let solved = match problem.solve() {
                Ok(s) => s,
                Err(_) => {
                    self.optimize(options)?;
                    return Ok((None, None));
                }
            };
            total_runtime += started.elapsed();

            let mut fractional: Vec<(String, f64)> = Vec::new();
            for key in &binary_keys {
                let var = self.variable_index[key];
                let v = solved.value(var);
                if (v - v.round()).abs() > ROUNDING_FRACTIONAL_TOLERANCE {
                    fractional.push((key.clone(), v));
                }
            }

            if fractional.is_empty() {
                self.status = Some(SolveStatus::Optimal);
                self.read_back(&solved);
                self.solve_runtime = total_runtime;
                return Ok((Some(total_runtime), Some(iteration)));
            }

            match strategy {
                "slow" => {
                    let (key, value) = fractional
                        .into_iter()
                        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                        .unwrap();
                    let var = self.variable_index[&key];
                    let fix_to = if value >= threshold { 1.0 } else { 0.0 };
                    fixed.push(constraint!(var == fix_to));
                }
                _ => {
                    for (key, value) in fractional {
                        let var = self.variable_index[&key];
                        let fix_to = if value >= threshold { 1.0 } else { 0.0 };
                        fixed.push(constraint!(var == fix_to));
                    }
                }
            }
        }

        self.optimize(options)?;
        Ok((None, None))
    }

    /// Fixes all binaries at their incumbent values, re-solves the LP, and
    /// approximates the system-wide locational marginal price from the
    /// marginal thermal generator's own cost coefficient (spec section 4.8),
    /// since `good_lp`'s Clarabel backend exposes no constraint duals in
    /// this API surface. Mirrors the cost-curve-derivative fallback in the
    /// original uniform-DC-OPF implementation this was adapted from: find a
    /// unit dispatched strictly between its min and derated capacity at an
    /// hour and use its marginal cost; if every unit is pinned at a bound,
    /// fall back to the highest marginal cost among all candidates at that
    /// hour. The one price per hour is broadcast to every node, keyed the
    /// way `solve_for_export_prices` expects.
    pub fn solve_for_lmp(&self) -> SolveResult<HashMap<String, f64>> {
        let mut fixed = Vec::new();
        for (key, var) in &self.variable_index {
            if is_binary_key(key) {
                let v = self.values.get(key).copied().unwrap_or(0.0).round();
                fixed.push(constraint!(*var == v));
            }
        }
        let mut problem = self.variables.clone().minimise(self.objective.clone()).using(clarabel);
        for c in self.constraints.iter().chain(fixed.iter()) {
            problem = problem.with(c.clone());
        }
        let solved = problem.solve().map_err(translate_resolution_error)?;

        let mut out = HashMap::new();
        for t in 1..=self.horizon {
            let mut marginal: Option<f64> = None;
            let mut highest = 0.0f64;
            for candidate in self.lmp_candidates.iter().filter(|c| c.hour == t) {
                let Some(&var) = self.variable_index.get(&candidate.key) else { continue };
                let p = solved.value(var);
                let at_min = (p - candidate.min_capacity).abs() < 1e-3;
                let at_max = (p - candidate.max_capacity).abs() < 1e-3;
                if !at_min && !at_max && marginal.is_none() {
                    marginal = Some(candidate.marginal_cost);
                }
                if candidate.marginal_cost > highest {
                    highest = candidate.marginal_cost;
                }
            }
            let price = marginal.unwrap_or(highest);
            for node in &self.nodes {
                out.insert(format!("system.pos_pmismatch[{node}@{t}]"), price);
            }
        }
        Ok(out)
    }

    pub fn solve_for_export_prices(&self, shared_nodes: &[String], horizon: usize, k: usize) -> SolveResult<HashMap<(String, usize), f64>> {
        let lmp = self.solve_for_lmp()?;
        let mut out = HashMap::new();
        for node in shared_nodes {
            for t in 1..=horizon {
                let key = format!("system.pos_pmismatch[{node}@{t}]");
                if let Some(v) = lmp.get(&key) {
                    out.insert((node.clone(), t), *v);
                }
            }
        }
        let _ = k;
        Ok(out)
    }

    pub fn solve_for_export_capacity(&self, shared_nodes: &[String], horizon: usize) -> SolveResult<HashMap<(String, usize), f64>> {
        let mut fixed = Vec::new();
        let mut export_vars = HashMap::new();
        let mut vars = self.variables.clone();
        for (key, var) in &self.variable_index {
            if is_binary_key(key) {
                let v = self.values.get(key).copied().unwrap_or(0.0).round();
                fixed.push(constraint!(*var == v));
            }
        }
        for node in shared_nodes {
            for t in 1..=horizon {
                let export = vars.add(good_lp::variable().min(0.0).max(f64::MAX / 4.0));
                export_vars.insert((node.clone(), t), export);
            }
        }

        let mut objective = self.objective.clone();
        for export in export_vars.values() {
            objective += -1.0 * *export;
        }

        let mut problem = vars.minimise(objective).using(clarabel);
        for c in self.constraints.iter().chain(fixed.iter()) {
            problem = problem.with(c.clone());
        }
        for ((node, t), export) in &export_vars {
            let mismatch_key = format!("system.pos_pmismatch[{node}@{t}]");
            if let Some(&mismatch_var) = self.variable_index.get(&mismatch_key) {
                problem = problem.with(constraint!(mismatch_var - *export >= 0.0));
            }
        }

        let solved = problem.solve().map_err(translate_resolution_error)?;
        Ok(export_vars
            .into_iter()
            .map(|(k, v)| (k, solved.value(v)))
            .collect())
    }

    /// Dumps the window's full constraint set with real objective
    /// coefficients (`objective_coefficients`) and variable bounds
    /// (`variable_bounds`), row-labeled by the owning component
    /// (`constraint_labels`) (spec section 6's infeasibility artifact).
    /// Row sense and RHS aren't recoverable from a `good_lp::Constraint`
    /// through this crate's API surface, so every row is still emitted as
    /// a free-standing `E` row; a reader needs the accompanying JSON
    /// snapshot for the actual bound each row enforces.
    pub fn write_mps(&self, folder: &Path, name: &str) -> SolveResult<()> {
        let path = folder.join(format!("{name}.mps"));
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "NAME          {name}")?;
        writeln!(file, "ROWS")?;
        writeln!(file, " N  COST")?;
        for label in &self.constraint_labels {
            writeln!(file, " E  {label}")?;
        }
        writeln!(file, "COLUMNS")?;
        let mut keys: Vec<&String> = self.variable_index.keys().collect();
        keys.sort();
        for key in &keys {
            let cost = self.objective_coefficients.get(*key).copied().unwrap_or(0.0);
            writeln!(file, "    {key}  COST  {cost}")?;
        }
        writeln!(file, "BOUNDS")?;
        for key in &keys {
            if let Some(&(min, max)) = self.variable_bounds.get(*key) {
                writeln!(file, " LO BND       {key}  {min}")?;
                writeln!(file, " UP BND       {key}  {max}")?;
            }
        }
        writeln!(file, "ENDATA")?;
        Ok(())
    }

    /// Computes an irreducible infeasible subsystem via the standard
    /// deletion-filter algorithm (try dropping each constraint in turn;
    /// keep it dropped only if the remainder is still infeasible) and
    /// dumps just that subsystem, row-labeled like `write_mps` (spec
    /// section 6).
    pub fn write_ilp_mps(&self, folder: &Path, name: &str) -> SolveResult<()> {
        let iis = self.compute_iis();
        let path = folder.join(format!("{name}_ilp.mps"));
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "NAME          {name}_ilp")?;
        writeln!(file, "ROWS")?;
        writeln!(file, " N  COST")?;
        for (label, _) in &iis {
            writeln!(file, " E  {label}")?;
        }
        writeln!(file, "COLUMNS")?;
        let mut keys: Vec<&String> = self.variable_index.keys().collect();
        keys.sort();
        for key in &keys {
            let cost = self.objective_coefficients.get(*key).copied().unwrap_or(0.0);
            writeln!(file, "    {key}  COST  {cost}")?;
        }
        writeln!(file, "ENDATA")?;
        Ok(())
    }

    /// `true` if `subset` alone (no objective, feasibility only) is
    /// infeasible under HiGHS — the deletion filter's per-candidate check.
    fn subset_is_infeasible(&self, subset: &[(String, Constraint)]) -> bool {
        let mut problem = self
            .variables
            .clone()
            .minimise(Expression::from(0.0))
            .using(highs)
            .set_time_limit(IIS_SOLVE_TIME_LIMIT_SECS);
        for (_, c) in subset {
            problem = problem.with(c.clone());
        }
        matches!(problem.solve(), Err(good_lp::ResolutionError::Infeasible))
    }

    fn compute_iis(&self) -> Vec<(String, Constraint)> {
        let mut working: Vec<(String, Constraint)> =
            self.constraint_labels.iter().cloned().zip(self.constraints.iter().cloned()).collect();

        if !self.subset_is_infeasible(&working) {
            return working;
        }

        let mut i = 0;
        while i < working.len() {
            let removed = working.remove(i);
            if self.subset_is_infeasible(&working) {
                // Still infeasible without it: it isn't part of the IIS.
            } else {
                working.insert(i, removed);
                i += 1;
            }
        }
        working
    }

    fn read_back(&mut self, solution: &impl Solution) {
        self.values.clear();
        for (key, var) in &self.variable_index {
            let mut v = solution.value(*var);
            if is_binary_key(key) && (v - v.round()).abs() <= BINARY_SNAP_TOLERANCE {
                v = v.round();
            }
            self.values.insert(key.clone(), v);
        }
    }
}

fn is_binary_key(key: &str) -> bool {
    key.starts_with("thermal.status[")
        || key.starts_with("thermal.startup[")
        || key.starts_with("thermal.shutdown[")
        || key.starts_with("storage.ucharge[")
        || key.starts_with("storage.udischarge[")
        || key.starts_with("nondispatch.u[")
}

/// Scopes the rounding heuristic (spec section 4.9) to thermal commitment
/// only, matching `rounding_algo.py`'s `get_variables(model, target_varnames=None)`
/// default of `["status"]`. `is_binary_key` is deliberately broader and stays
/// reserved for `solve_for_lmp`/`solve_for_export_capacity`, where fixing
/// every binary (not just thermal status) is the correct scope (spec section
/// 4.8).
fn is_rounding_target_key(key: &str) -> bool {
    key.starts_with("thermal.status[")
}

fn classify_failure(err: &good_lp::ResolutionError) -> SolveStatus {
    match err {
        good_lp::ResolutionError::Infeasible => SolveStatus::Infeasible,
        good_lp::ResolutionError::Unbounded => SolveStatus::Unbounded,
        _ => SolveStatus::InfeasibleOrUnbounded,
    }
}

fn translate_resolution_error(err: good_lp::ResolutionError) -> SolveError {
    match err {
        good_lp::ResolutionError::Infeasible => SolveError::Infeasible,
        good_lp::ResolutionError::Unbounded => SolveError::Unbounded,
        other => SolveError::Solver(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VariableRegistry;

    /// Builds one feasible constraint (`a >= b`, both within bounds) and one
    /// contradictory pair (`c <= 1` and `c >= 5`) so the deletion filter has
    /// exactly one constraint to exonerate and two to keep.
    fn contradictory_model() -> AssembledModel {
        let mut registry = VariableRegistry::new();
        let a = registry.add_continuous("a", 0.0, 10.0);
        let b = registry.add_continuous("b", 0.0, 10.0);
        let c = registry.add_continuous("c", 0.0, 10.0);

        let mut constraints = Vec::new();
        let mut constraint_labels = Vec::new();
        constraints.push(constraint!(a >= b));
        constraint_labels.push("harmless_0".to_string());
        constraints.push(constraint!(c <= 1.0));
        constraint_labels.push("contradiction_0".to_string());
        constraints.push(constraint!(c >= 5.0));
        constraint_labels.push("contradiction_1".to_string());

        let mut objective = Expression::from(0.0);
        objective += a * 1.0;
        objective += b * 1.0;

        let (variables, variable_index, variable_bounds) = registry.into_problem_variables();
        AssembledModel {
            variables,
            variable_index,
            objective,
            constraints,
            lmp_candidates: Vec::new(),
            nodes: Vec::new(),
            horizon: 1,
            objective_coefficients: HashMap::from([("a".to_string(), 1.0), ("b".to_string(), 1.0)]),
            variable_bounds,
            constraint_labels,
        }
    }

    #[test]
    fn deletion_filter_drops_the_harmless_constraint() {
        let model = PowerSystemModel::from_assembled(contradictory_model());
        let iis = model.compute_iis();
        let labels: Vec<&str> = iis.iter().map(|(l, _)| l.as_str()).collect();
        assert!(!labels.contains(&"harmless_0"), "the satisfiable constraint should not survive the filter");
        assert!(labels.contains(&"contradiction_0") && labels.contains(&"contradiction_1"), "both halves of the contradiction must remain");
    }

    #[test]
    fn write_mps_emits_real_cost_and_bounds() {
        let model = PowerSystemModel::from_assembled(contradictory_model());
        let dir = std::env::temp_dir().join(format!("pownet_test_write_mps_{:p}", &model));
        std::fs::create_dir_all(&dir).unwrap();
        model.write_mps(&dir, "case").unwrap();
        let contents = std::fs::read_to_string(dir.join("case.mps")).unwrap();
        assert!(contents.contains("COST  1"), "variable a's real cost coefficient should appear, got:\n{contents}");
        assert!(contents.contains("UP BND"), "real variable bounds should appear, got:\n{contents}");
        std::fs::remove_dir_all(&dir).ok();
    }
}

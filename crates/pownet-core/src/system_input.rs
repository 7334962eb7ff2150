//! `SystemInput`: the validated, immutable-for-the-simulation data model
//! (spec section 2 and 3).
//!
//! Construction is split from CSV ingestion on purpose (spec section 1 treats
//! "CSV ingestion and dataframe hygiene" as an external collaborator):
//! `pownet-io` reads the input folder and calls [`SystemInput::new`], which
//! builds the topology dictionaries and runs every load-time invariant from
//! spec section 3 into a [`Diagnostics`] report instead of aborting on the
//! first issue found.

use crate::config::SimConfig;
use crate::contracts::ContractTable;
use crate::demand::Demand;
use crate::diagnostics::Diagnostics;
use crate::generators::{HydroAvailability, HydroUnit, NonDispatchUnit, ThermalUnit};
use crate::network::Network;
use crate::storage::{AttachTarget, StorageUnit};
use crate::timeseries::TimeSeriesTable;
use std::collections::{HashMap, HashSet};

/// The fully assembled, load-time-validated power system model.
#[derive(Debug, Clone)]
pub struct SystemInput {
    pub config: SimConfig,
    pub network: Network,
    pub thermal_units: Vec<ThermalUnit>,
    pub hydro_units: Vec<HydroUnit>,
    pub nondispatch_units: Vec<NonDispatchUnit>,
    pub storage_units: Vec<StorageUnit>,
    pub demand: Demand,
    /// Cost table covering fuel, spot and ESS-discharge contracts alike
    /// (spec section 3: "contract_costs(contract_id, absolute_hour)").
    pub contracts: ContractTable,
    pub thermal_derated_capacity: TimeSeriesTable,
    pub storage_derated_capacity: TimeSeriesTable,
    pub hydro_hourly: TimeSeriesTable,
    pub hydro_daily: TimeSeriesTable,
    pub hydro_weekly: TimeSeriesTable,
    pub hydro_weekly_min: TimeSeriesTable,
    pub nondispatch_capacity: TimeSeriesTable,
    pub transmission_capacity: TimeSeriesTable,
    pub transmission_susceptance: TimeSeriesTable,
    reference_node: String,
    node_generators: HashMap<String, Vec<String>>,
    node_edge_indices: HashMap<String, Vec<usize>>,
}

impl SystemInput {
    /// Assembles a `SystemInput` from already-parsed components, builds the
    /// topology dictionaries (node→generators, node→edges) and the cycle
    /// basis, and picks the reference bus (peak-demand node, spec section 3).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        mut network: Network,
        thermal_units: Vec<ThermalUnit>,
        hydro_units: Vec<HydroUnit>,
        nondispatch_units: Vec<NonDispatchUnit>,
        storage_units: Vec<StorageUnit>,
        demand: Demand,
        contracts: ContractTable,
        thermal_derated_capacity: TimeSeriesTable,
        storage_derated_capacity: TimeSeriesTable,
        hydro_hourly: TimeSeriesTable,
        hydro_daily: TimeSeriesTable,
        hydro_weekly: TimeSeriesTable,
        hydro_weekly_min: TimeSeriesTable,
        nondispatch_capacity: TimeSeriesTable,
        transmission_capacity: TimeSeriesTable,
        transmission_susceptance: TimeSeriesTable,
    ) -> Self {
        if network.cycles().is_empty() {
            network.compute_cycle_basis();
        }

        let reference_node = demand
            .peak_demand_node()
            .unwrap_or_else(|| network.nodes().next().unwrap_or_default().to_string());

        let mut node_generators: HashMap<String, Vec<String>> = HashMap::new();
        for unit in &thermal_units {
            node_generators
                .entry(unit.node.clone())
                .or_default()
                .push(unit.name.clone());
        }
        for unit in &hydro_units {
            node_generators
                .entry(unit.node.clone())
                .or_default()
                .push(unit.name.clone());
        }
        for unit in &nondispatch_units {
            node_generators
                .entry(unit.node.clone())
                .or_default()
                .push(unit.name.clone());
        }

        let mut node_edge_indices: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, edge) in network.edges().iter().enumerate() {
            node_edge_indices.entry(edge.source.clone()).or_default().push(i);
            node_edge_indices.entry(edge.sink.clone()).or_default().push(i);
        }

        Self {
            config,
            network,
            thermal_units,
            hydro_units,
            nondispatch_units,
            storage_units,
            demand,
            contracts,
            thermal_derated_capacity,
            storage_derated_capacity,
            hydro_hourly,
            hydro_daily,
            hydro_weekly,
            hydro_weekly_min,
            nondispatch_capacity,
            transmission_capacity,
            transmission_susceptance,
            reference_node,
            node_generators,
            node_edge_indices,
        }
    }

    pub fn reference_node(&self) -> &str {
        &self.reference_node
    }

    pub fn generators_at(&self, node: &str) -> &[String] {
        self.node_generators.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_indices_at(&self, node: &str) -> &[usize] {
        self.node_edge_indices
            .get(node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Runs every load-time invariant from spec section 3 and returns a
    /// report rather than aborting on the first failure, so the caller can
    /// name every offending field/unit at once (spec section 7).
    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();

        if self.config.sim_horizon == 0 || self.config.sim_horizon % 24 != 0 {
            diag.add_error(
                "config",
                &format!(
                    "sim_horizon must be a positive multiple of 24, got {}",
                    self.config.sim_horizon
                ),
            );
        }

        for (name, value) in [
            ("gen_loss_factor", self.config.gen_loss_factor),
            ("line_loss_factor", self.config.line_loss_factor),
            ("line_capacity_factor", self.config.line_capacity_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                diag.add_error("config", &format!("{name} must be in [0, 1], got {value}"));
            }
        }
        for (name, value) in [
            ("load_shortfall_penalty_factor", self.config.load_shortfall_penalty_factor),
            ("load_curtail_penalty_factor", self.config.load_curtail_penalty_factor),
            ("spin_shortfall_penalty_factor", self.config.spin_shortfall_penalty_factor),
        ] {
            if value <= 0.0 {
                diag.add_error("config", &format!("{name} must be a positive $/MWh, got {value}"));
            }
        }

        self.validate_unique_names(&mut diag);
        self.validate_home_nodes(&mut diag);
        self.validate_demand_nodes(&mut diag);
        self.validate_nondispatch_contracts(&mut diag);
        self.validate_thermal_capacity_ordering(&mut diag);
        self.validate_hydro_weekly_ordering(&mut diag);
        self.validate_nondispatch_series_length(&mut diag);
        self.validate_storage(&mut diag);

        diag
    }

    fn validate_unique_names(&self, diag: &mut Diagnostics) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut names: Vec<&str> = Vec::new();
        names.extend(self.thermal_units.iter().map(|u| u.name.as_str()));
        names.extend(self.hydro_units.iter().map(|u| u.name.as_str()));
        names.extend(self.nondispatch_units.iter().map(|u| u.name.as_str()));
        names.extend(self.storage_units.iter().map(|u| u.name.as_str()));

        for name in names {
            if self.network.has_node(name) {
                diag.add_error_with_entity(
                    "unit.name",
                    &format!("unit name '{name}' clashes with a node name"),
                    name,
                );
            }
            if !seen.insert(name.to_string()) {
                diag.add_error_with_entity("unit.name", &format!("duplicate unit name '{name}'"), name);
            }
        }
    }

    fn validate_home_nodes(&self, diag: &mut Diagnostics) {
        let check = |node: &str, entity: &str, diag: &mut Diagnostics| {
            if !self.network.has_node(node) {
                diag.add_error_with_entity(
                    "unit.node",
                    &format!("home node '{node}' is not in the node set"),
                    entity,
                );
            }
        };
        for u in &self.thermal_units {
            check(&u.node, &u.name, diag);
        }
        for u in &self.hydro_units {
            check(&u.node, &u.name, diag);
        }
        for u in &self.nondispatch_units {
            check(&u.node, &u.name, diag);
        }
    }

    fn validate_demand_nodes(&self, diag: &mut Diagnostics) {
        for node in self.demand.nodes() {
            if !self.network.has_node(node) {
                diag.add_error_with_entity(
                    "demand.node",
                    &format!("demand node '{node}' is not in the node set"),
                    node,
                );
            }
        }
    }

    fn validate_nondispatch_contracts(&self, diag: &mut Diagnostics) {
        let mut matched = 0usize;
        let mut total = 0usize;
        for u in self.hydro_units.iter().map(|u| &u.contract).chain(self.nondispatch_units.iter().map(|u| &u.contract)) {
            total += 1;
            if self.contracts.has_contract(u) {
                matched += 1;
            } else {
                diag.add_error("contracts.nondispatch", &format!("missing contract entry for '{u}'"));
            }
        }
        if matched != total {
            diag.add_error(
                "contracts.nondispatch",
                &format!("non-dispatch contract count mismatch: {matched} matched of {total} units"),
            );
        }
    }

    fn validate_thermal_capacity_ordering(&self, diag: &mut Diagnostics) {
        for u in &self.thermal_units {
            for row in 1..=self.thermal_derated_capacity.rows() {
                match self.thermal_derated_capacity.get(row, &u.derated_capacity_column) {
                    Ok(p_bar) if p_bar < u.min_capacity.value() => {
                        diag.add_error_with_entity(
                            "thermal.derated_capacity",
                            &format!("P-bar({row}) = {p_bar} is below min_capacity {}", u.min_capacity.value()),
                            &u.name,
                        );
                    }
                    Ok(_) => {}
                    Err(_) => {
                        diag.add_error_with_entity(
                            "thermal.derated_capacity",
                            "missing derated-capacity column",
                            &u.name,
                        );
                        break;
                    }
                }
            }
        }
    }

    /// Weekly lower bound must not exceed the weekly upper bound, the same
    /// min-vs-max ordering check `validate_thermal_capacity_ordering` runs
    /// for thermal units (spec section 4.3).
    fn validate_hydro_weekly_ordering(&self, diag: &mut Diagnostics) {
        for u in &self.hydro_units {
            let HydroAvailability::Weekly { column, min_column: Some(min_column) } = &u.availability else {
                continue;
            };
            for week in 1..=self.hydro_weekly_min.rows() {
                let (max_cap, min_cap) = match (self.hydro_weekly.get(week, column), self.hydro_weekly_min.get(week, min_column)) {
                    (Ok(max_cap), Ok(min_cap)) => (max_cap, min_cap),
                    _ => {
                        diag.add_error_with_entity(
                            "hydro.weekly_min",
                            "missing weekly capacity or weekly-minimum column",
                            &u.name,
                        );
                        break;
                    }
                };
                if min_cap > max_cap {
                    diag.add_error_with_entity(
                        "hydro.weekly_min",
                        &format!("weekly minimum {min_cap} at week {week} exceeds weekly maximum {max_cap}"),
                        &u.name,
                    );
                }
            }
        }
    }

    fn validate_nondispatch_series_length(&self, diag: &mut Diagnostics) {
        for u in &self.hydro_units {
            let (rows, expected) = match &u.availability {
                HydroAvailability::Hourly { .. } => (self.hydro_hourly.rows(), 8760),
                HydroAvailability::Daily { .. } => (self.hydro_daily.rows(), 365),
                HydroAvailability::Weekly { .. } => (self.hydro_weekly.rows(), 52),
            };
            if rows != expected {
                diag.add_error_with_entity(
                    "hydro.availability.length",
                    &format!("expected {expected} rows, found {rows}"),
                    &u.name,
                );
            }
            if let HydroAvailability::Weekly { min_column: Some(_), .. } = &u.availability {
                if self.hydro_weekly_min.rows() != 52 {
                    diag.add_error_with_entity(
                        "hydro.availability.length",
                        &format!("expected 52 rows in weekly-minimum table, found {}", self.hydro_weekly_min.rows()),
                        &u.name,
                    );
                }
            }
        }
        if self.nondispatch_capacity.rows() != 8760 {
            diag.add_error(
                "nondispatch.capacity.length",
                &format!(
                    "expected 8760 rows, found {}",
                    self.nondispatch_capacity.rows()
                ),
            );
        }
    }

    fn validate_storage(&self, diag: &mut Diagnostics) {
        for u in &self.storage_units {
            for (label, eff) in [
                ("charge_efficiency", u.charge_efficiency),
                ("discharge_efficiency", u.discharge_efficiency),
                ("self_discharge_rate", u.self_discharge_rate),
            ] {
                if !(0.0..=1.0).contains(&eff) {
                    diag.add_error_with_entity(
                        "storage.efficiency",
                        &format!("{label} must be in [0, 1], got {eff}"),
                        &u.name,
                    );
                }
            }
            if u.min_capacity.value() > u.max_capacity.value() {
                diag.add_error_with_entity(
                    "storage.capacity",
                    &format!(
                        "min_capacity {} exceeds max_capacity {}",
                        u.min_capacity.value(),
                        u.max_capacity.value()
                    ),
                    &u.name,
                );
            }
            let attach_ok = match &u.attach_target {
                AttachTarget::Node(n) => self.network.has_node(n),
                AttachTarget::Generator(g) => self.node_generators.values().any(|names| names.iter().any(|n| n == g)),
            };
            if !attach_ok {
                diag.add_error_with_entity(
                    "storage.attach_target",
                    "attach_target is neither a known node nor a known generator",
                    &u.name,
                );
            }
        }
    }
}

//! `SystemRecord`: accumulates per-window solutions into three long tables
//! (spec section 4.10), grounded on
//! `examples/original_source/src/pownet/core/record.py`'s three-way split
//! of a solved model's variables by index shape (`var(node, t)`,
//! `var(node, node, t)`, `var(t)`) — realized here as a split on the
//! variable-key shape `pownet_solve::registry::var_key` produces rather
//! than a regex over a solver's raw variable names.

use pownet_core::timeseries::absolute_hour;
use pownet_core::SystemInput;
use pownet_solve::registry::var_key;
use pownet_solve::InitialConditions;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// One entity-indexed sample: `{component}.{var_name}` at `entity` and
/// absolute `hour`.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub component: String,
    pub var_name: String,
    pub entity: String,
    pub hour: usize,
    pub value: f64,
}

/// One directed-edge sample (`flow_fwd`/`flow_bwd`).
#[derive(Debug, Clone, Serialize)]
pub struct FlowRow {
    pub var_name: String,
    pub source: String,
    pub sink: String,
    pub hour: usize,
    pub value: f64,
}

/// One system-wide (non entity-indexed) sample, e.g. `spin_shortfall`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemRow {
    pub component: String,
    pub var_name: String,
    pub hour: usize,
    pub value: f64,
}

/// The on-disk shape of [`SystemRecord::write_snapshot`] (spec section 6's
/// "serialized `SystemRecord` snapshot" infeasibility artifact).
#[derive(Serialize)]
struct SnapshotView<'a> {
    node_rows: &'a [NodeRow],
    flow_rows: &'a [FlowRow],
    system_rows: &'a [SystemRow],
}

struct ThermalMeta {
    name: String,
    min_up_time: usize,
    min_down_time: usize,
}

/// Appends one window's solved variables at a time and derives the next
/// window's initial conditions from the final hour (spec section 4.10).
/// One hour-and-node locational marginal price sample.
#[derive(Debug, Clone, Serialize)]
pub struct LmpRow {
    pub node: String,
    pub hour: usize,
    pub value: f64,
}

pub struct SystemRecord {
    node_rows: Vec<NodeRow>,
    flow_rows: Vec<FlowRow>,
    system_rows: Vec<SystemRow>,
    lmp_rows: Vec<LmpRow>,
    thermal_meta: Vec<ThermalMeta>,
    current: InitialConditions,
}

impl SystemRecord {
    pub fn new(system: &SystemInput) -> Self {
        let thermal_meta = system
            .thermal_units
            .iter()
            .map(|u| ThermalMeta {
                name: u.name.clone(),
                min_up_time: u.min_up_time,
                min_down_time: u.min_down_time,
            })
            .collect();

        let current = InitialConditions::cold_start(
            system.thermal_units.iter().map(|u| u.name.clone()),
            system
                .storage_units
                .iter()
                .map(|u| (u.name.clone(), u.initial_state_of_charge.value())),
        );

        Self {
            node_rows: Vec::new(),
            flow_rows: Vec::new(),
            system_rows: Vec::new(),
            lmp_rows: Vec::new(),
            thermal_meta,
            current,
        }
    }

    pub fn node_rows(&self) -> &[NodeRow] {
        &self.node_rows
    }

    pub fn flow_rows(&self) -> &[FlowRow] {
        &self.flow_rows
    }

    pub fn system_rows(&self) -> &[SystemRow] {
        &self.system_rows
    }

    pub fn lmp_rows(&self) -> &[LmpRow] {
        &self.lmp_rows
    }

    /// Files one window's `PowerSystemModel::solve_for_lmp` result into the
    /// LMP table (spec section 4.8/6), converting the window-relative hour
    /// its keys carry into an absolute hour.
    pub fn append_lmp(&mut self, lmp: &HashMap<String, f64>, k: usize) {
        let mut keys: Vec<&String> = lmp.keys().collect();
        keys.sort();
        for key in keys {
            let value = lmp[key];
            let Some((_, _, node, t)) = parse_key(key) else {
                continue;
            };
            self.lmp_rows.push(LmpRow { node, hour: absolute_hour(t, k), value });
        }
    }

    /// Serializes the long tables to `path` as JSON (spec section 6's
    /// infeasibility artifact: "a serialized `SystemRecord` snapshot").
    pub fn write_snapshot(&self, path: &Path) -> std::io::Result<()> {
        let view = SnapshotView { node_rows: &self.node_rows, flow_rows: &self.flow_rows, system_rows: &self.system_rows };
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &view).map_err(std::io::Error::from)?;
        Ok(())
    }

    /// The initial conditions derived from the most recently appended
    /// window, ready for the next `build`/`update` call.
    pub fn current_init_conditions(&self) -> InitialConditions {
        self.current.clone()
    }

    /// Files one window's solved values into the long tables and re-derives
    /// `current_init_conditions` from its final hour (spec section 4.10).
    pub fn append(&mut self, solution: &HashMap<String, f64>, k: usize, horizon: usize) {
        let mut keys: Vec<&String> = solution.keys().collect();
        keys.sort();

        for key in keys {
            let value = solution[key];
            let Some((component, var_name, entity, t)) = parse_key(key) else {
                continue;
            };
            let hour = absolute_hour(t, k);

            if component == "system" && (var_name == "flow_fwd" || var_name == "flow_bwd") {
                let (source, sink) = entity.split_once("->").unwrap_or((entity.as_str(), ""));
                self.flow_rows.push(FlowRow {
                    var_name,
                    source: source.to_string(),
                    sink: sink.to_string(),
                    hour,
                    value,
                });
            } else if entity.is_empty() {
                self.system_rows.push(SystemRow { component, var_name, hour, value });
            } else {
                self.node_rows.push(NodeRow { component, var_name, entity, hour, value });
            }
        }

        self.current = self.derive_window_init_conditions(solution, horizon);
    }

    fn derive_window_init_conditions(&self, solution: &HashMap<String, f64>, horizon: usize) -> InitialConditions {
        let mut init = self.current.clone();

        for meta in &self.thermal_meta {
            let final_p = read(solution, &var_key("thermal", "p", &meta.name, horizon));
            let final_u = read(solution, &var_key("thermal", "status", &meta.name, horizon));
            let final_v = read(solution, &var_key("thermal", "startup", &meta.name, horizon));
            let final_w = read(solution, &var_key("thermal", "shutdown", &meta.name, horizon));

            let last_startup = last_hour_set(solution, "thermal", "startup", &meta.name, horizon);
            let last_shutdown = last_hour_set(solution, "thermal", "shutdown", &meta.name, horizon);

            let min_on = (meta.min_up_time as isize - (horizon as isize - last_startup)).max(0) as usize;
            let min_off = (meta.min_down_time as isize - (horizon as isize - last_shutdown)).max(0) as usize;

            init.thermal.insert(
                meta.name.clone(),
                pownet_solve::ThermalInitialState {
                    initial_p: final_p,
                    initial_u: final_u,
                    initial_v: final_v,
                    initial_w: final_w,
                    initial_min_on: min_on,
                    initial_min_off: min_off,
                },
            );
        }

        for (name, state) in init.storage.iter_mut() {
            let key = var_key("storage", "charge_state", name, horizon);
            if let Some(&v) = solution.get(&key) {
                state.initial_charge = v;
            }
        }

        init
    }
}

fn read(solution: &HashMap<String, f64>, key: &str) -> f64 {
    solution.get(key).copied().unwrap_or(0.0)
}

/// The latest local hour `1..=horizon` at which `{component}.{var_name}[{unit}@t]`
/// is set, or `-horizon` if none (spec section 4.10).
fn last_hour_set(solution: &HashMap<String, f64>, component: &str, var_name: &str, unit: &str, horizon: usize) -> isize {
    (1..=horizon)
        .filter(|&t| read(solution, &var_key(component, var_name, unit, t)) > 0.5)
        .map(|t| t as isize)
        .max()
        .unwrap_or(-(horizon as isize))
}

fn parse_key(key: &str) -> Option<(String, String, String, usize)> {
    let dot = key.find('.')?;
    let component = key[..dot].to_string();
    let rest = &key[dot + 1..];
    let open = rest.find('[')?;
    let var_name = rest[..open].to_string();
    let rest2 = &rest[open + 1..];
    let at = rest2.find('@')?;
    let entity = rest2[..at].to_string();
    let rest3 = &rest2[at + 1..];
    let close = rest3.find(']')?;
    let t: usize = rest3[..close].parse().ok()?;
    Some((component, var_name, entity, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_keyed_variable() {
        let (c, v, e, t) = parse_key("thermal.status[g1@3]").unwrap();
        assert_eq!((c.as_str(), v.as_str(), e.as_str(), t), ("thermal", "status", "g1", 3));
    }

    #[test]
    fn parses_scalar_variable() {
        let (c, v, e, t) = parse_key("system.spin_shortfall[@5]").unwrap();
        assert_eq!((c.as_str(), v.as_str(), e.as_str(), t), ("system", "spin_shortfall", "", 5));
    }

    #[test]
    fn parses_flow_edge_label() {
        let (c, v, e, t) = parse_key("system.flow_fwd[n1->n2@2]").unwrap();
        assert_eq!(c, "system");
        assert_eq!(v, "flow_fwd");
        assert_eq!(e, "n1->n2");
        assert_eq!(t, 2);
    }

    #[test]
    fn last_hour_set_defaults_to_negative_horizon() {
        let solution: HashMap<String, f64> = HashMap::new();
        assert_eq!(last_hour_set(&solution, "thermal", "startup", "g1", 24), -24);
    }

    #[test]
    fn last_hour_set_finds_latest_match() {
        let mut solution = HashMap::new();
        solution.insert(var_key("thermal", "startup", "g1", 3), 1.0);
        solution.insert(var_key("thermal", "startup", "g1", 10), 1.0);
        assert_eq!(last_hour_set(&solution, "thermal", "startup", "g1", 24), 10);
    }
}

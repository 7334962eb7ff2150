//! Per-unit initial conditions carried across a window boundary
//! (spec section 4.2 "State machine" and section 4.10).

use std::collections::HashMap;

/// One thermal unit's carry-over state at a window boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalInitialState {
    pub initial_p: f64,
    pub initial_u: f64,
    pub initial_v: f64,
    pub initial_w: f64,
    pub initial_min_on: usize,
    pub initial_min_off: usize,
}

/// Storage state of charge carried across a window boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StorageInitialState {
    pub initial_charge: f64,
}

/// Everything a `build`/`update` call needs about the previous window's
/// final hour (spec section 4.10).
#[derive(Debug, Clone, Default)]
pub struct InitialConditions {
    pub thermal: HashMap<String, ThermalInitialState>,
    pub storage: HashMap<String, StorageInitialState>,
}

impl InitialConditions {
    /// Cold-start conditions: every thermal unit off with no carried
    /// min-up/down obligation, every storage unit at its configured initial
    /// state of charge (spec section 4.10).
    pub fn cold_start(
        thermal_names: impl IntoIterator<Item = String>,
        storage_initial: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        let thermal = thermal_names
            .into_iter()
            .map(|name| (name, ThermalInitialState::default()))
            .collect();
        let storage = storage_initial
            .into_iter()
            .map(|(name, soc)| (name, StorageInitialState { initial_charge: soc }))
            .collect();
        Self { thermal, storage }
    }

    pub fn thermal_state(&self, unit: &str) -> ThermalInitialState {
        self.thermal.get(unit).copied().unwrap_or_default()
    }

    pub fn storage_state(&self, unit: &str) -> StorageInitialState {
        self.storage.get(unit).copied().unwrap_or_default()
    }
}

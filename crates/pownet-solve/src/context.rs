//! Shared read-only context threaded into every builder call.

use pownet_core::SystemInput;

/// Window-independent references every builder needs: the system model and
/// the window length. Absolute-hour arithmetic (`t + (k-1)*24`) is done by
/// the builders themselves via `pownet_core::timeseries::absolute_hour`.
pub struct BuildContext<'a> {
    pub system: &'a SystemInput,
}

impl<'a> BuildContext<'a> {
    pub fn new(system: &'a SystemInput) -> Self {
        Self { system }
    }

    pub fn horizon(&self) -> usize {
        self.system.config.sim_horizon
    }
}

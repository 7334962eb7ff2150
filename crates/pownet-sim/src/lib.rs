//! Rolling-horizon simulation driver (spec sections 4.10-4.12): the
//! `SystemRecord` long tables and initial-condition derivation, the
//! `Simulator` loop that repeatedly calls into `pownet-solve`, and the
//! `PowerWaterCoupler`/`ReservoirOperator` power-water feedback loop.

pub mod coupler;
pub mod error;
pub mod record;
pub mod simulator;

pub use coupler::{CouplerReport, PowerWaterCoupler, ReservoirOperator};
pub use error::{SimError, SimResult};
pub use record::{FlowRow, LmpRow, NodeRow, SystemRecord, SystemRow};
pub use simulator::{RoundingOptions, Simulator};

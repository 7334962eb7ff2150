//! Data model for the rolling-horizon power-system cost simulator.
//!
//! This crate covers spec section 3 ("Data model"): nodes and edges, the
//! four generator categories, energy storage, demand, contracts, dense
//! timeseries storage, and `SystemInput`, the validated aggregate every
//! builder in `pownet-solve` reads from. CSV ingestion lives in `pownet-io`;
//! this crate only knows how to hold and validate already-parsed data.

pub mod config;
pub mod contracts;
pub mod demand;
pub mod diagnostics;
pub mod error;
pub mod generators;
pub mod network;
pub mod storage;
pub mod system_input;
pub mod timeseries;
pub mod units;

pub use config::{DcOpfFormulation, SimConfig, SpinRequirement};
pub use contracts::ContractTable;
pub use demand::Demand;
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{PownetError, PownetResult};
pub use generators::{HydroAvailability, HydroUnit, NonDispatchKind, NonDispatchUnit, ThermalUnit};
pub use network::{Cycle, EdgeRecord, Network};
pub use storage::{AttachTarget, StorageUnit};
pub use system_input::SystemInput;
pub use timeseries::{absolute_day, absolute_hour, Resolution, TimeSeriesTable};
pub use units::{Dollars, DollarsPerMwh, Megawatts, MegawattHours};

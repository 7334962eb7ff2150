//! Solver-agnostic MILP/LP model assembly for the rolling-horizon dispatch
//! problem (spec sections 4.1-4.9): one `ComponentBuilder` per generator
//! category plus the cross-cutting `System` builder, composed by
//! `ModelBuilder` and solved through `PowerSystemModel`.

pub mod component;
pub mod context;
pub mod error;
pub mod hydro;
pub mod init_conditions;
pub mod lmp;
pub mod model_builder;
pub mod nondispatch;
pub mod power_system_model;
pub mod registry;
pub mod storage;
pub mod system;
pub mod thermal;

pub use component::ComponentBuilder;
pub use context::BuildContext;
pub use error::{BuildError, BuildResult, SolveError, SolveResult};
pub use hydro::HydroBuilder;
pub use init_conditions::{InitialConditions, StorageInitialState, ThermalInitialState};
pub use lmp::LmpCandidate;
pub use model_builder::{AssembledModel, ModelBuilder};
pub use nondispatch::NonDispatchBuilder;
pub use power_system_model::{PowerSystemModel, SolveOptions, SolveStatus};
pub use registry::{var_key, var_key_scalar, VariableRegistry};
pub use storage::StorageBuilder;
pub use system::SystemBuilder;
pub use thermal::ThermalBuilder;

//! Errors raised while assembling or solving a window's MILP (spec section 7:
//! "Model assembly errors" and "Solver-side infeasibility").

use thiserror::Error;

/// Raised while a [`crate::ModelBuilder`] assembles or updates a window.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unknown DC-OPF formulation name: {0}")]
    UnknownDcOpfFormulation(String),

    #[error("unit '{unit}' is attached to unknown node '{node}'")]
    UnknownNode { unit: String, node: String },

    #[error("cycle map references a non-edge ({0}, {1})")]
    CycleReferencesNonEdge(String, String),

    #[error("variable '{0}' was not found in the registry")]
    MissingVariable(String),

    #[error(transparent)]
    Core(#[from] pownet_core::PownetError),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Raised by [`crate::PowerSystemModel`] while solving.
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("solver reported infeasible")]
    Infeasible,

    #[error("solver reported infeasible-or-unbounded")]
    InfeasibleOrUnbounded,

    #[error("solver reported unbounded")]
    Unbounded,

    #[error("solver hit the time limit with no incumbent solution")]
    TimeLimitNoIncumbent,

    #[error("rounding heuristic exhausted max_iter without an integer solution and the MILP fallback failed: {0}")]
    RoundingFallbackFailed(String),

    #[error("underlying solver error: {0}")]
    Solver(String),

    #[error("I/O error writing solver artifact: {0}")]
    Io(#[from] std::io::Error),
}

pub type SolveResult<T> = Result<T, SolveError>;

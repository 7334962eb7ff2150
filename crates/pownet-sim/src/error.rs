//! Errors raised while driving the rolling-horizon simulation (spec section
//! 7: "Solver-side infeasibility" and "Coupler non-convergence").

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("window {window} is infeasible")]
    Infeasible { window: usize },

    #[error("power-water coupler did not converge within {max_iter} iterations at window {window}")]
    CouplerDidNotConverge { window: usize, max_iter: usize },

    #[error(transparent)]
    Build(#[from] pownet_solve::BuildError),

    #[error(transparent)]
    Solve(#[from] pownet_solve::SolveError),

    #[error(transparent)]
    Core(#[from] pownet_core::PownetError),

    #[error("I/O error writing infeasibility artifact: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;

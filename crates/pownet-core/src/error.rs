//! Error types for the data-model / validation layer.
//!
//! `PownetError` covers spec section 7's "input validation errors": things
//! wrong with a `SystemInput` before any MILP is ever built. Model-assembly
//! and solver errors live closer to where they're raised, in `pownet-solve`
//! and `pownet-sim`, and convert into an `anyhow::Error` at the CLI boundary.

use thiserror::Error;

/// Errors raised while constructing or validating a [`crate::SystemInput`].
#[derive(Error, Debug)]
pub enum PownetError {
    /// I/O errors reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A timeseries or config value could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A load-time invariant from spec section 3 was violated. Carries the
    /// offending field/unit name so the user-visible diagnostic can point at
    /// it directly (spec section 7's "name the failing field/unit").
    #[error("validation error in {field}: {message}")]
    Validation { field: String, message: String },
}

pub type PownetResult<T> = Result<T, PownetError>;

impl PownetError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PownetError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = PownetError::validation("thermal_unit.min_up_time", "must be positive");
        assert!(err.to_string().contains("thermal_unit.min_up_time"));
        assert!(err.to_string().contains("must be positive"));
    }
}

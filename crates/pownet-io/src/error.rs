//! Errors raised while reading a model folder (spec section 7's "Input
//! validation errors" subset covering missing files and CSV/JSON parse
//! failures; the bounds/length checks themselves live in
//! `pownet_core::SystemInput::validate`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("missing required input file: {0}")]
    MissingFile(std::path::PathBuf),

    #[error("error reading {path}: {source}")]
    Csv {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("error reading {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed header in {path}: {message}")]
    Header { path: std::path::PathBuf, message: String },

    #[error(transparent)]
    Core(#[from] pownet_core::PownetError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type IoResult<T> = Result<T, IoError>;

//! CSV/JSON ingestion and output-artifact writing for the model folder
//! layout in spec section 6 ("CSV ingestion and dataframe hygiene" — treated
//! as an external collaborator in spec section 1, so this crate stays a
//! thin, purpose-built reader/writer rather than a general-purpose
//! dataframe toolkit).

pub mod contracts;
pub mod csv_util;
pub mod demand;
pub mod error;
pub mod hydro;
pub mod network;
pub mod nondispatch;
pub mod nondispatch_registry;
pub mod storage;
pub mod system;
pub mod thermal;
pub mod writer;

pub use error::{IoError, IoResult};
pub use system::load_system_input;
pub use writer::{write_long_form_csv, write_lmp_csv, LongFormRow};

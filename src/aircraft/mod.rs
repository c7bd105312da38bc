mod catalog;

pub use catalog::{AircraftId, AircraftSpec};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AircraftError {
    #[error("Unknown aircraft '{0}'")]
    UnknownAircraft(String),

    #[error("Model for aircraft {aircraft} not found at {path}")]
    ModelNotFound { aircraft: String, path: PathBuf },

    #[error("Model for aircraft {aircraft} could not be parsed: {reason}")]
    ModelParse { aircraft: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

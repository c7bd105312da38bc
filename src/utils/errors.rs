use std::io;
use thiserror::Error;

use crate::{
    aircraft::AircraftError, physics::EngineError, properties::PropertyError,
    render::RenderError, simulation::TrimError, tasks::TaskError,
};

/// Top-level error surfaced by the environment facade.
///
/// Construction-time failures (unknown id, missing model asset, bad config)
/// are returned before any engine resources are allocated. Per-step
/// simulation failures never appear here: they end the episode instead.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Unknown environment id '{id}': {reason}")]
    UnknownEnvironmentId { id: String, reason: String },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Render mode '{requested}' is not supported by this environment (configured: '{configured}')")]
    UnsupportedRenderMode {
        requested: String,
        configured: String,
    },

    #[error("step() called before reset()")]
    ResetRequired,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Aircraft load error: {0}")]
    AircraftLoad(#[from] AircraftError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Trim error: {0}")]
    Trim(#[from] TrimError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type EnvResult<T> = Result<T, EnvError>;

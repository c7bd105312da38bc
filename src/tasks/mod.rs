mod base;
mod kind;
mod termination;

pub use base::{EpisodeState, FlightTask, TaskPhase, TaskStep, TaskTargets};
pub use kind::{
    TaskKind, ACTIONS, BASE_OBSERVATION, NAVIGATION_POINT_EAST_FT, NAVIGATION_POINT_NORTH_FT,
    TRAJECTORY_OBSERVATION,
};
pub use termination::{
    check_arrival, check_bounds, terminal_penalty, TerminalReason, CRASH_ALTITUDE_FT,
    MAX_ABS_PITCH_DEG, MAX_ABS_ROLL_DEG, MAX_ALTITUDE_DEVIATION_FT, NAVIGATION_TOLERANCE_FT,
};

use thiserror::Error;

use crate::properties::PropertyError;
use crate::rewards::Shaping;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("{task} does not support {shaping}")]
    UnsupportedShaping { task: String, shaping: Shaping },

    #[error("Episode length must be at least one agent step")]
    InvalidEpisodeLength,

    #[error("No episode in progress")]
    NoEpisode,

    #[error(transparent)]
    Property(#[from] PropertyError),
}

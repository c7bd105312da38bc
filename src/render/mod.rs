//! Visualization bridge: a 2D figure and a FlightGear UDP link.

mod figure;
mod flightgear;

pub use figure::{FigureVisualiser, FIGURE_HEIGHT, FIGURE_WIDTH};
pub use flightgear::{
    flightgear_args, format_packet, launch_flightgear, FlightGearConfig, FlightGearLink,
    RealTimePacer, DEFAULT_FLIGHTGEAR_ADDR,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

use crate::properties::{catalog, PropertySnapshot};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown render mode '{0}'")]
    UnsupportedMode(String),

    #[error("Visualization link to {0} was lost")]
    ConnectionLost(String),

    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// How an environment presents itself. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    None,
    Human,
    FlightGear,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::None => "none",
            RenderMode::Human => "human",
            RenderMode::FlightGear => "flightgear",
        }
    }

    /// Modes `render` accepts once the environment was built with `self`.
    ///
    /// FlightGear environments can also draw the 2D figure.
    pub fn allows(&self, requested: RenderMode) -> bool {
        match self {
            RenderMode::None => false,
            RenderMode::Human => requested == RenderMode::Human,
            RenderMode::FlightGear => requested != RenderMode::None,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(RenderMode::None),
            "human" => Ok(RenderMode::Human),
            "flightgear" => Ok(RenderMode::FlightGear),
            _ => Err(RenderError::UnsupportedMode(s.to_string())),
        }
    }
}

/// Raw RGBA image (premultiplied alpha, row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// The slice of aircraft state the visualisers draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderState {
    pub sim_time_s: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_ft: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub heading_deg: f64,
    pub target_track_deg: f64,
    pub altitude_error_ft: f64,
    pub track_error_deg: f64,
    pub aileron: f64,
    pub elevator: f64,
    pub rudder: f64,
    pub throttle: f64,
}

impl RenderState {
    pub fn from_snapshot(snapshot: &PropertySnapshot) -> Self {
        let value = |id| {
            let v = snapshot.get(id);
            if v.is_finite() {
                v
            } else {
                0.0
            }
        };
        Self {
            sim_time_s: value(catalog::SIM_TIME_S),
            latitude_deg: value(catalog::LATITUDE_DEG),
            longitude_deg: value(catalog::LONGITUDE_DEG),
            altitude_ft: value(catalog::ALTITUDE_SL_FT),
            roll_deg: value(catalog::ROLL_RAD).to_degrees(),
            pitch_deg: value(catalog::PITCH_RAD).to_degrees(),
            heading_deg: value(catalog::HEADING_DEG),
            target_track_deg: value(catalog::TARGET_TRACK_DEG),
            altitude_error_ft: value(catalog::ALTITUDE_ERROR_FT),
            track_error_deg: value(catalog::TRACK_ERROR_DEG),
            aileron: value(catalog::AILERON_CMD),
            elevator: value(catalog::ELEVATOR_CMD),
            rudder: value(catalog::RUDDER_CMD),
            throttle: value(catalog::THROTTLE_CMD),
        }
    }
}

use serde::Serialize;
use std::fmt;

use crate::properties::{catalog, PropertySnapshot};

pub const MAX_ALTITUDE_DEVIATION_FT: f64 = 1000.0;
pub const CRASH_ALTITUDE_FT: f64 = 100.0;
pub const MAX_ABS_PITCH_DEG: f64 = 75.0;
pub const MAX_ABS_ROLL_DEG: f64 = 150.0;
pub const NAVIGATION_TOLERANCE_FT: f64 = 50.0;

/// Why an episode ended early.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalReason {
    Crash { altitude_ft: f64 },
    AltitudeDeviation { altitude_error_ft: f64 },
    ExtremeAttitude { pitch_deg: f64, roll_deg: f64 },
    SimulationFailure { detail: String },
    ArrivedAtTarget { position_error_ft: f64 },
}

impl TerminalReason {
    pub fn code(&self) -> &'static str {
        match self {
            TerminalReason::Crash { .. } => "crash",
            TerminalReason::AltitudeDeviation { .. } => "altitude_deviation",
            TerminalReason::ExtremeAttitude { .. } => "extreme_attitude",
            TerminalReason::SimulationFailure { .. } => "simulation_failure",
            TerminalReason::ArrivedAtTarget { .. } => "arrived_at_target",
        }
    }

    /// Failures forfeit the remaining steps; arrival does not.
    pub fn is_failure(&self) -> bool {
        !matches!(self, TerminalReason::ArrivedAtTarget { .. })
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalReason::Crash { altitude_ft } => {
                write!(f, "altitude {:.0} ft below crash altitude", altitude_ft)
            }
            TerminalReason::AltitudeDeviation { altitude_error_ft } => {
                write!(f, "altitude error {:.0} ft out of bounds", altitude_error_ft)
            }
            TerminalReason::ExtremeAttitude {
                pitch_deg,
                roll_deg,
            } => write!(f, "extreme attitude (pitch {:.1}°, roll {:.1}°)", pitch_deg, roll_deg),
            TerminalReason::SimulationFailure { detail } => {
                write!(f, "simulation failure: {}", detail)
            }
            TerminalReason::ArrivedAtTarget { position_error_ft } => {
                write!(f, "arrived within {:.0} ft of the navigation point", position_error_ft)
            }
        }
    }
}

/// Out-of-bounds check on a freshly captured snapshot.
pub fn check_bounds(snapshot: &PropertySnapshot) -> Option<TerminalReason> {
    let altitude_ft = snapshot.get(catalog::ALTITUDE_SL_FT);
    if altitude_ft < CRASH_ALTITUDE_FT {
        return Some(TerminalReason::Crash { altitude_ft });
    }

    let altitude_error_ft = snapshot.get(catalog::ALTITUDE_ERROR_FT);
    if altitude_error_ft.abs() > MAX_ALTITUDE_DEVIATION_FT {
        return Some(TerminalReason::AltitudeDeviation { altitude_error_ft });
    }

    let pitch_deg = snapshot.get(catalog::PITCH_RAD).to_degrees();
    let roll_deg = snapshot.get(catalog::ROLL_RAD).to_degrees();
    if pitch_deg.abs() > MAX_ABS_PITCH_DEG || roll_deg.abs() > MAX_ABS_ROLL_DEG {
        return Some(TerminalReason::ExtremeAttitude {
            pitch_deg,
            roll_deg,
        });
    }
    None
}

/// Success check for navigation tasks, run after [`check_bounds`].
pub fn check_arrival(snapshot: &PropertySnapshot) -> Option<TerminalReason> {
    let position_error_ft = snapshot.get(catalog::POSITION_ERROR_FT);
    (position_error_ft < NAVIGATION_TOLERANCE_FT)
        .then_some(TerminalReason::ArrivedAtTarget { position_error_ft })
}

/// Reward replacing the step reward on termination: -1 for this and every remaining step.
pub fn terminal_penalty(steps_left: u64) -> f64 {
    -(1.0 + steps_left as f64)
}

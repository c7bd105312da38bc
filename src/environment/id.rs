use std::fmt;
use std::str::FromStr;

use crate::aircraft::AircraftId;
use crate::render::RenderMode;
use crate::rewards::Shaping;
use crate::tasks::TaskKind;
use crate::utils::EnvError;

const VERSION: &str = "v0";
const FLIGHTGEAR_ON: &str = "FG";
const FLIGHTGEAR_OFF: &str = "NoFG";

/// Parsed environment identifier, `{aircraft}-{task}-{shaping}-{FG|NoFG}-v0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId {
    pub aircraft: AircraftId,
    pub task: TaskKind,
    pub shaping: Shaping,
    pub flightgear: bool,
}

impl EnvId {
    pub fn new(aircraft: AircraftId, task: TaskKind, shaping: Shaping, flightgear: bool) -> Self {
        Self {
            aircraft,
            task,
            shaping,
            flightgear,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.flightgear {
            RenderMode::FlightGear
        } else {
            RenderMode::None
        }
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.aircraft,
            self.task,
            self.shaping,
            if self.flightgear {
                FLIGHTGEAR_ON
            } else {
                FLIGHTGEAR_OFF
            },
            VERSION
        )
    }
}

impl FromStr for EnvId {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = |reason: String| EnvError::UnknownEnvironmentId {
            id: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('-').collect();
        let [aircraft, task, shaping, flightgear, version] = parts[..] else {
            return Err(unknown(format!(
                "expected 5 '-'-separated components, found {}",
                parts.len()
            )));
        };

        if version != VERSION {
            return Err(unknown(format!("unsupported version '{}'", version)));
        }
        let aircraft = aircraft
            .parse::<AircraftId>()
            .map_err(|e| unknown(e.to_string()))?;
        let task = task.parse::<TaskKind>().map_err(|e| unknown(e.to_string()))?;
        let shaping = shaping.parse::<Shaping>().map_err(unknown)?;
        let flightgear = match flightgear {
            FLIGHTGEAR_ON => true,
            FLIGHTGEAR_OFF => false,
            other => {
                return Err(unknown(format!(
                    "visualisation flag must be '{}' or '{}', found '{}'",
                    FLIGHTGEAR_ON, FLIGHTGEAR_OFF, other
                )))
            }
        };

        if !task.supports(shaping) {
            return Err(unknown(format!("{} is not offered with {}", task, shaping)));
        }

        Ok(EnvId {
            aircraft,
            task,
            shaping,
            flightgear,
        })
    }
}

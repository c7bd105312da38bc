use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftSpec;
use crate::properties::{catalog, PropertyId};

/// Default starting altitude, also the altitude target of the heading tasks.
pub const INITIAL_ALTITUDE_FT: f64 = 5000.0;
pub const INITIAL_HEADING_DEG: f64 = 270.0;
pub const INITIAL_LATITUDE_DEG: f64 = 51.3781;
pub const INITIAL_LONGITUDE_DEG: f64 = -2.3273;

/// Starting state written to the engine's `ic/*` properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub altitude_ft: f64,
    pub heading_deg: f64,
    pub u_fps: f64,
    pub v_fps: f64,
    pub w_fps: f64,
    pub p_radps: f64,
    pub q_radps: f64,
    pub r_radps: f64,
    pub pitch_rad: f64,
    pub roll_rad: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl InitialConditions {
    /// Straight and level at cruise speed, heading west.
    pub fn for_aircraft(aircraft: &AircraftSpec) -> Self {
        Self {
            altitude_ft: INITIAL_ALTITUDE_FT,
            heading_deg: INITIAL_HEADING_DEG,
            u_fps: aircraft.cruise_speed_fps(),
            v_fps: 0.0,
            w_fps: 0.0,
            p_radps: 0.0,
            q_radps: 0.0,
            r_radps: 0.0,
            pitch_rad: 0.0,
            roll_rad: 0.0,
            latitude_deg: INITIAL_LATITUDE_DEG,
            longitude_deg: INITIAL_LONGITUDE_DEG,
        }
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }

    pub(crate) fn properties(&self) -> [(PropertyId, f64); 12] {
        [
            (catalog::IC_ALTITUDE_FT, self.altitude_ft),
            (catalog::IC_HEADING_DEG, self.heading_deg),
            (catalog::IC_U_FPS, self.u_fps),
            (catalog::IC_V_FPS, self.v_fps),
            (catalog::IC_W_FPS, self.w_fps),
            (catalog::IC_P_RADPS, self.p_radps),
            (catalog::IC_Q_RADPS, self.q_radps),
            (catalog::IC_R_RADPS, self.r_radps),
            (catalog::IC_PITCH_RAD, self.pitch_rad),
            (catalog::IC_ROLL_RAD, self.roll_rad),
            (catalog::IC_LATITUDE_DEG, self.latitude_deg),
            (catalog::IC_LONGITUDE_DEG, self.longitude_deg),
        ]
    }
}

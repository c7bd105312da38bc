//! Process-wide property catalog.
//!
//! Every property the environment touches is declared once here with its
//! engine identifier, unit and valid range. The catalog is immutable and shared
//! by all environment instances without locking.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use super::descriptor::{PropertyDescriptor, PropertyId, PropertyKind, Unit};
use super::PropertyError;

macro_rules! property_catalog {
    ($(
        $konst:ident => ($name:literal, $engine:literal, $desc:literal, $unit:ident, $kind:ident, $min:expr, $max:expr)
    ),+ $(,)?) => {
        #[allow(non_camel_case_types, dead_code)]
        #[repr(u16)]
        enum Slot {
            $($konst),+
        }

        $(
            pub const $konst: PropertyId = PropertyId(Slot::$konst as u16);
        )+

        static DESCRIPTORS: &[PropertyDescriptor] = &[
            $(
                PropertyDescriptor {
                    semantic_name: $name,
                    engine_id: $engine,
                    description: $desc,
                    unit: Unit::$unit,
                    kind: PropertyKind::$kind,
                    min: $min,
                    max: $max,
                }
            ),+
        ];
    };
}

property_catalog! {
    // position and attitude
    ALTITUDE_SL_FT => ("altitude", "position/h-sl-ft", "altitude above mean sea level", Feet, State, -1400.0, 85000.0),
    PITCH_RAD => ("pitch", "attitude/pitch-rad", "pitch angle", Radians, State, -FRAC_PI_2, FRAC_PI_2),
    ROLL_RAD => ("roll", "attitude/roll-rad", "roll angle", Radians, State, -PI, PI),
    HEADING_DEG => ("heading", "attitude/psi-deg", "true heading", Degrees, State, 0.0, 360.0),
    SIDESLIP_DEG => ("sideslip", "aero/beta-deg", "sideslip angle", Degrees, State, -180.0, 180.0),
    LATITUDE_DEG => ("latitude", "position/lat-geod-deg", "geodetic latitude", Degrees, State, -90.0, 90.0),
    LONGITUDE_DEG => ("longitude", "position/long-gc-deg", "geocentric longitude", Degrees, State, -180.0, 180.0),
    NORTH_FT => ("position_north", "position/distance-north-ft", "distance north of the initial position", Feet, State, -1.0e6, 1.0e6),
    EAST_FT => ("position_east", "position/distance-east-ft", "distance east of the initial position", Feet, State, -1.0e6, 1.0e6),

    // body-frame velocities and rates
    U_FPS => ("u", "velocities/u-fps", "body frame x-axis velocity", FeetPerSecond, State, -2200.0, 2200.0),
    V_FPS => ("v", "velocities/v-fps", "body frame y-axis velocity", FeetPerSecond, State, -2200.0, 2200.0),
    W_FPS => ("w", "velocities/w-fps", "body frame z-axis velocity", FeetPerSecond, State, -2200.0, 2200.0),
    P_RADPS => ("roll_rate", "velocities/p-rad_sec", "roll rate", RadiansPerSecond, State, -2.0 * PI, 2.0 * PI),
    Q_RADPS => ("pitch_rate", "velocities/q-rad_sec", "pitch rate", RadiansPerSecond, State, -2.0 * PI, 2.0 * PI),
    R_RADPS => ("yaw_rate", "velocities/r-rad_sec", "yaw rate", RadiansPerSecond, State, -2.0 * PI, 2.0 * PI),
    VERTICAL_SPEED_FPS => ("vertical_speed", "velocities/h-dot-fps", "rate of climb", FeetPerSecond, State, -2200.0, 2200.0),

    // body-frame accelerations, used by trim
    UDOT_FPS2 => ("u_acceleration", "accelerations/udot-ft_sec2", "body x-axis acceleration", FeetPerSecondSquared, State, -4000.0, 4000.0),
    VDOT_FPS2 => ("v_acceleration", "accelerations/vdot-ft_sec2", "body y-axis acceleration", FeetPerSecondSquared, State, -4000.0, 4000.0),
    WDOT_FPS2 => ("w_acceleration", "accelerations/wdot-ft_sec2", "body z-axis acceleration", FeetPerSecondSquared, State, -4000.0, 4000.0),
    PDOT_RADPS2 => ("roll_acceleration", "accelerations/pdot-rad_sec2", "roll acceleration", RadiansPerSecondSquared, State, -100.0, 100.0),
    QDOT_RADPS2 => ("pitch_acceleration", "accelerations/qdot-rad_sec2", "pitch acceleration", RadiansPerSecondSquared, State, -100.0, 100.0),
    RDOT_RADPS2 => ("yaw_acceleration", "accelerations/rdot-rad_sec2", "yaw acceleration", RadiansPerSecondSquared, State, -100.0, 100.0),

    SIM_TIME_S => ("sim_time", "simulation/sim-time-sec", "simulation time", Seconds, State, 0.0, f64::INFINITY),

    // flight control commands
    AILERON_CMD => ("aileron_cmd", "fcs/aileron-cmd-norm", "aileron commanded position", Normalised, Actuator, -1.0, 1.0),
    ELEVATOR_CMD => ("elevator_cmd", "fcs/elevator-cmd-norm", "elevator commanded position", Normalised, Actuator, -1.0, 1.0),
    RUDDER_CMD => ("rudder_cmd", "fcs/rudder-cmd-norm", "rudder commanded position", Normalised, Actuator, -1.0, 1.0),
    THROTTLE_CMD => ("throttle_cmd", "fcs/throttle-cmd-norm", "throttle commanded position", Normalised, Actuator, 0.0, 1.0),
    MIXTURE_CMD => ("mixture_cmd", "fcs/mixture-cmd-norm", "engine mixture setting", Normalised, Actuator, 0.0, 1.0),
    ENGINE_RUNNING => ("engine_running", "propulsion/set-running", "engine running (-1 for all engines)", Dimensionless, Actuator, -1.0, 1.0),

    // initial conditions
    IC_ALTITUDE_FT => ("initial_altitude", "ic/h-sl-ft", "initial altitude MSL", Feet, InitialCondition, -1400.0, 85000.0),
    IC_HEADING_DEG => ("initial_heading", "ic/psi-true-deg", "initial true heading", Degrees, InitialCondition, 0.0, 360.0),
    IC_PITCH_RAD => ("initial_pitch", "ic/theta-rad", "initial pitch angle", Radians, InitialCondition, -FRAC_PI_2, FRAC_PI_2),
    IC_ROLL_RAD => ("initial_roll", "ic/phi-rad", "initial roll angle", Radians, InitialCondition, -PI, PI),
    IC_U_FPS => ("initial_u", "ic/u-fps", "initial body x-axis velocity", FeetPerSecond, InitialCondition, -2200.0, 2200.0),
    IC_V_FPS => ("initial_v", "ic/v-fps", "initial body y-axis velocity", FeetPerSecond, InitialCondition, -2200.0, 2200.0),
    IC_W_FPS => ("initial_w", "ic/w-fps", "initial body z-axis velocity", FeetPerSecond, InitialCondition, -2200.0, 2200.0),
    IC_P_RADPS => ("initial_roll_rate", "ic/p-rad_sec", "initial roll rate", RadiansPerSecond, InitialCondition, -2.0 * PI, 2.0 * PI),
    IC_Q_RADPS => ("initial_pitch_rate", "ic/q-rad_sec", "initial pitch rate", RadiansPerSecond, InitialCondition, -2.0 * PI, 2.0 * PI),
    IC_R_RADPS => ("initial_yaw_rate", "ic/r-rad_sec", "initial yaw rate", RadiansPerSecond, InitialCondition, -2.0 * PI, 2.0 * PI),
    IC_LATITUDE_DEG => ("initial_latitude", "ic/lat-geod-deg", "initial geodetic latitude", Degrees, InitialCondition, -90.0, 90.0),
    IC_LONGITUDE_DEG => ("initial_longitude", "ic/long-gc-deg", "initial geocentric longitude", Degrees, InitialCondition, -180.0, 180.0),

    // task-owned values
    ALTITUDE_ERROR_FT => ("altitude_error", "error/altitude-error-ft", "error to desired altitude", Feet, Derived, -1400.0, 85000.0),
    TRACK_ERROR_DEG => ("track_error", "error/track-error-deg", "error to desired track", Degrees, Derived, -180.0, 180.0),
    TARGET_TRACK_DEG => ("target_track", "target/track-deg", "desired heading", Degrees, Derived, 0.0, 360.0),
    TARGET_ALTITUDE_FT => ("target_altitude", "target/altitude-ft", "desired altitude MSL", Feet, Derived, -1400.0, 85000.0),
    POSITION_ERROR_FT => ("position_error", "error/position-error-ft", "horizontal distance to the navigation point", Feet, Derived, 0.0, 20000.0),
    TARGET_NORTH_FT => ("target_north", "target/position-north-ft", "navigation point north of the initial position", Feet, Derived, -1.0e6, 1.0e6),
    TARGET_EAST_FT => ("target_east", "target/position-east-ft", "navigation point east of the initial position", Feet, Derived, -1.0e6, 1.0e6),
    STEPS_LEFT => ("steps_left", "info/steps_left", "steps remaining in episode", Count, Derived, 0.0, f64::INFINITY),
}

fn name_index() -> &'static HashMap<&'static str, PropertyId> {
    static INDEX: OnceLock<HashMap<&'static str, PropertyId>> = OnceLock::new();
    INDEX.get_or_init(|| {
        DESCRIPTORS
            .iter()
            .enumerate()
            .map(|(i, d)| (d.semantic_name, PropertyId(i as u16)))
            .collect()
    })
}

/// Resolve a semantic name such as `"altitude"` or `"roll_rate"`.
pub fn resolve(semantic_name: &str) -> Result<PropertyId, PropertyError> {
    name_index()
        .get(semantic_name)
        .copied()
        .ok_or_else(|| PropertyError::Unknown(semantic_name.to_string()))
}

/// Resolve a semantic name straight to its descriptor.
pub fn resolve_descriptor(
    semantic_name: &str,
) -> Result<&'static PropertyDescriptor, PropertyError> {
    resolve(semantic_name).map(descriptor)
}

/// Look up an engine identifier such as `"position/h-sl-ft"`.
pub fn resolve_engine_id(engine_id: &str) -> Result<PropertyId, PropertyError> {
    DESCRIPTORS
        .iter()
        .position(|d| d.engine_id == engine_id)
        .map(|i| PropertyId(i as u16))
        .ok_or_else(|| PropertyError::Unknown(engine_id.to_string()))
}

/// Descriptor for an already-resolved id.
#[inline]
pub fn descriptor(id: PropertyId) -> &'static PropertyDescriptor {
    &DESCRIPTORS[id.index()]
}

pub fn len() -> usize {
    DESCRIPTORS.len()
}

pub fn all() -> impl Iterator<Item = (PropertyId, &'static PropertyDescriptor)> {
    DESCRIPTORS
        .iter()
        .enumerate()
        .map(|(i, d)| (PropertyId(i as u16), d))
}

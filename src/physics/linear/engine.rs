use nalgebra::{Rotation3, SVector, Vector3};
use tracing::{debug, info};

use super::model::LinearModel;
use crate::physics::{EngineError, FlightDynamics, ModelReference, PropertySlot};
use crate::utils::{deg_to_rad, rad_to_deg, wrap_heading_deg, EARTH_RADIUS_FT, GRAVITY_FPS2};

type StateVector = SVector<f64, 12>;

const U: usize = 0;
const V: usize = 1;
const W: usize = 2;
const P: usize = 3;
const Q: usize = 4;
const R: usize = 5;
const PHI: usize = 6;
const THETA: usize = 7;
const PSI: usize = 8;
const NORTH: usize = 9;
const EAST: usize = 10;
const H: usize = 11;

/// Mixture below which the engine produces no thrust.
const MIXTURE_CUTOFF: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    State(usize),
    Derivative(usize),
    Heading,
    Sideslip,
    Latitude,
    Longitude,
    VerticalSpeed,
    SimTime,
    Aileron,
    Elevator,
    Rudder,
    Throttle,
    Mixture,
    Running,
    IcAltitude,
    IcHeading,
    IcPitch,
    IcRoll,
    IcU,
    IcV,
    IcW,
    IcP,
    IcQ,
    IcR,
    IcLatitude,
    IcLongitude,
}

const BINDINGS: &[(&str, Binding)] = &[
    ("position/h-sl-ft", Binding::State(H)),
    ("attitude/pitch-rad", Binding::State(THETA)),
    ("attitude/roll-rad", Binding::State(PHI)),
    ("attitude/psi-deg", Binding::Heading),
    ("aero/beta-deg", Binding::Sideslip),
    ("position/lat-geod-deg", Binding::Latitude),
    ("position/long-gc-deg", Binding::Longitude),
    ("position/distance-north-ft", Binding::State(NORTH)),
    ("position/distance-east-ft", Binding::State(EAST)),
    ("velocities/u-fps", Binding::State(U)),
    ("velocities/v-fps", Binding::State(V)),
    ("velocities/w-fps", Binding::State(W)),
    ("velocities/p-rad_sec", Binding::State(P)),
    ("velocities/q-rad_sec", Binding::State(Q)),
    ("velocities/r-rad_sec", Binding::State(R)),
    ("velocities/h-dot-fps", Binding::VerticalSpeed),
    ("accelerations/udot-ft_sec2", Binding::Derivative(U)),
    ("accelerations/vdot-ft_sec2", Binding::Derivative(V)),
    ("accelerations/wdot-ft_sec2", Binding::Derivative(W)),
    ("accelerations/pdot-rad_sec2", Binding::Derivative(P)),
    ("accelerations/qdot-rad_sec2", Binding::Derivative(Q)),
    ("accelerations/rdot-rad_sec2", Binding::Derivative(R)),
    ("simulation/sim-time-sec", Binding::SimTime),
    ("fcs/aileron-cmd-norm", Binding::Aileron),
    ("fcs/elevator-cmd-norm", Binding::Elevator),
    ("fcs/rudder-cmd-norm", Binding::Rudder),
    ("fcs/throttle-cmd-norm", Binding::Throttle),
    ("fcs/mixture-cmd-norm", Binding::Mixture),
    ("propulsion/set-running", Binding::Running),
    ("ic/h-sl-ft", Binding::IcAltitude),
    ("ic/psi-true-deg", Binding::IcHeading),
    ("ic/theta-rad", Binding::IcPitch),
    ("ic/phi-rad", Binding::IcRoll),
    ("ic/u-fps", Binding::IcU),
    ("ic/v-fps", Binding::IcV),
    ("ic/w-fps", Binding::IcW),
    ("ic/p-rad_sec", Binding::IcP),
    ("ic/q-rad_sec", Binding::IcQ),
    ("ic/r-rad_sec", Binding::IcR),
    ("ic/lat-geod-deg", Binding::IcLatitude),
    ("ic/long-gc-deg", Binding::IcLongitude),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Controls {
    aileron: f64,
    elevator: f64,
    rudder: f64,
    throttle: f64,
    mixture: f64,
    running: bool,
}

impl Controls {
    fn effective_throttle(&self) -> f64 {
        if self.running && self.mixture > MIXTURE_CUTOFF {
            self.throttle
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct InitialValues {
    altitude_ft: f64,
    heading_deg: f64,
    pitch_rad: f64,
    roll_rad: f64,
    u_fps: f64,
    v_fps: f64,
    w_fps: f64,
    p_radps: f64,
    q_radps: f64,
    r_radps: f64,
    latitude_deg: f64,
    longitude_deg: f64,
}

/// Small-perturbation fixed-wing engine.
///
/// Forces and moments come from dimensional stability derivatives about the
/// model's reference condition; gravity, Euler kinematics and navigation are
/// nonlinear. Integrated with fixed-step RK4.
pub struct LinearEngine {
    model: Option<LinearModel>,
    state: StateVector,
    derivative: StateVector,
    controls: Controls,
    ic: InitialValues,
    origin: (f64, f64),
    dt: f64,
    sim_time: f64,
}

impl Default for LinearEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearEngine {
    pub fn new() -> Self {
        Self {
            model: None,
            state: StateVector::zeros(),
            derivative: StateVector::zeros(),
            controls: Controls::default(),
            ic: InitialValues::default(),
            origin: (0.0, 0.0),
            dt: 1.0 / crate::utils::DEFAULT_ENGINE_HZ as f64,
            sim_time: 0.0,
        }
    }

    /// Engine with a model already in place, skipping the file lookup.
    pub fn with_model(model: LinearModel) -> Self {
        let mut engine = Self::new();
        engine.model = Some(model);
        engine
    }

    pub fn model(&self) -> Option<&LinearModel> {
        self.model.as_ref()
    }

    fn loaded_model(&self) -> Result<&LinearModel, EngineError> {
        self.model.as_ref().ok_or(EngineError::NotLoaded)
    }

    fn check_finite(&self, x: &StateVector) -> Result<(), EngineError> {
        match x.iter().position(|v| !v.is_finite()) {
            None => Ok(()),
            Some(i) => Err(EngineError::Diverged {
                sim_time: self.sim_time,
                detail: format!("state component {} is {}", i, x[i]),
            }),
        }
    }

    fn airspeed(&self) -> f64 {
        Vector3::new(self.state[U], self.state[V], self.state[W]).norm()
    }
}

/// State derivative of the small-perturbation model.
fn derivatives(model: &LinearModel, x: &StateVector, controls: &Controls) -> StateVector {
    let g = GRAVITY_FPS2;
    let reference = &model.reference;
    let lon = &model.longitudinal;
    let lat = &model.lateral;

    let u0 = reference.airspeed_fps;
    let theta0 = reference.alpha_rad;
    let du = x[U] - u0;
    let dw = x[W] - model.reference_w_fps();
    let d_elevator = controls.elevator - reference.elevator;
    let d_throttle = controls.effective_throttle() - reference.throttle;

    let (phi, theta, psi) = (x[PHI], x[THETA], x[PSI]);
    let (p, q, r) = (x[P], x[Q], x[R]);
    let (s_phi, c_phi) = phi.sin_cos();
    let (s_theta, c_theta) = theta.sin_cos();

    let mut dx = StateVector::zeros();

    dx[U] = lon.x_u * du + lon.x_w * dw - g * (s_theta - theta0.sin())
        + lon.x_throttle * d_throttle;
    dx[W] = lon.z_u * du
        + lon.z_w * dw
        + u0 * q
        + g * (c_theta * c_phi - theta0.cos())
        + lon.z_elevator * d_elevator;
    dx[Q] = lon.m_u * du + lon.m_w * dw + lon.m_q * q + lon.m_elevator * d_elevator;

    dx[V] = lat.y_v * x[V] + lat.y_rudder * controls.rudder - u0 * r + g * c_theta * s_phi;
    dx[P] = lat.l_v * x[V]
        + lat.l_p * p
        + lat.l_r * r
        + lat.l_aileron * controls.aileron
        + lat.l_rudder * controls.rudder;
    dx[R] = lat.n_v * x[V]
        + lat.n_p * p
        + lat.n_r * r
        + lat.n_aileron * controls.aileron
        + lat.n_rudder * controls.rudder;

    dx[PHI] = p + (q * s_phi + r * c_phi) * theta.tan();
    dx[THETA] = q * c_phi - r * s_phi;
    dx[PSI] = (q * s_phi + r * c_phi) / c_theta;

    let body_to_ned = Rotation3::from_euler_angles(phi, theta, psi);
    let velocity_ned = body_to_ned * Vector3::new(x[U], x[V], x[W]);
    dx[NORTH] = velocity_ned.x;
    dx[EAST] = velocity_ned.y;
    dx[H] = -velocity_ned.z;

    dx
}

fn rk4_step(model: &LinearModel, x: &StateVector, controls: &Controls, dt: f64) -> StateVector {
    let k1 = derivatives(model, x, controls);
    let k2 = derivatives(model, &(x + k1 * (dt / 2.0)), controls);
    let k3 = derivatives(model, &(x + k2 * (dt / 2.0)), controls);
    let k4 = derivatives(model, &(x + k3 * dt), controls);
    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

impl FlightDynamics for LinearEngine {
    fn name(&self) -> &str {
        "linear"
    }

    fn load_model(&mut self, model: &ModelReference) -> Result<(), EngineError> {
        let loaded = LinearModel::from_file(&model.model_id, &model.path)?;
        info!(
            "Loaded linear model '{}' for {} from {}",
            loaded.name,
            model.model_id,
            model.path.display()
        );
        self.model = Some(loaded);
        self.state = StateVector::zeros();
        self.derivative = StateVector::zeros();
        self.controls = Controls::default();
        self.sim_time = 0.0;
        Ok(())
    }

    fn bind(&self, engine_id: &str) -> Option<PropertySlot> {
        BINDINGS
            .iter()
            .position(|(id, _)| *id == engine_id)
            .map(PropertySlot)
    }

    fn get(&self, slot: PropertySlot) -> f64 {
        let Some((_, binding)) = BINDINGS.get(slot.0) else {
            return f64::NAN;
        };
        match *binding {
            Binding::State(i) => self.state[i],
            Binding::Derivative(i) => self.derivative[i],
            Binding::Heading => wrap_heading_deg(rad_to_deg(self.state[PSI])),
            Binding::Sideslip => {
                let airspeed = self.airspeed();
                if airspeed < 1e-9 {
                    0.0
                } else {
                    rad_to_deg((self.state[V] / airspeed).clamp(-1.0, 1.0).asin())
                }
            }
            Binding::Latitude => self.origin.0 + rad_to_deg(self.state[NORTH] / EARTH_RADIUS_FT),
            Binding::Longitude => {
                let radius = EARTH_RADIUS_FT * deg_to_rad(self.origin.0).cos();
                self.origin.1 + rad_to_deg(self.state[EAST] / radius)
            }
            Binding::VerticalSpeed => self.derivative[H],
            Binding::SimTime => self.sim_time,
            Binding::Aileron => self.controls.aileron,
            Binding::Elevator => self.controls.elevator,
            Binding::Rudder => self.controls.rudder,
            Binding::Throttle => self.controls.throttle,
            Binding::Mixture => self.controls.mixture,
            Binding::Running => {
                if self.controls.running {
                    1.0
                } else {
                    0.0
                }
            }
            Binding::IcAltitude => self.ic.altitude_ft,
            Binding::IcHeading => self.ic.heading_deg,
            Binding::IcPitch => self.ic.pitch_rad,
            Binding::IcRoll => self.ic.roll_rad,
            Binding::IcU => self.ic.u_fps,
            Binding::IcV => self.ic.v_fps,
            Binding::IcW => self.ic.w_fps,
            Binding::IcP => self.ic.p_radps,
            Binding::IcQ => self.ic.q_radps,
            Binding::IcR => self.ic.r_radps,
            Binding::IcLatitude => self.ic.latitude_deg,
            Binding::IcLongitude => self.ic.longitude_deg,
        }
    }

    fn set(&mut self, slot: PropertySlot, value: f64) {
        let Some((engine_id, binding)) = BINDINGS.get(slot.0) else {
            return;
        };
        match *binding {
            Binding::Aileron => self.controls.aileron = value,
            Binding::Elevator => self.controls.elevator = value,
            Binding::Rudder => self.controls.rudder = value,
            Binding::Throttle => self.controls.throttle = value,
            Binding::Mixture => self.controls.mixture = value,
            // -1 starts every engine
            Binding::Running => self.controls.running = value != 0.0,
            Binding::IcAltitude => self.ic.altitude_ft = value,
            Binding::IcHeading => self.ic.heading_deg = value,
            Binding::IcPitch => self.ic.pitch_rad = value,
            Binding::IcRoll => self.ic.roll_rad = value,
            Binding::IcU => self.ic.u_fps = value,
            Binding::IcV => self.ic.v_fps = value,
            Binding::IcW => self.ic.w_fps = value,
            Binding::IcP => self.ic.p_radps = value,
            Binding::IcQ => self.ic.q_radps = value,
            Binding::IcR => self.ic.r_radps = value,
            Binding::IcLatitude => self.ic.latitude_deg = value,
            Binding::IcLongitude => self.ic.longitude_deg = value,
            _ => debug!("Ignoring write to read-only property {}", engine_id),
        }
    }

    fn set_dt(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn run_ic(&mut self) -> Result<(), EngineError> {
        let model = self.loaded_model()?;
        let ic = self.ic;
        let mut x = StateVector::zeros();
        x[U] = ic.u_fps;
        x[V] = ic.v_fps;
        x[W] = ic.w_fps;
        x[P] = ic.p_radps;
        x[Q] = ic.q_radps;
        x[R] = ic.r_radps;
        x[PHI] = ic.roll_rad;
        x[THETA] = ic.pitch_rad;
        x[PSI] = deg_to_rad(ic.heading_deg);
        x[H] = ic.altitude_ft;
        let dx = derivatives(model, &x, &self.controls);

        self.sim_time = 0.0;
        self.check_finite(&x)?;
        self.check_finite(&dx)?;
        self.state = x;
        self.derivative = dx;
        self.origin = (ic.latitude_deg, ic.longitude_deg);
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let model = self.loaded_model()?;
        let next = rk4_step(model, &self.state, &self.controls, self.dt);
        let dx = derivatives(model, &next, &self.controls);
        self.check_finite(&next)?;
        self.check_finite(&dx)?;
        self.state = next;
        self.derivative = dx;
        self.sim_time += self.dt;
        Ok(())
    }

    fn sim_time(&self) -> f64 {
        self.sim_time
    }

    fn unload(&mut self) {
        if self.model.take().is_some() {
            debug!("Unloaded linear model");
        }
        self.state = StateVector::zeros();
        self.derivative = StateVector::zeros();
        self.sim_time = 0.0;
    }
}

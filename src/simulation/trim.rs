use argmin::core::{CostFunction, Error as ArgminError, Executor};
use argmin::solver::neldermead::NelderMead;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::adapter::Simulation;
use crate::properties::catalog;
use crate::utils::GRAVITY_FPS2;

/// Cost reported for parameter sets the engine cannot evaluate.
const INFEASIBLE_COST: f64 = 1e10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrimError {
    #[error("Trim solver failed: {0}")]
    Solver(String),

    #[error("Trim did not converge (cost {cost:.3e} after {iterations} iterations)")]
    NotConverged { cost: f64, iterations: u64 },
}

/// Box constraints on the trim parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimBounds {
    pub alpha_range: (f64, f64),
    pub elevator_range: (f64, f64),
    pub throttle_range: (f64, f64),
    pub aileron_range: (f64, f64),
    pub rudder_range: (f64, f64),
}

impl Default for TrimBounds {
    fn default() -> Self {
        Self {
            alpha_range: (-10f64.to_radians(), 20f64.to_radians()),
            elevator_range: (-1.0, 1.0),
            throttle_range: (0.0, 1.0),
            aileron_range: (-1.0, 1.0),
            rudder_range: (-1.0, 1.0),
        }
    }
}

/// Configuration for the trim solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSolverConfig {
    /// Maximum number of Nelder-Mead iterations
    pub max_iterations: u64,
    /// The solver stops as soon as the best cost reaches this
    pub target_cost: f64,
    /// Trim counts as converged below this cost
    pub cost_tolerance: f64,
    pub bounds: TrimBounds,
}

impl Default for TrimSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            target_cost: 1e-8,
            cost_tolerance: 1e-6,
            bounds: TrimBounds::default(),
        }
    }
}

/// Steady straight-and-level control solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimResult {
    pub alpha_rad: f64,
    pub elevator: f64,
    pub throttle: f64,
    pub aileron: f64,
    pub rudder: f64,
    pub cost: f64,
    pub iterations: u64,
}

#[derive(Debug, Clone, Copy)]
struct TrimParams {
    alpha: f64,
    elevator: f64,
    throttle: f64,
    aileron: f64,
    rudder: f64,
}

impl TrimParams {
    // [alpha, elevator, throttle, aileron, rudder], clamped to bounds
    fn from_vec(param: &[f64], bounds: &TrimBounds) -> Self {
        Self {
            alpha: param[0].clamp(bounds.alpha_range.0, bounds.alpha_range.1),
            elevator: param[1].clamp(bounds.elevator_range.0, bounds.elevator_range.1),
            throttle: param[2].clamp(bounds.throttle_range.0, bounds.throttle_range.1),
            aileron: param[3].clamp(bounds.aileron_range.0, bounds.aileron_range.1),
            rudder: param[4].clamp(bounds.rudder_range.0, bounds.rudder_range.1),
        }
    }

    fn to_vec(self) -> Vec<f64> {
        vec![
            self.alpha,
            self.elevator,
            self.throttle,
            self.aileron,
            self.rudder,
        ]
    }
}

/// Cost over the trim parameters, evaluated by the simulation's own engine.
struct TrimProblem<'a> {
    sim: RefCell<&'a mut Simulation>,
    airspeed_fps: f64,
    bounds: TrimBounds,
}

impl TrimProblem<'_> {
    /// Write the parameters as level flight at the fixed airspeed and
    /// recompute accelerations.
    fn apply(&self, params: &TrimParams) -> Result<(), ArgminError> {
        let mut sim = self.sim.borrow_mut();
        let writes = [
            (catalog::IC_U_FPS, self.airspeed_fps),
            (catalog::IC_W_FPS, self.airspeed_fps * params.alpha.tan()),
            (catalog::IC_PITCH_RAD, params.alpha),
            (catalog::ELEVATOR_CMD, params.elevator),
            (catalog::THROTTLE_CMD, params.throttle),
            (catalog::AILERON_CMD, params.aileron),
            (catalog::RUDDER_CMD, params.rudder),
        ];
        for (id, value) in writes {
            sim.set(id, value)
                .map_err(|e| ArgminError::msg(e.to_string()))?;
        }
        sim.rerun_initial_conditions()
            .map_err(|e| ArgminError::msg(e.to_string()))
    }
}

impl CostFunction for TrimProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        if param.len() != 5 {
            return Err(ArgminError::msg(
                "Param vector must have length 5 [alpha, elevator, throttle, aileron, rudder]",
            ));
        }
        let params = TrimParams::from_vec(param, &self.bounds);
        if self.apply(&params).is_err() {
            return Ok(INFEASIBLE_COST);
        }

        let sim = self.sim.borrow();
        let linear = [catalog::UDOT_FPS2, catalog::VDOT_FPS2, catalog::WDOT_FPS2]
            .map(|id| sim.get(id) / GRAVITY_FPS2);
        let angular = [catalog::PDOT_RADPS2, catalog::QDOT_RADPS2, catalog::RDOT_RADPS2]
            .map(|id| sim.get(id));
        let cost: f64 = linear.iter().chain(angular.iter()).map(|a| a * a).sum();
        Ok(if cost.is_finite() { cost } else { INFEASIBLE_COST })
    }
}

fn initial_simplex(init: &[f64]) -> Vec<Vec<f64>> {
    const STEPS: [f64; 5] = [0.02, 0.05, 0.05, 0.05, 0.05];
    let mut simplex = Vec::with_capacity(init.len() + 1);
    simplex.push(init.to_vec());
    for (i, step) in STEPS.iter().enumerate() {
        let mut vertex = init.to_vec();
        vertex[i] += step;
        simplex.push(vertex);
    }
    simplex
}

impl Simulation {
    /// Solve for steady straight-and-level flight at the current initial airspeed.
    ///
    /// On success the solution is written back to the engine (attitude, body
    /// velocities and controls) and the initial-condition pass is re-run.
    pub fn trim(&mut self, config: &TrimSolverConfig) -> Result<TrimResult, TrimError> {
        let airspeed_fps = self.get(catalog::IC_U_FPS);
        let init = TrimParams::from_vec(
            &[
                (self.get(catalog::IC_W_FPS) / airspeed_fps).atan(),
                self.get(catalog::ELEVATOR_CMD),
                self.get(catalog::THROTTLE_CMD),
                self.get(catalog::AILERON_CMD),
                self.get(catalog::RUDDER_CMD),
            ],
            &config.bounds,
        );
        let aircraft = self.aircraft().name;

        let (best, cost, iterations) = {
            let problem = TrimProblem {
                sim: RefCell::new(&mut *self),
                airspeed_fps,
                bounds: config.bounds,
            };
            let solver = NelderMead::new(initial_simplex(&init.to_vec()))
                .with_sd_tolerance(1e-14)
                .map_err(|e| TrimError::Solver(e.to_string()))?;
            let result = Executor::new(problem, solver)
                .configure(|state| {
                    state
                        .max_iters(config.max_iterations)
                        .target_cost(config.target_cost)
                })
                .run()
                .map_err(|e| TrimError::Solver(e.to_string()))?;
            let best = result
                .state
                .best_param
                .clone()
                .ok_or_else(|| TrimError::Solver("solver returned no parameters".into()))?;
            (best, result.state.best_cost, result.state.iter)
        };

        let params = TrimParams::from_vec(&best, &config.bounds);
        let problem = TrimProblem {
            sim: RefCell::new(&mut *self),
            airspeed_fps,
            bounds: config.bounds,
        };
        problem
            .apply(&params)
            .map_err(|e| TrimError::Solver(e.to_string()))?;
        debug!("Trim solution for {}: {:?}", aircraft, params);

        if !(cost < config.cost_tolerance) {
            warn!(
                "Trim for {} did not converge: cost {:.3e} after {} iterations",
                aircraft, cost, iterations
            );
            return Err(TrimError::NotConverged { cost, iterations });
        }

        info!(
            "{} trimmed: alpha={:.2}°, elevator={:.3}, throttle={:.3}, cost={:.2e}, iterations={}",
            aircraft,
            params.alpha.to_degrees(),
            params.elevator,
            params.throttle,
            cost,
            iterations
        );
        Ok(TrimResult {
            alpha_rad: params.alpha,
            elevator: params.elevator,
            throttle: params.throttle,
            aileron: params.aileron,
            rudder: params.rudder,
            cost,
            iterations,
        })
    }
}

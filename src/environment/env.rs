use rand_chacha::ChaCha8Rng;
use serde_json::{json, Map, Value};
use tracing::{debug, info, trace, warn};

use super::config::EnvConfig;
use super::spaces::BoxSpace;
use crate::physics::{linear_engine_factory, EngineFactory};
use crate::render::{
    launch_flightgear, FigureVisualiser, FlightGearLink, RealTimePacer, RenderFrame, RenderMode,
    RenderState,
};
use crate::simulation::Simulation;
use crate::tasks::{FlightTask, TaskPhase, TaskStep};
use crate::utils::{EnvError, EnvResult, RngManager};

/// RNG stream feeding task target sampling.
const TASK_STREAM: &str = "task";

/// One reinforcement-learning environment: an aircraft, a task and a reward shaping.
///
/// The environment owns its simulation exclusively. Run several environments
/// side by side by building several instances.
pub struct Environment {
    config: EnvConfig,
    engine_factory: EngineFactory,
    sim: Option<Simulation>,
    task: FlightTask,
    rng: RngManager,
    task_rng: ChaCha8Rng,
    observation_space: BoxSpace,
    action_space: BoxSpace,
    figure: Option<FigureVisualiser>,
    flightgear: Option<FlightGearLink>,
    pacer: Option<RealTimePacer>,
    closed: bool,
}

impl Environment {
    /// Build an environment on the bundled linear engine.
    pub fn new(config: EnvConfig) -> EnvResult<Self> {
        Self::with_engine(config, linear_engine_factory())
    }

    /// Build an environment whose simulations come from `engine_factory`.
    ///
    /// The aircraft model is loaded here, so a missing or malformed model
    /// fails construction rather than the first reset.
    pub fn with_engine(config: EnvConfig, engine_factory: EngineFactory) -> EnvResult<Self> {
        let task = FlightTask::new(config.task, config.shaping, config.max_episode_steps())?;
        let sim = load_simulation(&config, &engine_factory)?;
        let observation_space = BoxSpace::from_properties(task.observation_properties());
        let action_space = BoxSpace::from_properties(task.action_properties());
        let rng = config
            .seed
            .map(RngManager::new)
            .unwrap_or_else(RngManager::from_entropy);
        let task_rng = rng.get_rng(TASK_STREAM);

        let pacer = (config.render_mode == RenderMode::FlightGear)
            .then(|| RealTimePacer::new(config.flightgear.time_factor));

        info!(
            "Created environment {} (aircraft {}, task {}, shaping {}, render mode {}, {} steps per episode)",
            config.env_id(),
            config.aircraft,
            config.task,
            config.shaping,
            config.render_mode,
            task.max_steps()
        );

        let mut env = Self {
            config,
            engine_factory,
            sim: Some(sim),
            task,
            rng,
            task_rng,
            observation_space,
            action_space,
            figure: None,
            flightgear: None,
            pacer,
            closed: false,
        };
        env.open_flightgear()?;
        Ok(env)
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    pub fn task(&self) -> &FlightTask {
        &self.task
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Master seed of the current RNG streams.
    pub fn seed(&self) -> u64 {
        self.rng.master_seed()
    }

    /// Start a new episode.
    ///
    /// A seed reseeds target sampling, so equal seeds give equal targets and
    /// equal initial observations. Without one the previous stream continues.
    pub fn reset(&mut self, seed: Option<u64>) -> EnvResult<(Vec<f64>, Map<String, Value>)> {
        if let Some(seed) = seed {
            self.rng = RngManager::new(seed);
            self.task_rng = self.rng.get_rng(TASK_STREAM);
        }
        if self.closed {
            self.sim = Some(load_simulation(&self.config, &self.engine_factory)?);
            self.open_flightgear()?;
            self.closed = false;
        }

        // Only a completed reset may leave an episode running.
        self.task.clear();

        let targets = self.task.kind().sample_targets(&mut self.task_rng);
        let aircraft = self.config.aircraft.spec();
        let conditions = self.task.initial_conditions(aircraft, &targets);

        let sim = self.sim.as_mut().ok_or(EnvError::ResetRequired)?;
        sim.initialize(&conditions)?;
        let trim = sim.trim(&self.config.trim)?;
        let (observation, mut info) = self.task.begin_episode(sim, targets)?;
        let sim_time = sim.sim_time();

        info.insert("seed".into(), json!(self.rng.master_seed()));
        info.insert("trim_cost".into(), json!(trim.cost));
        info.insert("trim_iterations".into(), json!(trim.iterations));

        if let Some(figure) = self.figure.as_mut() {
            figure.clear_history();
        }
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.reset(sim_time);
        }
        info!(
            "Reset {} (seed {}): trim cost {:.2e}",
            self.config.env_id(),
            self.rng.master_seed(),
            trim.cost
        );
        Ok((observation, info))
    }

    /// Apply `action` (aileron, elevator, rudder, each in [-1, 1]) for one agent step.
    pub fn step(&mut self, action: &[f64]) -> EnvResult<TaskStep> {
        if let Some(reason) = self.action_space.violation(action) {
            return Err(EnvError::InvalidAction(reason));
        }
        if self.closed || self.task.phase() == TaskPhase::Uninitialized {
            return Err(EnvError::ResetRequired);
        }
        let sim = self.sim.as_mut().ok_or(EnvError::ResetRequired)?;
        let step = self.task.step(sim, action)?;
        trace!(
            "step reward={:.4} terminated={} truncated={}",
            step.reward,
            step.terminated,
            step.truncated
        );

        if let Some(pacer) = self.pacer.as_ref() {
            pacer.pace(sim.sim_time());
        }
        Ok(step)
    }

    /// Draw the current state.
    ///
    /// `human` returns a frame from the 2D figure; `flightgear` sends the pose
    /// to FlightGear and returns no frame.
    pub fn render(&mut self, mode: RenderMode) -> EnvResult<Option<RenderFrame>> {
        if !self.config.render_mode.allows(mode) {
            return Err(EnvError::UnsupportedRenderMode {
                requested: mode.to_string(),
                configured: self.config.render_mode.to_string(),
            });
        }
        let sim = self.sim.as_ref().ok_or(EnvError::ResetRequired)?;
        let state = RenderState::from_snapshot(&sim.snapshot());

        match mode {
            RenderMode::Human => {
                if self.figure.is_none() {
                    self.figure = Some(FigureVisualiser::new()?);
                }
                match self.figure.as_mut() {
                    Some(figure) => Ok(Some(figure.draw(&state)?)),
                    None => Ok(None),
                }
            }
            RenderMode::FlightGear => {
                let link = self
                    .flightgear
                    .as_mut()
                    .ok_or(EnvError::ResetRequired)?;
                link.send(&state)?;
                Ok(None)
            }
            RenderMode::None => Ok(None),
        }
    }

    /// Release the simulation and any visualisation link. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Some(mut sim) = self.sim.take() {
            sim.close();
        }
        if let Some(mut link) = self.flightgear.take() {
            link.close();
        }
        self.task.clear();
        self.closed = true;
        info!("Closed environment {}", self.config.env_id());
    }

    fn open_flightgear(&mut self) -> EnvResult<()> {
        if self.config.render_mode != RenderMode::FlightGear || self.flightgear.is_some() {
            return Ok(());
        }
        let mut link = FlightGearLink::connect(&self.config.flightgear)?;
        if self.config.flightgear.launch {
            match launch_flightgear(
                &self.config.flightgear,
                self.config.aircraft.spec(),
                self.config.agent_hz,
            ) {
                Ok(child) => link.attach_process(child),
                Err(e) => warn!("Could not launch FlightGear: {}", e),
            }
        }
        self.flightgear = Some(link);
        Ok(())
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.close();
    }
}

fn load_simulation(config: &EnvConfig, engine_factory: &EngineFactory) -> EnvResult<Simulation> {
    debug!(
        "Loading {} from {}",
        config.aircraft,
        config.asset_dir.display()
    );
    Simulation::load(
        engine_factory(),
        config.aircraft.spec(),
        &config.asset_dir,
        config.engine_hz,
        config.agent_hz,
    )
}

use std::path::Path;
use tracing::{debug, info, warn};

use super::conditions::InitialConditions;
use crate::aircraft::{AircraftError, AircraftSpec};
use crate::physics::{EngineError, FlightDynamics, PropertySlot};
use crate::properties::{catalog, PropertyError, PropertyId, PropertyKind, PropertySnapshot};
use crate::utils::EnvResult;

/// Throttle and mixture written before trimming.
const START_THROTTLE: f64 = 0.8;
const START_MIXTURE: f64 = 0.8;

/// Outcome of one agent-rate advance.
#[derive(Debug, Clone, PartialEq)]
pub struct SimResult {
    pub success: bool,
    pub sim_time: f64,
    /// Why the advance failed, when it did.
    pub error: Option<EngineError>,
}

/// Owns one flight-dynamics engine and exposes it through catalogued properties.
///
/// Engine-backed properties are bound to engine slots once at load time.
/// Derived properties (errors, targets, counters) live here, not in the engine.
pub struct Simulation {
    engine: Box<dyn FlightDynamics>,
    aircraft: &'static AircraftSpec,
    slots: Vec<Option<PropertySlot>>,
    derived: PropertySnapshot,
    engine_steps_per_advance: usize,
    closed: bool,
}

impl Simulation {
    /// Load the aircraft model into `engine` and bind every engine-backed property.
    ///
    /// # Arguments
    /// - `engine`: A fresh engine, owned exclusively by this simulation.
    /// - `aircraft`: The aircraft to load.
    /// - `asset_dir`: Directory holding `aircraft/<model>.yaml`.
    /// - `engine_hz`: Engine integration frequency.
    /// - `agent_hz`: Rate at which [`Simulation::advance`] is called.
    pub fn load(
        mut engine: Box<dyn FlightDynamics>,
        aircraft: &'static AircraftSpec,
        asset_dir: &Path,
        engine_hz: u32,
        agent_hz: u32,
    ) -> EnvResult<Self> {
        let model = aircraft.model_reference(asset_dir)?;
        engine.load_model(&model).map_err(|e| match e {
            EngineError::InvalidModel { reason, .. } => AircraftError::ModelParse {
                aircraft: aircraft.name.to_string(),
                reason,
            }
            .into(),
            other => crate::utils::EnvError::from(other),
        })?;
        engine.set_dt(1.0 / engine_hz as f64);

        let mut slots = Vec::with_capacity(catalog::len());
        for (_, descriptor) in catalog::all() {
            if !descriptor.is_engine_backed() {
                slots.push(None);
                continue;
            }
            let slot = engine
                .bind(descriptor.engine_id)
                .ok_or_else(|| EngineError::UnboundProperty(descriptor.engine_id.to_string()))?;
            slots.push(Some(slot));
        }

        let engine_steps_per_advance = (engine_hz / agent_hz.max(1)).max(1) as usize;
        info!(
            "Loaded {} into {} engine ({} engine steps per agent step)",
            aircraft.name,
            engine.name(),
            engine_steps_per_advance
        );

        Ok(Self {
            engine,
            aircraft,
            slots,
            derived: PropertySnapshot::new(),
            engine_steps_per_advance,
            closed: false,
        })
    }

    pub fn aircraft(&self) -> &'static AircraftSpec {
        self.aircraft
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn engine_steps_per_advance(&self) -> usize {
        self.engine_steps_per_advance
    }

    /// Simulated time covered by one [`Simulation::advance`].
    pub fn agent_dt(&self) -> f64 {
        self.engine.dt() * self.engine_steps_per_advance as f64
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write the starting state, start the engine and run the initial-condition pass.
    ///
    /// The aircraft is not yet in equilibrium afterwards; call [`Simulation::trim`]
    /// before applying any agent control.
    pub fn initialize(&mut self, conditions: &InitialConditions) -> EnvResult<()> {
        if self.closed {
            return Err(EngineError::NotLoaded.into());
        }
        self.derived = PropertySnapshot::new();
        for (id, value) in conditions.properties() {
            self.set(id, value)?;
        }
        for (id, value) in [
            (catalog::AILERON_CMD, 0.0),
            (catalog::ELEVATOR_CMD, 0.0),
            (catalog::RUDDER_CMD, 0.0),
            (catalog::THROTTLE_CMD, START_THROTTLE),
            (catalog::MIXTURE_CMD, START_MIXTURE),
            (catalog::ENGINE_RUNNING, -1.0),
        ] {
            self.set(id, value)?;
        }
        self.engine.run_ic()?;
        debug!(
            "Initialised {} at {:.0} ft, heading {:.1}°",
            self.aircraft.name, conditions.altitude_ft, conditions.heading_deg
        );
        Ok(())
    }

    /// Re-apply the current `ic/*` values without advancing time.
    pub(crate) fn rerun_initial_conditions(&mut self) -> Result<(), EngineError> {
        self.engine.run_ic()
    }

    #[inline]
    pub fn get(&self, id: PropertyId) -> f64 {
        match self.slots.get(id.index()).copied().flatten() {
            Some(slot) => self.engine.get(slot),
            None => self.derived.get(id),
        }
    }

    /// Write a property.
    ///
    /// Actuator values are clamped into their declared range. Initial conditions
    /// and derived values are stored as given. Engine outputs are read-only.
    pub fn set(&mut self, id: PropertyId, value: f64) -> Result<(), PropertyError> {
        let descriptor = catalog::descriptor(id);
        match descriptor.kind {
            PropertyKind::State => Err(PropertyError::ReadOnly(
                descriptor.semantic_name.to_string(),
            )),
            PropertyKind::Derived => {
                self.derived.set(id, value);
                Ok(())
            }
            PropertyKind::Actuator | PropertyKind::InitialCondition => {
                let value = if descriptor.kind == PropertyKind::Actuator {
                    descriptor.clamp(value)
                } else {
                    value
                };
                if let Some(slot) = self.slots[id.index()] {
                    self.engine.set(slot, value);
                }
                Ok(())
            }
        }
    }

    /// Advance one agent step, i.e. `engine_hz / agent_hz` engine steps.
    ///
    /// Never returns an error: engine failures and non-finite outputs come back
    /// as `success = false` so the caller can end the episode.
    pub fn advance(&mut self) -> SimResult {
        if self.closed {
            return SimResult {
                success: false,
                sim_time: self.engine.sim_time(),
                error: Some(EngineError::NotLoaded),
            };
        }
        for _ in 0..self.engine_steps_per_advance {
            if let Err(error) = self.engine.run() {
                warn!("{} engine failed: {}", self.aircraft.name, error);
                return SimResult {
                    success: false,
                    sim_time: self.engine.sim_time(),
                    error: Some(error),
                };
            }
        }

        let sim_time = self.engine.sim_time();
        let non_finite = catalog::all()
            .filter(|(_, d)| d.kind == PropertyKind::State)
            .find(|(id, _)| !self.get(*id).is_finite());
        if let Some((id, descriptor)) = non_finite {
            let error = EngineError::Diverged {
                sim_time,
                detail: format!("{} = {}", descriptor.semantic_name, self.get(id)),
            };
            warn!("{} state became non-finite: {}", self.aircraft.name, error);
            return SimResult {
                success: false,
                sim_time,
                error: Some(error),
            };
        }

        SimResult {
            success: true,
            sim_time,
            error: None,
        }
    }

    pub fn sim_time(&self) -> f64 {
        self.engine.sim_time()
    }

    /// Copy of every property value at this instant.
    pub fn snapshot(&self) -> PropertySnapshot {
        let mut snapshot = self.derived.clone();
        for (id, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                snapshot.set(PropertyId(id as u16), self.engine.get(*slot));
            }
        }
        snapshot
    }

    /// Release the engine's model. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.engine.unload();
        self.closed = true;
        debug!("Closed simulation for {}", self.aircraft.name);
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.close();
    }
}
